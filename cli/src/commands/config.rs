// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0

//! Policy file commands
//!
//! Commands: validate, show

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use warden_engine::domain::registry::DefaultPolicy;
use warden_engine::infrastructure::{load_policy, InMemoryAuthority, LoadedPolicy};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Validate a policy file
    Validate {
        /// Path to the policy file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show the namespaces and rules a policy file produces
    Show {
        /// Path to the policy file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

pub fn handle_command(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Validate { file } => validate(&file),
        ConfigCommand::Show { file, json } => show(&file, json),
    }
}

fn load(file: &PathBuf) -> Result<LoadedPolicy> {
    let mut authority = InMemoryAuthority::new();
    load_policy(file, &mut authority)
        .with_context(|| format!("Failed to load policy file {}", file.display()))
}

fn validate(file: &PathBuf) -> Result<()> {
    let policy = load(file)?;

    println!(
        "{} {} namespaces, {} client rules",
        "OK".green().bold(),
        policy.registry.len(),
        policy.rules.len()
    );
    Ok(())
}

fn show(file: &PathBuf, json: bool) -> Result<()> {
    let policy = load(file)?;

    if json {
        let summaries = policy.registry.summaries();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("{}", "Namespaces:".bold());
    for ns in policy.registry.iter() {
        let mut tags = Vec::new();
        if ns.is_root {
            tags.push("root");
        }
        if ns.super_power {
            tags.push("superpower");
        }
        if !ns.retained {
            tags.push("ephemeral");
        }
        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join(", "))
        };
        println!("  {}{}", ns.name.bold(), tags);

        let granted: Vec<&str> = ns.permissions.granted().map(|cap| cap.token()).collect();
        if !granted.is_empty() {
            println!("    allow: {}", granted.join(" "));
        }
        for credential in &ns.credentials {
            println!(
                "    auth: {} {}",
                credential.protocol,
                credential.secret_hex().dimmed()
            );
        }
    }
    println!();

    println!("{}", "Client rules:".bold());
    if policy.rules.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for rule in policy.rules.iter() {
        let target = policy
            .registry
            .get(rule.namespace)
            .map(|ns| ns.name.as_str())
            .unwrap_or("?");
        println!("  {} → {}", rule.client_name, target);
    }
    println!();

    let default = match policy.registry.default_policy() {
        DefaultPolicy::Anonymous => "anon".to_string(),
        DefaultPolicy::Deny => "deny".to_string(),
        DefaultPolicy::Ephemeral => "new_ns".to_string(),
        DefaultPolicy::Namespace(id) => policy
            .registry
            .get(id)
            .map(|ns| ns.name.clone())
            .unwrap_or_else(|| "?".to_string()),
    };
    println!("{} {}", "Default policy:".bold(), default);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn policy_file(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{text}").unwrap();
        file
    }

    #[test]
    fn test_validate_accepts_good_policy() {
        let file = policy_file("namespace studio\nallow screen\nclient editor\n");
        assert!(validate(&file.path().to_path_buf()).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_file() {
        assert!(validate(&PathBuf::from("/nonexistent/warden.conf")).is_err());
    }

    #[test]
    fn test_show_renders_json() {
        let file = policy_file("namespace studio\nallow randr\n");
        assert!(show(&file.path().to_path_buf(), true).is_ok());
    }
}
