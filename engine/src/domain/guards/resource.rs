// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Resource-Access Guard
//!
//! Mediates every access to a resource owned by another session. On top of
//! the shared rule shape it carries one side effect: a window created by a
//! namespace without the `transparency` flag is reported forced-opaque,
//! independent of the pass/block outcome.
//!
//! Whitelist layers, in evaluation order:
//! - resources owned by the root namespace (benign geometry/property/tree
//!   queries, cursor-image queries, flag-gated pointer and screen reads)
//! - the acting namespace's own private virtual-root window
//!   (property get/set/rotate and subtree queries)
//! - the literal screen root window (creation and read access every
//!   top-level client needs, keyed on the requested access-mode mask)
//! - server-owned non-window resources (colormap and read-only masks)

use tracing::warn;

use crate::domain::binding::ClientBinding;
use crate::domain::guards::{ResourceDecision, Verdict};
use crate::domain::namespace::Namespace;
use crate::domain::operation::{AccessMode, ResourceKind, ResourceOp, ResourceTarget};

/// Decide whether `subject` may access a resource owned by `owner`.
pub fn check(
    subject_binding: &ClientBinding,
    subject: &Namespace,
    owner_binding: &ClientBinding,
    owner: &Namespace,
    op: ResourceOp,
    target: &ResourceTarget,
) -> ResourceDecision {
    // the side effect applies before any verdict is rendered
    let force_opaque = target.kind == ResourceKind::Window
        && target.access.contains(AccessMode::CREATE)
        && !subject.permissions.transparency;

    let verdict = classify(subject_binding, subject, owner_binding, owner, op, target);
    if verdict == Verdict::Block {
        warn!(
            guard = "resource",
            namespace = %subject.name,
            owner = %owner.name,
            op = ?op,
            kind = ?target.kind,
            access = ?target.access,
            "blocked resource access"
        );
    }

    ResourceDecision {
        verdict,
        force_opaque,
    }
}

fn classify(
    subject_binding: &ClientBinding,
    subject: &Namespace,
    owner_binding: &ClientBinding,
    owner: &Namespace,
    op: ResourceOp,
    target: &ResourceTarget,
) -> Verdict {
    // the server session itself can do anything
    if subject_binding.is_server {
        return Verdict::Pass;
    }

    if subject.super_power || subject_binding.shares_namespace_with(owner_binding) {
        return Verdict::Pass;
    }

    if owner.is_root && root_owner_whitelisted(subject, op, target) {
        return Verdict::Pass;
    }

    if is_own_virtual_root(subject, target) && virtual_root_whitelisted(op) {
        return Verdict::Pass;
    }

    if target.is_screen_root {
        if let Some(verdict) = screen_root_rule(subject, op, target.access) {
            return verdict;
        }
    }

    if owner_binding.is_server {
        return server_resource_rule(op, target);
    }

    Verdict::Block
}

/// Benign categories every namespace may aim at root-owned resources.
fn root_owner_whitelisted(subject: &Namespace, op: ResourceOp, target: &ResourceTarget) -> bool {
    let perms = &subject.permissions;

    if target.kind == ResourceKind::RandrEvent && perms.randr {
        return true;
    }

    match op {
        // safe to expose globally from root
        ResourceOp::GetProperty
        | ResourceOp::TranslateCoords
        | ResourceOp::GetGeometry
        | ResourceOp::QueryTree
        | ResourceOp::GetWindowAttributes
        | ResourceOp::DestroyWindow
        | ResourceOp::XfixesGetCursorImage
        | ResourceOp::XfixesGetCursorImageAndName => true,

        ResourceOp::QueryPointer | ResourceOp::XiQueryPointer => perms.mouse_motion,

        ResourceOp::ShmCreatePixmap => true,
        ResourceOp::ShmOther => perms.screen,
        ResourceOp::Composite => perms.composite,
        ResourceOp::GetImage | ResourceOp::CopyArea => perms.screen,

        _ => false,
    }
}

fn is_own_virtual_root(subject: &Namespace, target: &ResourceTarget) -> bool {
    match (subject.virtual_root, target.window) {
        (Some(own), Some(window)) => own == window,
        _ => false,
    }
}

/// Operations a namespace may aim at its own private virtual root.
fn virtual_root_whitelisted(op: ResourceOp) -> bool {
    matches!(
        op,
        ResourceOp::DeleteProperty
            | ResourceOp::ChangeProperty
            | ResourceOp::GetProperty
            | ResourceOp::RotateProperties
            | ResourceOp::QueryTree
    )
}

/// Table for the literal screen root window. Returns `None` when the
/// category is not handled here, leaving the remaining rules to decide.
fn screen_root_rule(subject: &Namespace, op: ResourceOp, access: AccessMode) -> Option<Verdict> {
    let perms = &subject.permissions;

    let verdict = match op {
        // creating a top-level window adds a child to the root
        ResourceOp::CreateWindow => flag(access.is_subset_of(AccessMode::ADD)),

        // these only read the root's attributes
        ResourceOp::CreateGc | ResourceOp::CreatePixmap | ResourceOp::CreateColormap => {
            flag(access.is_subset_of(AccessMode::GET_ATTR))
        }

        // destroying a top-level window removes a child from the root
        ResourceOp::DestroyWindow => flag(access == AccessMode::REMOVE),

        ResourceOp::TranslateCoords
        | ResourceOp::QueryTree
        | ResourceOp::GetWindowAttributes
        | ResourceOp::ChangeWindowAttributes => Verdict::Pass,

        ResourceOp::QueryPointer => flag(perms.mouse_motion),
        ResourceOp::GrabPointer => flag(perms.x_input),

        // the send/receive guards mediate the actual event delivery
        ResourceOp::SendEvent => Verdict::Pass,

        ResourceOp::XiQueryPointer => flag(perms.x_input),
        ResourceOp::XiSelectEvents => Verdict::Pass,
        ResourceOp::XiOther => Verdict::Block,

        ResourceOp::Randr => flag(perms.randr),
        ResourceOp::Render => flag(perms.render),

        _ => return None,
    };
    Some(verdict)
}

/// Server-owned resources that are not the screen root.
fn server_resource_rule(op: ResourceOp, target: &ResourceTarget) -> Verdict {
    match target.kind {
        ResourceKind::Colormap => flag(target.access.is_subset_of(
            AccessMode::READ
                | AccessMode::GET_PROP
                | AccessMode::USE
                | AccessMode::GET_ATTR
                | AccessMode::ADD,
        )),

        // any allowed window access was caught by the earlier layers
        ResourceKind::Window => {
            warn!(guard = "resource", op = ?op, "rejecting access to server-owned window");
            Verdict::Block
        }

        _ => flag(target.access.is_subset_of(AccessMode::READ)),
    }
}

fn flag(allowed: bool) -> Verdict {
    if allowed {
        Verdict::Pass
    } else {
        Verdict::Block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::namespace::{NamespaceFlags, NamespaceId, WindowHandle};
    use crate::domain::permissions::{Capability, PermissionSet};

    fn namespace(name: &str, perms: PermissionSet, flags: NamespaceFlags) -> Namespace {
        Namespace::new(name, perms, true, flags)
    }

    fn bound(ns: &Namespace) -> ClientBinding {
        ClientBinding {
            is_server: false,
            credential: None,
            namespace: Some(ns.id),
        }
    }

    fn plain_target(kind: ResourceKind, access: AccessMode) -> ResourceTarget {
        ResourceTarget::new(kind, access)
    }

    #[test]
    fn test_same_namespace_always_passes() {
        let ns = namespace("studio", PermissionSet::NONE, NamespaceFlags::default());
        let a = bound(&ns);
        let b = bound(&ns);

        let decision = check(
            &a,
            &ns,
            &b,
            &ns,
            ResourceOp::Other,
            &plain_target(ResourceKind::Other, AccessMode::WRITE),
        );
        assert_eq!(decision.verdict, Verdict::Pass);
    }

    #[test]
    fn test_server_session_passes_everything() {
        let ns = namespace("root", PermissionSet::ALL, NamespaceFlags::default());
        let other = namespace("studio", PermissionSet::NONE, NamespaceFlags::default());
        let server = ClientBinding::server();

        let decision = check(
            &server,
            &ns,
            &bound(&other),
            &other,
            ResourceOp::Other,
            &plain_target(ResourceKind::Other, AccessMode::WRITE),
        );
        assert_eq!(decision.verdict, Verdict::Pass);
    }

    #[test]
    fn test_cross_namespace_default_blocks() {
        let a = namespace("a", PermissionSet::NONE, NamespaceFlags::default());
        let b = namespace("b", PermissionSet::NONE, NamespaceFlags::default());

        let decision = check(
            &bound(&a),
            &a,
            &bound(&b),
            &b,
            ResourceOp::GetProperty,
            &plain_target(ResourceKind::Window, AccessMode::READ),
        );
        assert_eq!(decision.verdict, Verdict::Block);
    }

    #[test]
    fn test_root_owner_whitelist_geometry_queries() {
        let subject = namespace("studio", PermissionSet::NONE, NamespaceFlags::default());
        let root = namespace(
            "root",
            PermissionSet::ALL,
            NamespaceFlags {
                is_root: true,
                ..NamespaceFlags::default()
            },
        );

        for op in [
            ResourceOp::GetProperty,
            ResourceOp::GetGeometry,
            ResourceOp::QueryTree,
            ResourceOp::GetWindowAttributes,
            ResourceOp::TranslateCoords,
            ResourceOp::XfixesGetCursorImage,
        ] {
            let decision = check(
                &bound(&subject),
                &subject,
                &bound(&root),
                &root,
                op,
                &plain_target(ResourceKind::Window, AccessMode::READ),
            );
            assert_eq!(decision.verdict, Verdict::Pass, "{op:?}");
        }
    }

    #[test]
    fn test_root_owner_pointer_query_needs_mouse_motion() {
        let root = namespace(
            "root",
            PermissionSet::ALL,
            NamespaceFlags {
                is_root: true,
                ..NamespaceFlags::default()
            },
        );
        let blocked = namespace("a", PermissionSet::NONE, NamespaceFlags::default());
        let mut perms = PermissionSet::NONE;
        perms.grant(Capability::MouseMotion);
        let allowed = namespace("b", perms, NamespaceFlags::default());

        let target = plain_target(ResourceKind::Window, AccessMode::READ);
        let verdict = |subject: &Namespace| {
            check(&bound(subject), subject, &bound(&root), &root, ResourceOp::QueryPointer, &target)
                .verdict
        };
        assert_eq!(verdict(&blocked), Verdict::Block);
        assert_eq!(verdict(&allowed), Verdict::Pass);
    }

    #[test]
    fn test_randr_event_resource_gated_by_randr() {
        let root = namespace(
            "root",
            PermissionSet::ALL,
            NamespaceFlags {
                is_root: true,
                ..NamespaceFlags::default()
            },
        );
        let mut perms = PermissionSet::NONE;
        perms.grant(Capability::Randr);
        let allowed = namespace("a", perms, NamespaceFlags::default());
        let blocked = namespace("b", PermissionSet::NONE, NamespaceFlags::default());

        let target = plain_target(ResourceKind::RandrEvent, AccessMode::READ);
        let verdict = |subject: &Namespace| {
            check(&bound(subject), subject, &bound(&root), &root, ResourceOp::Other, &target)
                .verdict
        };
        assert_eq!(verdict(&allowed), Verdict::Pass);
        assert_eq!(verdict(&blocked), Verdict::Block);
    }

    #[test]
    fn test_forced_opaque_on_create_without_transparency() {
        let subject = namespace("studio", PermissionSet::NONE, NamespaceFlags::default());
        let owner = namespace("other", PermissionSet::NONE, NamespaceFlags::default());

        let target = ResourceTarget {
            kind: ResourceKind::Window,
            access: AccessMode::CREATE,
            window: Some(WindowHandle(7)),
            is_screen_root: false,
        };
        let decision = check(
            &bound(&subject),
            &subject,
            &bound(&owner),
            &owner,
            ResourceOp::CreateWindow,
            &target,
        );

        // the side effect applies even though the access itself blocks
        assert!(decision.force_opaque);
        assert_eq!(decision.verdict, Verdict::Block);
    }

    #[test]
    fn test_no_forced_opaque_with_transparency_flag() {
        let mut perms = PermissionSet::NONE;
        perms.grant(Capability::Transparency);
        let subject = namespace("studio", perms, NamespaceFlags::default());

        let target = ResourceTarget {
            kind: ResourceKind::Window,
            access: AccessMode::CREATE,
            window: Some(WindowHandle(7)),
            is_screen_root: false,
        };
        let decision = check(
            &bound(&subject),
            &subject,
            &bound(&subject),
            &subject,
            ResourceOp::CreateWindow,
            &target,
        );
        assert!(!decision.force_opaque);
    }

    #[test]
    fn test_own_virtual_root_property_whitelist() {
        let mut subject = namespace("studio", PermissionSet::NONE, NamespaceFlags::default());
        subject.virtual_root = Some(WindowHandle(42));
        let owner = namespace("other", PermissionSet::NONE, NamespaceFlags::default());

        let target = ResourceTarget::window(WindowHandle(42), AccessMode::READ);
        let verdict = |op| {
            check(&bound(&subject), &subject, &bound(&owner), &owner, op, &target).verdict
        };

        assert_eq!(verdict(ResourceOp::GetProperty), Verdict::Pass);
        assert_eq!(verdict(ResourceOp::ChangeProperty), Verdict::Pass);
        assert_eq!(verdict(ResourceOp::RotateProperties), Verdict::Pass);
        assert_eq!(verdict(ResourceOp::QueryTree), Verdict::Pass);
        assert_eq!(verdict(ResourceOp::GetImage), Verdict::Block);
    }

    #[test]
    fn test_foreign_virtual_root_is_not_whitelisted() {
        let mut subject = namespace("studio", PermissionSet::NONE, NamespaceFlags::default());
        subject.virtual_root = Some(WindowHandle(42));
        let owner = namespace("other", PermissionSet::NONE, NamespaceFlags::default());

        // a window that is some *other* namespace's virtual root
        let target = ResourceTarget::window(WindowHandle(43), AccessMode::READ);
        let decision = check(
            &bound(&subject),
            &subject,
            &bound(&owner),
            &owner,
            ResourceOp::GetProperty,
            &target,
        );
        assert_eq!(decision.verdict, Verdict::Block);
    }

    #[test]
    fn test_screen_root_create_window_needs_add_access() {
        let subject = namespace("studio", PermissionSet::NONE, NamespaceFlags::default());
        let server_ns = namespace("root", PermissionSet::ALL, NamespaceFlags::default());
        let server = ClientBinding::server();

        let create = ResourceTarget::screen_root(WindowHandle(1), AccessMode::ADD);
        let decision = check(
            &bound(&subject),
            &subject,
            &server,
            &server_ns,
            ResourceOp::CreateWindow,
            &create,
        );
        assert_eq!(decision.verdict, Verdict::Pass);

        let too_broad =
            ResourceTarget::screen_root(WindowHandle(1), AccessMode::ADD | AccessMode::WRITE);
        let decision = check(
            &bound(&subject),
            &subject,
            &server,
            &server_ns,
            ResourceOp::CreateWindow,
            &too_broad,
        );
        assert_eq!(decision.verdict, Verdict::Block);
    }

    #[test]
    fn test_server_colormap_read_masks_pass() {
        let subject = namespace("studio", PermissionSet::NONE, NamespaceFlags::default());
        let server_ns = namespace("root", PermissionSet::ALL, NamespaceFlags::default());
        let server = ClientBinding::server();

        let readable = plain_target(ResourceKind::Colormap, AccessMode::READ | AccessMode::USE);
        let decision = check(
            &bound(&subject),
            &subject,
            &server,
            &server_ns,
            ResourceOp::Other,
            &readable,
        );
        assert_eq!(decision.verdict, Verdict::Pass);

        let writable = plain_target(ResourceKind::Colormap, AccessMode::WRITE);
        let decision = check(
            &bound(&subject),
            &subject,
            &server,
            &server_ns,
            ResourceOp::Other,
            &writable,
        );
        assert_eq!(decision.verdict, Verdict::Block);
    }

    #[test]
    fn test_server_owned_window_blocks() {
        let subject = namespace("studio", PermissionSet::ALL, NamespaceFlags::default());
        let server_ns = namespace("srv", PermissionSet::ALL, NamespaceFlags::default());
        let server = ClientBinding::server();

        let target = ResourceTarget::window(WindowHandle(9), AccessMode::WRITE);
        let decision = check(
            &bound(&subject),
            &subject,
            &server,
            &server_ns,
            ResourceOp::ChangeProperty,
            &target,
        );
        assert_eq!(decision.verdict, Verdict::Block);
    }

    #[test]
    fn test_unbound_subject_binding_is_distinct() {
        // regression guard: two unbound sessions compare equal, but a bound
        // subject against an unbound owner must not
        let ns = namespace("studio", PermissionSet::NONE, NamespaceFlags::default());
        let other = namespace("other", PermissionSet::NONE, NamespaceFlags::default());
        let mut unbound = ClientBinding::new();
        unbound.namespace = Some(NamespaceId::new());

        let decision = check(
            &bound(&ns),
            &ns,
            &unbound,
            &other,
            ResourceOp::Other,
            &plain_target(ResourceKind::Other, AccessMode::WRITE),
        );
        assert_eq!(decision.verdict, Verdict::Block);
    }
}
