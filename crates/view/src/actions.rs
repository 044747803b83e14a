//! Callbacks bound to tree nodes. Each one captures identifiers only and resolves live handles
//! when it runs.

use std::rc::Rc;

use open_editors_layout::{LayoutId, LayoutKind};
use open_editors_tree::TreeNode;
use tracing::{debug, trace};

use crate::diagnostic::{Diagnostic, DiagnosticLog};
use crate::host::WorkspaceHost;

pub(crate) fn activate_leaf<H>(host: Rc<H>, log: DiagnosticLog, id: LayoutId) -> impl Fn(&TreeNode)
where
    H: WorkspaceHost + 'static,
{
    move |_: &TreeNode| match host.resolve(&id) {
        Some(handle) => host.activate(&handle),
        None => log.record(Diagnostic::StaleIdentifier {
            id: id.clone(),
            action: "activate",
        }),
    }
}

pub(crate) fn close_leaf<H>(host: Rc<H>, id: LayoutId) -> impl Fn(&TreeNode)
where
    H: WorkspaceHost + 'static,
{
    move |_: &TreeNode| detach_all(host.as_ref(), std::slice::from_ref(&id))
}

/// Closes every leaf below the node the action is attached to.
pub(crate) fn close_leaves<H>(host: Rc<H>) -> impl Fn(&TreeNode)
where
    H: WorkspaceHost + 'static,
{
    move |node: &TreeNode| {
        let leaves = node.collect_identities(LayoutKind::Leaf);
        debug!(scope = %node.identity(), count = leaves.len(), "closing editors");
        detach_all(host.as_ref(), &leaves);
    }
}

pub(crate) fn close_all_but_one<H>(host: Rc<H>, log: DiagnosticLog) -> impl Fn(&TreeNode)
where
    H: WorkspaceHost + 'static,
{
    move |group: &TreeNode| {
        let leaves = group.collect_identities(LayoutKind::Leaf);
        keep_one_editor(host.as_ref(), &log, group.identity(), &leaves);
    }
}

/// Replaces the editors of a group with one blank pane.
/// 以一個空白面板取代群組內的所有編輯器。
///
/// The replacement is created in the first leaf's parent before anything is detached, so the
/// host never sees the group empty. Returns the id of the replacement pane when it was created.
pub fn keep_one_editor<H>(
    host: &H,
    log: &DiagnosticLog,
    group: &LayoutId,
    leaves: &[LayoutId],
) -> Option<LayoutId>
where
    H: WorkspaceHost + ?Sized,
{
    let Some(first) = leaves.first() else {
        log.record(Diagnostic::EmptyGroup { id: group.clone() });
        return None;
    };
    let Some(handle) = host.resolve(first) else {
        log.record(Diagnostic::StaleIdentifier {
            id: first.clone(),
            action: "close all editors except one",
        });
        return None;
    };
    let Some(parent) = host.parent_of(&handle) else {
        log.record(Diagnostic::MissingParent { id: first.clone() });
        return None;
    };
    let Some(replacement) = host.create_pane_in_parent(&parent, 0) else {
        log.record(Diagnostic::ReplacementRejected {
            parent: host.handle_id(&parent),
        });
        return None;
    };

    let keep = host.handle_id(&replacement);
    let doomed: Vec<LayoutId> = leaves.iter().filter(|id| **id != keep).cloned().collect();
    debug!(%group, kept = %keep, closing = doomed.len(), "closing all editors except one");
    detach_all(host, &doomed);
    Some(keep)
}

fn detach_all<H>(host: &H, ids: &[LayoutId])
where
    H: WorkspaceHost + ?Sized,
{
    for id in ids {
        match host.resolve(id) {
            Some(handle) => host.detach(&handle),
            None => trace!(%id, "pane already closed"),
        }
    }
}
