use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use open_editors_layout::{LayoutId, LayoutKind, LayoutNode};
use open_editors_settings::{ViewSettings, VIEW_DISPLAY, VIEW_TYPE};
use open_editors_tree::{ElementId, NodeAction, NodeShape, Surface, TreeNode, TreeNodeDraft};
use tracing::{debug, trace};

use crate::actions;
use crate::diagnostic::{Diagnostic, DiagnosticLog};
use crate::host::{SubscriptionId, WorkspaceHost};

/// Mirrors the host layout into a forest of [`TreeNode`]s, one per window.
/// 將主機版面鏡射為 [`TreeNode`] 森林，每個視窗對應一棵樹。
///
/// Every change notification tears the whole forest down and walks a fresh snapshot. A
/// notification that arrives while the forest is borrowed (an action is running) is remembered
/// and serviced as soon as that borrow ends.
pub struct TreeSynchronizer<H: WorkspaceHost + 'static> {
    inner: Rc<Inner<H>>,
}

struct Inner<H: WorkspaceHost + 'static> {
    host: Rc<H>,
    surface: Rc<dyn Surface>,
    settings: ViewSettings,
    diagnostics: DiagnosticLog,
    root: Cell<Option<ElementId>>,
    subscription: Cell<Option<SubscriptionId>>,
    windows: RefCell<Vec<TreeNode>>,
    pending: Cell<bool>,
    generation: Cell<u64>,
}

impl<H: WorkspaceHost + 'static> TreeSynchronizer<H> {
    pub fn new(host: Rc<H>, surface: Rc<dyn Surface>, settings: ViewSettings) -> Self {
        Self {
            inner: Rc::new(Inner {
                host,
                surface,
                settings,
                diagnostics: DiagnosticLog::new(),
                root: Cell::new(None),
                subscription: Cell::new(None),
                windows: RefCell::new(Vec::new()),
                pending: Cell::new(false),
                generation: Cell::new(0),
            }),
        }
    }

    /// Creates the root element, subscribes to layout changes and performs the first build.
    /// 建立根元素、訂閱版面變更並進行第一次建構。
    pub fn activate(&self) {
        if self.inner.root.get().is_some() {
            debug!("open editors view already active");
            return;
        }
        debug!(
            view = VIEW_TYPE,
            title = VIEW_DISPLAY,
            icon = %self.inner.settings.icons.view,
            "activating view"
        );
        self.inner.root.set(Some(self.inner.surface.create_root()));

        let weak: Weak<Inner<H>> = Rc::downgrade(&self.inner);
        let subscription = self.inner.host.subscribe(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.rebuild();
            }
        }));
        self.inner.subscription.set(Some(subscription));
        self.inner.rebuild();
    }

    pub fn rebuild(&self) {
        self.inner.rebuild();
    }

    /// Releases the forest and root element and drops the host subscription.
    /// 釋放森林與根元素，並取消主機訂閱。
    pub fn teardown(&self) {
        match self.inner.windows.try_borrow_mut() {
            Ok(mut windows) => clear_forest(&mut windows),
            Err(_) => debug!("teardown while the forest is busy; nodes are released on drop"),
        }
        if let Some(root) = self.inner.root.take() {
            self.inner.surface.remove(root);
        }
        if let Some(subscription) = self.inner.subscription.take() {
            self.inner.host.unsubscribe(subscription);
        }
        self.inner.pending.set(false);
    }

    pub fn is_active(&self) -> bool {
        self.inner.root.get().is_some()
    }

    pub fn root(&self) -> Option<ElementId> {
        self.inner.root.get()
    }

    /// Number of completed rebuilds.
    pub fn generation(&self) -> u64 {
        self.inner.generation.get()
    }

    pub fn has_pending_rebuild(&self) -> bool {
        self.inner.pending.get()
    }

    /// Activates the node at `path` (window index first, then child indices).
    /// 啟動位於 `path` 的節點（先視窗索引，再依序為子節點索引）。
    pub fn click(&self, path: &[usize]) -> bool {
        let handled = match self.inner.windows.try_borrow_mut() {
            Ok(mut windows) => match node_at_mut(&mut windows, path) {
                Some(node) => {
                    node.click();
                    true
                }
                None => false,
            },
            Err(_) => {
                debug!(?path, "click ignored while the forest is busy");
                false
            }
        };
        self.inner.flush_pending();
        handled
    }

    /// Runs action `index` of the node at `path` without activating the node.
    /// 執行 `path` 節點的第 `index` 個動作，不啟動該節點。
    pub fn click_action(&self, path: &[usize], index: usize) -> bool {
        let handled = match self.inner.windows.try_borrow() {
            Ok(windows) => node_at(&windows, path)
                .map(|node| node.click_action(index))
                .unwrap_or(false),
            Err(_) => {
                debug!(?path, index, "action ignored while the forest is busy");
                false
            }
        };
        self.inner.flush_pending();
        handled
    }

    pub fn click_identity(&self, id: &LayoutId) -> bool {
        match self.path_of(id) {
            Some(path) => self.click(&path),
            None => false,
        }
    }

    pub fn path_of(&self, id: &LayoutId) -> Option<Vec<usize>> {
        self.inner
            .windows
            .borrow()
            .iter()
            .enumerate()
            .find_map(|(index, window)| {
                window.path_of(id).map(|mut path| {
                    path.insert(0, index);
                    path
                })
            })
    }

    /// Read access to the current forest. Must not be called from inside a node callback.
    pub fn with_forest<R>(&self, f: impl FnOnce(&[TreeNode]) -> R) -> R {
        f(&self.inner.windows.borrow())
    }

    pub fn forest_shape(&self) -> Vec<NodeShape> {
        self.with_forest(|windows| windows.iter().map(TreeNode::shape).collect())
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.diagnostics.entries()
    }

    pub fn diagnostic_log(&self) -> &DiagnosticLog {
        &self.inner.diagnostics
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.inner.settings
    }
}

impl<H: WorkspaceHost + 'static> Drop for TreeSynchronizer<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<H: WorkspaceHost + 'static> Inner<H> {
    fn rebuild(&self) {
        let Some(root) = self.root.get() else {
            debug!("rebuild requested before activation");
            return;
        };
        let Ok(mut windows) = self.windows.try_borrow_mut() else {
            trace!("forest busy; deferring rebuild");
            self.pending.set(true);
            return;
        };
        self.pending.set(false);
        clear_forest(&mut windows);

        let snapshot = self.host.layout_snapshot();
        let mut walk = Walk {
            host: &self.host,
            surface: &self.surface,
            settings: &self.settings,
            diagnostics: &self.diagnostics,
            root,
            forest: &mut *windows,
            windows_seen: 0,
        };
        for window in snapshot.windows() {
            walk.walk(window, None);
        }

        self.generation.set(self.generation.get() + 1);
        debug!(
            windows = windows.len(),
            generation = self.generation.get(),
            "rebuilt open editors tree"
        );
    }

    fn flush_pending(&self) {
        if self.pending.get() {
            self.rebuild();
        }
    }
}

fn clear_forest(windows: &mut Vec<TreeNode>) {
    for mut window in windows.drain(..) {
        window.delete_tree();
    }
}

fn node_at<'a>(windows: &'a [TreeNode], path: &[usize]) -> Option<&'a TreeNode> {
    let (head, rest) = path.split_first()?;
    windows.get(*head)?.node_at(rest)
}

fn node_at_mut<'a>(windows: &'a mut [TreeNode], path: &[usize]) -> Option<&'a mut TreeNode> {
    let (head, rest) = path.split_first()?;
    windows.get_mut(*head)?.node_at_mut(rest)
}

/// One pass over a snapshot.
struct Walk<'a, H: WorkspaceHost + 'static> {
    host: &'a Rc<H>,
    surface: &'a Rc<dyn Surface>,
    settings: &'a ViewSettings,
    diagnostics: &'a DiagnosticLog,
    root: ElementId,
    forest: &'a mut Vec<TreeNode>,
    windows_seen: usize,
}

impl<'a, H: WorkspaceHost + 'static> Walk<'a, H> {
    fn walk(&mut self, node: &LayoutNode, parent: Option<&mut TreeNode>) {
        match (node, parent) {
            (LayoutNode::Window { id, main, children }, _) => self.window(id, *main, children),
            (LayoutNode::Split { children, .. }, Some(parent)) => self.groups(children, parent),
            (LayoutNode::Tabs { children, .. }, Some(parent)) => {
                for child in children {
                    self.walk(child, Some(&mut *parent));
                }
            }
            (LayoutNode::Leaf { id, title }, Some(parent)) => self.leaf(id, title, parent),
            (LayoutNode::Unrecognized { id, kind }, _) => {
                self.diagnostics.record(Diagnostic::UnrecognizedKind {
                    id: id.clone(),
                    kind: kind.clone(),
                });
            }
            (other, None) => {
                if let Some(kind) = other.kind() {
                    self.diagnostics.record(Diagnostic::OrphanNode {
                        id: other.id().clone(),
                        kind,
                    });
                }
            }
        }
    }

    fn window(&mut self, id: &LayoutId, main: bool, children: &[LayoutNode]) {
        let label = if main {
            self.settings.labels.main_window.clone()
        } else {
            self.windows_seen += 1;
            self.settings.window_label(self.windows_seen)
        };
        let mut window = TreeNodeDraft::new(id.clone(), LayoutKind::Window, label)
            .with_action(NodeAction::new(
                &self.settings.icons.close_window,
                &self.settings.labels.close_all,
                actions::close_leaves(Rc::clone(self.host)),
            ))
            .build(Rc::clone(self.surface), self.root);

        // Nested windows found below are pushed while walking; keep this one ahead of them.
        let slot = self.forest.len();
        // A window holding a single unsplit group skips the redundant "Group 1" level.
        match children {
            [only] => self.walk(only, Some(&mut window)),
            _ => self.groups(children, &mut window),
        }
        self.forest.insert(slot, window);
    }

    fn groups(&mut self, children: &[LayoutNode], parent: &mut TreeNode) {
        let mut position = 0;
        for child in children {
            // Unrecognized children are skipped and nested windows become their own trees.
            if let LayoutNode::Unrecognized { .. } | LayoutNode::Window { .. } = child {
                self.walk(child, Some(&mut *parent));
                continue;
            }
            position += 1;
            let draft = TreeNodeDraft::new(
                child.id().clone(),
                LayoutKind::Split,
                self.settings.group_label(position),
            )
            .with_action(NodeAction::new(
                &self.settings.icons.close_group,
                &self.settings.labels.close_group,
                actions::close_leaves(Rc::clone(self.host)),
            ))
            .with_action(NodeAction::new(
                &self.settings.icons.close_others,
                &self.settings.labels.close_others,
                actions::close_all_but_one(Rc::clone(self.host), self.diagnostics.clone()),
            ));
            let group = parent.push_child(draft);
            self.walk(child, Some(group));
        }
    }

    fn leaf(&mut self, id: &LayoutId, title: &str, parent: &mut TreeNode) {
        let label = if title.trim().is_empty() {
            self.settings.labels.untitled.clone()
        } else {
            title.to_string()
        };
        let draft = TreeNodeDraft::new(id.clone(), LayoutKind::Leaf, label)
            .with_click(actions::activate_leaf(
                Rc::clone(self.host),
                self.diagnostics.clone(),
                id.clone(),
            ))
            .with_action(NodeAction::new(
                &self.settings.icons.close,
                &self.settings.labels.close,
                actions::close_leaf(Rc::clone(self.host), id.clone()),
            ));
        parent.push_child(draft);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::InMemoryWorkspace;
    use open_editors_layout::LayoutSnapshot;
    use open_editors_tree::MemorySurface;

    type View = (
        Rc<InMemoryWorkspace>,
        Rc<MemorySurface>,
        TreeSynchronizer<InMemoryWorkspace>,
    );

    fn view(snapshot: LayoutSnapshot) -> View {
        let host = Rc::new(InMemoryWorkspace::new(snapshot));
        let surface = Rc::new(MemorySurface::new());
        let sync = TreeSynchronizer::new(
            host.clone(),
            surface.clone() as Rc<dyn Surface>,
            ViewSettings::default(),
        );
        (host, surface, sync)
    }

    #[test]
    fn rebuild_before_activation_is_a_no_op() {
        let (_host, _surface, sync) = view(LayoutSnapshot::new(LayoutNode::main_window(
            "main",
            vec![LayoutNode::tabs("t", vec![LayoutNode::leaf("a", "a.md")])],
        )));
        sync.rebuild();
        assert_eq!(sync.generation(), 0);
        assert!(sync.forest_shape().is_empty());
    }

    #[test]
    fn activate_twice_keeps_a_single_subscription() {
        let (host, _surface, sync) = view(LayoutSnapshot::new(LayoutNode::main_window(
            "main",
            Vec::new(),
        )));
        sync.activate();
        sync.activate();
        assert_eq!(host.listener_count(), 1);
        assert_eq!(sync.generation(), 1);
        sync.teardown();
        assert_eq!(host.listener_count(), 0);
        assert!(!sync.is_active());
    }

    #[test]
    fn empty_leaf_titles_use_untitled_label() {
        let (_host, _surface, sync) = view(LayoutSnapshot::new(LayoutNode::main_window(
            "main",
            vec![LayoutNode::tabs("t", vec![LayoutNode::leaf("a", "")])],
        )));
        sync.activate();
        let shape = sync.forest_shape();
        assert_eq!(shape[0].children[0].label, "Untitled");
    }

    #[test]
    fn nested_window_follows_its_container_without_an_empty_group() {
        let (_host, _surface, sync) = view(LayoutSnapshot::new(LayoutNode::main_window(
            "main",
            vec![LayoutNode::split(
                "s",
                vec![
                    LayoutNode::tabs("t1", vec![LayoutNode::leaf("a", "a.md")]),
                    LayoutNode::window(
                        "w2",
                        vec![LayoutNode::tabs("t2", vec![LayoutNode::leaf("b", "b.md")])],
                    ),
                    LayoutNode::tabs("t3", vec![LayoutNode::leaf("c", "c.md")]),
                ],
            )],
        )));
        sync.activate();

        let shape = sync.forest_shape();
        let windows: Vec<_> = shape.iter().map(|w| w.label.as_str()).collect();
        assert_eq!(windows, vec!["Main window", "Window 1"]);

        let groups: Vec<_> = shape[0].children.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(groups, vec!["Group 1", "Group 2"]);
        assert_eq!(shape[0].children[1].children[0].identity.as_str(), "c");
        assert_eq!(shape[1].children[0].identity.as_str(), "b");
        assert!(sync.diagnostics().is_empty());
    }

    #[test]
    fn top_level_leaf_outside_a_window_is_reported() {
        let snapshot = LayoutSnapshot {
            main: Some(LayoutNode::leaf("stray", "stray.md")),
            floating: Vec::new(),
            active: None,
        };
        let (_host, _surface, sync) = view(snapshot);
        sync.activate();
        assert!(sync.forest_shape().is_empty());
        assert_eq!(
            sync.diagnostics(),
            vec![Diagnostic::OrphanNode {
                id: "stray".into(),
                kind: LayoutKind::Leaf,
            }]
        );
    }
}
