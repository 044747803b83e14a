//! In-memory [`WorkspaceHost`] used by the command line tool and the test suites.
//! 命令列工具與測試使用的記憶體內 [`WorkspaceHost`]。

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use open_editors_layout::{LayoutId, LayoutNode, LayoutSnapshot};
use tracing::{debug, trace};

use crate::host::{SubscriptionId, WorkspaceHost};

const NEW_PANE_TITLE: &str = "New tab";

/// Mutating call received by an [`InMemoryWorkspace`], in arrival order.
/// [`InMemoryWorkspace`] 依序收到的變更呼叫。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Activate(LayoutId),
    Detach(LayoutId),
    Create {
        parent: LayoutId,
        position: usize,
        pane: LayoutId,
    },
}

impl fmt::Display for HostCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostCall::Activate(id) => write!(f, "activate {id}"),
            HostCall::Detach(id) => write!(f, "detach {id}"),
            HostCall::Create {
                parent,
                position,
                pane,
            } => write!(f, "create {pane} in {parent} at {position}"),
        }
    }
}

/// When layout-change notifications reach listeners.
/// 版面變更通知送達監聽者的時機。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyMode {
    /// Queued until [`InMemoryWorkspace::dispatch_events`] runs.
    #[default]
    Deferred,
    /// Delivered synchronously from inside the mutating call.
    Immediate,
}

type Listener = Rc<RefCell<Box<dyn FnMut()>>>;

/// Workspace whose layout lives in a [`LayoutSnapshot`]; handles are the layout ids themselves.
/// 以 [`LayoutSnapshot`] 保存版面的工作區；控制代碼即為版面識別碼。
///
/// Detaching a pane prunes containers left empty. The main window always survives; a floating
/// window disappears with its last pane.
pub struct InMemoryWorkspace {
    layout: RefCell<LayoutSnapshot>,
    journal: RefCell<Vec<HostCall>>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_subscription: Cell<u64>,
    next_pane: Cell<u64>,
    pending: Cell<usize>,
    mode: NotifyMode,
}

impl InMemoryWorkspace {
    pub fn new(snapshot: LayoutSnapshot) -> Self {
        Self::with_mode(snapshot, NotifyMode::default())
    }

    pub fn with_mode(snapshot: LayoutSnapshot, mode: NotifyMode) -> Self {
        Self {
            layout: RefCell::new(snapshot),
            journal: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            next_subscription: Cell::new(1),
            next_pane: Cell::new(1),
            pending: Cell::new(0),
            mode,
        }
    }

    pub fn mode(&self) -> NotifyMode {
        self.mode
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        self.layout.borrow().clone()
    }

    /// Swaps in a new layout, as if the user rearranged panes in the host.
    /// 置換整個版面，如同使用者在主機中重新排列面板。
    pub fn replace_layout(&self, snapshot: LayoutSnapshot) {
        *self.layout.borrow_mut() = snapshot;
        self.notify();
    }

    pub fn journal(&self) -> Vec<HostCall> {
        self.journal.borrow().clone()
    }

    pub fn clear_journal(&self) {
        self.journal.borrow_mut().clear();
    }

    pub fn pending_events(&self) -> usize {
        self.pending.get()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Delivers queued notifications one at a time, including any queued while delivering.
    /// 逐一送出佇列中的通知，包含送出期間新增的通知。
    pub fn dispatch_events(&self) -> usize {
        let mut delivered = 0;
        while self.pending.get() > 0 {
            self.pending.set(self.pending.get() - 1);
            self.deliver();
            delivered += 1;
        }
        delivered
    }

    fn record(&self, call: HostCall) {
        trace!(%call, "host call");
        self.journal.borrow_mut().push(call);
    }

    fn notify(&self) {
        match self.mode {
            NotifyMode::Deferred => self.pending.set(self.pending.get() + 1),
            NotifyMode::Immediate => self.deliver(),
        }
    }

    fn deliver(&self) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            match listener.try_borrow_mut() {
                Ok(mut callback) => {
                    let callback: &mut dyn FnMut() = &mut **callback;
                    callback();
                }
                // The listener is already running further up the stack.
                Err(_) => self.pending.set(self.pending.get() + 1),
            }
        }
    }
}

impl WorkspaceHost for InMemoryWorkspace {
    type Handle = LayoutId;

    fn layout_snapshot(&self) -> LayoutSnapshot {
        self.snapshot()
    }

    fn subscribe(&self, listener: Box<dyn FnMut()>) -> SubscriptionId {
        let id = SubscriptionId::from_raw(self.next_subscription.get());
        self.next_subscription.set(id.as_u64() + 1);
        self.listeners
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(listener))));
        debug!(%id, "layout listener subscribed");
        id
    }

    fn unsubscribe(&self, subscription: SubscriptionId) {
        self.listeners
            .borrow_mut()
            .retain(|(id, _)| *id != subscription);
    }

    fn resolve(&self, id: &LayoutId) -> Option<LayoutId> {
        self.layout.borrow().find(id).map(|node| node.id().clone())
    }

    fn handle_id(&self, handle: &LayoutId) -> LayoutId {
        handle.clone()
    }

    fn activate(&self, handle: &LayoutId) {
        self.record(HostCall::Activate(handle.clone()));
        self.layout.borrow_mut().active = Some(handle.clone());
        self.notify();
    }

    fn detach(&self, handle: &LayoutId) {
        self.record(HostCall::Detach(handle.clone()));
        let removed = {
            let mut layout = self.layout.borrow_mut();
            let removed = remove_node(&mut layout, handle);
            let active_gone = layout
                .active
                .as_ref()
                .is_some_and(|active| layout.find(active).is_none());
            if active_gone {
                layout.active = None;
            }
            removed
        };
        if removed {
            self.notify();
        } else {
            debug!(%handle, "detach ignored; node not in layout");
        }
    }

    fn create_pane_in_parent(&self, parent: &LayoutId, position: usize) -> Option<LayoutId> {
        let pane = LayoutId::new(format!("pane-{}", self.next_pane.get()));
        let inserted = {
            let mut layout = self.layout.borrow_mut();
            match layout.find_mut(parent).and_then(LayoutNode::children_mut) {
                Some(children) => {
                    let index = position.min(children.len());
                    children.insert(index, LayoutNode::leaf(pane.clone(), NEW_PANE_TITLE));
                    true
                }
                None => false,
            }
        };
        if !inserted {
            debug!(%parent, "cannot create a pane outside a container");
            return None;
        }
        self.next_pane.set(self.next_pane.get() + 1);
        self.record(HostCall::Create {
            parent: parent.clone(),
            position,
            pane: pane.clone(),
        });
        self.notify();
        Some(pane)
    }

    fn parent_of(&self, handle: &LayoutId) -> Option<LayoutId> {
        self.layout
            .borrow()
            .find_parent(handle)
            .map(|parent| parent.id().clone())
    }
}

fn remove_node(layout: &mut LayoutSnapshot, id: &LayoutId) -> bool {
    if let Some(main) = layout.main.as_mut() {
        if remove_descendant(main, id) {
            return true;
        }
    }
    if let Some(index) = layout.floating.iter().position(|window| window.id() == id) {
        layout.floating.remove(index);
        return true;
    }
    for index in 0..layout.floating.len() {
        if remove_descendant(&mut layout.floating[index], id) {
            if layout.floating[index].children().is_empty() {
                layout.floating.remove(index);
            }
            return true;
        }
    }
    false
}

fn remove_descendant(node: &mut LayoutNode, id: &LayoutId) -> bool {
    let Some(children) = node.children_mut() else {
        return false;
    };
    if let Some(index) = children.iter().position(|child| child.id() == id) {
        children.remove(index);
        return true;
    }
    for index in 0..children.len() {
        if remove_descendant(&mut children[index], id) {
            if children[index].children().is_empty() {
                children.remove(index);
            }
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> LayoutSnapshot {
        LayoutSnapshot::new(LayoutNode::main_window(
            "main",
            vec![LayoutNode::split(
                "s",
                vec![
                    LayoutNode::tabs("t1", vec![LayoutNode::leaf("a", "a.md")]),
                    LayoutNode::tabs(
                        "t2",
                        vec![LayoutNode::leaf("b", "b.md"), LayoutNode::leaf("c", "c.md")],
                    ),
                ],
            )],
        ))
        .with_floating(LayoutNode::window(
            "w1",
            vec![LayoutNode::tabs("t3", vec![LayoutNode::leaf("d", "d.md")])],
        ))
        .with_active("a")
    }

    #[test]
    fn detach_prunes_empty_containers() {
        let host = InMemoryWorkspace::new(layout());
        host.detach(&"a".into());
        let snapshot = host.snapshot();
        assert!(snapshot.find(&"t1".into()).is_none());
        assert!(snapshot.find(&"s".into()).is_some());
        assert_eq!(snapshot.active, None);
    }

    #[test]
    fn floating_window_closes_with_last_pane() {
        let host = InMemoryWorkspace::new(layout());
        host.detach(&"d".into());
        assert!(host.snapshot().floating.is_empty());
    }

    #[test]
    fn main_window_survives_when_emptied() {
        let host = InMemoryWorkspace::new(layout());
        for id in ["a", "b", "c"] {
            host.detach(&id.into());
        }
        let snapshot = host.snapshot();
        let main = snapshot.main.as_ref().expect("main window");
        assert!(main.children().is_empty());
    }

    #[test]
    fn create_inserts_new_leaf_at_clamped_position() {
        let host = InMemoryWorkspace::new(layout());
        let first = host.create_pane_in_parent(&"t2".into(), 0).expect("pane");
        let last = host.create_pane_in_parent(&"t2".into(), 99).expect("pane");
        assert_eq!(first.as_str(), "pane-1");
        assert_eq!(last.as_str(), "pane-2");
        let snapshot = host.snapshot();
        let ids: Vec<_> = snapshot
            .find(&"t2".into())
            .map(LayoutNode::leaf_ids)
            .unwrap_or_default()
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["pane-1", "b", "c", "pane-2"]);
        assert_eq!(host.parent_of(&first), Some("t2".into()));
    }

    #[test]
    fn keep_one_editor_in_tab_group_main_area_stays_in_the_group() {
        let snapshot = LayoutSnapshot::from_json(
            r#"{ "main": { "id": "t", "type": "tabs", "children": [
                { "id": "a", "type": "leaf", "state": { "title": "a.md" } },
                { "id": "b", "type": "leaf", "state": { "title": "b.md" } }
            ] } }"#,
        )
        .unwrap();
        let host = InMemoryWorkspace::new(snapshot);
        let log = crate::diagnostic::DiagnosticLog::new();

        let kept = crate::actions::keep_one_editor(
            &host,
            &log,
            &"t".into(),
            &["a".into(), "b".into()],
        );
        assert_eq!(kept, Some("pane-1".into()));
        assert!(log.is_empty());

        let snapshot = host.snapshot();
        let main = snapshot.main.as_ref().expect("main window");
        assert_eq!(main.children().len(), 1);
        let tabs = &main.children()[0];
        assert_eq!(tabs.id().as_str(), "t");
        assert!(matches!(tabs, LayoutNode::Tabs { .. }));
        assert_eq!(tabs.leaf_ids(), vec![LayoutId::from("pane-1")]);
    }

    #[test]
    fn create_refuses_leaf_parent() {
        let host = InMemoryWorkspace::new(layout());
        assert_eq!(host.create_pane_in_parent(&"a".into(), 0), None);
        assert!(host.journal().is_empty());
    }

    #[test]
    fn deferred_notifications_wait_for_dispatch() {
        let host = InMemoryWorkspace::new(layout());
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        host.subscribe(Box::new(move || counter.set(counter.get() + 1)));

        host.activate(&"b".into());
        host.detach(&"c".into());
        assert_eq!(hits.get(), 0);
        assert_eq!(host.pending_events(), 2);

        assert_eq!(host.dispatch_events(), 2);
        assert_eq!(hits.get(), 2);
        assert_eq!(
            host.journal(),
            vec![HostCall::Activate("b".into()), HostCall::Detach("c".into())]
        );
    }

    #[test]
    fn immediate_notifications_run_inside_the_call() {
        let host = InMemoryWorkspace::with_mode(layout(), NotifyMode::Immediate);
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let subscription = host.subscribe(Box::new(move || counter.set(counter.get() + 1)));

        host.activate(&"b".into());
        assert_eq!(hits.get(), 1);

        host.unsubscribe(subscription);
        host.activate(&"c".into());
        assert_eq!(hits.get(), 1);
        assert_eq!(host.listener_count(), 0);
    }
}
