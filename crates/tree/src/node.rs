use std::fmt;
use std::rc::Rc;

use open_editors_layout::{LayoutId, LayoutKind};
use tracing::trace;

use crate::action::{NodeAction, NodeCallback};
use crate::surface::{ElementId, ItemElements, Surface};

/// Construction parameters for a [`TreeNode`].
/// 建立 [`TreeNode`] 所需的參數。
pub struct TreeNodeDraft {
    identity: LayoutId,
    kind: LayoutKind,
    label: String,
    click: Option<NodeCallback>,
    actions: Vec<NodeAction>,
}

impl TreeNodeDraft {
    pub fn new(identity: impl Into<LayoutId>, kind: LayoutKind, label: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            kind,
            label: label.into(),
            click: None,
            actions: Vec::new(),
        }
    }

    /// Handler run when the node row is activated, after any collapse toggle.
    /// 節點列被啟動時（於收合切換之後）執行的處理函式。
    pub fn with_click(mut self, handler: impl Fn(&TreeNode) + 'static) -> Self {
        self.click = Some(Rc::new(handler));
        self
    }

    pub fn with_action(mut self, action: NodeAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Allocates the node's elements under `container` and renders its action buttons.
    /// 於 `container` 下配置節點元素並繪製動作按鈕。
    pub fn build(self, surface: Rc<dyn Surface>, container: ElementId) -> TreeNode {
        let elements = surface.create_item(container, &self.label);
        let action_elements = self
            .actions
            .iter()
            .map(|action| surface.create_action(elements.row, action.icon(), action.label()))
            .collect();
        TreeNode {
            identity: self.identity,
            kind: self.kind,
            label: self.label,
            children: Vec::new(),
            collapsed: false,
            click: self.click,
            actions: self.actions,
            surface,
            elements,
            action_elements,
            collapse_icon: None,
            released: false,
        }
    }
}

/// Structural description of a subtree, comparable across rebuilds.
/// 子樹的結構描述，可於重建之間比較。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeShape {
    pub identity: LayoutId,
    pub kind: LayoutKind,
    pub label: String,
    pub children: Vec<NodeShape>,
}

/// A node of the mirrored tree. Owns its children and its rendered elements.
/// 鏡射樹中的節點，擁有其子節點與已繪製的元素。
///
/// Dropping a node tears it down the same way [`TreeNode::delete_tree`] does, so elements are
/// never left behind on the surface.
pub struct TreeNode {
    identity: LayoutId,
    kind: LayoutKind,
    label: String,
    children: Vec<TreeNode>,
    collapsed: bool,
    click: Option<NodeCallback>,
    actions: Vec<NodeAction>,
    surface: Rc<dyn Surface>,
    elements: ItemElements,
    action_elements: Vec<ElementId>,
    collapse_icon: Option<ElementId>,
    released: bool,
}

impl TreeNode {
    pub fn identity(&self) -> &LayoutId {
        &self.identity
    }

    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    pub fn actions(&self) -> &[NodeAction] {
        &self.actions
    }

    pub fn elements(&self) -> ItemElements {
        self.elements
    }

    pub fn action_elements(&self) -> &[ElementId] {
        &self.action_elements
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Whether the node currently shows the expand/collapse affordance.
    /// 節點目前是否顯示展開／收合圖示。
    pub fn is_collapsible(&self) -> bool {
        self.collapse_icon.is_some()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Activates the node row: toggles collapse when collapsible, then runs the click handler.
    /// 啟動節點列：若可收合則切換狀態，之後執行點擊處理函式。
    pub fn click(&mut self) {
        if self.is_collapsible() {
            self.collapsed = !self.collapsed;
            self.surface.set_collapsed(&self.elements, self.collapsed);
            trace!(identity = %self.identity, collapsed = self.collapsed, "toggled tree node");
        }
        if let Some(handler) = self.click.clone() {
            handler(self);
        }
    }

    /// Runs the action at `index` without activating the node itself.
    /// 執行第 `index` 個動作，不會觸發節點本身的點擊。
    pub fn click_action(&self, index: usize) -> bool {
        match self.actions.get(index) {
            Some(action) => {
                action.invoke(self);
                true
            }
            None => false,
        }
    }

    /// Appends a child built by `factory` inside this node's children container.
    /// 以 `factory` 在子項目容器中建立並附加子節點。
    ///
    /// The first child promotes the node to collapsible.
    pub fn add_child<F>(&mut self, factory: F) -> &mut TreeNode
    where
        F: FnOnce(&Rc<dyn Surface>, ElementId) -> TreeNode,
    {
        if self.collapse_icon.is_none() {
            self.surface.set_collapsible(self.elements.row, true);
            self.collapse_icon = Some(self.surface.create_collapse_icon(self.elements.row));
        }
        let child = factory(&self.surface, self.elements.children);
        self.children.push(child);
        let index = self.children.len() - 1;
        &mut self.children[index]
    }

    pub fn push_child(&mut self, draft: TreeNodeDraft) -> &mut TreeNode {
        self.add_child(|surface, container| draft.build(Rc::clone(surface), container))
    }

    /// Removes the direct child with `identity`, tearing down its subtree first.
    /// 移除指定識別碼的直接子節點，並先拆除其子樹。
    pub fn remove_child(&mut self, identity: &LayoutId) -> bool {
        let removed = match self
            .children
            .iter()
            .position(|child| &child.identity == identity)
        {
            Some(index) => {
                let mut child = self.children.remove(index);
                child.delete_tree();
                true
            }
            None => false,
        };
        if self.children.is_empty() {
            self.demote();
        }
        removed
    }

    pub fn remove_all_children(&mut self) {
        while let Some(mut child) = self.children.pop() {
            child.delete_tree();
        }
        self.demote();
    }

    /// Removes every child, then releases this node's own elements. Safe to call twice.
    /// 移除所有子節點後釋放自身元素；可重複呼叫。
    pub fn delete_tree(&mut self) {
        self.remove_all_children();
        self.release();
    }

    /// Depth-first, children-before-self traversal.
    /// 深度優先、先子後父的走訪。
    pub fn recursive_call<F>(&self, mut callback: F)
    where
        F: FnMut(&TreeNode),
    {
        self.visit(&mut |node| callback(node));
    }

    /// Same traversal as [`TreeNode::recursive_call`], applied only to nodes of `kind`.
    /// 與 [`TreeNode::recursive_call`] 相同，但僅套用於指定類型的節點。
    pub fn recursive_call_for_type<F>(&self, kind: LayoutKind, mut callback: F)
    where
        F: FnMut(&TreeNode),
    {
        self.visit(&mut |node| {
            if node.kind == kind {
                callback(node);
            }
        });
    }

    /// Identities of all nodes of `kind` in this subtree, in traversal order.
    pub fn collect_identities(&self, kind: LayoutKind) -> Vec<LayoutId> {
        let mut ids = Vec::new();
        self.recursive_call_for_type(kind, |node| ids.push(node.identity.clone()));
        ids
    }

    pub fn find(&self, identity: &LayoutId) -> Option<&TreeNode> {
        if &self.identity == identity {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(identity))
    }

    /// Index path from this node to the first node with `identity` (empty for `self`).
    pub fn path_of(&self, identity: &LayoutId) -> Option<Vec<usize>> {
        if &self.identity == identity {
            return Some(Vec::new());
        }
        self.children.iter().enumerate().find_map(|(index, child)| {
            child.path_of(identity).map(|mut path| {
                path.insert(0, index);
                path
            })
        })
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&TreeNode> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => self.children.get(*head)?.node_at(rest),
        }
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut TreeNode> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => self.children.get_mut(*head)?.node_at_mut(rest),
        }
    }

    pub fn shape(&self) -> NodeShape {
        NodeShape {
            identity: self.identity.clone(),
            kind: self.kind,
            label: self.label.clone(),
            children: self.children.iter().map(TreeNode::shape).collect(),
        }
    }

    fn visit(&self, callback: &mut dyn FnMut(&TreeNode)) {
        for child in &self.children {
            child.visit(callback);
        }
        callback(self);
    }

    fn demote(&mut self) {
        if let Some(icon) = self.collapse_icon.take() {
            self.surface.remove(icon);
            self.surface.set_collapsible(self.elements.row, false);
            if self.collapsed {
                self.collapsed = false;
                self.surface.set_collapsed(&self.elements, false);
            }
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.surface.release_item(self.elements);
    }
}

impl Drop for TreeNode {
    fn drop(&mut self) {
        self.delete_tree();
    }
}

impl fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("identity", &self.identity)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("collapsed", &self.collapsed)
            .field("actions", &self.actions)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}
