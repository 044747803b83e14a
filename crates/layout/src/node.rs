use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier the host assigns to a window, group or pane.
/// 主機指派給視窗、群組或面板的不透明識別碼。
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutId(String);

impl LayoutId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayoutId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LayoutId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Structural kind of a layout node.
/// 版面節點的結構類型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    Window,
    Split,
    Tabs,
    Leaf,
}

impl LayoutKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutKind::Window => "window",
            LayoutKind::Split => "split",
            LayoutKind::Tabs => "tabs",
            LayoutKind::Leaf => "leaf",
        }
    }

    /// Maps the host's `type` string onto a known kind.
    /// 將主機提供的 `type` 字串對應至已知類型。
    pub fn from_host(value: &str) -> Option<Self> {
        match value {
            "window" => Some(LayoutKind::Window),
            "split" => Some(LayoutKind::Split),
            "tabs" => Some(LayoutKind::Tabs),
            "leaf" => Some(LayoutKind::Leaf),
            _ => None,
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    Horizontal,
    Vertical,
}

impl SplitDirection {
    pub fn from_host(value: &str) -> Option<Self> {
        match value {
            "horizontal" => Some(SplitDirection::Horizontal),
            "vertical" => Some(SplitDirection::Vertical),
            _ => None,
        }
    }
}

/// One node of the host layout tree.
/// 主機版面樹中的單一節點。
///
/// `Unrecognized` carries node types the host reported but this crate does not model; consumers
/// must skip them rather than guess at their structure.
/// `Unrecognized` 保存無法辨識的節點類型，使用端應略過而非臆測其結構。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutNode {
    Window {
        id: LayoutId,
        main: bool,
        children: Vec<LayoutNode>,
    },
    Split {
        id: LayoutId,
        direction: Option<SplitDirection>,
        children: Vec<LayoutNode>,
    },
    Tabs {
        id: LayoutId,
        children: Vec<LayoutNode>,
    },
    Leaf {
        id: LayoutId,
        title: String,
    },
    Unrecognized {
        id: LayoutId,
        kind: String,
    },
}

impl LayoutNode {
    pub fn main_window(id: impl Into<LayoutId>, children: Vec<LayoutNode>) -> Self {
        LayoutNode::Window {
            id: id.into(),
            main: true,
            children,
        }
    }

    pub fn window(id: impl Into<LayoutId>, children: Vec<LayoutNode>) -> Self {
        LayoutNode::Window {
            id: id.into(),
            main: false,
            children,
        }
    }

    pub fn split(id: impl Into<LayoutId>, children: Vec<LayoutNode>) -> Self {
        LayoutNode::Split {
            id: id.into(),
            direction: None,
            children,
        }
    }

    pub fn tabs(id: impl Into<LayoutId>, children: Vec<LayoutNode>) -> Self {
        LayoutNode::Tabs {
            id: id.into(),
            children,
        }
    }

    pub fn leaf(id: impl Into<LayoutId>, title: impl Into<String>) -> Self {
        LayoutNode::Leaf {
            id: id.into(),
            title: title.into(),
        }
    }

    pub fn unrecognized(id: impl Into<LayoutId>, kind: impl Into<String>) -> Self {
        LayoutNode::Unrecognized {
            id: id.into(),
            kind: kind.into(),
        }
    }

    pub fn id(&self) -> &LayoutId {
        match self {
            LayoutNode::Window { id, .. }
            | LayoutNode::Split { id, .. }
            | LayoutNode::Tabs { id, .. }
            | LayoutNode::Leaf { id, .. }
            | LayoutNode::Unrecognized { id, .. } => id,
        }
    }

    /// Returns the structural kind, or `None` for unrecognized nodes.
    /// 取得結構類型；無法辨識的節點回傳 `None`。
    pub fn kind(&self) -> Option<LayoutKind> {
        match self {
            LayoutNode::Window { .. } => Some(LayoutKind::Window),
            LayoutNode::Split { .. } => Some(LayoutKind::Split),
            LayoutNode::Tabs { .. } => Some(LayoutKind::Tabs),
            LayoutNode::Leaf { .. } => Some(LayoutKind::Leaf),
            LayoutNode::Unrecognized { .. } => None,
        }
    }

    /// Host-facing type name, including the raw string of unrecognized nodes.
    /// 主機端的類型名稱，無法辨識的節點保留原始字串。
    pub fn kind_name(&self) -> &str {
        match self {
            LayoutNode::Unrecognized { kind, .. } => kind,
            other => other.kind().map(LayoutKind::as_str).unwrap_or_default(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            LayoutNode::Leaf { title, .. } => Some(title),
            _ => None,
        }
    }

    pub fn children(&self) -> &[LayoutNode] {
        match self {
            LayoutNode::Window { children, .. }
            | LayoutNode::Split { children, .. }
            | LayoutNode::Tabs { children, .. } => children,
            LayoutNode::Leaf { .. } | LayoutNode::Unrecognized { .. } => &[],
        }
    }

    /// Mutable access to the child list of container nodes.
    /// 取得容器節點子清單的可變參照。
    pub fn children_mut(&mut self) -> Option<&mut Vec<LayoutNode>> {
        match self {
            LayoutNode::Window { children, .. }
            | LayoutNode::Split { children, .. }
            | LayoutNode::Tabs { children, .. } => Some(children),
            LayoutNode::Leaf { .. } | LayoutNode::Unrecognized { .. } => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            LayoutNode::Window { .. } | LayoutNode::Split { .. } | LayoutNode::Tabs { .. }
        )
    }

    /// Finds a node by identifier (depth-first, self first).
    /// 依識別碼尋找節點（深度優先，先檢查自身）。
    pub fn find(&self, id: &LayoutId) -> Option<&LayoutNode> {
        if self.id() == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &LayoutId) -> Option<&mut LayoutNode> {
        if self.id() == id {
            return Some(self);
        }
        self.children_mut()?
            .iter_mut()
            .find_map(|child| child.find_mut(id))
    }

    /// Finds the container that directly holds `id`.
    /// 尋找直接包含 `id` 的容器節點。
    pub fn find_parent(&self, id: &LayoutId) -> Option<&LayoutNode> {
        let children = self.children();
        if children.iter().any(|child| child.id() == id) {
            return Some(self);
        }
        children.iter().find_map(|child| child.find_parent(id))
    }

    /// Identifiers of every leaf below this node, in document order.
    /// 依文件順序列出此節點下所有葉節點的識別碼。
    pub fn leaf_ids(&self) -> Vec<LayoutId> {
        let mut ids = Vec::new();
        collect_leaf_ids(self, &mut ids);
        ids
    }
}

fn collect_leaf_ids(node: &LayoutNode, out: &mut Vec<LayoutId>) {
    match node {
        LayoutNode::Leaf { id, .. } => out.push(id.clone()),
        other => {
            for child in other.children() {
                collect_leaf_ids(child, out);
            }
        }
    }
}
