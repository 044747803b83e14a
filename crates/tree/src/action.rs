use std::fmt;
use std::rc::Rc;

use crate::node::TreeNode;

/// Callback bound to a tree node; receives the node it was attached to.
/// 綁定於樹節點的回呼，參數為其所屬節點。
pub type NodeCallback = Rc<dyn Fn(&TreeNode)>;

/// Clickable button rendered on a node row.
/// 節點列上顯示的可點擊動作按鈕。
#[derive(Clone)]
pub struct NodeAction {
    icon: String,
    label: String,
    callback: NodeCallback,
}

impl NodeAction {
    pub fn new(
        icon: impl Into<String>,
        label: impl Into<String>,
        callback: impl Fn(&TreeNode) + 'static,
    ) -> Self {
        Self {
            icon: icon.into(),
            label: label.into(),
            callback: Rc::new(callback),
        }
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn invoke(&self, node: &TreeNode) {
        (self.callback)(node);
    }
}

impl fmt::Debug for NodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeAction")
            .field("icon", &self.icon)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
