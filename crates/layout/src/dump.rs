//! Serde mirror of the host's workspace layout dump.

use serde::Deserialize;

use crate::node::{LayoutId, LayoutNode, SplitDirection};
use crate::snapshot::{LayoutSnapshot, SnapshotError};

#[derive(Debug, Deserialize)]
pub(crate) struct RawWorkspace {
    #[serde(default)]
    main: Option<RawNode>,
    #[serde(default)]
    floating: Option<RawNode>,
    #[serde(default)]
    active: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    direction: Option<String>,
    #[serde(default)]
    children: Vec<RawNode>,
    #[serde(default)]
    state: Option<RawLeafState>,
}

#[derive(Debug, Deserialize)]
struct RawLeafState {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "type")]
    view_type: Option<String>,
}

impl RawWorkspace {
    pub(crate) fn into_snapshot(self) -> Result<LayoutSnapshot, SnapshotError> {
        let main = self.main.map(RawNode::into_main_window).transpose()?;
        let floating = self
            .floating
            .map(|area| {
                area.children
                    .into_iter()
                    .map(RawNode::into_node)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Ok(LayoutSnapshot {
            main,
            floating,
            active: self.active.map(LayoutId::from),
        })
    }
}

/// Id of the window synthesized around a main area that is a single tab group.
fn main_window_id(tabs: &LayoutId) -> LayoutId {
    LayoutId::from(format!("{}#window", tabs.as_str()))
}

impl RawNode {
    /// The main area is reported as a bare split; it becomes the distinguished main window whose
    /// children are the split's children so a single tab group flattens like a popout window.
    /// A bare tab group is wrapped in a window with its own derived id.
    fn into_main_window(self) -> Result<LayoutNode, SnapshotError> {
        let id = LayoutId::from(self.id);
        let children: Vec<LayoutNode> = self.children.into_iter().map(RawNode::into_node).collect();
        match self.kind.as_str() {
            "split" | "window" => Ok(LayoutNode::Window {
                id,
                main: true,
                children,
            }),
            "tabs" => Ok(LayoutNode::Window {
                id: main_window_id(&id),
                main: true,
                children: vec![LayoutNode::Tabs { id, children }],
            }),
            other => Err(SnapshotError::InvalidMain(other.to_string())),
        }
    }

    fn into_node(self) -> LayoutNode {
        let id = LayoutId::from(self.id);
        let children = || self.children.into_iter().map(RawNode::into_node).collect();
        match self.kind.as_str() {
            "window" => LayoutNode::Window {
                id,
                main: false,
                children: children(),
            },
            "split" => LayoutNode::Split {
                id,
                direction: self.direction.as_deref().and_then(SplitDirection::from_host),
                children: children(),
            },
            "tabs" => LayoutNode::Tabs {
                id,
                children: children(),
            },
            "leaf" => LayoutNode::Leaf {
                id,
                title: self
                    .state
                    .and_then(|state| state.title.or(state.view_type))
                    .unwrap_or_default(),
            },
            other => LayoutNode::Unrecognized {
                id,
                kind: other.to_string(),
            },
        }
    }
}
