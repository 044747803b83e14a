use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::dump::RawWorkspace;
use crate::node::{LayoutId, LayoutNode};

/// Pull-based view of the host layout: the main window plus popout windows.
/// 主機版面的拉取式快照：主視窗與所有浮動視窗。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutSnapshot {
    pub main: Option<LayoutNode>,
    pub floating: Vec<LayoutNode>,
    pub active: Option<LayoutId>,
}

impl LayoutSnapshot {
    pub fn new(main: LayoutNode) -> Self {
        Self {
            main: Some(main),
            floating: Vec::new(),
            active: None,
        }
    }

    pub fn with_floating(mut self, window: LayoutNode) -> Self {
        self.floating.push(window);
        self
    }

    pub fn with_active(mut self, id: impl Into<LayoutId>) -> Self {
        self.active = Some(id.into());
        self
    }

    /// Top-level windows, main first, then floating windows in host order.
    /// 依序列出頂層視窗：先主視窗，再依主機順序列出浮動視窗。
    pub fn windows(&self) -> impl Iterator<Item = &LayoutNode> {
        self.main.iter().chain(self.floating.iter())
    }

    pub fn find(&self, id: &LayoutId) -> Option<&LayoutNode> {
        self.windows().find_map(|window| window.find(id))
    }

    pub fn find_mut(&mut self, id: &LayoutId) -> Option<&mut LayoutNode> {
        self.main
            .iter_mut()
            .chain(self.floating.iter_mut())
            .find_map(|window| window.find_mut(id))
    }

    pub fn find_parent(&self, id: &LayoutId) -> Option<&LayoutNode> {
        self.windows().find_map(|window| window.find_parent(id))
    }

    pub fn leaf_ids(&self) -> Vec<LayoutId> {
        self.windows().flat_map(LayoutNode::leaf_ids).collect()
    }

    /// Parses the host's workspace layout dump (`main`, `floating`, `active`; sidebars ignored).
    /// 解析主機的工作區版面傾印（`main`、`floating`、`active`；側邊欄會被忽略）。
    pub fn from_json(input: &str) -> Result<Self, SnapshotError> {
        let raw: RawWorkspace = serde_json::from_str(input)?;
        raw.into_snapshot()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }
}

/// Errors raised while reading a layout dump.
/// 讀取版面傾印時可能發生的錯誤。
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read layout dump {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid layout dump: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("main area must be a split, tabs or window container, found '{0}'")]
    InvalidMain(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{LayoutKind, SplitDirection};

    const DUMP: &str = r#"{
        "main": {
            "id": "m0",
            "type": "split",
            "direction": "vertical",
            "children": [
                {
                    "id": "t1",
                    "type": "tabs",
                    "children": [
                        { "id": "l1", "type": "leaf", "state": { "type": "markdown", "title": "Daily note" } },
                        { "id": "l2", "type": "leaf", "state": { "type": "graph" } }
                    ]
                },
                {
                    "id": "s2",
                    "type": "split",
                    "direction": "horizontal",
                    "children": [
                        { "id": "t2", "type": "tabs", "children": [
                            { "id": "l3", "type": "leaf", "state": { "type": "markdown", "title": "Inbox" } }
                        ] },
                        { "id": "c1", "type": "canvas-stack", "children": [] }
                    ]
                }
            ]
        },
        "left": { "id": "left", "type": "mobile-drawer", "children": [] },
        "floating": {
            "id": "f0",
            "type": "floating",
            "children": [
                { "id": "w1", "type": "window", "children": [
                    { "id": "t3", "type": "tabs", "children": [
                        { "id": "l4", "type": "leaf", "state": { "type": "empty" } }
                    ] }
                ] }
            ]
        },
        "active": "l3"
    }"#;

    #[test]
    fn parses_host_dump_into_windows() {
        let snapshot = LayoutSnapshot::from_json(DUMP).expect("parse dump");
        let main = snapshot.main.as_ref().expect("main window");
        assert!(matches!(main, LayoutNode::Window { main: true, .. }));
        assert_eq!(main.id().as_str(), "m0");
        assert_eq!(main.children().len(), 2);
        assert_eq!(snapshot.floating.len(), 1);
        assert_eq!(snapshot.floating[0].kind(), Some(LayoutKind::Window));
        assert_eq!(snapshot.active, Some(LayoutId::from("l3")));
    }

    #[test]
    fn leaf_titles_fall_back_to_view_type() {
        let snapshot = LayoutSnapshot::from_json(DUMP).unwrap();
        assert_eq!(
            snapshot.find(&"l1".into()).and_then(LayoutNode::title),
            Some("Daily note")
        );
        assert_eq!(
            snapshot.find(&"l2".into()).and_then(LayoutNode::title),
            Some("graph")
        );
    }

    #[test]
    fn unknown_types_are_preserved_as_unrecognized() {
        let snapshot = LayoutSnapshot::from_json(DUMP).unwrap();
        let node = snapshot.find(&"c1".into()).expect("canvas node");
        assert_eq!(node.kind(), None);
        assert_eq!(node.kind_name(), "canvas-stack");
        match snapshot.find(&"s2".into()) {
            Some(LayoutNode::Split { direction, .. }) => {
                assert_eq!(*direction, Some(SplitDirection::Horizontal))
            }
            other => panic!("expected split, got {:?}", other),
        }
    }

    #[test]
    fn leaf_ids_span_main_and_floating() {
        let snapshot = LayoutSnapshot::from_json(DUMP).unwrap();
        let ids: Vec<_> = snapshot.leaf_ids().into_iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["l1", "l2", "l3", "l4"]);
    }

    #[test]
    fn tab_group_main_area_gets_its_own_window_id() {
        let snapshot = LayoutSnapshot::from_json(
            r#"{ "main": { "id": "t", "type": "tabs", "children": [
                { "id": "a", "type": "leaf", "state": { "title": "a.md" } }
            ] } }"#,
        )
        .unwrap();
        let main = snapshot.main.as_ref().expect("main window");
        assert_eq!(main.id().as_str(), "t#window");
        assert_eq!(main.children()[0].kind(), Some(LayoutKind::Tabs));
        assert_eq!(main.children()[0].id().as_str(), "t");

        let tabs = LayoutId::from("t");
        assert_eq!(snapshot.find(&tabs).and_then(LayoutNode::kind), Some(LayoutKind::Tabs));
        assert_eq!(
            snapshot.find_parent(&"a".into()).map(LayoutNode::id),
            Some(&tabs)
        );
    }

    #[test]
    fn rejects_leaf_as_main_area() {
        let err = LayoutSnapshot::from_json(r#"{ "main": { "id": "x", "type": "leaf" } }"#)
            .unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidMain(kind) if kind == "leaf"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LayoutSnapshot::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Read { .. }));
    }
}
