//! In-memory [`Surface`] used by tests and the command-line inspector.
//! 供測試與命令列檢視工具使用的記憶體內 [`Surface`]。

use std::cell::RefCell;
use std::fmt::Write as _;

use crate::surface::{ElementId, ItemElements, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRole {
    Root,
    Item,
    Row,
    Children,
    Action,
    CollapseIcon,
}

#[derive(Debug, Clone)]
struct ElementRecord {
    role: ElementRole,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    text: String,
    icon: Option<String>,
    collapsible: bool,
    collapsed: bool,
    removed: bool,
    releases: u32,
}

impl ElementRecord {
    fn new(role: ElementRole, parent: Option<ElementId>, text: &str) -> Self {
        Self {
            role,
            parent,
            children: Vec::new(),
            text: text.to_string(),
            icon: None,
            collapsible: false,
            collapsed: false,
            removed: false,
            releases: 0,
        }
    }
}

/// Element arena that records every allocation and release.
/// 記錄每次配置與釋放的元素集合。
///
/// The arena only grows: released records are kept so their release counts stay queryable, and
/// ids are never reused. [`MemorySurface::live_items`] scans every record ever allocated, so a
/// long-lived surface gets slower with each rebuild.
#[derive(Debug, Default)]
pub struct MemorySurface {
    elements: RefCell<Vec<ElementRecord>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, record: ElementRecord) -> ElementId {
        let mut elements = self.elements.borrow_mut();
        let id = ElementId::from_raw(elements.len() as u64);
        if let Some(parent) = record.parent {
            if let Some(parent) = elements.get_mut(parent.as_u64() as usize) {
                parent.children.push(id);
            }
        }
        elements.push(record);
        id
    }

    fn with_record<R>(&self, id: ElementId, f: impl FnOnce(&ElementRecord) -> R) -> Option<R> {
        self.elements.borrow().get(id.as_u64() as usize).map(f)
    }

    fn update(&self, id: ElementId, f: impl FnOnce(&mut ElementRecord)) {
        if let Some(record) = self.elements.borrow_mut().get_mut(id.as_u64() as usize) {
            f(record);
        }
    }

    pub fn role(&self, id: ElementId) -> Option<ElementRole> {
        self.with_record(id, |record| record.role)
    }

    pub fn text(&self, id: ElementId) -> Option<String> {
        self.with_record(id, |record| record.text.clone())
    }

    pub fn icon(&self, id: ElementId) -> Option<String> {
        self.with_record(id, |record| record.icon.clone()).flatten()
    }

    /// Number of times [`Surface::release_item`] was called for this item.
    /// 此項目被 [`Surface::release_item`] 釋放的次數。
    pub fn release_count(&self, item: ElementId) -> u32 {
        self.with_record(item, |record| record.releases)
            .unwrap_or_default()
    }

    /// An element is live when neither it nor any ancestor has been removed.
    /// 元素本身與所有祖先皆未被移除時視為存活。
    pub fn is_live(&self, id: ElementId) -> bool {
        let elements = self.elements.borrow();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match elements.get(current.as_u64() as usize) {
                Some(record) if !record.removed => cursor = record.parent,
                _ => return false,
            }
        }
        true
    }

    pub fn is_collapsible(&self, row: ElementId) -> bool {
        self.with_record(row, |record| record.collapsible)
            .unwrap_or(false)
    }

    pub fn is_collapsed(&self, item: ElementId) -> bool {
        self.with_record(item, |record| record.collapsed)
            .unwrap_or(false)
    }

    /// Items that are still mounted, in allocation order.
    /// 依配置順序列出仍掛載中的項目。
    pub fn live_items(&self) -> Vec<ElementId> {
        let count = self.elements.borrow().len();
        (0..count as u64)
            .map(ElementId::from_raw)
            .filter(|id| self.role(*id) == Some(ElementRole::Item) && self.is_live(*id))
            .collect()
    }

    /// Renders the live items mounted under `root` as an indented outline.
    /// 將 `root` 之下仍存活的項目繪製為縮排大綱。
    ///
    /// Collapsible rows are marked `▾` (expanded) or `▸` (collapsed); collapsed items hide their
    /// children. Action buttons follow the label in brackets.
    pub fn outline(&self, root: ElementId) -> String {
        let mut out = String::new();
        self.outline_container(root, 0, &mut out);
        out
    }

    fn outline_container(&self, container: ElementId, depth: usize, out: &mut String) {
        let items = self
            .with_record(container, |record| record.children.clone())
            .unwrap_or_default();
        for item in items {
            if self.role(item) != Some(ElementRole::Item) || !self.is_live(item) {
                continue;
            }
            self.outline_item(item, depth, out);
        }
    }

    fn outline_item(&self, item: ElementId, depth: usize, out: &mut String) {
        let parts = self.with_record(item, |record| (record.children.clone(), record.collapsed));
        let Some((parts, collapsed)) = parts else {
            return;
        };
        let row = parts
            .iter()
            .copied()
            .find(|id| self.role(*id) == Some(ElementRole::Row));
        let children = parts
            .iter()
            .copied()
            .find(|id| self.role(*id) == Some(ElementRole::Children));

        let label = self.text(item).unwrap_or_default();
        let marker = match row {
            Some(row) if self.is_collapsible(row) && collapsed => "▸",
            Some(row) if self.is_collapsible(row) => "▾",
            _ => "•",
        };
        let _ = write!(out, "{}{} {}", "  ".repeat(depth), marker, label);
        if let Some(row) = row {
            let buttons = self
                .with_record(row, |record| record.children.clone())
                .unwrap_or_default();
            for button in buttons {
                if self.role(button) == Some(ElementRole::Action) && self.is_live(button) {
                    let _ = write!(out, " [{}]", self.text(button).unwrap_or_default());
                }
            }
        }
        out.push('\n');

        if !collapsed {
            if let Some(children) = children {
                self.outline_container(children, depth + 1, out);
            }
        }
    }
}

impl Surface for MemorySurface {
    fn create_root(&self) -> ElementId {
        self.push(ElementRecord::new(ElementRole::Root, None, ""))
    }

    fn create_item(&self, container: ElementId, label: &str) -> ItemElements {
        let item = self.push(ElementRecord::new(ElementRole::Item, Some(container), label));
        let row = self.push(ElementRecord::new(ElementRole::Row, Some(item), label));
        let children = self.push(ElementRecord::new(ElementRole::Children, Some(item), ""));
        ItemElements {
            item,
            row,
            children,
        }
    }

    fn create_action(&self, row: ElementId, icon: &str, label: &str) -> ElementId {
        let mut record = ElementRecord::new(ElementRole::Action, Some(row), label);
        record.icon = Some(icon.to_string());
        self.push(record)
    }

    fn create_collapse_icon(&self, row: ElementId) -> ElementId {
        let mut record = ElementRecord::new(ElementRole::CollapseIcon, Some(row), "");
        record.icon = Some("right-triangle".to_string());
        self.push(record)
    }

    fn set_collapsible(&self, row: ElementId, collapsible: bool) {
        self.update(row, |record| record.collapsible = collapsible);
    }

    fn set_collapsed(&self, item: &ItemElements, collapsed: bool) {
        self.update(item.item, |record| record.collapsed = collapsed);
        self.update(item.row, |record| record.collapsed = collapsed);
    }

    fn release_item(&self, item: ItemElements) {
        self.update(item.item, |record| {
            record.releases += 1;
            record.removed = true;
        });
        self.update(item.row, |record| record.removed = true);
        self.update(item.children, |record| record.removed = true);
    }

    fn remove(&self, element: ElementId) {
        self.update(element, |record| record.removed = true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_reflects_collapse_and_actions() {
        let surface = MemorySurface::new();
        let root = surface.create_root();
        let window = surface.create_item(root, "Main window");
        surface.set_collapsible(window.row, true);
        surface.create_action(window.row, "copy-x", "Close all");
        let leaf = surface.create_item(window.children, "notes.md");
        surface.create_action(leaf.row, "x-square", "Close");

        assert_eq!(
            surface.outline(root),
            "▾ Main window [Close all]\n  • notes.md [Close]\n"
        );

        surface.set_collapsed(&window, true);
        assert_eq!(surface.outline(root), "▸ Main window [Close all]\n");
    }

    #[test]
    fn released_items_disappear_with_descendants() {
        let surface = MemorySurface::new();
        let root = surface.create_root();
        let window = surface.create_item(root, "Window 1");
        let leaf = surface.create_item(window.children, "a.md");

        surface.release_item(window);
        assert_eq!(surface.release_count(window.item), 1);
        assert_eq!(surface.release_count(leaf.item), 0);
        assert!(!surface.is_live(leaf.item));
        assert!(surface.live_items().is_empty());
        assert_eq!(surface.outline(root), "");
    }
}
