use std::fmt;

/// Handle to an element owned by a [`Surface`].
/// [`Surface`] 所擁有之元素的識別碼。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Elements allocated for one tree item: the outer item, its clickable row and the container
/// that holds child items.
/// 單一樹項目所配置的元素：外層項目、可點擊列與子項目容器。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemElements {
    pub item: ElementId,
    pub row: ElementId,
    pub children: ElementId,
}

/// Rendering toolkit boundary. Implementations paint; tree nodes decide what exists.
/// 繪製工具組的邊界；實作者負責繪製，樹節點決定元素的存在與否。
pub trait Surface {
    /// Creates the container the whole forest is mounted in.
    fn create_root(&self) -> ElementId;

    fn create_item(&self, container: ElementId, label: &str) -> ItemElements;

    /// Adds an always-visible action button to an item row.
    fn create_action(&self, row: ElementId, icon: &str, label: &str) -> ElementId;

    fn create_collapse_icon(&self, row: ElementId) -> ElementId;

    fn set_collapsible(&self, row: ElementId, collapsible: bool);

    /// Shows or hides the children container and flips the collapse affordance.
    fn set_collapsed(&self, item: &ItemElements, collapsed: bool);

    /// Releases everything allocated by [`Surface::create_item`] for this item.
    fn release_item(&self, item: ItemElements);

    fn remove(&self, element: ElementId);
}
