use std::fmt;

use open_editors_layout::{LayoutId, LayoutSnapshot};

/// Token returned by [`WorkspaceHost::subscribe`].
/// [`WorkspaceHost::subscribe`] 回傳的訂閱代號。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription-{}", self.0)
    }
}

/// Capabilities the view needs from the editor host.
/// 檢視所需的編輯器主機能力。
///
/// Every mutating call may itself trigger a later change notification. Hosts deliver
/// notifications one at a time; a listener may be invoked while the view is still inside an
/// action callback.
pub trait WorkspaceHost {
    /// Live, operable reference to a pane, group or window.
    type Handle: Clone;

    fn layout_snapshot(&self) -> LayoutSnapshot;

    fn subscribe(&self, listener: Box<dyn FnMut()>) -> SubscriptionId;

    fn unsubscribe(&self, subscription: SubscriptionId);

    /// Resolves an identifier; `None` when the item no longer exists.
    fn resolve(&self, id: &LayoutId) -> Option<Self::Handle>;

    fn handle_id(&self, handle: &Self::Handle) -> LayoutId;

    fn activate(&self, handle: &Self::Handle);

    fn detach(&self, handle: &Self::Handle);

    /// Creates a blank pane at `position` inside `parent`.
    fn create_pane_in_parent(&self, parent: &Self::Handle, position: usize)
        -> Option<Self::Handle>;

    fn parent_of(&self, handle: &Self::Handle) -> Option<Self::Handle>;
}
