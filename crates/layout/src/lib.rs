//! Layout snapshot model mirrored by the Open Editors view.
//! Open Editors 檢視所鏡射的版面快照模型。

mod dump;

pub mod node;
pub mod snapshot;

pub use node::{LayoutId, LayoutKind, LayoutNode, SplitDirection};
pub use snapshot::{LayoutSnapshot, SnapshotError};
