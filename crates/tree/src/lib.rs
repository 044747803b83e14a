//! Owned UI tree mirrored from the host layout, plus the rendering surface boundary.
//! 自主機版面鏡射而來的 UI 樹，以及繪製介面的邊界定義。

pub mod action;
pub mod memory;
pub mod node;
pub mod surface;

pub use action::{NodeAction, NodeCallback};
pub use memory::{ElementRole, MemorySurface};
pub use node::{NodeShape, TreeNode, TreeNodeDraft};
pub use surface::{ElementId, ItemElements, Surface};
