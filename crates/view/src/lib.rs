//! Open Editors view: keeps a mirrored tree in sync with the host layout.
//! Open Editors 檢視：讓鏡射樹與主機版面保持同步。

mod actions;

pub mod diagnostic;
pub mod host;
pub mod synchronizer;
pub mod workspace;

pub use actions::keep_one_editor;
pub use diagnostic::{Diagnostic, DiagnosticLog};
pub use host::{SubscriptionId, WorkspaceHost};
pub use synchronizer::TreeSynchronizer;
pub use workspace::{HostCall, InMemoryWorkspace, NotifyMode};
