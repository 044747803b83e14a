pub mod store;
pub mod view;

pub use store::{SettingsError, SettingsStore};
pub use view::{IconSettings, LabelSettings, ViewSettings, VIEW_DISPLAY, VIEW_TYPE};
