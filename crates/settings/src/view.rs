use serde::{Deserialize, Serialize};

pub const VIEW_TYPE: &str = "open-editors";
pub const VIEW_DISPLAY: &str = "Open editors";

const SETTINGS_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub labels: LabelSettings,
    #[serde(default)]
    pub icons: IconSettings,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            labels: LabelSettings::default(),
            icons: IconSettings::default(),
        }
    }
}

impl ViewSettings {
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = SETTINGS_VERSION;
        }
        self.labels.sanitize();
        self.icons.sanitize();
    }

    /// Label of the `index`-th (1-based) non-main window.
    pub fn window_label(&self, index: usize) -> String {
        format!("{} {}", self.labels.window_prefix, index)
    }

    /// Label of the `index`-th (1-based) group inside a split.
    pub fn group_label(&self, index: usize) -> String {
        format!("{} {}", self.labels.group_prefix, index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSettings {
    #[serde(default = "default_main_window")]
    pub main_window: String,
    #[serde(default = "default_window_prefix")]
    pub window_prefix: String,
    #[serde(default = "default_group_prefix")]
    pub group_prefix: String,
    #[serde(default = "default_untitled")]
    pub untitled: String,
    #[serde(default = "default_close")]
    pub close: String,
    #[serde(default = "default_close_group")]
    pub close_group: String,
    #[serde(default = "default_close_all")]
    pub close_all: String,
    #[serde(default = "default_close_others")]
    pub close_others: String,
}

fn default_main_window() -> String {
    "Main window".to_string()
}

fn default_window_prefix() -> String {
    "Window".to_string()
}

fn default_group_prefix() -> String {
    "Group".to_string()
}

fn default_untitled() -> String {
    "Untitled".to_string()
}

fn default_close() -> String {
    "Close".to_string()
}

fn default_close_group() -> String {
    "Close group".to_string()
}

fn default_close_all() -> String {
    "Close all".to_string()
}

fn default_close_others() -> String {
    "Close all editors except one".to_string()
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            main_window: default_main_window(),
            window_prefix: default_window_prefix(),
            group_prefix: default_group_prefix(),
            untitled: default_untitled(),
            close: default_close(),
            close_group: default_close_group(),
            close_all: default_close_all(),
            close_others: default_close_others(),
        }
    }
}

impl LabelSettings {
    fn sanitize(&mut self) {
        restore_if_blank(&mut self.main_window, default_main_window);
        restore_if_blank(&mut self.window_prefix, default_window_prefix);
        restore_if_blank(&mut self.group_prefix, default_group_prefix);
        restore_if_blank(&mut self.untitled, default_untitled);
        restore_if_blank(&mut self.close, default_close);
        restore_if_blank(&mut self.close_group, default_close_group);
        restore_if_blank(&mut self.close_all, default_close_all);
        restore_if_blank(&mut self.close_others, default_close_others);
    }
}

/// Icon identifiers handed to the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconSettings {
    #[serde(default = "default_view_icon")]
    pub view: String,
    #[serde(default = "default_close_icon")]
    pub close: String,
    #[serde(default = "default_close_group_icon")]
    pub close_group: String,
    #[serde(default = "default_close_window_icon")]
    pub close_window: String,
    #[serde(default = "default_close_others_icon")]
    pub close_others: String,
}

fn default_view_icon() -> String {
    "layers".to_string()
}

fn default_close_icon() -> String {
    "x-square".to_string()
}

fn default_close_group_icon() -> String {
    "copy-x".to_string()
}

fn default_close_window_icon() -> String {
    "copy-x".to_string()
}

fn default_close_others_icon() -> String {
    "copy-minus".to_string()
}

impl Default for IconSettings {
    fn default() -> Self {
        Self {
            view: default_view_icon(),
            close: default_close_icon(),
            close_group: default_close_group_icon(),
            close_window: default_close_window_icon(),
            close_others: default_close_others_icon(),
        }
    }
}

impl IconSettings {
    fn sanitize(&mut self) {
        restore_if_blank(&mut self.view, default_view_icon);
        restore_if_blank(&mut self.close, default_close_icon);
        restore_if_blank(&mut self.close_group, default_close_group_icon);
        restore_if_blank(&mut self.close_window, default_close_window_icon);
        restore_if_blank(&mut self.close_others, default_close_others_icon);
    }
}

fn restore_if_blank(value: &mut String, default: fn() -> String) {
    if value.trim().is_empty() {
        *value = default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_labels_use_prefixes() {
        let settings = ViewSettings::default();
        assert_eq!(settings.window_label(2), "Window 2");
        assert_eq!(settings.group_label(1), "Group 1");
    }

    #[test]
    fn sanitize_restores_blank_fields() {
        let mut settings = ViewSettings::default();
        settings.version = 0;
        settings.labels.group_prefix = "   ".into();
        settings.icons.close = String::new();
        settings.sanitize();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.labels.group_prefix, "Group");
        assert_eq!(settings.icons.close, "x-square");
    }
}
