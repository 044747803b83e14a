use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::view::ViewSettings;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read view settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse view settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only loader for [`ViewSettings`]; a missing file yields the defaults.
/// [`ViewSettings`] 的唯讀載入器；檔案不存在時使用預設值。
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    data: ViewSettings,
}

impl SettingsStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            let mut data = ViewSettings::default();
            data.sanitize();
            return Ok(Self { path, data });
        }

        let contents = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let mut data: ViewSettings =
            serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.clone(),
                source,
            })?;
        data.sanitize();
        Ok(Self { path, data })
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.data
    }

    pub fn into_settings(self) -> ViewSettings {
        self.data
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
