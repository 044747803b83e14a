use std::cell::RefCell;
use std::rc::Rc;

use open_editors_layout::{LayoutId, LayoutKind};
use thiserror::Error;
use tracing::warn;

/// Recoverable conditions met while walking the layout or running an action.
/// 走訪版面或執行動作時遇到的可復原狀況。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("no live item for '{id}' while trying to {action}")]
    StaleIdentifier { id: LayoutId, action: &'static str },
    #[error("skipping layout node '{id}' of unrecognized kind '{kind}'")]
    UnrecognizedKind { id: LayoutId, kind: String },
    #[error("skipping top-level {kind} node '{id}' that is not inside a window")]
    OrphanNode { id: LayoutId, kind: LayoutKind },
    #[error("group '{id}' has no editors to close")]
    EmptyGroup { id: LayoutId },
    #[error("pane '{id}' has no parent to hold a replacement pane")]
    MissingParent { id: LayoutId },
    #[error("host refused to create a replacement pane in '{parent}'")]
    ReplacementRejected { parent: LayoutId },
}

/// Shared, append-only record of diagnostics; every entry is also logged.
/// 共用且僅可附加的診斷紀錄；每筆紀錄同時輸出至日誌。
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    entries: Rc<RefCell<Vec<Diagnostic>>>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, diagnostic: Diagnostic) {
        warn!(%diagnostic, "open editors");
        self.entries.borrow_mut().push(diagnostic);
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
