//! [`DiagnosticSink`] – the shared warning/error reporting channel.
//!
//! Recoverable problems (tier 1 and 2) surface here as warnings tagged with
//! the originating block's label; the control thread publishes a captured
//! fatal message here after teardown (tier 3, message-only form). The sink
//! keeps a bounded in-memory history so a supervisor UI can show recent
//! diagnostics, plus two "global" slots:
//!
//! - the warning slot holds the **latest** warning (each new warning
//!   replaces it),
//! - the error slot holds the **first** error of a run and sticks until a
//!   supervisor clears it.

use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::{error, warn};

use blockbot_types::{Diagnostic, Severity};

/// Maximum retained diagnostics; older entries are dropped.
const HISTORY_LIMIT: usize = 256;

/// Shared diagnostic channel for one runtime instance.
#[derive(Default)]
pub struct DiagnosticSink {
    history: Mutex<VecDeque<Diagnostic>>,
    global_warning: Mutex<Option<String>>,
    global_error: Mutex<Option<String>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a recoverable problem, tagged with the label of the block that
    /// was executing.
    pub fn warn(&self, block_label: &str, message: &str) {
        warn!(block = block_label, "{message}");
        let diag = Diagnostic::new(Severity::Warning, block_label, message);
        self.push(diag);
        let mut slot = self.global_warning.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(message.to_string());
    }

    /// Publish a fatal, run-ending message. The first message of a run wins;
    /// later calls are discarded until [`DiagnosticSink::clear_global_error`]
    /// runs. Returns `true` when this call set the slot.
    pub fn set_global_error(&self, message: &str) -> bool {
        error!("{message}");
        self.push(Diagnostic::new(Severity::Error, "", message));
        let mut slot = self.global_error.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            *slot = Some(message.to_string());
            true
        } else {
            false
        }
    }

    pub fn global_warning(&self) -> Option<String> {
        self.global_warning
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn global_error(&self) -> Option<String> {
        self.global_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Supervisor hook: acknowledge and clear the sticky error slot.
    pub fn clear_global_error(&self) {
        *self.global_error.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Recent diagnostics, oldest first.
    pub fn history(&self) -> Vec<Diagnostic> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    fn push(&self, diag: Diagnostic) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        if history.len() == HISTORY_LIMIT {
            history.pop_front();
        }
        history.push_back(diag);
    }
}
