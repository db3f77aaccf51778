//! [`RunContext`] – the shared state of exactly one script execution.
//!
//! A fresh context is created for every run and handed (as an `Arc`) to each
//! capability built for that run, so nothing leaks between executions. It
//! holds:
//!
//! - the execution phase and the stop-requested overlay flag,
//! - the block context used to compose diagnostics,
//! - the first-wins fatal signal (captured error or message),
//! - the cooperative stop watchdog.
//!
//! [`RunContext::begin_block`] is the single choke point every capability
//! operation passes through before doing real work: it records the entered
//! block and performs the forced-stop check. Because the check is
//! cooperative, forced-termination latency equals time-to-next-capability
//! call rather than a hard bound — an accepted trade-off.

use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use blockbot_types::{BlockContext, BlockKind, BotError, ExecutionPhase};

/// Shared, request-scoped state for one script execution.
pub struct RunContext {
    script: String,
    phase: Mutex<ExecutionPhase>,
    block: Mutex<BlockContext>,
    /// First captured fatal error wins; later writes lose the race and are
    /// discarded so the clearest diagnostic survives.
    fatal_error: OnceLock<BotError>,
    /// First captured fatal *message* (no exception object behind it).
    fatal_message: OnceLock<String>,
    /// Timestamp of the first observed stop notification.
    stop_requested_at: OnceLock<Instant>,
    force_stop_after: Duration,
}

impl RunContext {
    pub fn new(script: impl Into<String>, force_stop_after: Duration) -> Self {
        Self {
            script: script.into(),
            phase: Mutex::new(ExecutionPhase::Idle),
            block: Mutex::new(BlockContext::entering_run()),
            fatal_error: OnceLock::new(),
            fatal_message: OnceLock::new(),
            stop_requested_at: OnceLock::new(),
            force_stop_after,
        }
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    // ── Phase ────────────────────────────────────────────────────────────

    pub fn phase(&self) -> ExecutionPhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_phase(&self, phase: ExecutionPhase) {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = phase;
    }

    // ── Block context ────────────────────────────────────────────────────

    /// Record that a capability operation was entered, then run the
    /// cooperative forced-stop check.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::ForcedStop`] once a pending stop request is older
    /// than the configured threshold. The error is also captured into the
    /// fatal signal (first-wins) so the control thread rethrows it after
    /// teardown.
    pub fn begin_block(
        &self,
        kind: BlockKind,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), BotError> {
        {
            let mut block = self.block.lock().unwrap_or_else(|e| e.into_inner());
            *block = BlockContext::new(kind, first_name, last_name);
        }
        self.check_forced_stop()
    }

    /// The diagnostic label of the most recently entered block.
    pub fn full_block_label(&self) -> String {
        self.block
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .full_label()
    }

    // ── Stop watchdog ────────────────────────────────────────────────────

    /// Record an external stop notification. The first call arms the
    /// watchdog; later calls are no-ops. Callable from any thread.
    pub fn request_stop(&self) {
        if self.stop_requested_at.set(Instant::now()).is_ok() {
            info!(script = %self.script, "stop requested; watchdog armed");
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested_at.get().is_some()
    }

    fn check_forced_stop(&self) -> Result<(), BotError> {
        if let Some(at) = self.stop_requested_at.get() {
            if at.elapsed() >= self.force_stop_after {
                let err = BotError::ForcedStop {
                    script: self.script.clone(),
                };
                warn!(script = %self.script, "stop deadline exceeded; aborting script by force");
                self.record_fatal_error(err.clone());
                return Err(err);
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn arm_watchdog_at(&self, at: Instant) {
        let _ = self.stop_requested_at.set(at);
    }

    // ── Fatal signal ─────────────────────────────────────────────────────

    /// Capture a fatal error. Returns `true` when this call won the
    /// first-write race.
    pub fn record_fatal_error(&self, err: BotError) -> bool {
        self.fatal_error.set(err).is_ok()
    }

    /// Capture a fatal human-readable message with no error object behind
    /// it. Returns `true` when this call won the first-write race.
    pub fn record_fatal_message(&self, message: impl Into<String>) -> bool {
        self.fatal_message.set(message.into()).is_ok()
    }

    pub fn fatal_error(&self) -> Option<BotError> {
        self.fatal_error.get().cloned()
    }

    pub fn fatal_message(&self) -> Option<String> {
        self.fatal_message.get().cloned()
    }
}
