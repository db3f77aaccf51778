//! [`ScriptBridge`] – the lifecycle callback surface the composed script
//! payload drives.
//!
//! The bridge is a system capability like any other, but its operations are
//! notifications, not block executions: they never pass through the
//! cooperative stop check, because a script that is already reporting
//! completion or failure must always get through.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use blockbot_kernel::{Capability, RunContext};
use blockbot_types::{BotError, ExecutionPhase};

use crate::signal::FinishedSignal;

pub struct ScriptBridge {
    cx: Arc<RunContext>,
    finished: Arc<FinishedSignal>,
}

impl ScriptBridge {
    pub fn new(cx: Arc<RunContext>, finished: Arc<FinishedSignal>) -> Self {
        Self { cx, finished }
    }

    /// Turn a raw engine exception rendering into the message published to
    /// the operator. Unresolved-identifier errors almost always mean a script
    /// referring to a hardware slot that is not in the active configuration,
    /// so they get the friendlier diagnostic.
    fn exception_message(&self, details: &str) -> String {
        if let Some(device) = details
            .strip_prefix("ReferenceError: ")
            .and_then(|rest| rest.strip_suffix(" is not defined"))
        {
            format!("Could not find hardware device: {device}")
        } else {
            format!(
                "Fatal error occurred while executing the block labeled \"{}\".",
                self.cx.full_block_label()
            )
        }
    }
}

impl Capability for ScriptBridge {
    fn identifier(&self) -> &str {
        "scriptBridge"
    }

    fn block_prefix(&self) -> &str {
        ""
    }

    fn invoke(&self, op: &str, args: &[Value]) -> Result<Value, BotError> {
        match op {
            "scriptStarting" => {
                debug!(script = %self.cx.script(), "script reported start");
                self.cx.set_phase(ExecutionPhase::Running);
            }
            "caughtException" => {
                let details = args
                    .first()
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                self.cx.record_fatal_message(self.exception_message(details));
            }
            "scriptFinished" => {
                debug!(script = %self.cx.script(), "script reported completion");
                self.finished.signal();
            }
            other => {
                debug!(op = other, "ignoring unknown bridge notification");
            }
        }
        Ok(Value::Null)
    }
}
