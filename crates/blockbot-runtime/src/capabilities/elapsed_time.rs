//! Elapsed-time capability: the stopwatch every script gets for free.

use std::sync::Mutex;
use std::time::Instant;

use serde_json::{json, Value};

use blockbot_kernel::Capability;
use blockbot_types::{BlockKind, BotError};

use super::CapabilityCore;

/// A resettable stopwatch registered under a system identifier for every
/// run. The timer starts when the capability is built, which happens just
/// before the script is loaded.
pub struct ElapsedTimeCapability {
    core: CapabilityCore,
    started: Mutex<Instant>,
}

impl ElapsedTimeCapability {
    pub fn new(core: CapabilityCore) -> Self {
        Self {
            core,
            started: Mutex::new(Instant::now()),
        }
    }

    fn seconds(&self) -> f64 {
        self.started
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .elapsed()
            .as_secs_f64()
    }
}

impl Capability for ElapsedTimeCapability {
    fn identifier(&self) -> &str {
        self.core.identifier()
    }

    fn block_prefix(&self) -> &str {
        self.core.block_prefix()
    }

    fn invoke(&self, op: &str, args: &[Value]) -> Result<Value, BotError> {
        let _ = args;
        match op {
            "reset" => {
                self.core.begin(BlockKind::Function, ".reset")?;
                *self.started.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
                Ok(Value::Null)
            }
            "seconds" => {
                self.core.begin(BlockKind::Getter, ".Seconds")?;
                Ok(json!(self.seconds()))
            }
            "milliseconds" => {
                self.core.begin(BlockKind::Getter, ".Milliseconds")?;
                Ok(json!(self.seconds() * 1000.0))
            }
            other => {
                self.core.begin(BlockKind::Function, &format!(".{other}"))?;
                self.core.report_unknown_op(other);
                Ok(Value::Null)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use blockbot_kernel::{DiagnosticSink, RunContext};

    fn capability() -> ElapsedTimeCapability {
        let cx = Arc::new(RunContext::new("Test", Duration::from_secs(20)));
        let sink = Arc::new(DiagnosticSink::new());
        let core = CapabilityCore::new("elapsedTime", "ElapsedTime", cx, sink);
        ElapsedTimeCapability::new(core)
    }

    #[test]
    fn timer_advances() {
        let cap = capability();
        std::thread::sleep(Duration::from_millis(15));
        let seconds = cap
            .invoke("seconds", &[])
            .expect("no stop pending")
            .as_f64()
            .expect("number");
        assert!(seconds >= 0.015);
    }

    #[test]
    fn reset_rewinds_the_timer() {
        let cap = capability();
        std::thread::sleep(Duration::from_millis(15));
        cap.invoke("reset", &[]).expect("no stop pending");
        let seconds = cap
            .invoke("seconds", &[])
            .expect("no stop pending")
            .as_f64()
            .expect("number");
        assert!(seconds < 0.015);
    }

    #[test]
    fn milliseconds_scales_seconds() {
        let cap = capability();
        std::thread::sleep(Duration::from_millis(10));
        let millis = cap
            .invoke("milliseconds", &[])
            .expect("no stop pending")
            .as_f64()
            .expect("number");
        assert!(millis >= 10.0);
    }
}
