//! Telemetry capability: the script's driver-station display channel.
//!
//! Scripts stage key/value lines with `addTextData` / `addNumericData` and
//! publish the staged batch with `update`. The flushed lines are retained so
//! a display surface (or a test) can read the latest published batch.

use std::sync::Mutex;

use serde_json::Value;
use tracing::info;

use blockbot_kernel::Capability;
use blockbot_types::{BlockKind, BotError};

use super::CapabilityCore;

pub struct TelemetryCapability {
    core: CapabilityCore,
    pending: Mutex<Vec<(String, String)>>,
    flushed: Mutex<Vec<(String, String)>>,
}

impl TelemetryCapability {
    pub fn new(core: CapabilityCore) -> Self {
        Self {
            core,
            pending: Mutex::new(Vec::new()),
            flushed: Mutex::new(Vec::new()),
        }
    }

    /// The most recently published batch of lines.
    pub fn lines(&self) -> Vec<(String, String)> {
        self.flushed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn stage(&self, key: String, value: String) {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((key, value));
    }
}

impl Capability for TelemetryCapability {
    fn identifier(&self) -> &str {
        self.core.identifier()
    }

    fn block_prefix(&self) -> &str {
        self.core.block_prefix()
    }

    fn invoke(&self, op: &str, args: &[Value]) -> Result<Value, BotError> {
        match op {
            "addTextData" => {
                self.core.begin(BlockKind::Function, ".addTextData")?;
                if let Some(key) = self.core.arg_str(args, 0, "key") {
                    // Any value renders; text data is display-only.
                    self.stage(key, self.core.arg_display(args, 1));
                }
                Ok(Value::Null)
            }
            "addNumericData" => {
                self.core.begin(BlockKind::Function, ".addNumericData")?;
                if let (Some(key), Some(number)) = (
                    self.core.arg_str(args, 0, "key"),
                    self.core.arg_f64(args, 1, "number"),
                ) {
                    self.stage(key, number.to_string());
                }
                Ok(Value::Null)
            }
            "update" => {
                self.core.begin(BlockKind::Function, ".update")?;
                let batch =
                    std::mem::take(&mut *self.pending.lock().unwrap_or_else(|e| e.into_inner()));
                for (key, value) in &batch {
                    info!(target: "blockbot::telemetry", "{key}: {value}");
                }
                *self.flushed.lock().unwrap_or_else(|e| e.into_inner()) = batch;
                Ok(Value::Null)
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

    use serde_json::json;

    use blockbot_kernel::{DiagnosticSink, RunContext};

    fn capability() -> (TelemetryCapability, Arc<DiagnosticSink>) {
        let cx = Arc::new(RunContext::new("Test", Duration::from_secs(20)));
        let sink = Arc::new(DiagnosticSink::new());
        let core = CapabilityCore::new("telemetry", "Telemetry", cx, Arc::clone(&sink));
        (TelemetryCapability::new(core), sink)
    }

    #[test]
    fn update_publishes_staged_lines_in_order() {
        let (cap, _sink) = capability();
        cap.invoke("addTextData", &[json!("status"), json!("ready")])
            .expect("no stop pending");
        cap.invoke("addNumericData", &[json!("power"), json!(0.5)])
            .expect("no stop pending");
        assert!(cap.lines().is_empty());

        cap.invoke("update", &[]).expect("no stop pending");
        assert_eq!(
            cap.lines(),
            vec![
                ("status".to_string(), "ready".to_string()),
                ("power".to_string(), "0.5".to_string()),
            ]
        );
    }

    #[test]
    fn update_replaces_the_previous_batch() {
        let (cap, _sink) = capability();
        cap.invoke("addTextData", &[json!("a"), json!("1")]).unwrap();
        cap.invoke("update", &[]).unwrap();
        cap.invoke("addTextData", &[json!("b"), json!("2")]).unwrap();
        cap.invoke("update", &[]).unwrap();
        assert_eq!(cap.lines(), vec![("b".to_string(), "2".to_string())]);
    }

    #[test]
    fn text_data_renders_non_string_values() {
        let (cap, sink) = capability();
        cap.invoke("addTextData", &[json!("count"), json!(3)]).unwrap();
        cap.invoke("update", &[]).unwrap();
        assert_eq!(cap.lines(), vec![("count".to_string(), "3".to_string())]);
        assert!(sink.global_warning().is_none());
    }

    #[test]
    fn numeric_data_rejects_text_values() {
        let (cap, sink) = capability();
        cap.invoke("addNumericData", &[json!("power"), json!("lots")])
            .unwrap();
        cap.invoke("update", &[]).unwrap();
        assert!(cap.lines().is_empty());
        assert!(
            sink.global_warning()
                .expect("warning reported")
                .contains("number socket")
        );
    }
}
