//! Gyro capability: exposes one configured [`Gyro`] slot to script code.
//!
//! The gyro is the one device class with a release obligation: its sample
//! stream must be stopped when the run ends, so this capability implements
//! the release hook.

use std::sync::Arc;

use serde_json::{json, Value};

use blockbot_hal::Gyro;
use blockbot_kernel::Capability;
use blockbot_types::{BlockKind, BotError};

use super::CapabilityCore;

pub struct GyroCapability {
    core: CapabilityCore,
    gyro: Option<Arc<dyn Gyro>>,
}

impl GyroCapability {
    pub fn new(core: CapabilityCore, gyro: Option<Arc<dyn Gyro>>) -> Self {
        Self { core, gyro }
    }
}

impl Capability for GyroCapability {
    fn identifier(&self) -> &str {
        self.core.identifier()
    }

    fn block_prefix(&self) -> &str {
        self.core.block_prefix()
    }

    fn invoke(&self, op: &str, args: &[Value]) -> Result<Value, BotError> {
        let _ = args;
        match op {
            "getHeading" => {
                self.core.begin(BlockKind::Getter, ".Heading")?;
                Ok(json!(self.gyro.as_ref().map_or(0.0, |g| g.heading())))
            }
            "calibrate" => {
                self.core.begin(BlockKind::Function, ".calibrate")?;
                if let Some(gyro) = self.gyro.as_ref() {
                    gyro.calibrate();
                }
                Ok(Value::Null)
            }
            other => {
                self.core.begin(BlockKind::Function, &format!(".{other}"))?;
                self.core.report_unknown_op(other);
                Ok(Value::Null)
            }
        }
    }

    fn release(&self) {
        if let Some(gyro) = self.gyro.as_ref() {
            gyro.stop_listening();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use blockbot_hal::sim::SimGyro;
    use blockbot_kernel::{DiagnosticSink, RunContext};

    fn capability(gyro: Option<Arc<dyn Gyro>>) -> GyroCapability {
        let cx = Arc::new(RunContext::new("Test", Duration::from_secs(20)));
        let sink = Arc::new(DiagnosticSink::new());
        let core = CapabilityCore::new("heading", "heading", cx, sink);
        GyroCapability::new(core, gyro)
    }

    #[test]
    fn heading_reads_the_device() {
        let gyro = SimGyro::shared();
        gyro.set_heading(42.0);
        let cap = capability(Some(gyro));
        assert_eq!(cap.invoke("getHeading", &[]).unwrap(), json!(42.0));
    }

    #[test]
    fn calibrate_zeroes_the_device() {
        let gyro = SimGyro::shared();
        gyro.set_heading(90.0);
        let cap = capability(Some(gyro.clone()));
        cap.invoke("calibrate", &[]).expect("no stop pending");
        assert!(gyro.heading().abs() < f64::EPSILON);
    }

    #[test]
    fn release_stops_the_stream() {
        let gyro = SimGyro::shared();
        let cap = capability(Some(gyro.clone()));
        cap.release();
        assert_eq!(gyro.stop_count(), 1);
    }

    #[test]
    fn release_with_absent_device_is_a_no_op() {
        let cap = capability(None);
        cap.release();
        assert_eq!(cap.invoke("getHeading", &[]).unwrap(), json!(0.0));
    }
}
