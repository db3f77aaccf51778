//! Motor capability: exposes one configured [`Motor`] slot to script code.

use std::sync::Arc;

use serde_json::{json, Value};

use blockbot_hal::{Motor, MotorDirection, ZeroPowerBehavior};
use blockbot_kernel::Capability;
use blockbot_types::{BlockKind, BotError};

use super::CapabilityCore;

/// Script-facing wrapper around a drive motor.
///
/// Built by the factory with `motor: None` when the configured slot could not
/// be resolved; an absent device turns every operation into a no-op that
/// returns the type's neutral default, so a script touching a missing motor
/// degrades instead of crashing.
pub struct MotorCapability {
    core: CapabilityCore,
    motor: Option<Arc<dyn Motor>>,
}

impl MotorCapability {
    pub fn new(core: CapabilityCore, motor: Option<Arc<dyn Motor>>) -> Self {
        Self { core, motor }
    }
}

impl Capability for MotorCapability {
    fn identifier(&self) -> &str {
        self.core.identifier()
    }

    fn block_prefix(&self) -> &str {
        self.core.block_prefix()
    }

    fn invoke(&self, op: &str, args: &[Value]) -> Result<Value, BotError> {
        match op {
            "setPower" => {
                self.core.begin(BlockKind::Setter, ".Power")?;
                if let (Some(motor), Some(power)) =
                    (self.motor.as_ref(), self.core.arg_f64(args, 0, "power"))
                {
                    motor.set_power(power);
                }
                Ok(Value::Null)
            }
            "getPower" => {
                self.core.begin(BlockKind::Getter, ".Power")?;
                Ok(json!(self.motor.as_ref().map_or(0.0, |m| m.power())))
            }
            "setDirection" => {
                self.core.begin(BlockKind::Setter, ".Direction")?;
                if let (Some(motor), Some(direction)) = (
                    self.motor.as_ref(),
                    self.core
                        .arg_enum::<MotorDirection>(args, 0, "direction", "Direction"),
                ) {
                    motor.set_direction(direction);
                }
                Ok(Value::Null)
            }
            "getDirection" => {
                self.core.begin(BlockKind::Getter, ".Direction")?;
                Ok(json!(
                    self.motor.as_ref().map_or("", |m| m.direction().as_str())
                ))
            }
            "setZeroPowerBehavior" => {
                self.core.begin(BlockKind::Setter, ".ZeroPowerBehavior")?;
                if let (Some(motor), Some(behavior)) = (
                    self.motor.as_ref(),
                    self.core.arg_enum::<ZeroPowerBehavior>(
                        args,
                        0,
                        "zeroPowerBehavior",
                        "ZeroPowerBehavior",
                    ),
                ) {
                    motor.set_zero_power_behavior(behavior);
                }
                Ok(Value::Null)
            }
            "getZeroPowerBehavior" => {
                self.core.begin(BlockKind::Getter, ".ZeroPowerBehavior")?;
                Ok(json!(
                    self.motor
                        .as_ref()
                        .map_or("", |m| m.zero_power_behavior().as_str())
                ))
            }
            "getCurrentPosition" => {
                self.core.begin(BlockKind::Getter, ".CurrentPosition")?;
                Ok(json!(self.motor.as_ref().map_or(0, |m| m.current_position())))
            }
            "isBusy" => {
                self.core.begin(BlockKind::Function, ".isBusy")?;
                // No run-to-position mode yet; a commanded motor with nonzero
                // power counts as busy.
                Ok(json!(
                    self.motor.as_ref().is_some_and(|m| m.power().abs() > 0.0)
                ))
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
    use std::time::Duration;

    use blockbot_hal::sim::SimMotor;
    use blockbot_kernel::{DiagnosticSink, RunContext};

    fn capability(motor: Option<Arc<dyn Motor>>) -> (MotorCapability, Arc<DiagnosticSink>) {
        let cx = Arc::new(RunContext::new("Test", Duration::from_secs(20)));
        let sink = Arc::new(DiagnosticSink::new());
        let core = CapabilityCore::new("left_drive", "left_drive", cx, Arc::clone(&sink));
        (MotorCapability::new(core, motor), sink)
    }

    #[test]
    fn set_power_reaches_the_device() {
        let motor = SimMotor::shared();
        let (cap, sink) = capability(Some(motor.clone()));

        cap.invoke("setPower", &[json!(0.5)]).expect("no stop pending");
        assert!((motor.power() - 0.5).abs() < f64::EPSILON);
        assert!(sink.global_warning().is_none());
    }

    #[test]
    fn get_power_returns_commanded_value() {
        let motor = SimMotor::shared();
        let (cap, _sink) = capability(Some(motor.clone()));
        motor.set_power(-0.25);

        let value = cap.invoke("getPower", &[]).expect("no stop pending");
        assert_eq!(value, json!(-0.25));
    }

    #[test]
    fn invalid_power_warns_and_leaves_motor_untouched() {
        let motor = SimMotor::shared();
        let (cap, sink) = capability(Some(motor.clone()));

        cap.invoke("setPower", &[json!("fast")]).expect("no stop pending");
        assert!(motor.power().abs() < f64::EPSILON);

        let warning = sink.global_warning().expect("warning reported");
        assert!(warning.contains("power socket"));
        assert!(warning.contains("set left_drive.Power to"));
    }

    #[test]
    fn direction_round_trips_through_strings() {
        let motor = SimMotor::shared();
        let (cap, _sink) = capability(Some(motor.clone()));

        cap.invoke("setDirection", &[json!("REVERSE")]).expect("no stop pending");
        assert_eq!(motor.direction(), MotorDirection::Reverse);

        let value = cap.invoke("getDirection", &[]).expect("no stop pending");
        assert_eq!(value, json!("REVERSE"));
    }

    #[test]
    fn zero_power_behavior_accepts_loose_case() {
        let motor = SimMotor::shared();
        let (cap, sink) = capability(Some(motor.clone()));

        cap.invoke("setZeroPowerBehavior", &[json!("float")])
            .expect("no stop pending");
        assert_eq!(motor.zero_power_behavior(), ZeroPowerBehavior::Float);
        assert!(sink.global_warning().is_none());
    }

    #[test]
    fn absent_device_returns_defaults_silently() {
        let (cap, sink) = capability(None);

        assert_eq!(cap.invoke("setPower", &[json!(1.0)]).unwrap(), Value::Null);
        assert_eq!(cap.invoke("getPower", &[]).unwrap(), json!(0.0));
        assert_eq!(cap.invoke("getDirection", &[]).unwrap(), json!(""));
        assert_eq!(cap.invoke("getCurrentPosition", &[]).unwrap(), json!(0));
        assert_eq!(cap.invoke("isBusy", &[]).unwrap(), json!(false));
        // Missing-device diagnostics were already reported at build time.
        assert!(sink.global_warning().is_none());
    }

    #[test]
    fn unknown_op_warns_and_returns_null() {
        let (cap, sink) = capability(Some(SimMotor::shared()));
        let value = cap.invoke("engageWarpDrive", &[]).expect("no stop pending");
        assert_eq!(value, Value::Null);

        let warning = sink.global_warning().expect("warning reported");
        assert!(warning.contains("engageWarpDrive"));
    }

    #[test]
    fn is_busy_reflects_commanded_power() {
        let motor = SimMotor::shared();
        let (cap, _sink) = capability(Some(motor.clone()));
        assert_eq!(cap.invoke("isBusy", &[]).unwrap(), json!(false));
        motor.set_power(0.3);
        assert_eq!(cap.invoke("isBusy", &[]).unwrap(), json!(true));
    }
}
