//! Servo capability: exposes one configured [`Servo`] slot to script code.

use std::sync::Arc;

use serde_json::{json, Value};

use blockbot_hal::{Servo, ServoDirection};
use blockbot_kernel::Capability;
use blockbot_types::{BlockKind, BotError};

use super::CapabilityCore;

/// Script-facing wrapper around a position servo. Absent devices degrade to
/// neutral defaults, same contract as the motor capability.
pub struct ServoCapability {
    core: CapabilityCore,
    servo: Option<Arc<dyn Servo>>,
}

impl ServoCapability {
    pub fn new(core: CapabilityCore, servo: Option<Arc<dyn Servo>>) -> Self {
        Self { core, servo }
    }
}

impl Capability for ServoCapability {
    fn identifier(&self) -> &str {
        self.core.identifier()
    }

    fn block_prefix(&self) -> &str {
        self.core.block_prefix()
    }

    fn invoke(&self, op: &str, args: &[Value]) -> Result<Value, BotError> {
        match op {
            "setPosition" => {
                self.core.begin(BlockKind::Setter, ".Position")?;
                if let (Some(servo), Some(position)) =
                    (self.servo.as_ref(), self.core.arg_f64(args, 0, "position"))
                {
                    servo.set_position(position);
                }
                Ok(Value::Null)
            }
            "getPosition" => {
                self.core.begin(BlockKind::Getter, ".Position")?;
                Ok(json!(self.servo.as_ref().map_or(0.0, |s| s.position())))
            }
            "setDirection" => {
                self.core.begin(BlockKind::Setter, ".Direction")?;
                if let (Some(servo), Some(direction)) = (
                    self.servo.as_ref(),
                    self.core
                        .arg_enum::<ServoDirection>(args, 0, "direction", "Direction"),
                ) {
                    servo.set_direction(direction);
                }
                Ok(Value::Null)
            }
            "getDirection" => {
                self.core.begin(BlockKind::Getter, ".Direction")?;
                Ok(json!(
                    self.servo.as_ref().map_or("", |s| s.direction().as_str())
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
