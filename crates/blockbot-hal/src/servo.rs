//! Generic [`Servo`] trait for position-controlled servos.

use std::str::FromStr;

/// Travel direction of a servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoDirection {
    Forward,
    Reverse,
}

impl ServoDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            ServoDirection::Forward => "FORWARD",
            ServoDirection::Reverse => "REVERSE",
        }
    }
}

impl FromStr for ServoDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FORWARD" => Ok(ServoDirection::Forward),
            "REVERSE" => Ok(ServoDirection::Reverse),
            _ => Err(()),
        }
    }
}

/// A position-controlled servo.
///
/// Like [`Motor`][crate::motor::Motor], handles are shared as
/// `Arc<dyn Servo>` across threads, so the trait uses interior mutability.
pub trait Servo: Send + Sync {
    /// Command the servo position in `[0.0, 1.0]`.
    fn set_position(&self, position: f64);

    /// The most recently commanded position.
    fn position(&self) -> f64;

    fn set_direction(&self, direction: ServoDirection);

    fn direction(&self) -> ServoDirection;
}
