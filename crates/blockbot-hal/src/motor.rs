//! Generic [`Motor`] trait for power-controlled drive motors.
//!
//! Drivers implement this trait and are placed in a
//! [`HardwareConfig`][crate::config::HardwareConfig]. The runtime only ever
//! talks to the trait, so drivers can be swapped without touching script or
//! capability logic.
//!
//! Implementations use interior mutability: motor handles are shared as
//! `Arc<dyn Motor>` between the control thread (setup/teardown) and the
//! engine callback threads (script execution).

use std::str::FromStr;

/// Spin direction of a motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorDirection {
    Forward,
    Reverse,
}

impl MotorDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            MotorDirection::Forward => "FORWARD",
            MotorDirection::Reverse => "REVERSE",
        }
    }
}

impl FromStr for MotorDirection {
    type Err = ();

    /// Accepts the exact variant name, retrying upper-cased on failure.
    /// Script-side arguments arrive as loosely-cased strings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FORWARD" => Ok(MotorDirection::Forward),
            "REVERSE" => Ok(MotorDirection::Reverse),
            _ => match s.to_uppercase().as_str() {
                "FORWARD" => Ok(MotorDirection::Forward),
                "REVERSE" => Ok(MotorDirection::Reverse),
                _ => Err(()),
            },
        }
    }
}

/// What the motor does when commanded power is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroPowerBehavior {
    Brake,
    Float,
}

impl ZeroPowerBehavior {
    pub fn as_str(self) -> &'static str {
        match self {
            ZeroPowerBehavior::Brake => "BRAKE",
            ZeroPowerBehavior::Float => "FLOAT",
        }
    }
}

impl FromStr for ZeroPowerBehavior {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BRAKE" => Ok(ZeroPowerBehavior::Brake),
            "FLOAT" => Ok(ZeroPowerBehavior::Float),
            _ => match s.to_uppercase().as_str() {
                "BRAKE" => Ok(ZeroPowerBehavior::Brake),
                "FLOAT" => Ok(ZeroPowerBehavior::Float),
                _ => Err(()),
            },
        }
    }
}

/// A power-controlled drive motor.
pub trait Motor: Send + Sync {
    /// Command the motor power in `[-1.0, 1.0]`.
    fn set_power(&self, power: f64);

    /// The most recently commanded power.
    fn power(&self) -> f64;

    fn set_direction(&self, direction: MotorDirection);

    fn direction(&self) -> MotorDirection;

    fn set_zero_power_behavior(&self, behavior: ZeroPowerBehavior);

    fn zero_power_behavior(&self) -> ZeroPowerBehavior;

    /// Encoder position in ticks.
    fn current_position(&self) -> i64;
}
