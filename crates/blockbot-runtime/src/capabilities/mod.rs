//! The concrete script-callable capabilities.
//!
//! Each capability dispatches operations by name with loosely-typed JSON
//! arguments, reports every entered operation through
//! [`CapabilityCore::begin`] (the cooperative stop choke point), validates
//! arguments with the shared helpers, and degrades to safe defaults instead
//! of erroring on expected user mistakes.

mod bridge;
mod core;
mod elapsed_time;
mod gyro;
mod motor;
mod servo;
mod telemetry;

pub use bridge::ScriptBridge;
pub use self::core::CapabilityCore;
pub use elapsed_time::ElapsedTimeCapability;
pub use gyro::GyroCapability;
pub use motor::MotorCapability;
pub use servo::ServoCapability;
pub use telemetry::TelemetryCapability;
