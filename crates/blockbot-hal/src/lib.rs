//! `blockbot-hal` – Hardware Abstraction
//!
//! Device traits and the active hardware configuration map that the script
//! runtime resolves capabilities against.
//!
//! # Modules
//!
//! - [`motor`] – [`Motor`][motor::Motor]: a power-controlled drive motor with
//!   direction and zero-power behavior, plus the loosely-coercible
//!   [`MotorDirection`][motor::MotorDirection] and
//!   [`ZeroPowerBehavior`][motor::ZeroPowerBehavior] enums.
//! - [`servo`] – [`Servo`][servo::Servo]: a position-controlled servo.
//! - [`gyro`] – [`Gyro`][gyro::Gyro]: a streaming heading sensor whose
//!   subscription must be stopped when a script run ends.
//! - [`config`] – [`HardwareConfig`][config::HardwareConfig]: the name →
//!   device map for the active robot configuration, with class-checked and
//!   classless lookups.
//! - [`sim`] – simulated devices and a [`SimConfig`][sim::SimConfig] builder
//!   for headless tests and CI.

pub mod config;
pub mod gyro;
pub mod motor;
pub mod servo;
pub mod sim;

pub use config::{Device, DeviceClass, HardwareConfig};
pub use gyro::Gyro;
pub use motor::{Motor, MotorDirection, ZeroPowerBehavior};
pub use servo::{Servo, ServoDirection};
