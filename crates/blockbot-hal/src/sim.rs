//! In-process simulated devices for headless testing without physical
//! hardware.
//!
//! [`SimConfig`] builds a [`HardwareConfig`] pre-populated with stub drivers
//! that record commands and return plausible state. This lets the full
//! runtime stack execute in headless tests and CI pipelines.
//!
//! # Example
//!
//! ```rust
//! use blockbot_hal::sim::SimConfig;
//! use blockbot_hal::DeviceClass;
//!
//! let config = SimConfig::new()
//!     .with_motor("left_drive")
//!     .with_motor("right_drive")
//!     .with_gyro("heading")
//!     .build();
//!
//! assert!(config.get("left_drive", DeviceClass::Motor).is_some());
//! ```

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::{Device, HardwareConfig};
use crate::gyro::Gyro;
use crate::motor::{Motor, MotorDirection, ZeroPowerBehavior};
use crate::servo::{Servo, ServoDirection};

// ────────────────────────────────────────────────────────────────────────────
// Simulated motor
// ────────────────────────────────────────────────────────────────────────────

/// A simulated motor that records the most recent commands.
pub struct SimMotor {
    state: Mutex<SimMotorState>,
}

struct SimMotorState {
    power: f64,
    direction: MotorDirection,
    zero_power_behavior: ZeroPowerBehavior,
    position: i64,
}

impl SimMotor {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SimMotorState {
                power: 0.0,
                direction: MotorDirection::Forward,
                zero_power_behavior: ZeroPowerBehavior::Brake,
                position: 0,
            }),
        })
    }
}

impl Motor for SimMotor {
    fn set_power(&self, power: f64) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.power = power.clamp(-1.0, 1.0);
        // Crude encoder model: every command advances the count.
        state.position += (state.power * 100.0) as i64;
    }

    fn power(&self) -> f64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).power
    }

    fn set_direction(&self, direction: MotorDirection) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).direction = direction;
    }

    fn direction(&self) -> MotorDirection {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).direction
    }

    fn set_zero_power_behavior(&self, behavior: ZeroPowerBehavior) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .zero_power_behavior = behavior;
    }

    fn zero_power_behavior(&self) -> ZeroPowerBehavior {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .zero_power_behavior
    }

    fn current_position(&self) -> i64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).position
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated servo
// ────────────────────────────────────────────────────────────────────────────

/// A simulated servo that records the most recent commanded position.
pub struct SimServo {
    state: Mutex<(f64, ServoDirection)>,
}

impl SimServo {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new((0.0, ServoDirection::Forward)),
        })
    }
}

impl Servo for SimServo {
    fn set_position(&self, position: f64) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).0 = position.clamp(0.0, 1.0);
    }

    fn position(&self) -> f64 {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).0
    }

    fn set_direction(&self, direction: ServoDirection) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).1 = direction;
    }

    fn direction(&self) -> ServoDirection {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).1
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated gyro
// ────────────────────────────────────────────────────────────────────────────

/// A simulated gyro that counts how often its stream was stopped, so tests
/// can assert the release contract.
pub struct SimGyro {
    heading: Mutex<f64>,
    stop_count: AtomicUsize,
}

impl SimGyro {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self {
            heading: Mutex::new(0.0),
            stop_count: AtomicUsize::new(0),
        })
    }

    /// Number of times [`Gyro::stop_listening`] was invoked.
    pub fn stop_count(&self) -> usize {
        self.stop_count.load(Ordering::SeqCst)
    }

    /// Test hook: push a heading sample.
    pub fn set_heading(&self, degrees: f64) {
        *self.heading.lock().unwrap_or_else(|e| e.into_inner()) = degrees.rem_euclid(360.0);
    }
}

impl Gyro for SimGyro {
    fn heading(&self) -> f64 {
        *self.heading.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn calibrate(&self) {
        *self.heading.lock().unwrap_or_else(|e| e.into_inner()) = 0.0;
    }

    fn stop_listening(&self) {
        self.stop_count.fetch_add(1, Ordering::SeqCst);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

/// Builder producing a [`HardwareConfig`] populated with simulated devices.
#[derive(Default)]
pub struct SimConfig {
    config: HardwareConfig,
}

impl SimConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_motor(mut self, name: &str) -> Self {
        self.config.insert(name, Device::Motor(SimMotor::shared()));
        self
    }

    pub fn with_servo(mut self, name: &str) -> Self {
        self.config.insert(name, Device::Servo(SimServo::shared()));
        self
    }

    pub fn with_gyro(mut self, name: &str) -> Self {
        self.config.insert(name, Device::Gyro(SimGyro::shared()));
        self
    }

    pub fn build(self) -> HardwareConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_motor_records_commands() {
        let motor = SimMotor::shared();
        motor.set_power(0.5);
        assert!((motor.power() - 0.5).abs() < f64::EPSILON);
        motor.set_direction(MotorDirection::Reverse);
        assert_eq!(motor.direction(), MotorDirection::Reverse);
    }

    #[test]
    fn sim_motor_clamps_power() {
        let motor = SimMotor::shared();
        motor.set_power(3.0);
        assert!((motor.power() - 1.0).abs() < f64::EPSILON);
        motor.set_power(-3.0);
        assert!((motor.power() + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sim_gyro_counts_stops() {
        let gyro = SimGyro::shared();
        assert_eq!(gyro.stop_count(), 0);
        gyro.stop_listening();
        gyro.stop_listening();
        assert_eq!(gyro.stop_count(), 2);
    }

    #[test]
    fn sim_gyro_calibrate_zeroes_heading() {
        let gyro = SimGyro::shared();
        gyro.set_heading(90.0);
        assert!((gyro.heading() - 90.0).abs() < f64::EPSILON);
        gyro.calibrate();
        assert!(gyro.heading().abs() < f64::EPSILON);
    }

    #[test]
    fn builder_populates_config() {
        let config = SimConfig::new()
            .with_motor("left_drive")
            .with_servo("claw")
            .with_gyro("heading")
            .build();
        assert_eq!(config.len(), 3);
    }
}
