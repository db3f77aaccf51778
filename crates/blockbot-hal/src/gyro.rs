//! Generic [`Gyro`] trait for streaming heading sensors.
//!
//! Unlike motors and servos, a gyro holds a live stream subscription while a
//! script runs. [`Gyro::stop_listening`] must be called when the run ends so
//! the sensor stops pushing samples; the capability layer invokes it from its
//! release hook. Implementations must tolerate repeated calls.

/// A streaming heading sensor.
pub trait Gyro: Send + Sync {
    /// Current heading in degrees, `[0.0, 360.0)`.
    fn heading(&self) -> f64;

    /// Re-zero the sensor.
    fn calibrate(&self);

    /// Stop the stream subscription. Idempotent.
    fn stop_listening(&self);
}
