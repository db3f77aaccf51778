//! [`HardwareCapabilityFactory`] – builds one capability per configured
//! hardware slot.
//!
//! Resolution never fails the load: when a slot cannot be satisfied the
//! factory reports a warning that distinguishes "no device under that name"
//! from "a device of another class under that name", and returns a
//! device-less capability so the script can still run and degrade.

use std::sync::Arc;

use tracing::debug;

use blockbot_hal::{Device, DeviceClass, HardwareConfig};
use blockbot_kernel::{Capability, DiagnosticSink, RunContext};

use crate::capabilities::{CapabilityCore, GyroCapability, MotorCapability, ServoCapability};

pub struct HardwareCapabilityFactory {
    config: Arc<HardwareConfig>,
}

impl HardwareCapabilityFactory {
    pub fn new(config: Arc<HardwareConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Arc<HardwareConfig> {
        &self.config
    }

    /// Build the capability for the slot `name` declared as `class`.
    ///
    /// Always returns a capability; an unresolvable slot yields a
    /// device-less one after reporting why.
    pub fn create(
        &self,
        name: &str,
        class: DeviceClass,
        cx: Arc<RunContext>,
        sink: Arc<DiagnosticSink>,
    ) -> Arc<dyn Capability> {
        let device = self.resolve(name, class, &sink);
        let core = CapabilityCore::new(name, name, cx, sink);
        match class {
            DeviceClass::Motor => {
                let motor = match device {
                    Some(Device::Motor(m)) => Some(m),
                    _ => None,
                };
                Arc::new(MotorCapability::new(core, motor))
            }
            DeviceClass::Servo => {
                let servo = match device {
                    Some(Device::Servo(s)) => Some(s),
                    _ => None,
                };
                Arc::new(ServoCapability::new(core, servo))
            }
            DeviceClass::Gyro => {
                let gyro = match device {
                    Some(Device::Gyro(g)) => Some(g),
                    _ => None,
                };
                Arc::new(GyroCapability::new(core, gyro))
            }
        }
    }

    fn resolve(
        &self,
        name: &str,
        class: DeviceClass,
        sink: &DiagnosticSink,
    ) -> Option<Device> {
        if let Some(device) = self.config.get(name, class) {
            debug!(device = name, %class, "resolved hardware slot");
            return Some(device);
        }
        // Classless retry tells absence apart from a class mismatch.
        let message = if self.config.get_any(name).is_some() {
            format!(
                "Device \"{name}\" in the active hardware configuration is not a {class}."
            )
        } else {
            format!("Could not find device \"{name}\" in the active hardware configuration.")
        };
        sink.warn("", &message);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;

    use blockbot_hal::sim::SimConfig;

    fn harness(config: HardwareConfig) -> (HardwareCapabilityFactory, Arc<RunContext>, Arc<DiagnosticSink>) {
        (
            HardwareCapabilityFactory::new(Arc::new(config)),
            Arc::new(RunContext::new("Test", Duration::from_secs(20))),
            Arc::new(DiagnosticSink::new()),
        )
    }

    #[test]
    fn resolved_motor_is_live() {
        let config = SimConfig::new().with_motor("left_drive").build();
        let (factory, cx, sink) = harness(config);

        let cap = factory.create("left_drive", DeviceClass::Motor, cx, Arc::clone(&sink));
        cap.invoke("setPower", &[json!(0.5)]).expect("no stop pending");
        assert_eq!(cap.invoke("getPower", &[]).unwrap(), json!(0.5));
        assert!(sink.global_warning().is_none());
    }

    #[test]
    fn missing_slot_warns_and_yields_deviceless_capability() {
        let (factory, cx, sink) = harness(HardwareConfig::new());

        let cap = factory.create("left_drive", DeviceClass::Motor, cx, Arc::clone(&sink));
        assert_eq!(
            sink.global_warning().as_deref(),
            Some("Could not find device \"left_drive\" in the active hardware configuration.")
        );
        // Still callable, returns the neutral default.
        assert_eq!(cap.invoke("getPower", &[]).unwrap(), json!(0.0));
    }

    #[test]
    fn wrong_class_gets_the_mismatch_diagnostic() {
        let config = SimConfig::new().with_gyro("left_drive").build();
        let (factory, cx, sink) = harness(config);

        let _cap = factory.create("left_drive", DeviceClass::Motor, cx, Arc::clone(&sink));
        assert_eq!(
            sink.global_warning().as_deref(),
            Some("Device \"left_drive\" in the active hardware configuration is not a Motor.")
        );
    }

    #[test]
    fn gyro_capability_carries_the_release_hook() {
        use blockbot_hal::sim::SimGyro;

        let gyro = SimGyro::shared();
        let mut config = HardwareConfig::new();
        config.insert("heading", Device::Gyro(gyro.clone()));
        let (factory, cx, sink) = harness(config);

        let cap = factory.create("heading", DeviceClass::Gyro, cx, sink);
        cap.release();
        assert_eq!(gyro.stop_count(), 1);
    }
}
