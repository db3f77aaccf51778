//! [`HardwareConfig`] – the active robot configuration.
//!
//! Maps device names to live driver handles. The runtime resolves one
//! capability per configured slot at script-load time, using the
//! class-checked [`HardwareConfig::get`] first and the classless
//! [`HardwareConfig::get_any`] to distinguish "name absent entirely" from
//! "name present but wrong type" when producing diagnostics.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::gyro::Gyro;
use crate::motor::Motor;
use crate::servo::Servo;

/// The class a configured slot declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeviceClass {
    Motor,
    Servo,
    Gyro,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceClass::Motor => "Motor",
            DeviceClass::Servo => "Servo",
            DeviceClass::Gyro => "Gyro",
        };
        f.write_str(name)
    }
}

/// A live device handle tagged with its class.
#[derive(Clone)]
pub enum Device {
    Motor(Arc<dyn Motor>),
    Servo(Arc<dyn Servo>),
    Gyro(Arc<dyn Gyro>),
}

impl Device {
    pub fn class(&self) -> DeviceClass {
        match self {
            Device::Motor(_) => DeviceClass::Motor,
            Device::Servo(_) => DeviceClass::Servo,
            Device::Gyro(_) => DeviceClass::Gyro,
        }
    }
}

/// Name → device map for the active configuration.
///
/// Built once before a script runs and shared read-only thereafter.
#[derive(Default)]
pub struct HardwareConfig {
    devices: HashMap<String, Device>,
}

impl HardwareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a device under `name`. Any previously configured device with
    /// the same name is replaced.
    pub fn insert(&mut self, name: impl Into<String>, device: Device) {
        let name = name.into();
        if let Some(previous) = self.devices.insert(name.clone(), device) {
            tracing::debug!(device = %name, class = %previous.class(), "replaced configured device");
        }
    }

    /// Class-checked lookup: the device under `name`, only if it is of the
    /// requested class.
    pub fn get(&self, name: &str, class: DeviceClass) -> Option<Device> {
        self.devices
            .get(name)
            .filter(|d| d.class() == class)
            .cloned()
    }

    /// Classless lookup, used to tell a missing name apart from a name bound
    /// to a device of another class.
    pub fn get_any(&self, name: &str) -> Option<Device> {
        self.devices.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.devices.contains_key(name)
    }

    /// Declared slots as `(name, class)` pairs. Iteration order is
    /// unspecified.
    pub fn slots(&self) -> impl Iterator<Item = (&str, DeviceClass)> {
        self.devices.iter().map(|(n, d)| (n.as_str(), d.class()))
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimGyro, SimMotor};

    #[test]
    fn class_checked_lookup_filters_by_class() {
        let mut config = HardwareConfig::new();
        config.insert("left_drive", Device::Motor(SimMotor::shared()));

        assert!(config.get("left_drive", DeviceClass::Motor).is_some());
        assert!(config.get("left_drive", DeviceClass::Servo).is_none());
    }

    #[test]
    fn classless_lookup_finds_wrong_class() {
        let mut config = HardwareConfig::new();
        config.insert("heading", Device::Gyro(SimGyro::shared()));

        // Wrong class for the typed lookup, but present for the classless one.
        assert!(config.get("heading", DeviceClass::Motor).is_none());
        assert!(config.get_any("heading").is_some());
        assert!(config.get_any("missing").is_none());
    }

    #[test]
    fn slots_report_declared_classes() {
        let mut config = HardwareConfig::new();
        config.insert("left_drive", Device::Motor(SimMotor::shared()));
        config.insert("heading", Device::Gyro(SimGyro::shared()));

        let mut slots: Vec<_> = config
            .slots()
            .map(|(n, c)| (n.to_string(), c))
            .collect();
        slots.sort();
        assert_eq!(
            slots,
            vec![
                ("heading".to_string(), DeviceClass::Gyro),
                ("left_drive".to_string(), DeviceClass::Motor),
            ]
        );
    }

    #[test]
    fn reinsert_replaces_device() {
        let mut config = HardwareConfig::new();
        config.insert("slot", Device::Motor(SimMotor::shared()));
        config.insert("slot", Device::Gyro(SimGyro::shared()));
        assert_eq!(config.len(), 1);
        assert_eq!(config.get_any("slot").unwrap().class(), DeviceClass::Gyro);
    }
}
