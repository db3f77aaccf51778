//! [`CapabilityRegistry`] – request-scoped name → capability table.
//!
//! One registry exists per script execution. The control thread writes to it
//! during setup and drains it during teardown; the engine callback threads
//! read (and, for the bridge, write) while the script runs. The registry owns
//! its own lock, so callers never synchronise externally.
//!
//! Invariant: empty before loading begins, empty again once teardown
//! completes; every entry present at any instant maps a unique identifier to
//! exactly one live capability.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::capability::Capability;

/// Thread-safe bookkeeping of which capability answers to which identifier,
/// for the current execution only.
#[derive(Default)]
pub struct CapabilityRegistry {
    entries: RwLock<HashMap<String, Arc<dyn Capability>>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hardware-backed capability. If `id` is already taken the
    /// first registration is kept and the new one is dropped with a warning.
    pub fn register_hardware(&self, id: &str, capability: Arc<dyn Capability>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.contains_key(id) {
            warn!(
                identifier = id,
                "capability identifier already registered; ignoring duplicate hardware capability"
            );
            return;
        }
        entries.insert(id.to_string(), capability);
    }

    /// Register a fixed system capability, overwriting any previous entry
    /// under the same identifier.
    pub fn register_system(&self, id: &str, capability: Arc<dyn Capability>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(id.to_string(), capability);
    }

    /// O(1) lookup. Callers treat `None` as a configuration error, report it
    /// once, and degrade to a no-op.
    pub fn lookup(&self, id: &str) -> Option<Arc<dyn Capability>> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    /// Snapshot of all registered identifiers.
    pub fn identifiers(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    /// Snapshot of all entries as `(identifier, capability)` pairs.
    pub fn entries(&self) -> Vec<(String, Arc<dyn Capability>)> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(id, cap)| (id.clone(), Arc::clone(cap)))
            .collect()
    }

    /// Release every capability exactly once and leave the registry empty.
    pub fn drain_and_close(&self) {
        let drained: Vec<(String, Arc<dyn Capability>)> = {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            entries.drain().collect()
        };
        for (id, capability) in drained {
            tracing::debug!(identifier = %id, "releasing capability");
            capability.release();
        }
        let remaining = self.len();
        if remaining != 0 {
            warn!(remaining, "capability registry not empty after drain");
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
