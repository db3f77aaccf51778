//! [`Capability`] – the uniform contract for script-callable objects.
//!
//! Every object a script can reach implements this one trait. The engine
//! resolves capabilities by string identifier through the
//! [`CapabilityRegistry`][crate::registry::CapabilityRegistry] and invokes
//! operations by name with loosely-typed JSON arguments — the natural shape
//! of a script-to-native bridge.
//!
//! # Failure semantics
//!
//! Expected user errors (a wrong argument, a missing device) must **never**
//! surface as an `Err` from [`Capability::invoke`]: implementations report a
//! warning and return a safe default value instead, so a misassembled script
//! degrades rather than crashes. Only the cooperative forced-stop escalation
//! and truly unexpected conditions return an error, which the runtime
//! captures into the execution's fatal signal.

use serde_json::Value;

use blockbot_types::BotError;

/// A named object exposing domain operations to script code.
pub trait Capability: Send + Sync {
    /// The identifier script code uses to reach this capability.
    fn identifier(&self) -> &str;

    /// The first half of block labels for this capability's operations,
    /// used only to compose diagnostics.
    fn block_prefix(&self) -> &str;

    /// Invoke the operation named `op` with loosely-typed arguments.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::ForcedStop`] when a pending stop request has
    /// exceeded its threshold, and [`BotError::FatalBlock`] for unexpected
    /// catastrophic conditions. All other failures degrade to a default
    /// return value with a reported warning.
    fn invoke(&self, op: &str, args: &[Value]) -> Result<Value, BotError>;

    /// Release any live resources this capability holds (e.g. stop a sensor
    /// stream). Called exactly once by the registry drain; implementations
    /// should nonetheless tolerate repeated calls. Default is a no-op.
    fn release(&self) {}
}
