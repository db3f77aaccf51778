//! `blockbot-runtime` – Script Orchestration
//!
//! Owns one script execution from load to teardown: the control thread calls
//! [`ScriptRunner::run`][runner::ScriptRunner::run], capabilities are built
//! and registered, the script is handed to the engine thread, and script code
//! calls back into capabilities until it signals completion (or the
//! cooperative watchdog aborts it).
//!
//! # Modules
//!
//! - [`engine`] – [`EngineHost`][engine::EngineHost] (the consumed
//!   engine-host collaborator), [`EngineThread`][engine::EngineThread]
//!   (the GUI-affined worker), and [`HostedEngine`][engine::HostedEngine]
//!   (single-occupancy session management).
//! - [`capabilities`] – the concrete script-callable capabilities and the
//!   [`CapabilityCore`][capabilities::CapabilityCore] validation helpers
//!   they share.
//! - [`factory`] – [`HardwareCapabilityFactory`][factory::HardwareCapabilityFactory]:
//!   builds one capability per configured device slot, degrading instead of
//!   failing when a slot cannot be resolved.
//! - [`loader`] – [`ScriptLoader`][loader::ScriptLoader] and the bridge
//!   harness wrapped around fetched script source.
//! - [`runner`] – [`ScriptRunner`][runner::ScriptRunner]: the lifecycle
//!   state machine.
//! - [`telemetry`] – tracing-subscriber initialisation.

pub mod capabilities;
pub mod engine;
pub mod factory;
pub mod loader;
pub mod runner;
mod signal;
pub mod telemetry;

pub use engine::{EngineHost, HostedEngine};
pub use factory::HardwareCapabilityFactory;
pub use loader::{ScriptLoader, StaticScriptLoader};
pub use runner::{RunnerConfig, ScriptRunner, ELAPSED_TIME_ID, SCRIPT_BRIDGE_ID, TELEMETRY_ID};
