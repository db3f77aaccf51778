//! `blockbot-kernel` – Safety & Bookkeeping
//!
//! The layer between the script engine and the rest of the runtime. It does
//! not execute scripts; it keeps one execution's shared state consistent and
//! race-free.
//!
//! # Modules
//!
//! - [`capability`] – [`Capability`][capability::Capability]: the uniform
//!   contract every script-callable object implements, resolved by string
//!   key at call time.
//! - [`registry`] – [`CapabilityRegistry`][registry::CapabilityRegistry]:
//!   the request-scoped name → capability table shared between the control
//!   thread and the engine callback threads.
//! - [`run_context`] – [`RunContext`][run_context::RunContext]: one
//!   execution's phase, block context, first-wins fatal signal, and
//!   cooperative stop watchdog.
//! - [`diagnostics`] – [`DiagnosticSink`][diagnostics::DiagnosticSink]:
//!   the shared warning/error reporting channel.

pub mod capability;
pub mod diagnostics;
pub mod registry;
pub mod run_context;

pub use capability::Capability;
pub use diagnostics::DiagnosticSink;
pub use registry::CapabilityRegistry;
pub use run_context::RunContext;
