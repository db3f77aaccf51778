use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The visual shape of a script block. Each capability operation reports its
/// kind when it is entered, so diagnostics can quote the block the way the
/// user sees it in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Blocks with a fixed, pre-composed label (e.g. the script bridge).
    Special,
    /// Event handler entry points ("to runScript").
    Event,
    /// Constructor blocks ("new Timer").
    Create,
    /// Property setters ("set motor.Power to").
    Setter,
    /// Property getters ("motor.Power").
    Getter,
    /// Method calls ("call gyro.calibrate").
    Function,
}

/// The most recently *entered* script operation. Single-writer-at-a-time;
/// carries no control-flow meaning — it exists only so diagnostics can name
/// the offending block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockContext {
    pub kind: BlockKind,
    pub first_name: String,
    pub last_name: String,
}

impl BlockContext {
    pub fn new(kind: BlockKind, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            kind,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// The synthetic marker installed before any real block executes, so the
    /// very first diagnostic of a run still has something to quote.
    pub fn entering_run() -> Self {
        Self::new(BlockKind::Event, "", "runScript")
    }

    /// Compose the exact label phrasing used by capability diagnostics.
    ///
    /// A pure function of the context; never a source of state mutation.
    pub fn full_label(&self) -> String {
        match self.kind {
            BlockKind::Special => format!("{}{}", self.first_name, self.last_name),
            BlockKind::Event => format!("to {}{}", self.first_name, self.last_name),
            BlockKind::Create => format!("new {}", self.first_name),
            BlockKind::Setter => format!("set {}{} to", self.first_name, self.last_name),
            BlockKind::Getter => format!("{}{}", self.first_name, self.last_name),
            BlockKind::Function => format!("call {}{}", self.first_name, self.last_name),
        }
    }
}

/// Lifecycle phase of one script execution.
///
/// Stop requests are *not* a phase: they are an overlay flag recorded by the
/// run context, and execution continues until `Finished` is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionPhase {
    Idle,
    Loading,
    Running,
    Finished,
}

/// Severity of a reported diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

/// One structured diagnostic emitted while a script runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    /// Label of the block that was executing when the diagnostic was raised.
    pub block_label: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, block_label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            severity,
            block_label: block_label.into(),
            message: message.into(),
        }
    }
}

/// Global error type spanning engine handoff, script faults, and the
/// cooperative forced-stop path.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum BotError {
    /// The cooperative watchdog escalated a pending stop request.
    #[error("Stopping script \"{script}\" by force.")]
    ForcedStop { script: String },

    /// An unexpected failure escaped a capability operation.
    #[error("Fatal error occurred while executing the block labeled \"{label}\". {details}")]
    FatalBlock { label: String, details: String },

    /// The engine host is still occupied by a previous script.
    #[error(
        "Unable to start running the script \"{requested}\". The engine is still loaded \
         with the previous script \"{loaded}\". Please restart the engine host."
    )]
    EngineBusy { requested: String, loaded: String },

    /// The script source could not be fetched.
    #[error("Could not load script \"{script}\": {details}")]
    ScriptLoad { script: String, details: String },

    /// Dispatching work to the engine thread failed.
    #[error("Engine dispatch failed: {0}")]
    EngineDispatch(String),
}
