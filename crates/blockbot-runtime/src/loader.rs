//! Script source loading and payload composition.
//!
//! [`ScriptLoader`] abstracts where script source comes from (disk, an
//! editor session, a test fixture). [`compose_payload`] wraps the fetched
//! source in the bridge harness so the engine reports lifecycle events back
//! through the `scriptBridge` capability.

use std::collections::HashMap;

use tracing::debug;

use blockbot_types::BotError;

/// Source of script code, keyed by script name.
pub trait ScriptLoader: Send + Sync {
    /// Fetch the source for `script`.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::ScriptLoad`] when the script cannot be produced.
    fn fetch(&self, script: &str) -> Result<String, BotError>;
}

/// In-memory loader for tests and embedded scripts.
#[derive(Default)]
pub struct StaticScriptLoader {
    scripts: HashMap<String, String>,
}

impl StaticScriptLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.scripts.insert(name.into(), source.into());
        self
    }
}

impl ScriptLoader for StaticScriptLoader {
    fn fetch(&self, script: &str) -> Result<String, BotError> {
        self.scripts
            .get(script)
            .cloned()
            .ok_or_else(|| BotError::ScriptLoad {
                script: script.to_string(),
                details: "no such script".to_string(),
            })
    }
}

/// Wrap raw script source in the lifecycle harness.
///
/// The harness announces the start, routes any uncaught failure through
/// `caughtException`, and always reports completion, so the control thread's
/// wait terminates whether the script succeeds or dies.
pub fn compose_payload(source: &str) -> String {
    debug!(bytes = source.len(), "composing script payload");
    format!(
        "scriptBridge.scriptStarting();\n\
         try {{\n\
         {source}\n\
         }} catch (e) {{\n\
         scriptBridge.caughtException(String(e));\n\
         }}\n\
         scriptBridge.scriptFinished();\n"
    )
}
