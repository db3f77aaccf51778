//! [`CapabilityCore`] – identity, stop-check forwarding, and argument
//! validation shared by every capability implementation.
//!
//! Script-side arguments arrive as loosely-typed [`serde_json::Value`]s. The
//! validators attempt to coerce them into the expected domain type; on
//! failure they emit the structured "wrong block plugged into socket"
//! warning through the diagnostic sink and return `None`, and the calling
//! operation must then short-circuit to a safe default rather than erroring.

use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

use blockbot_kernel::{DiagnosticSink, RunContext};
use blockbot_types::{BlockKind, BotError};

/// Shared plumbing embedded in every capability.
pub struct CapabilityCore {
    identifier: String,
    block_prefix: String,
    cx: Arc<RunContext>,
    sink: Arc<DiagnosticSink>,
}

impl CapabilityCore {
    pub fn new(
        identifier: impl Into<String>,
        block_prefix: impl Into<String>,
        cx: Arc<RunContext>,
        sink: Arc<DiagnosticSink>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            block_prefix: block_prefix.into(),
            cx,
            sink,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn block_prefix(&self) -> &str {
        &self.block_prefix
    }

    pub fn context(&self) -> &Arc<RunContext> {
        &self.cx
    }

    pub fn sink(&self) -> &Arc<DiagnosticSink> {
        &self.sink
    }

    /// Record entry into an operation of this capability and run the
    /// cooperative stop check. Must be the first thing every operation does.
    pub fn begin(&self, kind: BlockKind, last_name: &str) -> Result<(), BotError> {
        self.cx.begin_block(kind, &self.block_prefix, last_name)
    }

    /// Like [`begin`][Self::begin] with an overridden first name, for
    /// operations whose block label does not start with the capability's
    /// usual prefix.
    pub fn begin_named(
        &self,
        kind: BlockKind,
        first_override: &str,
        last_name: &str,
    ) -> Result<(), BotError> {
        self.cx.begin_block(kind, first_override, last_name)
    }

    // ── Argument validation ──────────────────────────────────────────────

    /// Coerce argument `idx` to a number.
    pub fn arg_f64(&self, args: &[Value], idx: usize, socket: &str) -> Option<f64> {
        match args.get(idx).and_then(Value::as_f64) {
            Some(v) => Some(v),
            None => {
                self.report_invalid_arg(socket, "Number");
                None
            }
        }
    }

    /// Coerce argument `idx` to a string.
    pub fn arg_str(&self, args: &[Value], idx: usize, socket: &str) -> Option<String> {
        match args.get(idx).and_then(Value::as_str) {
            Some(v) => Some(v.to_string()),
            None => {
                self.report_invalid_arg(socket, "Text");
                None
            }
        }
    }

    /// Coerce argument `idx` to a boolean.
    pub fn arg_bool(&self, args: &[Value], idx: usize, socket: &str) -> Option<bool> {
        match args.get(idx).and_then(Value::as_bool) {
            Some(v) => Some(v),
            None => {
                self.report_invalid_arg(socket, "Boolean");
                None
            }
        }
    }

    /// Coerce argument `idx` to an enum value via its `FromStr`, which
    /// accepts the exact variant name and an upper-cased retry.
    pub fn arg_enum<T: FromStr>(
        &self,
        args: &[Value],
        idx: usize,
        socket: &str,
        expected: &str,
    ) -> Option<T> {
        let Some(raw) = args.get(idx).and_then(Value::as_str) else {
            self.report_invalid_arg(socket, expected);
            return None;
        };
        match raw.parse::<T>() {
            Ok(v) => Some(v),
            Err(_) => {
                self.report_invalid_arg(socket, expected);
                None
            }
        }
    }

    /// Render any argument for display (telemetry payloads take anything).
    pub fn arg_display(&self, args: &[Value], idx: usize) -> String {
        match args.get(idx) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    // ── Diagnostics ──────────────────────────────────────────────────────

    /// Report that the wrong kind of block is plugged into `socket`.
    pub fn report_invalid_arg(&self, socket: &str, expected: &str) {
        let label = self.cx.full_block_label();
        let message = if socket.is_empty() {
            format!(
                "Incorrect block plugged into a socket of the block labeled \"{label}\". \
                 Expected {expected}."
            )
        } else {
            format!(
                "Incorrect block plugged into the {socket} socket of the block labeled \
                 \"{label}\". Expected {expected}."
            )
        };
        self.sink.warn(&label, &message);
    }

    /// Report a recoverable problem in the currently executing block.
    pub fn report_warning(&self, message: &str) {
        let label = self.cx.full_block_label();
        let full = format!("Warning while executing the block labeled \"{label}\". {message}");
        self.sink.warn(&label, &full);
    }

    /// Report an operation name this capability does not expose. Callers
    /// return a null value afterwards; a miswired script degrades, it does
    /// not crash.
    pub fn report_unknown_op(&self, op: &str) {
        self.report_warning(&format!(
            "\"{}\" has no operation named \"{op}\".",
            self.identifier
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;

    use blockbot_hal::MotorDirection;

    fn core() -> CapabilityCore {
        let cx = Arc::new(RunContext::new("Test", Duration::from_secs(20)));
        let sink = Arc::new(DiagnosticSink::new());
        CapabilityCore::new("left_drive", "left_drive", cx, sink)
    }

    #[test]
    fn begin_updates_block_label() {
        let core = core();
        core.begin(BlockKind::Setter, ".Power").expect("no stop pending");
        assert_eq!(core.context().full_block_label(), "set left_drive.Power to");
    }

    #[test]
    fn arg_f64_accepts_ints_and_floats() {
        let core = core();
        assert_eq!(core.arg_f64(&[json!(1)], 0, "power"), Some(1.0));
        assert_eq!(core.arg_f64(&[json!(0.25)], 0, "power"), Some(0.25));
        assert!(core.sink().global_warning().is_none());
    }

    #[test]
    fn arg_f64_rejects_text_with_socket_warning() {
        let core = core();
        core.begin(BlockKind::Setter, ".Power").expect("no stop pending");
        assert_eq!(core.arg_f64(&[json!("fast")], 0, "power"), None);

        let warning = core.sink().global_warning().expect("warning reported");
        assert_eq!(
            warning,
            "Incorrect block plugged into the power socket of the block labeled \
             \"set left_drive.Power to\". Expected Number."
        );
    }

    #[test]
    fn arg_missing_is_invalid() {
        let core = core();
        assert_eq!(core.arg_f64(&[], 0, "power"), None);
        assert!(core.sink().global_warning().is_some());
    }

    #[test]
    fn arg_enum_coerces_loose_case() {
        let core = core();
        let d: Option<MotorDirection> = core.arg_enum(&[json!("reverse")], 0, "", "Direction");
        assert_eq!(d, Some(MotorDirection::Reverse));
        assert!(core.sink().global_warning().is_none());
    }

    #[test]
    fn arg_enum_unknown_variant_warns_without_socket_name() {
        let core = core();
        core.begin(BlockKind::Setter, ".Direction").expect("no stop pending");
        let d: Option<MotorDirection> = core.arg_enum(&[json!("sideways")], 0, "", "Direction");
        assert_eq!(d, None);

        let warning = core.sink().global_warning().expect("warning reported");
        assert!(warning.starts_with("Incorrect block plugged into a socket"));
        assert!(warning.contains("Expected Direction."));
    }

    #[test]
    fn arg_display_renders_any_value() {
        let core = core();
        assert_eq!(core.arg_display(&[json!("text")], 0), "text");
        assert_eq!(core.arg_display(&[json!(3.5)], 0), "3.5");
        assert_eq!(core.arg_display(&[json!(true)], 0), "true");
        assert_eq!(core.arg_display(&[], 0), "");
    }

    #[test]
    fn report_warning_quotes_current_block() {
        let core = core();
        core.begin(BlockKind::Getter, ".Power").expect("no stop pending");
        core.report_warning("Something odd.");
        let warning = core.sink().global_warning().expect("warning reported");
        assert_eq!(
            warning,
            "Warning while executing the block labeled \"left_drive.Power\". Something odd."
        );
    }
}
