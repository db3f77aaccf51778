//! [`ScriptRunner`] – one script execution from load to teardown.
//!
//! The control thread calls [`ScriptRunner::run`] and blocks until the
//! script reports completion (or the cooperative watchdog aborts it). The
//! runner owns the setup/teardown choreography:
//!
//! 1. build and install a fresh [`RunContext`], so stop requests have a
//!    watchdog to arm from the very start of setup,
//! 2. reclaim the engine if a previous script is still loaded,
//! 3. claim the single-occupancy session slot,
//! 4. register system capabilities, then one capability per hardware slot,
//! 5. hand everything to the engine thread and start the script,
//! 6. wait for the finished signal,
//! 7. tear down: unregister, clear the engine, release every capability,
//! 8. rethrow a captured fatal error or publish a captured fatal message.
//!
//! Stop requests are cooperative: [`ScriptRunner::request_stop`] arms the
//! watchdog in the current run's context, and the next capability call past
//! the deadline aborts the script.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use blockbot_hal::HardwareConfig;
use blockbot_kernel::{CapabilityRegistry, DiagnosticSink, RunContext};
use blockbot_types::{BotError, ExecutionPhase};

use crate::capabilities::{
    CapabilityCore, ElapsedTimeCapability, ScriptBridge, TelemetryCapability,
};
use crate::engine::{HostedEngine, SessionHandle};
use crate::factory::HardwareCapabilityFactory;
use crate::loader::{compose_payload, ScriptLoader};
use crate::signal::FinishedSignal;

/// Identifier of the lifecycle bridge capability.
pub const SCRIPT_BRIDGE_ID: &str = "scriptBridge";
/// Identifier of the built-in stopwatch capability.
pub const ELAPSED_TIME_ID: &str = "elapsedTime";
/// Identifier of the built-in telemetry capability.
pub const TELEMETRY_ID: &str = "telemetry";

/// Tunables for one runner instance.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// How long a stop request may go unanswered before the next capability
    /// call aborts the script by force.
    pub force_stop_after: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            force_stop_after: Duration::from_secs(20),
        }
    }
}

/// Drives one script execution at a time against a hosted engine.
pub struct ScriptRunner {
    engine: Arc<HostedEngine>,
    hardware: Arc<HardwareConfig>,
    loader: Arc<dyn ScriptLoader>,
    sink: Arc<DiagnosticSink>,
    config: RunnerConfig,
    current: Mutex<Option<Arc<RunContext>>>,
}

impl ScriptRunner {
    pub fn new(
        engine: Arc<HostedEngine>,
        hardware: Arc<HardwareConfig>,
        loader: Arc<dyn ScriptLoader>,
        sink: Arc<DiagnosticSink>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            engine,
            hardware,
            loader,
            sink,
            config,
            current: Mutex::new(None),
        }
    }

    /// Whether a script currently occupies the engine.
    pub fn is_script_loaded(&self) -> bool {
        self.engine.current_session().is_some()
    }

    /// The phase of the run in progress, if any.
    pub fn current_phase(&self) -> Option<ExecutionPhase> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|cx| cx.phase())
    }

    /// Arm the cooperative stop watchdog for the run in progress. The first
    /// call per run wins; without a run in progress this is a no-op.
    pub fn request_stop(&self) {
        let cx = self
            .current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match cx {
            Some(cx) => cx.request_stop(),
            None => debug!("stop requested with no script running"),
        }
    }

    /// Execute `script` to completion.
    ///
    /// # Errors
    ///
    /// - [`BotError::EngineBusy`] when a previous script occupies the engine
    ///   and could not be cleared,
    /// - [`BotError::ScriptLoad`] when the source cannot be fetched,
    /// - [`BotError::ForcedStop`] when the watchdog aborted the run,
    /// - any fatal error captured while the script ran.
    ///
    /// An engine-side rejection of the payload does not fail the run: it is
    /// captured as a fatal message and published after teardown.
    pub fn run(&self, script: &str) -> Result<(), BotError> {
        // The context is installed before the engine is touched: a stop
        // request arriving while setup is still reclaiming the engine must
        // land in this run's watchdog.
        let cx = Arc::new(RunContext::new(script, self.config.force_stop_after));
        cx.set_phase(ExecutionPhase::Loading);
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::clone(&cx));

        let outcome = self.claim_and_execute(script, &cx);

        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = None;
        outcome
    }

    fn claim_and_execute(&self, script: &str, cx: &Arc<RunContext>) -> Result<(), BotError> {
        self.reclaim_engine(script)?;
        let session = self.engine.begin_session(script)?;
        info!(script, "starting script run");
        self.execute(script, cx, session)
    }

    // ── Lifecycle stages ─────────────────────────────────────────────────

    /// If the engine still holds an earlier script, clear it before claiming
    /// a new session. A clear that fails leaves the session slot occupied so
    /// the conflict is reported instead of papered over.
    fn reclaim_engine(&self, script: &str) -> Result<(), BotError> {
        let Some(loaded) = self.engine.current_session() else {
            return Ok(());
        };
        info!(loaded = %loaded, "engine occupied; clearing previous script");

        let host = self.engine.host();
        let cleared = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cleared);
        self.engine.post_blocking(Box::new(move || {
            match host.clear() {
                Ok(()) => flag.store(true, Ordering::SeqCst),
                Err(e) => warn!(error = %e, "failed to clear previous script"),
            }
        }))?;

        if cleared.load(Ordering::SeqCst) {
            self.engine.clear_session();
            Ok(())
        } else {
            Err(BotError::EngineBusy {
                requested: script.to_string(),
                loaded,
            })
        }
    }

    fn execute(
        &self,
        script: &str,
        cx: &Arc<RunContext>,
        session: SessionHandle,
    ) -> Result<(), BotError> {
        let source = match self.loader.fetch(script) {
            Ok(source) => source,
            Err(e) => {
                self.engine.end_session(session);
                return Err(e);
            }
        };
        let payload = compose_payload(&source);

        let registry = CapabilityRegistry::new();
        let finished = Arc::new(FinishedSignal::new());
        self.register_capabilities(&registry, cx, &finished);

        self.start_script(&registry, payload, cx, &finished);

        finished.wait();
        cx.set_phase(ExecutionPhase::Finished);
        self.teardown(&registry, session);

        // A captured error is the run's result; only a message-only fatal
        // is published through the sink.
        if let Some(err) = cx.fatal_error() {
            return Err(err);
        }
        if let Some(message) = cx.fatal_message() {
            self.sink.set_global_error(&message);
        }
        Ok(())
    }

    /// System capabilities first; a hardware slot colliding with a built-in
    /// identifier is dropped by the registry's keep-first rule.
    fn register_capabilities(
        &self,
        registry: &CapabilityRegistry,
        cx: &Arc<RunContext>,
        finished: &Arc<FinishedSignal>,
    ) {
        registry.register_system(
            SCRIPT_BRIDGE_ID,
            Arc::new(ScriptBridge::new(Arc::clone(cx), Arc::clone(finished))),
        );
        registry.register_system(
            ELAPSED_TIME_ID,
            Arc::new(ElapsedTimeCapability::new(CapabilityCore::new(
                ELAPSED_TIME_ID,
                "ElapsedTime",
                Arc::clone(cx),
                Arc::clone(&self.sink),
            ))),
        );
        registry.register_system(
            TELEMETRY_ID,
            Arc::new(TelemetryCapability::new(CapabilityCore::new(
                TELEMETRY_ID,
                "Telemetry",
                Arc::clone(cx),
                Arc::clone(&self.sink),
            ))),
        );

        let factory = HardwareCapabilityFactory::new(Arc::clone(&self.hardware));
        for (name, class) in self.hardware.slots() {
            let capability =
                factory.create(name, class, Arc::clone(cx), Arc::clone(&self.sink));
            registry.register_hardware(name, capability);
        }
        debug!(capabilities = registry.len(), "capabilities registered");
    }

    /// On the engine thread: expose every registered capability, then load
    /// and start the payload. Dispatched fire-and-forget; a failure on
    /// either side is logged, captured as a fatal message, and the finished
    /// signal is fired in the script's stead so the control thread's wait
    /// still terminates.
    fn start_script(
        &self,
        registry: &CapabilityRegistry,
        payload: String,
        cx: &Arc<RunContext>,
        finished: &Arc<FinishedSignal>,
    ) {
        let host = self.engine.host();
        let entries = registry.entries();
        let job_cx = Arc::clone(cx);
        let job_finished = Arc::clone(finished);
        let posted = self.engine.post(Box::new(move || {
            for (id, capability) in &entries {
                host.add_capability(id, Arc::clone(capability));
            }
            if let Err(e) = host.load_and_start(&payload) {
                warn!(error = %e, "engine rejected the script payload");
                job_cx.record_fatal_message(e.to_string());
                job_finished.signal();
            }
        }));
        if let Err(e) = posted {
            warn!(error = %e, "could not dispatch script load to the engine thread");
            cx.record_fatal_message(e.to_string());
            finished.signal();
        }
    }

    /// Unregister and clear on the engine thread, then release every
    /// capability on the control thread. The session ends only when the
    /// engine actually cleared; otherwise the slot stays occupied and the
    /// next run retries the cleanup.
    fn teardown(&self, registry: &CapabilityRegistry, session: SessionHandle) {
        let host = self.engine.host();
        let identifiers = registry.identifiers();
        let cleared = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cleared);
        let posted = self.engine.post_blocking(Box::new(move || {
            for id in &identifiers {
                host.remove_capability(id);
            }
            match host.clear() {
                Ok(()) => flag.store(true, Ordering::SeqCst),
                Err(e) => warn!(error = %e, "engine failed to clear during teardown"),
            }
        }));
        if let Err(e) = posted {
            warn!(error = %e, "could not dispatch teardown to the engine thread");
        }

        registry.drain_and_close();

        if cleared.load(Ordering::SeqCst) {
            self.engine.end_session(session);
        } else {
            warn!(
                script = session.script(),
                "leaving session occupied after failed teardown"
            );
        }
    }
}
