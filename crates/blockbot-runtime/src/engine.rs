//! Engine hosting: the [`EngineHost`] collaborator contract, the dedicated
//! [`EngineThread`] that gives it its thread affinity, and the
//! [`HostedEngine`] session wrapper enforcing single occupancy.
//!
//! The hosted script engine may only be started or cleared from one thread
//! (a GUI-affinity constraint of the real host). [`EngineThread`] is that
//! thread: a worker consuming fire-and-forget jobs over a channel. All
//! [`EngineHost`] calls made by the runtime are routed through it.
//!
//! Only one script may be loaded into the shared engine at a time.
//! [`HostedEngine`] owns that invariant as an explicit session slot:
//! [`HostedEngine::begin_session`] claims it (or reports which script is in
//! the way), [`HostedEngine::current_session`] answers the supervisor's
//! "is a script loaded" query.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, warn};

use blockbot_kernel::Capability;
use blockbot_types::BotError;

/// A work item executed on the engine thread.
pub type EngineJob = Box<dyn FnOnce() + Send>;

/// The hosted script engine, as consumed from the host collaborator.
///
/// Every method must be invoked only from the engine thread; the runtime
/// guarantees this by routing all calls through [`HostedEngine::post`] /
/// [`HostedEngine::post_blocking`].
pub trait EngineHost: Send + Sync {
    /// Load the composed script payload and start executing it. Completion
    /// is signalled back asynchronously through the script bridge
    /// capability.
    fn load_and_start(&self, payload: &str) -> Result<(), BotError>;

    /// Unload whatever script the engine holds.
    fn clear(&self) -> Result<(), BotError>;

    /// Expose `capability` to script code under `id`.
    fn add_capability(&self, id: &str, capability: Arc<dyn Capability>);

    /// Remove the capability registered under `id`.
    fn remove_capability(&self, id: &str);
}

// ────────────────────────────────────────────────────────────────────────────
// Engine thread
// ────────────────────────────────────────────────────────────────────────────

/// Dedicated worker thread executing [`EngineJob`]s in submission order.
pub struct EngineThread {
    tx: mpsc::Sender<EngineJob>,
}

impl EngineThread {
    /// Spawn the worker. The thread exits when the `EngineThread` is
    /// dropped and all pending jobs have run.
    pub fn spawn(name: &str) -> Result<Self, BotError> {
        let (tx, rx) = mpsc::channel::<EngineJob>();
        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    job();
                }
                debug!("engine thread exiting");
            })
            .map_err(|e| BotError::EngineDispatch(format!("failed to spawn engine thread: {e}")))?;
        Ok(Self { tx })
    }

    /// Fire-and-forget dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::EngineDispatch`] if the worker is gone.
    pub fn post(&self, job: EngineJob) -> Result<(), BotError> {
        self.tx
            .send(job)
            .map_err(|_| BotError::EngineDispatch("engine thread is not running".to_string()))
    }

    /// Dispatch `job` and wait until it has executed.
    pub fn post_blocking(&self, job: EngineJob) -> Result<(), BotError> {
        let (done_tx, done_rx) = mpsc::channel::<()>();
        self.post(Box::new(move || {
            job();
            let _ = done_tx.send(());
        }))?;
        done_rx.recv().map_err(|_| {
            BotError::EngineDispatch("engine thread exited before the job completed".to_string())
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Hosted engine with session management
// ────────────────────────────────────────────────────────────────────────────

/// Handle for a claimed engine session; returned by
/// [`HostedEngine::begin_session`] and consumed by
/// [`HostedEngine::end_session`].
#[derive(Debug)]
pub struct SessionHandle {
    script: String,
}

impl SessionHandle {
    pub fn script(&self) -> &str {
        &self.script
    }
}

/// The engine host plus its thread affinity and the single-occupancy
/// session slot.
pub struct HostedEngine {
    host: Arc<dyn EngineHost>,
    worker: EngineThread,
    session: Mutex<Option<String>>,
}

impl HostedEngine {
    pub fn new(host: Arc<dyn EngineHost>) -> Result<Self, BotError> {
        Ok(Self {
            host,
            worker: EngineThread::spawn("blockbot-engine")?,
            session: Mutex::new(None),
        })
    }

    pub fn host(&self) -> Arc<dyn EngineHost> {
        Arc::clone(&self.host)
    }

    /// The script currently loaded into the engine, if any.
    pub fn current_session(&self) -> Option<String> {
        self.session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Claim the engine for `script`. Atomic test-and-set: exactly one of
    /// two concurrent claimants wins.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::EngineBusy`] naming the occupying script.
    pub fn begin_session(&self, script: &str) -> Result<SessionHandle, BotError> {
        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(loaded) = session.as_ref() {
            return Err(BotError::EngineBusy {
                requested: script.to_string(),
                loaded: loaded.clone(),
            });
        }
        *session = Some(script.to_string());
        Ok(SessionHandle {
            script: script.to_string(),
        })
    }

    /// Release a session claimed by [`begin_session`][Self::begin_session].
    pub fn end_session(&self, handle: SessionHandle) {
        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        match session.as_ref() {
            Some(loaded) if *loaded == handle.script => *session = None,
            other => warn!(
                handle = %handle.script,
                loaded = ?other,
                "session handle does not match the loaded script"
            ),
        }
    }

    /// Forcibly clear the session slot after a successful engine cleanup of
    /// a session this runtime did not claim.
    pub(crate) fn clear_session(&self) {
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Fire-and-forget dispatch to the engine thread.
    pub fn post(&self, job: EngineJob) -> Result<(), BotError> {
        self.worker.post(job)
    }

    /// Synchronous dispatch to the engine thread.
    pub fn post_blocking(&self, job: EngineJob) -> Result<(), BotError> {
        self.worker.post_blocking(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullHost;

    impl EngineHost for NullHost {
        fn load_and_start(&self, _payload: &str) -> Result<(), BotError> {
            Ok(())
        }
        fn clear(&self) -> Result<(), BotError> {
            Ok(())
        }
        fn add_capability(&self, _id: &str, _capability: Arc<dyn Capability>) {}
        fn remove_capability(&self, _id: &str) {}
    }

    fn hosted() -> HostedEngine {
        HostedEngine::new(Arc::new(NullHost)).expect("engine thread spawns")
    }

    #[test]
    fn jobs_run_in_submission_order() {
        let engine = hosted();
        let counter = Arc::new(AtomicUsize::new(0));
        for expected in 0..10 {
            let counter = Arc::clone(&counter);
            engine
                .post(Box::new(move || {
                    let seen = counter.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(seen, expected);
                }))
                .expect("post succeeds");
        }
        // A blocking job flushes everything posted before it.
        engine.post_blocking(Box::new(|| {})).expect("flush");
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn post_blocking_waits_for_job() {
        let engine = hosted();
        let ran = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&ran);
        engine
            .post_blocking(Box::new(move || {
                flag.store(1, Ordering::SeqCst);
            }))
            .expect("blocking post");
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn begin_session_claims_and_reports_busy() {
        let engine = hosted();
        assert!(engine.current_session().is_none());

        let handle = engine.begin_session("AutoDrive").expect("engine free");
        assert_eq!(engine.current_session().as_deref(), Some("AutoDrive"));

        let busy = engine.begin_session("TeleOp");
        match busy {
            Err(BotError::EngineBusy { requested, loaded }) => {
                assert_eq!(requested, "TeleOp");
                assert_eq!(loaded, "AutoDrive");
            }
            other => panic!("expected EngineBusy, got {other:?}"),
        }

        engine.end_session(handle);
        assert!(engine.current_session().is_none());
    }

    #[test]
    fn end_session_with_stale_handle_keeps_current() {
        let engine = hosted();
        let stale = engine.begin_session("First").expect("engine free");
        engine.clear_session();
        let _current = engine.begin_session("Second").expect("engine free");

        engine.end_session(stale);
        // The mismatched handle must not evict the live session.
        assert_eq!(engine.current_session().as_deref(), Some("Second"));
    }

    #[test]
    fn clear_session_frees_the_slot() {
        let engine = hosted();
        let _ = engine.begin_session("Stuck").expect("engine free");
        engine.clear_session();
        assert!(engine.begin_session("Next").is_ok());
    }
}
