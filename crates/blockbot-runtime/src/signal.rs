//! The "script finished" monitor shared between the control thread and the
//! engine callback thread.

use std::sync::{Condvar, Mutex};

/// One-shot completion signal. The control thread blocks in
/// [`FinishedSignal::wait`]; the script bridge calls
/// [`FinishedSignal::signal`] from the callback thread when the script ends,
/// normally or abnormally.
#[derive(Default)]
pub struct FinishedSignal {
    done: Mutex<bool>,
    cv: Condvar,
}

impl FinishedSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) {
        let mut done = self.done.lock().unwrap_or_else(|e| e.into_inner());
        *done = true;
        self.cv.notify_all();
    }

    /// Block until [`signal`][Self::signal] has been called. Safe against
    /// spurious wakeups; stop notifications do not abandon the wait — only
    /// the cooperative watchdog inside capability calls can cut a run short.
    pub fn wait(&self) {
        let mut done = self.done.lock().unwrap_or_else(|e| e.into_inner());
        while !*done {
            done = self.cv.wait(done).unwrap_or_else(|e| e.into_inner());
        }
    }

    pub fn is_signaled(&self) -> bool {
        *self.done.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn wait_returns_after_signal_from_other_thread() {
        let signal = Arc::new(FinishedSignal::new());
        let signaler = {
            let signal = Arc::clone(&signal);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                signal.signal();
            })
        };
        signal.wait();
        assert!(signal.is_signaled());
        signaler.join().expect("signaler panicked");
    }

    #[test]
    fn wait_after_signal_returns_immediately() {
        let signal = FinishedSignal::new();
        signal.signal();
        signal.wait();
    }
}
