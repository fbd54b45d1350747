//! Periodic background tasks with an explicit shutdown signal.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// A named thread that runs a tick function on a fixed interval.
///
/// The thread waits on a shutdown channel between ticks, so [`stop`]
/// returns as soon as the current tick (if any) finishes. Dropping the
/// task stops and joins it.
///
/// [`stop`]: PeriodicTask::stop
#[derive(Debug)]
pub struct PeriodicTask {
    name: String,
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawns the task.
    ///
    /// With `run_immediately` the first tick runs right away; otherwise it
    /// runs after one interval.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn<F>(
        name: impl Into<String>,
        interval: Duration,
        run_immediately: bool,
        mut tick: F,
    ) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let name = name.into();
        let (shutdown, signal) = mpsc::channel::<()>();
        let thread_name = name.clone();
        let handle = thread::Builder::new().name(name.clone()).spawn(move || {
            debug!(task = %thread_name, ?interval, "task started");
            if run_immediately {
                tick();
            }
            loop {
                match signal.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => tick(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!(task = %thread_name, "task stopped");
        })?;

        Ok(Self {
            name,
            shutdown: Some(shutdown),
            handle: Some(handle),
        })
    }

    /// Returns the thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true until the task has been stopped.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Signals the task and waits for its thread to exit.
    ///
    /// Calling `stop` more than once is a no-op.
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!(task = %self.name, "task panicked");
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.stop();
    }
}
