//! Status poller
//!
//! One polling task at a time. Every call to [`Poller::set_deployments`]
//! bumps the generation, aborts the previous task and spawns a new one for
//! the new list, all under the same lock.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::sync::fetcher::StatusFetcher;

/// Poller options
#[derive(Debug, Clone)]
pub struct Options {
    /// Time between two rounds of status fetches
    pub interval: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15),
        }
    }
}

/// Owns the polling task for the current deployments list
pub struct Poller {
    options: Options,
    fetcher: Arc<StatusFetcher>,
    generation: AtomicU64,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Poller {
    pub fn new(options: Options, fetcher: Arc<StatusFetcher>) -> Self {
        Self {
            options,
            fetcher,
            generation: AtomicU64::new(0),
            task: Mutex::new(None),
        }
    }

    /// Current generation; bumped by every list change and teardown
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether a polling task is scheduled
    pub fn is_running(&self) -> bool {
        let task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        task.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Poll `ids`: fetch all now, then again every interval. Replaces any
    /// previously scheduled polling. Must be called inside a tokio runtime.
    pub fn set_deployments(&self, ids: Vec<String>) -> u64 {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = task.take() {
            previous.abort();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if ids.is_empty() {
            debug!("Poller generation {} has no deployments", generation);
            return generation;
        }

        info!(
            "Polling {} deployment(s) every {:?} (generation {})",
            ids.len(),
            self.options.interval,
            generation
        );
        let options = self.options.clone();
        let fetcher = self.fetcher.clone();
        *task = Some(tokio::spawn(async move {
            run(&options, fetcher, ids, generation, tokio::time::sleep).await;
        }));
        generation
    }

    /// Cancel polling. Fetches already sent still land in the cache.
    pub fn stop(&self) {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = task.take() {
            previous.abort();
            self.generation.fetch_add(1, Ordering::SeqCst);
            debug!("Poller stopped");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        let task = self.task.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = task.take() {
            handle.abort();
        }
    }
}

/// Polling loop for one generation. Runs until its task is aborted.
pub async fn run<S, F>(
    options: &Options,
    fetcher: Arc<StatusFetcher>,
    ids: Vec<String>,
    generation: u64,
    sleep_fn: S,
) where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    loop {
        debug!("Poll round for generation {}", generation);
        for id in &ids {
            let fetcher = fetcher.clone();
            let id = id.clone();
            tokio::spawn(async move {
                fetcher.fetch_status(&id).await;
            });
        }
        sleep_fn(options.interval).await;
    }
}
