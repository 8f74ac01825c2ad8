//! # sixthsense-adapter-virtual
//!
//! Simulated oven that speaks the attribute protocol, for testing and
//! demonstration.
//!
//! ## Behaviour
//!
//! | Command | Effect |
//! |---------|--------|
//! | cavity `Start` | cavity preheats, then cooks once it reaches its target |
//! | cavity `Cancel` | cycle attributes return to `0` |
//! | cavity `Modify` | running cycle picks up the new cook time; rejected when idle |
//! | kitchen timer `Start` / `Cancel` | timer runs down from its set time / returns to standby |
//! | any other attribute | stored as written |
//!
//! Remaining cook and timer seconds are counted exactly but only published
//! every [`VirtualOvenConfig::report_interval_secs`], like the real appliance.
//! Every accepted write and every [`VirtualOven::advance`] echoes the full
//! attribute state back through the [`AttributeFeed`].
//!
//! ## Dependency rule
//!
//! Depends on `sixthsense-app` (port traits) and `sixthsense-domain` only.

pub mod config;
pub mod error;
mod simulation;

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use sixthsense_app::ports::{ApplianceTransport, AttributeFeed};
use sixthsense_domain::attribute::AttributeMap;
use sixthsense_domain::error::SixthSenseError;
use tokio::task::JoinHandle;

pub use config::VirtualOvenConfig;
pub use error::VirtualError;

use simulation::Simulation;

/// Accepted writes kept for [`VirtualOven::writes`].
const WRITE_LOG_CAPACITY: usize = 256;

/// Simulated appliance that feeds its state into `F`.
pub struct VirtualOven<F> {
    feed: F,
    speedup: u32,
    state: Mutex<Simulation>,
    failing: AtomicBool,
    write_log: Mutex<VecDeque<AttributeMap>>,
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn load_snapshot(path: &Path) -> Result<AttributeMap, VirtualError> {
    let json = std::fs::read_to_string(path).map_err(|source| VirtualError::SnapshotRead {
        path: path.to_path_buf(),
        source,
    })?;
    AttributeMap::from_json(&json).map_err(VirtualError::SnapshotParse)
}

impl<F: AttributeFeed> VirtualOven<F> {
    /// Build the simulated appliance. Nothing is published until
    /// [`Self::publish`] is called.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured snapshot cannot be read or parsed.
    pub fn new(feed: F, config: VirtualOvenConfig) -> Result<Self, VirtualError> {
        let snapshot = config.snapshot.as_deref().map(load_snapshot).transpose()?;
        let speedup = config.speedup.max(1);
        let mut state = Simulation::new(config);
        if let Some(snapshot) = snapshot {
            tracing::info!(attributes = snapshot.len(), "loaded attribute snapshot");
            state.load(snapshot);
        }
        Ok(Self {
            feed,
            speedup,
            state: Mutex::new(state),
            failing: AtomicBool::new(false),
            write_log: Mutex::new(VecDeque::new()),
        })
    }

    /// Push the complete current state to the feed.
    ///
    /// The state lock is held while the feed runs, so refreshes reach it in
    /// the order the state changed. Feed subscribers must not call back into
    /// the appliance.
    pub fn publish(&self) {
        let state = lock(&self.state);
        self.feed.refresh(state.attributes().clone());
    }

    /// Let `elapsed` of simulated time pass, then publish.
    pub fn advance(&self, elapsed: Duration) {
        let mut state = lock(&self.state);
        state.advance(elapsed);
        self.feed.refresh(state.attributes().clone());
    }

    /// Make every following write fail until called with `false`.
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The most recent accepted writes, oldest first.
    pub fn writes(&self) -> Vec<AttributeMap> {
        lock(&self.write_log).iter().cloned().collect()
    }

    /// Current appliance-side state.
    pub fn attributes(&self) -> AttributeMap {
        lock(&self.state).attributes().clone()
    }

    /// Write the current state as a flat JSON object, loadable through
    /// [`VirtualOvenConfig::snapshot`].
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn save_snapshot(&self, path: &Path) -> Result<(), VirtualError> {
        let json =
            serde_json::to_string_pretty(&self.attributes()).map_err(VirtualError::SnapshotEncode)?;
        std::fs::write(path, json).map_err(|source| VirtualError::SnapshotWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply(&self, attrs: AttributeMap) -> Result<(), VirtualError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(VirtualError::Injected);
        }
        let mut state = lock(&self.state);
        state.apply(&attrs)?;
        tracing::debug!(attributes = attrs.len(), "virtual oven accepted write");
        {
            let mut log = lock(&self.write_log);
            if log.len() == WRITE_LOG_CAPACITY {
                log.pop_front();
            }
            log.push_back(attrs);
        }
        self.feed.refresh(state.attributes().clone());
        Ok(())
    }
}

impl<F> VirtualOven<F>
where
    F: AttributeFeed + Send + Sync + 'static,
{
    /// Advance the simulation by `tick` times the configured speedup every
    /// real `tick`. Abort the returned handle to stop.
    pub fn spawn_ticker(self: &Arc<Self>, tick: Duration) -> JoinHandle<()> {
        let oven = Arc::clone(self);
        let step = tick * oven.speedup;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                oven.advance(step);
            }
        })
    }
}

impl<F> ApplianceTransport for VirtualOven<F>
where
    F: AttributeFeed + Send + Sync,
{
    async fn write_attributes(&self, attrs: AttributeMap) -> Result<(), SixthSenseError> {
        self.apply(attrs).map_err(|err| {
            tracing::warn!(error = %err, "virtual oven rejected write");
            err.into_domain()
        })
    }
}
