//! In-test port implementations shared by the facade tests.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use sixthsense_domain::attribute::AttributeMap;
use sixthsense_domain::error::SixthSenseError;

use crate::ports::ApplianceTransport;

#[derive(Debug, thiserror::Error)]
#[error("appliance rejected the write")]
pub struct Rejected;

/// Records every write; can be told to fail.
#[derive(Default)]
pub struct RecordingTransport {
    writes: Mutex<Vec<AttributeMap>>,
    failing: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<AttributeMap> {
        self.writes.lock().unwrap().clone()
    }

    pub fn last_write(&self) -> Option<AttributeMap> {
        self.writes.lock().unwrap().last().cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

impl ApplianceTransport for RecordingTransport {
    fn write_attributes(
        &self,
        attrs: AttributeMap,
    ) -> impl Future<Output = Result<(), SixthSenseError>> + Send {
        let result = if self.failing.load(Ordering::SeqCst) {
            Err(SixthSenseError::Transport(Box::new(Rejected)))
        } else {
            self.writes.lock().unwrap().push(attrs);
            Ok(())
        };
        async { result }
    }
}
