//! Virtual oven error types.

use std::path::PathBuf;

use sixthsense_domain::cavity::Cavity;
use sixthsense_domain::error::{DecodeError, SixthSenseError};

/// Errors specific to the virtual oven.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    /// Failure injected by a test or demo.
    #[error("write rejected by failure injection")]
    Injected,

    /// A command addressed a cavity the simulated appliance does not have.
    #[error("{0} cavity is not present")]
    CavityNotPresent(Cavity),

    /// `Modify` was sent to a cavity with no running cycle.
    #[error("cannot modify idle {0} cavity")]
    ModifyIdle(Cavity),

    /// A command carried a value the appliance does not understand.
    #[error("malformed command")]
    Protocol(#[source] DecodeError),

    /// The snapshot file could not be read.
    #[error("failed to read snapshot {path}")]
    SnapshotRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file is not a flat JSON object of strings.
    #[error("failed to parse snapshot")]
    SnapshotParse(#[source] DecodeError),

    /// The snapshot file could not be written.
    #[error("failed to write snapshot {path}")]
    SnapshotWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The attribute state could not be encoded as JSON.
    #[error("failed to encode snapshot")]
    SnapshotEncode(#[source] serde_json::Error),
}

impl VirtualError {
    /// Convert into a [`SixthSenseError::Transport`] for propagation across
    /// port boundaries.
    pub fn into_domain(self) -> SixthSenseError {
        SixthSenseError::Transport(Box::new(self))
    }
}

impl From<VirtualError> for SixthSenseError {
    fn from(err: VirtualError) -> Self {
        err.into_domain()
    }
}
