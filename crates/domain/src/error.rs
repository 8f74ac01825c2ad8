//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`SixthSenseError`] via `#[from]` (no `String` variants).

/// Top-level error shared by every layer.
#[derive(Debug, thiserror::Error)]
pub enum SixthSenseError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("decode error")]
    Decode(#[from] DecodeError),

    /// The transport rejected or failed to deliver an attribute write.
    #[error("attribute write failed")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Invariant violations detected while constructing domain values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("appliance said must not be empty")]
    EmptySaid,

    #[error("appliance name must not be empty")]
    EmptyName,

    #[error("kitchen timer id {0} is outside 1..=99")]
    TimerIdOutOfRange(u8),
}

/// A raw attribute value could not be turned into a typed value.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("attribute {key} is missing")]
    Missing { key: String },

    #[error("unknown {kind} code {code:?}")]
    UnknownCode { kind: &'static str, code: String },

    #[error("attribute {key} holds a malformed integer {value:?}")]
    Malformed { key: String, value: String },

    #[error("malformed attribute snapshot")]
    Snapshot(#[source] serde_json::Error),
}
