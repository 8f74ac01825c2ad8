//! # sixthsense-app
//!
//! Application layer: **port definitions** (traits) and the stateful pieces
//! that sit between a transport and its consumers.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement:
//!   - `ApplianceTransport`: deliver an attribute diff to the appliance
//!   - `AttributeFeed`: hand full snapshots or pushed partial updates to the store
//! - Hold the last-known attribute map (`AttributeStore`) and fan out change
//!   notifications (`NotificationHub`) with isolated callbacks
//! - Expose the **oven facade** (`Oven`): typed getters, cook lifecycle,
//!   reconciled cook timer, debounced edits, mode transitions, kitchen timers
//!
//! ## Dependency rule
//! Depends on `sixthsense-domain` only (plus `tokio` for timers, tasks and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod attribute_store;
pub mod notify;
pub mod oven;
pub mod ports;

#[cfg(test)]
pub(crate) mod fakes;
