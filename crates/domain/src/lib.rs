//! # sixthsense-domain
//!
//! Pure domain model for a connected multi-cavity oven that speaks a sparse
//! key-value attribute protocol.
//!
//! ## Responsibilities
//! - Foundational types: appliance identity, error conventions, timestamps and clocks
//! - Define the **vocabulary** (cavities, cavity states, cook modes, cook
//!   operations, kitchen-timer states) and its wire codes
//! - Define the **attribute map** and its codecs (boolean, integer, tenths of a degree)
//! - Reproduce the wire **key naming** convention bit for bit
//! - Build **command payloads** (attribute diffs) for every cook-lifecycle operation
//! - Reconcile the **predicted cook timer** against coarse server reports
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod code;
pub mod error;
pub mod id;
pub mod time;

pub mod appliance;
pub mod attribute;
pub mod cavity;
pub mod command;
pub mod cook;
pub mod kitchen_timer;
pub mod timer;
