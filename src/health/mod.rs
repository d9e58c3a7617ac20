//! Passive health tracking.
//!
//! # Data Flow
//! ```text
//! acquisition outcome observed
//!     → success: failure streak reset to zero
//!     → failure: streak incremented
//!         → streak reaches threshold:
//!             node transitions out of selection (exactly one winner)
//!             pool drain scheduled
//!             eviction event emitted
//! ```
//!
//! # Design Decisions
//! - Eviction is driven purely by observed acquisitions; no probing
//! - The CAS on the node state guarantees one eviction event per node
//! - Explicit `remove` bypasses the threshold entirely

pub mod tracker;

pub use tracker::HealthTracker;
