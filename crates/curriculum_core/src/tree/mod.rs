//! In-memory curriculum tree.
//!
//! # Responsibility
//! - Hold the hierarchy in an arena addressed by ancestor-id paths.
//! - Apply store mutations and answer navigation queries.
//!
//! # Invariants
//! - Unresolvable paths are no-ops for writes and not-found for reads.

pub mod arena;
pub mod mutation;
pub mod navigator;
pub mod outline;
pub mod path;
