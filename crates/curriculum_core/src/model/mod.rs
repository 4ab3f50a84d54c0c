//! Curriculum domain model.
//!
//! # Responsibility
//! - Define the nested document shape exchanged with persistence and APIs.
//! - Define the flat per-node record the in-memory arena stores.
//!
//! # Invariants
//! - Every node is identified by a `NodeId` unique among its siblings.
//! - Child order is insertion order and is the display order.

pub mod curriculum;
pub mod node;
