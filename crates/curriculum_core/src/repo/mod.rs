//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract the local curriculum store writes through.
//! - Isolate SQLite query details from store orchestration.

pub mod kv_repo;
