//! Editor-facing state on top of a curriculum store.

pub mod debounce;
pub mod session;
