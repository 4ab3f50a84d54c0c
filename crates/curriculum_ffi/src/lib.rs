//! Flutter-facing bindings over `curriculum_core`.

pub mod api;
