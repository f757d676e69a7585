//! Controller layer: UI events, per-kind list state, and command orchestration.

pub mod events;
pub mod lists;
pub mod orchestration;
