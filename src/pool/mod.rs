//! Pool state and the swap engine that runs against it.

pub mod depth;
pub mod events;
pub mod snapshot;
pub mod swap;
pub mod tick_curve;
