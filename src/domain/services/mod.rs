//! Domain services.

mod checkpoint_grid;

pub use checkpoint_grid::{CheckpointGrid, MAX_INTERVAL_MINUTES, UPCOMING_CHECKPOINTS};
