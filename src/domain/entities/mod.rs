//! # Domain Entities
//!
//! - **Session**: the single environment session and its connection set
//! - **Checkpoint**: a scheduled "time start"
//! - **DrawRun**: pool and history of one draw run
//! - **Notification**: an outbound event plus the `Notifier` gateway trait

mod checkpoint;
mod draw_run;
mod notification;
mod session;

pub use checkpoint::Checkpoint;
pub use draw_run::{join_sequence, run_label, DrawRun, MAX_TICK_SECONDS, POOL_SIZE};
pub use notification::{Notification, Notifier, CHECKPOINT_CATEGORY};
pub use session::{Session, MAX_TTL_SECS};
