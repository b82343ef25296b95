//! Application Layer
//!
//! The two timer-driven services and the read models they expose. This layer
//! owns every timer task; domain types only hold data.

pub mod dto;
pub mod services;
