//! Data Transfer Objects
//!
//! Read models returned by the application services.

pub mod status;

pub use status::{
    format_clock, format_datetime, DrawStatus, EnvironmentStatus, TimeStartDto, TimeStartsView,
};
