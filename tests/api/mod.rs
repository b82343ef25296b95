//! API Integration Tests

mod draw_tests;
mod environment_tests;
mod health_tests;
