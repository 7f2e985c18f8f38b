//! Test helper utilities
//!
//! Shared fixtures for bangumi-ingest integration tests

#![allow(dead_code)]

pub mod fixtures;
pub mod log_capture;

pub use fixtures::*;
pub use log_capture::capture_logs;
