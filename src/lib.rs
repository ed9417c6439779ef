// ABOUTME: Library root for tdlctl - exposes the lifecycle and dispatch layers for testing.
// ABOUTME: The main binary is in main.rs.

pub mod bucket;
pub mod cloud;
pub mod config;
pub mod coordinator;
pub mod diagnostics;
pub mod error;
pub mod invoke;
pub mod output;
pub mod stack;
pub mod types;
