// ABOUTME: Library root for conveyor - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod context;
pub mod convention;
pub mod diagnostics;
pub mod error;
pub mod files;
pub mod output;
pub mod provider;
pub mod stack;
pub mod substitution;
pub mod types;
pub mod upload;
