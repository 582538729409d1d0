//! CLI command handlers

pub mod commands;

pub use commands::{manual, selenium, uft, RunOptions};
