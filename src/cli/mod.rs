//! CLI interface for allophony
//!
//! Provides command-line utilities for transcription scoring and inventory
//! inspection.

pub mod args;
pub mod commands;
pub mod paths;

pub use args::{Cli, Commands, UtteranceFormat};
pub use paths::{config_dir, resolve_config};
