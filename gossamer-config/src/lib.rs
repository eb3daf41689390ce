//! Configuration system for the Gossamer browser shell.
//!
//! This crate provides configuration loading, saving, and default values
//! for the shell, plus the identifier types shared across crates:
//!
//! - Browser configuration (start page, chrome defaults, close confirmations)
//! - Session restore and lockdown policy toggles
//! - Shared `TabId` / `WindowId` identifier types and the window mode enum

pub mod config;
pub mod error;
mod types;

// Re-export main types for convenience
pub use config::Config;
pub use error::ConfigError;
pub use types::{TabId, WindowId, WindowMode};
