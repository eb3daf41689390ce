// Library exports for testing and embedding.
//
// The crate is single-threaded by design: windows, tabs, and engine
// handles live on the main loop and are never shared across threads.
// Engine adapters may do their work wherever they like (the offline
// backend uses the tokio runtime), but results only re-enter the core
// through the event channel, drained on the main loop.

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod chrome;
pub mod cli;
pub mod close_workflow;
pub mod config {
    //! Configuration re-exports from the `gossamer-config` sub-crate.
    pub use gossamer_config::{Config, ConfigError, TabId, WindowId, WindowMode};
}
pub mod downloads;
pub mod embed;
pub mod engine;
pub mod history;
pub mod navigation;
pub mod session;
pub mod shell;
pub mod tab;
pub mod window;
