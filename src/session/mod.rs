//! Session state types for save/restore.
//!
//! The shell persists the open windows and tabs on clean exit and restores
//! them on the next launch. The same state is also written opportunistically
//! after navigations commit, so a crashed session can be recovered.

pub mod capture;
pub mod storage;

use gossamer_config::WindowMode;
use serde::{Deserialize, Serialize};

/// Top-level session state: all windows at the time of save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Seconds since the Unix epoch when the session was saved.
    pub saved_at: u64,
    /// All windows in the session.
    pub windows: Vec<SessionWindow>,
}

/// A single window in the saved session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionWindow {
    /// Window mode; popups are not restored.
    pub mode: WindowMode,
    /// Tabs in strip order.
    pub tabs: Vec<SessionTab>,
    /// Index of the active tab.
    pub active_tab_index: usize,
}

/// A single tab in a saved session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTab {
    pub url: String,
    pub title: String,
}
