//! Identifier types and window modes shared across the Gossamer crates.

use serde::{Deserialize, Serialize};

/// Unique identifier for a tab within a window.
///
/// Allocated sequentially by the owning tab collection; never reused for
/// the lifetime of the window.
pub type TabId = u64;

/// Unique identifier for a top-level browser window.
pub type WindowId = u64;

/// How a window presents itself and what it is allowed to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// A regular browser window with full chrome and any number of tabs.
    #[default]
    Browser,
    /// An engine-created popup (`window.open`): chrome-restricted and
    /// limited to a single tab.
    Popup,
    /// Single-site application window: chrome and cross-origin navigation
    /// are restricted to the configured origin.
    Application,
}

impl WindowMode {
    pub fn is_popup(self) -> bool {
        matches!(self, WindowMode::Popup)
    }

    pub fn is_application(self) -> bool {
        matches!(self, WindowMode::Application)
    }
}
