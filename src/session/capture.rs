//! Capture live shell state into serializable session types.

use super::{SessionState, SessionTab, SessionWindow};
use crate::window::BrowserWindow;
use std::time::{SystemTime, UNIX_EPOCH};

/// Snapshot one window. Popup windows return `None`: they are engine
/// artifacts and are not restored across sessions.
pub fn capture_window(window: &BrowserWindow) -> Option<SessionWindow> {
    if window.mode().is_popup() {
        return None;
    }

    let tabs: Vec<SessionTab> = window
        .tabs()
        .iter()
        .filter(|tab| !tab.url().is_empty())
        .map(|tab| SessionTab {
            url: tab.url().to_string(),
            title: tab.title().to_string(),
        })
        .collect();

    if tabs.is_empty() {
        return None;
    }

    Some(SessionWindow {
        mode: window.mode(),
        active_tab_index: window.tabs().active_index().unwrap_or(0).min(tabs.len() - 1),
        tabs,
    })
}

/// Snapshot every restorable window in the shell.
pub fn capture_state<'a>(windows: impl Iterator<Item = &'a BrowserWindow>) -> SessionState {
    SessionState {
        saved_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0),
        windows: windows.filter_map(capture_window).collect(),
    }
}
