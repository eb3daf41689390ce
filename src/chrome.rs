//! Chrome presentation: project window state onto visible chrome elements.
//!
//! The projection is recomputed from scratch every time any contributing
//! input changes. Nothing here is patched incrementally, so toggle actions
//! and actual visibility cannot drift apart.

use gossamer_config::Config;
use serde::{Deserialize, Serialize};

/// Chrome elements a window requests.
///
/// The mask records intent; what is actually shown is decided by
/// [`present`], which also folds in popup/application restrictions and
/// fullscreen state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromeMask {
    pub menu_bar: bool,
    pub toolbar: bool,
    pub location_bar: bool,
    pub tab_strip: bool,
    pub downloads_tray: bool,
}

impl Default for ChromeMask {
    fn default() -> Self {
        Self {
            menu_bar: true,
            toolbar: true,
            location_bar: true,
            tab_strip: true,
            downloads_tray: true,
        }
    }
}

impl ChromeMask {
    /// Default chrome for new browser windows, from the user configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            menu_bar: config.show_menu_bar,
            toolbar: config.show_toolbar,
            location_bar: config.show_location_bar,
            tab_strip: config.show_tab_strip,
            downloads_tray: config.show_downloads_tray,
        }
    }

    /// Minimal chrome for engine-created popup windows.
    pub fn popup() -> Self {
        Self {
            menu_bar: false,
            toolbar: false,
            location_bar: true,
            tab_strip: false,
            downloads_tray: false,
        }
    }
}

/// Computed visibility of each chrome element for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChromeVisibility {
    pub menu_bar: bool,
    pub toolbar: bool,
    pub location_bar: bool,
    pub tab_strip: bool,
    pub downloads_tray: bool,
    /// Page-level actions (save, view source, open-in-browser) stay enabled
    /// outside application mode.
    pub page_actions_enabled: bool,
}

/// Compute chrome visibility for a window.
///
/// Fullscreen hides the menu bar and toolbar regardless of the mask; popup
/// windows never show the tab strip; application mode hides the tab strip
/// and location bar and disables page-level actions; the downloads tray is
/// visible only while the mask requests it *and* at least one unfinished
/// download exists.
pub fn present(
    mask: ChromeMask,
    is_popup: bool,
    is_application: bool,
    is_fullscreen: bool,
    has_active_downloads: bool,
) -> ChromeVisibility {
    ChromeVisibility {
        menu_bar: mask.menu_bar && !is_fullscreen && !is_application,
        toolbar: mask.toolbar && !is_fullscreen,
        location_bar: mask.location_bar && !is_application,
        tab_strip: mask.tab_strip && !is_popup && !is_application,
        downloads_tray: mask.downloads_tray && has_active_downloads,
        page_actions_enabled: !is_application,
    }
}
