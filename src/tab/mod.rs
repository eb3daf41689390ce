//! Tab infrastructure for multi-tab browser windows.
//!
//! - `Tab`: one open page, owning its engine view through an [`EmbedHandle`]
//! - `TabCollection`: the ordered strip of tabs within a window
//! - `TabId`: unique identifier for each tab

mod collection;

pub use collection::{PolicyError, RemoveOutcome, TabCollection};

// Re-export TabId from gossamer-config for shared access across crates
pub use gossamer_config::TabId;

use crate::embed::EmbedHandle;
use crate::history::VisitType;

/// A single browser tab.
///
/// The tab is a thin owner: everything page-related lives in the embed
/// handle, and the strip position is a property of the collection, not of
/// the tab.
pub struct Tab {
    /// Unique identifier for this tab within its window.
    pub id: TabId,
    /// Visit type of the navigation currently loading in this tab, consumed
    /// when the load commits.
    pub(crate) pending_visit: Option<VisitType>,
    embed: EmbedHandle,
}

impl Tab {
    pub fn new(id: TabId, embed: EmbedHandle) -> Self {
        Self {
            id,
            pending_visit: None,
            embed,
        }
    }

    pub fn embed(&self) -> &EmbedHandle {
        &self.embed
    }

    pub fn embed_mut(&mut self) -> &mut EmbedHandle {
        &mut self.embed
    }

    pub fn url(&self) -> &str {
        self.embed.url()
    }

    pub fn title(&self) -> &str {
        self.embed.title()
    }
}
