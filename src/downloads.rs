//! Per-window download tracking.
//!
//! The shell does not transfer bytes itself; the engine does. This registry
//! tracks what the window needs to know: which downloads are attached to it
//! and whether any of them is still running, which feeds both the close
//! confirmation workflow and the downloads-tray chrome rule.

/// Unique identifier for a download within a window.
pub type DownloadId = u64;

/// Lifecycle state of one download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    InProgress,
    Finished,
    Failed,
    Cancelled,
}

impl DownloadState {
    /// Whether the download no longer counts as ongoing.
    pub fn is_terminal(self) -> bool {
        !matches!(self, DownloadState::InProgress)
    }
}

/// A download attached to a window.
#[derive(Debug, Clone)]
pub struct Download {
    pub id: DownloadId,
    pub uri: String,
    pub state: DownloadState,
    pub received_bytes: u64,
    pub total_bytes: Option<u64>,
}

/// Registry of the downloads attached to one window.
#[derive(Debug, Default)]
pub struct DownloadsMonitor {
    downloads: Vec<Download>,
    next_id: DownloadId,
}

impl DownloadsMonitor {
    pub fn new() -> Self {
        Self {
            downloads: Vec::new(),
            next_id: 1,
        }
    }

    /// Register a new in-progress download and return its id.
    pub fn start(&mut self, uri: impl Into<String>) -> DownloadId {
        let id = self.next_id;
        self.next_id += 1;

        let uri = uri.into();
        log::info!("Starting download {} of {}", id, uri);
        self.downloads.push(Download {
            id,
            uri,
            state: DownloadState::InProgress,
            received_bytes: 0,
            total_bytes: None,
        });
        id
    }

    /// Update byte counters for a download.
    pub fn update_progress(&mut self, id: DownloadId, received: u64, total: Option<u64>) {
        if let Some(download) = self.get_mut(id) {
            download.received_bytes = received;
            download.total_bytes = total;
        }
    }

    /// Move a download into a terminal (or back into an active) state.
    pub fn set_state(&mut self, id: DownloadId, state: DownloadState) {
        if let Some(download) = self.get_mut(id) {
            log::debug!("Download {} -> {:?}", id, state);
            download.state = state;
        }
    }

    /// Cancel every download that is still running.
    ///
    /// Called when a window close resolves to proceed despite ongoing
    /// downloads.
    pub fn cancel_active(&mut self) -> usize {
        let mut cancelled = 0;
        for download in &mut self.downloads {
            if !download.state.is_terminal() {
                download.state = DownloadState::Cancelled;
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            log::info!("Cancelled {} ongoing download(s)", cancelled);
        }
        cancelled
    }

    /// Whether any attached download is still running.
    pub fn has_active(&self) -> bool {
        self.downloads
            .iter()
            .any(|download| !download.state.is_terminal())
    }

    pub fn active_count(&self) -> usize {
        self.downloads
            .iter()
            .filter(|download| !download.state.is_terminal())
            .count()
    }

    pub fn list(&self) -> &[Download] {
        &self.downloads
    }

    /// Drop finished/failed/cancelled entries.
    pub fn prune_terminal(&mut self) {
        self.downloads
            .retain(|download| !download.state.is_terminal());
    }

    fn get_mut(&mut self, id: DownloadId) -> Option<&mut Download> {
        self.downloads.iter_mut().find(|download| download.id == id)
    }
}
