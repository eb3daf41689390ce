//! Process-wide browser shell: the window set and everything shared
//! between windows.
//!
//! The shell owns the engine runtime guard handout, the event channel the
//! engine adapters feed, the history service, session persistence, and the
//! lockdown policy. GUI adapters talk to the shell; the shell routes into
//! the per-window controllers and carries out the requests they return.

use crate::chrome::ChromeMask;
use crate::embed::{EventProxy, TabAddress, TaggedEvent, event_channel};
use crate::engine::{EngineBackend, EngineRuntime};
use crate::history::{HistoryStore, MemoryHistory};
use crate::navigation::NavigationRequest;
use crate::session::{capture, storage};
use crate::tab::TabId;
use crate::window::{BrowserWindow, WindowRequest};
use anyhow::Context;
use gossamer_config::{Config, WindowId, WindowMode};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

/// Hands URLs the shell will not load to something that will.
pub trait ExternalOpener {
    fn open(&self, url: &str) -> anyhow::Result<()>;
}

/// Opens URLs with the OS default application.
pub struct SystemOpener;

impl ExternalOpener for SystemOpener {
    fn open(&self, url: &str) -> anyhow::Result<()> {
        open::that(url).with_context(|| format!("failed to hand {url} to the system handler"))
    }
}

/// A blocking confirmation the embedding GUI must put in front of the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellPrompt {
    pub window: WindowId,
    pub kind: PromptKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// "Close Document?" for a tab with unsubmitted form data.
    CloseDocument,
    /// "Ongoing downloads will be cancelled."
    AbortDownloads,
}

/// The top-level shell object.
pub struct BrowserShell {
    config: Config,
    profile_dir: PathBuf,
    /// Private sessions never touch the session file.
    private: bool,
    windows: BTreeMap<WindowId, BrowserWindow>,
    next_window_id: WindowId,
    backend: Arc<dyn EngineBackend>,
    engine: EngineRuntime,
    history: Box<dyn HistoryStore>,
    opener: Box<dyn ExternalOpener>,
    proxy: EventProxy,
    events: mpsc::Receiver<TaggedEvent>,
    /// Event routing overrides for tabs that moved to another window. The
    /// engine keeps tagging events with the address the view was created
    /// under; this map points that address at the tab's current window.
    moved_tabs: HashMap<TabAddress, WindowId>,
    pending_prompts: VecDeque<ShellPrompt>,
    last_status: Option<String>,
}

impl BrowserShell {
    pub fn new(
        config: Config,
        profile_dir: PathBuf,
        private: bool,
        backend: Arc<dyn EngineBackend>,
    ) -> Self {
        let (proxy, events) = event_channel();
        Self {
            config,
            profile_dir,
            private,
            windows: BTreeMap::new(),
            next_window_id: 1,
            backend,
            engine: EngineRuntime::new(),
            history: Box::new(MemoryHistory::new()),
            opener: Box::new(SystemOpener),
            proxy,
            events,
            moved_tabs: HashMap::new(),
            pending_prompts: VecDeque::new(),
            last_status: None,
        }
    }

    /// Replace the OS hand-off seam (tests, kiosk deployments).
    pub fn set_opener(&mut self, opener: Box<dyn ExternalOpener>) {
        self.opener = opener;
    }

    /// Replace the history backend.
    pub fn set_history(&mut self, history: Box<dyn HistoryStore>) {
        self.history = history;
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn window(&self, id: WindowId) -> Option<&BrowserWindow> {
        self.windows.get(&id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut BrowserWindow> {
        self.windows.get_mut(&id)
    }

    pub fn windows(&self) -> impl Iterator<Item = &BrowserWindow> {
        self.windows.values()
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }

    /// Next blocking confirmation to show, if any.
    pub fn take_prompt(&mut self) -> Option<ShellPrompt> {
        self.pending_prompts.pop_front()
    }

    // ------------------------------------------------------------------
    // Startup
    // ------------------------------------------------------------------

    /// Restore the saved session (when enabled) and open the initial
    /// window. An explicit `initial_url` always gets a window of its own.
    pub fn startup(&mut self, initial_url: Option<&str>) {
        let mut restored = false;
        if self.session_enabled() {
            match storage::load_session(&self.profile_dir) {
                Ok(Some(state)) => {
                    restored = self.restore_session(&state) > 0;
                }
                Ok(None) => {}
                Err(error) => {
                    log::warn!("Ignoring unreadable session state: {:#}", error);
                }
            }
        }

        if let Some(url) = initial_url {
            let id = self.create_window(self.default_mode(), self.default_chrome());
            self.open_initial_tab(id, Some(url));
        } else if !restored {
            let id = self.create_window(self.default_mode(), self.default_chrome());
            self.open_initial_tab(id, None);
        }
    }

    fn restore_session(&mut self, state: &crate::session::SessionState) -> usize {
        let mut opened = 0;
        for saved in &state.windows {
            if saved.tabs.is_empty() {
                continue;
            }

            let id = self.create_window(saved.mode, self.default_chrome());
            for tab in &saved.tabs {
                if let Some(window) = self.windows.get_mut(&id)
                    && let Err(error) = window.open_tab(Some(&tab.url), None, false)
                {
                    log::error!("Failed to restore tab {}: {}", tab.url, error);
                }
            }
            if let Some(window) = self.windows.get_mut(&id)
                && !window.tabs().is_empty()
            {
                let index = saved
                    .active_tab_index
                    .min(window.tabs().len().saturating_sub(1));
                let _ = window.activate_tab(index);
            }
            opened += 1;
        }
        if opened > 0 {
            log::info!("Restored {} window(s) from saved session", opened);
        }
        opened
    }

    // ------------------------------------------------------------------
    // Windows
    // ------------------------------------------------------------------

    /// Open a window with one tab loading `url` (or the start page).
    pub fn open_window(&mut self, url: Option<&str>) -> WindowId {
        let id = self.create_window(self.default_mode(), self.default_chrome());
        self.open_initial_tab(id, url);
        id
    }

    fn create_window(&mut self, mode: WindowMode, chrome: ChromeMask) -> WindowId {
        let id = self.next_window_id;
        self.next_window_id += 1;

        let window = BrowserWindow::new(
            id,
            mode,
            chrome,
            self.config.clone(),
            Arc::clone(&self.backend),
            self.proxy.clone(),
            self.engine.acquire(),
        );
        self.windows.insert(id, window);
        id
    }

    fn open_initial_tab(&mut self, id: WindowId, url: Option<&str>) {
        let start_page = self.config.start_page.clone();
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };

        // Popups with no target stay blank; the engine drives their view.
        let target = match url {
            Some(url) => Some(url),
            None if !window.mode().is_popup() => Some(start_page.as_str()),
            None => None,
        };

        if let Err(error) = window.open_tab(target, None, true) {
            log::error!("Failed to open initial tab in window {}: {}", id, error);
        }
    }

    /// Ask a window to close. Lockdown policy short-circuits to a refusal
    /// without running any checks.
    pub fn request_close_window(&mut self, id: WindowId) {
        if self.config.lockdown_disable_quit {
            log::warn!("Window close refused: quit is disabled by policy");
            self.last_status = Some("Closing windows is disabled by policy".to_string());
            return;
        }

        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        let requests = window.request_close();
        self.process_requests(id, requests);
    }

    /// Answer the "Close Document?" confirmation for a window.
    pub fn answer_close_document(&mut self, id: WindowId, confirmed: bool) {
        let requests = self
            .windows
            .get_mut(&id)
            .map(|window| window.confirm_close_document(confirmed))
            .unwrap_or_default();
        self.process_requests(id, requests);
    }

    /// Answer the downloads confirmation for a window.
    pub fn answer_abort_downloads(&mut self, id: WindowId, confirmed: bool) {
        let requests = self
            .windows
            .get_mut(&id)
            .map(|window| window.confirm_abort_downloads(confirmed))
            .unwrap_or_default();
        self.process_requests(id, requests);
    }

    /// Location-bar/menu navigation entry for a window's active tab.
    pub fn request_navigation(&mut self, id: WindowId, request: NavigationRequest) {
        let requests = self
            .windows
            .get_mut(&id)
            .map(|window| window.request_navigation(None, request))
            .unwrap_or_default();
        self.process_requests(id, requests);
    }

    /// Detach the active tab of a multi-tab window into a new window.
    pub fn detach_tab_to_new_window(&mut self, id: WindowId) -> Option<WindowId> {
        let window = self.windows.get_mut(&id)?;
        if window.tabs().len() < 2 {
            return None;
        }
        let index = window.tabs().active_index()?;

        let (tab, requests) = match window.detach_tab(index) {
            Ok(detached) => detached,
            Err(error) => {
                log::error!("Cannot detach tab from window {}: {}", id, error);
                return None;
            }
        };
        let tab_id = tab.id;
        self.process_requests(id, requests);

        let new_id = self.create_window(self.default_mode(), self.default_chrome());
        if let Some(new_window) = self.windows.get_mut(&new_id)
            && let Err(error) = new_window.adopt_tab(tab, true)
        {
            log::error!("Failed to adopt detached tab: {}", error);
        }
        self.reroute_tab(id, tab_id, new_id);
        log::info!("Detached tab {} from window {} into window {}", tab_id, id, new_id);
        Some(new_id)
    }

    // Point every address the moved tab answers to at its new window.
    fn reroute_tab(&mut self, source: WindowId, tab: TabId, target: WindowId) {
        for (address, destination) in self.moved_tabs.iter_mut() {
            if *destination == source && address.tab == tab {
                *destination = target;
            }
        }
        self.moved_tabs.insert(
            TabAddress {
                window: source,
                tab,
            },
            target,
        );
    }

    fn destroy_window(&mut self, id: WindowId) {
        // Capture the session while the closing window still exists, so a
        // restore brings it back.
        if self.windows.len() == 1 && self.windows.contains_key(&id) && self.session_enabled() {
            self.persist_session();
        }

        if let Some(mut window) = self.windows.remove(&id) {
            window.cancel_close();
            self.pending_prompts.retain(|prompt| prompt.window != id);
            log::info!("Destroyed window {}", id);
        }
    }

    // ------------------------------------------------------------------
    // Event loop
    // ------------------------------------------------------------------

    /// Drain and dispatch every queued engine event. Returns how many were
    /// handled.
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(tagged) = self.events.try_recv() {
            self.dispatch(tagged);
            handled += 1;
        }
        handled
    }

    /// Block up to `timeout` for one engine event, then drain the rest.
    /// Returns false when the timeout elapsed with nothing to do.
    pub fn wait_events(&mut self, timeout: Duration) -> bool {
        match self.events.recv_timeout(timeout) {
            Ok(tagged) => {
                self.dispatch(tagged);
                self.pump_events();
                true
            }
            Err(_) => false,
        }
    }

    fn dispatch(&mut self, tagged: TaggedEvent) {
        let target = self
            .moved_tabs
            .get(&tagged.source)
            .copied()
            .unwrap_or(tagged.source.window);

        let requests = match self.windows.get_mut(&target) {
            Some(window) => window.handle_engine_event(tagged.source.tab, tagged.event),
            None => {
                log::debug!(
                    "Dropping event for closed window {} (tab {})",
                    target,
                    tagged.source.tab
                );
                return;
            }
        };
        self.process_requests(target, requests);
    }

    fn process_requests(&mut self, source: WindowId, requests: Vec<WindowRequest>) {
        for request in requests {
            match request {
                WindowRequest::OpenWindow { url, chrome, popup } => {
                    let mode = if popup {
                        WindowMode::Popup
                    } else {
                        self.default_mode()
                    };
                    let id = self.create_window(mode, chrome);
                    let url = if url.is_empty() { None } else { Some(url) };
                    self.open_initial_tab(id, url.as_deref());
                }
                WindowRequest::HandOffToOs { url } => {
                    match self.opener.open(&url) {
                        Ok(()) => log::info!("Handed {} to the OS default handler", url),
                        Err(error) => {
                            log::warn!("OS hand-off failed: {:#}", error);
                            self.last_status = Some(format!("Unable to open {url}"));
                        }
                    }
                }
                WindowRequest::PromptCloseDocument => {
                    self.pending_prompts.push_back(ShellPrompt {
                        window: source,
                        kind: PromptKind::CloseDocument,
                    });
                }
                WindowRequest::PromptAbortDownloads => {
                    self.pending_prompts.push_back(ShellPrompt {
                        window: source,
                        kind: PromptKind::AbortDownloads,
                    });
                }
                WindowRequest::Teardown => {
                    self.destroy_window(source);
                }
                WindowRequest::RecordVisit { url, title, visit } => {
                    self.history.record_visit(&url, &title, visit);
                }
                WindowRequest::SessionCheckpoint => {
                    if self.session_enabled() {
                        self.persist_session();
                    }
                }
                WindowRequest::StatusMessage(message) => {
                    log::info!("Window {}: {}", source, message);
                    self.last_status = Some(message);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Session persistence
    // ------------------------------------------------------------------

    fn session_enabled(&self) -> bool {
        self.config.restore_session && !self.private
    }

    fn persist_session(&mut self) {
        let state = capture::capture_state(self.windows.values());
        if let Err(error) = storage::save_session(&state, &self.profile_dir) {
            log::warn!("Failed to persist session: {:#}", error);
        }
    }

    fn default_mode(&self) -> WindowMode {
        if self.config.application_origin.is_some() {
            WindowMode::Application
        } else {
            WindowMode::Browser
        }
    }

    fn default_chrome(&self) -> ChromeMask {
        ChromeMask::from_config(&self.config)
    }
}
