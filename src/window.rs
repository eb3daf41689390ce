//! Per-window session controller.
//!
//! A `BrowserWindow` owns the tab strip, the chrome state, the downloads
//! attached to the window, and the close confirmation workflow. Every GUI
//! adapter (toolbar button, menu action) and every engine callback enters
//! through here; anything that concerns other windows or the process is
//! returned as a [`WindowRequest`] for the shell to carry out.

use crate::chrome::{self, ChromeMask, ChromeVisibility};
use crate::close_workflow::{
    CloseConfirmationWorkflow, CloseEffect, CloseRequestOutcome, CloseResolution,
};
use crate::downloads::{DownloadId, DownloadState, DownloadsMonitor};
use crate::embed::{EmbedHandle, EngineEvent, EventProxy, FormsProbe, LoadState, TabAddress};
use crate::engine::{EngineBackend, EngineGuard};
use crate::history::VisitType;
use crate::navigation::{self, Disposition, NavigationRequest};
use crate::tab::{PolicyError, Tab, TabCollection, TabId};
use gossamer_config::{Config, WindowId, WindowMode};
use std::sync::Arc;

/// Work a window asks the shell (or the embedding GUI) to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowRequest {
    /// Create a new window, optionally loading a URL into its first tab.
    OpenWindow {
        url: String,
        chrome: ChromeMask,
        popup: bool,
    },
    /// Hand a URL to the OS default handler.
    HandOffToOs { url: String },
    /// Show the blocking "Close Document?" confirmation for this window.
    /// The dirty tab has already been brought to front.
    PromptCloseDocument,
    /// Show the blocking "ongoing downloads will be cancelled" confirmation.
    PromptAbortDownloads,
    /// The window must be destroyed (close resolved, or the last tab went
    /// away).
    Teardown,
    /// Record a committed navigation in the history service.
    RecordVisit {
        url: String,
        title: String,
        visit: VisitType,
    },
    /// Session state changed enough to be worth checkpointing.
    SessionCheckpoint,
    /// Non-blocking, status-bar-level message.
    StatusMessage(String),
}

/// One top-level browser window.
pub struct BrowserWindow {
    id: WindowId,
    mode: WindowMode,
    app_origin: Option<String>,
    tabs: TabCollection,
    chrome_mask: ChromeMask,
    chrome: ChromeVisibility,
    fullscreen: bool,
    /// Set once a close attempt resolves to proceed; suppresses further
    /// event handling while teardown is pending.
    closing: bool,
    downloads: DownloadsMonitor,
    workflow: CloseConfirmationWorkflow,
    backend: Arc<dyn EngineBackend>,
    proxy: EventProxy,
    config: Config,
    _engine: EngineGuard,
}

impl BrowserWindow {
    pub fn new(
        id: WindowId,
        mode: WindowMode,
        chrome_mask: ChromeMask,
        config: Config,
        backend: Arc<dyn EngineBackend>,
        proxy: EventProxy,
        engine: EngineGuard,
    ) -> Self {
        let app_origin = if mode.is_application() {
            config.application_origin.clone()
        } else {
            None
        };

        let mut window = Self {
            id,
            mode,
            app_origin,
            tabs: TabCollection::new(mode.is_popup()),
            chrome_mask,
            chrome: ChromeVisibility::default(),
            fullscreen: false,
            closing: false,
            downloads: DownloadsMonitor::new(),
            workflow: CloseConfirmationWorkflow::new(),
            backend,
            proxy,
            config,
            _engine: engine,
        };
        window.refresh_chrome();
        log::info!("Created window {} ({:?})", id, mode);
        window
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn tabs(&self) -> &TabCollection {
        &self.tabs
    }

    pub fn downloads(&self) -> &DownloadsMonitor {
        &self.downloads
    }

    pub fn chrome(&self) -> ChromeVisibility {
        self.chrome
    }

    pub fn chrome_mask(&self) -> ChromeMask {
        self.chrome_mask
    }

    // ------------------------------------------------------------------
    // Tabs
    // ------------------------------------------------------------------

    /// Open a new tab, optionally loading `url`, at `position` (append when
    /// `None`). Returns the new tab's id.
    pub fn open_tab(
        &mut self,
        url: Option<&str>,
        position: Option<usize>,
        activate_and_focus: bool,
    ) -> Result<TabId, PolicyError> {
        if self.tabs.is_popup() && !self.tabs.is_empty() {
            return Err(PolicyError::PopupSecondTab);
        }

        let id = self.tabs.allocate_id();
        let address = TabAddress {
            window: self.id,
            tab: id,
        };
        let view = self.backend.create_view(address, self.proxy.clone());
        let mut embed = EmbedHandle::new(view);
        embed.set_zoom(self.config.default_zoom);
        if let Some(url) = url {
            embed.load(url);
        }

        self.tabs
            .add(Tab::new(id, embed), position, activate_and_focus)?;
        self.refresh_chrome();
        Ok(id)
    }

    /// Close the tab at `index`. When the last tab goes, the window itself
    /// must go: the became-empty outcome turns into a single `Teardown`
    /// request, emitted before any other side effect.
    pub fn close_tab(&mut self, index: usize) -> Result<Vec<WindowRequest>, PolicyError> {
        let outcome = self.tabs.remove(index)?;
        self.refresh_chrome();

        let mut requests = Vec::new();
        if outcome.became_empty {
            log::info!("Window {} lost its last tab", self.id);
            self.closing = true;
            self.workflow.cancel();
            requests.push(WindowRequest::Teardown);
        } else {
            requests.push(WindowRequest::SessionCheckpoint);
        }
        Ok(requests)
    }

    /// Remove a tab without destroying it, for adoption by another window.
    pub fn detach_tab(
        &mut self,
        index: usize,
    ) -> Result<(Tab, Vec<WindowRequest>), PolicyError> {
        let (tab, outcome) = self.tabs.detach(index)?;
        self.refresh_chrome();

        let mut requests = Vec::new();
        if outcome.became_empty {
            self.closing = true;
            self.workflow.cancel();
            requests.push(WindowRequest::Teardown);
        }
        Ok((tab, requests))
    }

    /// Adopt a tab detached from another window.
    pub fn adopt_tab(&mut self, tab: Tab, activate: bool) -> Result<TabId, PolicyError> {
        let id = tab.id;
        self.tabs.adopt(tab, None, activate)?;
        self.refresh_chrome();
        Ok(id)
    }

    pub fn activate_tab(&mut self, index: usize) -> Result<(), PolicyError> {
        self.tabs.activate(index)?;
        self.refresh_chrome();
        Ok(())
    }

    pub fn move_tab(&mut self, from: usize, to: usize) -> Result<(), PolicyError> {
        self.tabs.move_tab(from, to)
    }

    pub fn next_tab(&mut self) {
        self.tabs.next_tab();
        self.refresh_chrome();
    }

    pub fn prev_tab(&mut self) {
        self.tabs.prev_tab();
        self.refresh_chrome();
    }

    // ------------------------------------------------------------------
    // Active-tab commands (toolbar/menu adapters)
    // ------------------------------------------------------------------

    pub fn go_back(&mut self) {
        if let Some(tab) = self.tabs.active_tab_mut() {
            tab.embed_mut().go_back();
        }
    }

    pub fn go_forward(&mut self) {
        if let Some(tab) = self.tabs.active_tab_mut() {
            tab.embed_mut().go_forward();
        }
    }

    pub fn reload(&mut self, bypass_cache: bool) {
        if let Some(tab) = self.tabs.active_tab_mut() {
            tab.embed_mut().reload(bypass_cache);
        }
    }

    pub fn stop(&mut self) {
        if let Some(tab) = self.tabs.active_tab_mut() {
            tab.embed_mut().stop();
        }
    }

    pub fn zoom_in(&mut self) {
        if let Some(tab) = self.tabs.active_tab_mut() {
            tab.embed_mut().zoom_in();
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(tab) = self.tabs.active_tab_mut() {
            tab.embed_mut().zoom_out();
        }
    }

    pub fn zoom_reset(&mut self) {
        if let Some(tab) = self.tabs.active_tab_mut() {
            tab.embed_mut().zoom_reset();
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Ask the policy engine where a navigation goes and carry it out.
    ///
    /// `origin` is the tab the request came from (a link click); `None`
    /// means the window chrome (location bar, menu), which acts on the
    /// active tab.
    pub fn request_navigation(
        &mut self,
        origin: Option<TabId>,
        mut request: NavigationRequest,
    ) -> Vec<WindowRequest> {
        // The engine doesn't know what kind of window hosts it; fill in the
        // window-level facts before deciding.
        request.from_popup = self.mode.is_popup();
        request.app_origin = self.app_origin.clone();

        let disposition = navigation::decide(&request);
        log::debug!(
            "Window {}: navigation to {} -> {:?}",
            self.id,
            request.url,
            disposition
        );

        let mut requests = Vec::new();
        match disposition {
            Disposition::LoadInPlace => {
                let visit = VisitType::from(request.trigger);
                let target = origin.or(self.tabs.active_id());
                if let Some(tab) = target.and_then(|id| self.tabs.tab_by_id_mut(id)) {
                    tab.pending_visit = Some(visit);
                    tab.embed_mut().load(&request.url);
                }
            }
            Disposition::OpenNewTab { after_current } => {
                let position = if after_current {
                    self.tabs.active_index().map(|index| index + 1)
                } else {
                    None
                };
                // Opened in the background, like the original's
                // control-click behavior.
                match self.open_tab(Some(&request.url), position, false) {
                    Ok(tab) => {
                        if let Some(tab) = self.tabs.tab_by_id_mut(tab) {
                            tab.pending_visit = Some(VisitType::from(request.trigger));
                        }
                    }
                    Err(error) => {
                        // Popup windows cannot grow a second tab; loud
                        // rejection, the URL is surfaced instead of dropped.
                        log::error!("Window {}: cannot open tab: {}", self.id, error);
                        requests.push(WindowRequest::StatusMessage(format!(
                            "Unable to open {} in a new tab",
                            request.url
                        )));
                    }
                }
            }
            Disposition::OpenNewWindow => {
                requests.push(WindowRequest::OpenWindow {
                    url: request.url.clone(),
                    chrome: ChromeMask::from_config(&self.config),
                    popup: false,
                });
            }
            Disposition::DownloadIntent => {
                self.start_download(request.url.clone());
            }
            Disposition::HandOffToOs => {
                requests.push(WindowRequest::HandOffToOs {
                    url: request.url.clone(),
                });
            }
        }
        requests
    }

    // ------------------------------------------------------------------
    // Downloads
    // ------------------------------------------------------------------

    pub fn start_download(&mut self, uri: String) -> DownloadId {
        let id = self.downloads.start(uri);
        self.refresh_chrome();
        id
    }

    pub fn set_download_state(&mut self, id: DownloadId, state: DownloadState) {
        self.downloads.set_state(id, state);
        self.refresh_chrome();
    }

    pub fn update_download_progress(&mut self, id: DownloadId, received: u64, total: Option<u64>) {
        self.downloads.update_progress(id, received, total);
    }

    // ------------------------------------------------------------------
    // Chrome
    // ------------------------------------------------------------------

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        if self.fullscreen != fullscreen {
            self.fullscreen = fullscreen;
            self.refresh_chrome();
        }
    }

    pub fn set_chrome_mask(&mut self, mask: ChromeMask) {
        self.chrome_mask = mask;
        self.refresh_chrome();
    }

    // Full recomputation on every contributing change; visibility is never
    // patched incrementally.
    fn refresh_chrome(&mut self) {
        self.chrome = chrome::present(
            self.chrome_mask,
            self.mode.is_popup(),
            self.mode.is_application(),
            self.fullscreen,
            self.downloads.has_active(),
        );
    }

    // ------------------------------------------------------------------
    // Close workflow
    // ------------------------------------------------------------------

    /// Ask the window to close. The asynchronous confirmation workflow may
    /// produce prompt requests before the final `Teardown`.
    pub fn request_close(&mut self) -> Vec<WindowRequest> {
        let mut requests = Vec::new();
        if self.closing {
            return requests;
        }

        match self.workflow.begin(
            self.tabs.len(),
            self.config.confirm_close_dirty_forms,
            self.downloads_need_confirm(),
        ) {
            CloseRequestOutcome::AlreadyClosing => {
                log::debug!("Window {} is already closing", self.id);
            }
            CloseRequestOutcome::CheckingForms { attempt, token: _ } => {
                // Fan out one query per tab, in strip order. All queries go
                // out together; completions re-enter through the event
                // proxy.
                for tab in self.tabs.iter() {
                    let probe = FormsProbe::new(
                        self.proxy.clone(),
                        TabAddress {
                            window: self.id,
                            tab: tab.id,
                        },
                        attempt,
                    );
                    tab.embed().query_modified_forms(probe);
                }
            }
            CloseRequestOutcome::Effect(effect) => {
                self.apply_close_effect(Some(effect), &mut requests);
            }
        }
        requests
    }

    /// Answer from the "Close Document?" dialog.
    pub fn confirm_close_document(&mut self, confirmed: bool) -> Vec<WindowRequest> {
        let mut requests = Vec::new();
        let effect = self
            .workflow
            .on_document_response(confirmed, self.downloads_need_confirm());
        self.apply_close_effect(effect, &mut requests);
        requests
    }

    /// Answer from the "ongoing downloads will be cancelled" dialog.
    pub fn confirm_abort_downloads(&mut self, confirmed: bool) -> Vec<WindowRequest> {
        let mut requests = Vec::new();
        let effect = self.workflow.on_downloads_response(confirmed);
        self.apply_close_effect(effect, &mut requests);
        requests
    }

    /// Cancel a pending close attempt (the window is being destroyed
    /// through another path).
    pub fn cancel_close(&mut self) {
        self.workflow.cancel();
    }

    fn downloads_need_confirm(&self) -> bool {
        self.config.confirm_close_downloads && self.downloads.has_active()
    }

    fn apply_close_effect(&mut self, effect: Option<CloseEffect>, requests: &mut Vec<WindowRequest>) {
        match effect {
            Some(CloseEffect::PromptCloseDocument { tab }) => {
                // Bring the dirty tab to front so the user sees what the
                // dialog is about.
                self.tabs.activate_by_id(tab);
                self.refresh_chrome();
                requests.push(WindowRequest::PromptCloseDocument);
            }
            Some(CloseEffect::PromptAbortDownloads) => {
                requests.push(WindowRequest::PromptAbortDownloads);
            }
            Some(CloseEffect::Resolved(CloseResolution::Proceed)) => {
                self.closing = true;
                self.downloads.cancel_active();
                requests.push(WindowRequest::Teardown);
            }
            Some(CloseEffect::Resolved(CloseResolution::Abort)) | None => {}
        }
    }

    // ------------------------------------------------------------------
    // Engine events
    // ------------------------------------------------------------------

    /// Dispatch one engine event addressed to a tab of this window.
    pub fn handle_engine_event(&mut self, tab_id: TabId, event: EngineEvent) -> Vec<WindowRequest> {
        let mut requests = Vec::new();

        // Teardown already decided; late engine chatter is ignored.
        if self.closing {
            return requests;
        }

        match event {
            EngineEvent::NavigationRequested(request) => {
                return self.request_navigation(Some(tab_id), request);
            }
            EngineEvent::FormsQueryResolved { attempt, result } => {
                let downloads = self.downloads_need_confirm();
                let effect = self
                    .workflow
                    .on_forms_result(tab_id, attempt, result, downloads);
                self.apply_close_effect(effect, &mut requests);
            }
            EngineEvent::NewWindowRequested(chrome) => {
                requests.push(WindowRequest::OpenWindow {
                    url: String::new(),
                    chrome,
                    popup: true,
                });
            }
            EngineEvent::ModalAlertRequested => {
                // The engine is about to block on a dialog; its tab must be
                // frontmost first.
                self.tabs.activate_by_id(tab_id);
                self.refresh_chrome();
            }
            EngineEvent::NavigationRefused { url } => {
                requests.push(WindowRequest::StatusMessage(format!(
                    "Unable to open {}",
                    url
                )));
            }
            other => {
                let Some(tab) = self.tabs.tab_by_id_mut(tab_id) else {
                    log::debug!("Event for unknown tab {} in window {}", tab_id, self.id);
                    return requests;
                };

                tab.embed_mut().apply_event(&other);

                // A load that just went idle with an address is a committed
                // navigation: record the visit and checkpoint the session.
                if matches!(other, EngineEvent::LoadStateChanged(LoadState::Idle))
                    && !tab.url().is_empty()
                {
                    let visit = tab.pending_visit.take().unwrap_or(VisitType::Link);
                    requests.push(WindowRequest::RecordVisit {
                        url: tab.url().to_string(),
                        title: tab.title().to_string(),
                        visit,
                    });
                    requests.push(WindowRequest::SessionCheckpoint);
                }
            }
        }
        requests
    }
}
