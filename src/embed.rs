//! Engine view wrapper and the typed event interface between the rendering
//! engine and the session controller.
//!
//! The engine itself (layout, JavaScript, networking) is an external
//! collaborator behind the [`EngineView`] trait. Each tab owns exactly one
//! [`EmbedHandle`] wrapping one view; engine callbacks re-enter the shell's
//! main loop as [`EngineEvent`] values through a cloneable [`EventProxy`],
//! replacing the signal-registry fan-out a GUI toolkit would provide.

use crate::chrome::ChromeMask;
use crate::navigation::NavigationRequest;
use gossamer_config::{TabId, WindowId};
use std::sync::mpsc;

/// Smallest and largest page zoom the shell will ask for.
pub const ZOOM_MIN: f32 = 0.25;
pub const ZOOM_MAX: f32 = 4.0;
/// Multiplicative zoom step for zoom-in/zoom-out.
pub const ZOOM_STEP: f32 = 1.25;

/// Load state reported by the engine view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
}

/// Security level the engine reports for the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityLevel {
    #[default]
    Unknown,
    Insecure,
    Broken,
    Secure,
}

/// Navigation capability flags for the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavCapabilities {
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

/// A modified-forms (or similar) engine query failed.
///
/// Recoverable by design: the close workflow treats a failed query as a
/// clean answer, so a degraded engine never wedges window close.
#[derive(Debug, Clone, thiserror::Error)]
#[error("engine query failed: {0}")]
pub struct QueryError(pub String);

/// Address of a tab within the shell: which window, which tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabAddress {
    pub window: WindowId,
    pub tab: TabId,
}

/// Events an engine view surfaces to the session controller.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The engine asks where a navigation should be carried out.
    NavigationRequested(NavigationRequest),
    LoadStateChanged(LoadState),
    TitleChanged(String),
    AddressChanged(String),
    IconChanged(Option<String>),
    SecurityLevelChanged(SecurityLevel),
    StatusMessageChanged(Option<String>),
    NavigationFlagsChanged(NavCapabilities),
    /// The engine wants a new window (e.g. `window.open`) with the given
    /// chrome; the shell answers by creating a popup window with a fresh
    /// view.
    NewWindowRequested(ChromeMask),
    /// The engine is about to show a modal alert; the owning tab must be
    /// brought to front first.
    ModalAlertRequested,
    /// The engine declined a navigation; surfaced as a status message, the
    /// tab stays on its prior page.
    NavigationRefused { url: String },
    /// Completion of an asynchronous modified-forms query.
    FormsQueryResolved {
        attempt: u64,
        result: Result<bool, QueryError>,
    },
}

/// An engine event tagged with the tab it came from, as it travels through
/// the shell's event queue.
#[derive(Debug, Clone)]
pub struct TaggedEvent {
    pub source: TabAddress,
    pub event: EngineEvent,
}

/// Cloneable sender handed to engine adapters. Engine callbacks and async
/// completions re-enter the main loop through it; the shell drains the
/// paired receiver once per turn.
#[derive(Clone)]
pub struct EventProxy {
    sender: mpsc::Sender<TaggedEvent>,
}

impl EventProxy {
    pub fn send(&self, source: TabAddress, event: EngineEvent) {
        // A closed receiver means the shell is shutting down; late engine
        // callbacks are dropped on the floor.
        let _ = self.sender.send(TaggedEvent { source, event });
    }
}

/// Create the event channel connecting engine adapters to the shell.
pub fn event_channel() -> (EventProxy, mpsc::Receiver<TaggedEvent>) {
    let (sender, receiver) = mpsc::channel();
    (EventProxy { sender }, receiver)
}

/// One-shot completion handle for a modified-forms query.
///
/// The engine adapter resolves it from wherever the answer becomes
/// available; the result re-enters the main loop through the event proxy
/// and is matched against the issuing close attempt by `attempt`.
pub struct FormsProbe {
    proxy: EventProxy,
    source: TabAddress,
    attempt: u64,
}

impl FormsProbe {
    pub(crate) fn new(proxy: EventProxy, source: TabAddress, attempt: u64) -> Self {
        Self {
            proxy,
            source,
            attempt,
        }
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn resolve(self, result: Result<bool, QueryError>) {
        self.proxy.send(
            self.source,
            EngineEvent::FormsQueryResolved {
                attempt: self.attempt,
                result,
            },
        );
    }
}

/// Commands the core sends to one rendering-engine view.
///
/// Implementations translate these into whatever the embedded engine
/// actually speaks and report back through the event proxy they were
/// created with.
pub trait EngineView {
    fn load(&mut self, url: &str);
    fn stop(&mut self);
    fn go_back(&mut self);
    fn go_forward(&mut self);
    fn reload(&mut self, bypass_cache: bool);
    fn set_zoom(&mut self, level: f32);

    /// Attach or detach the window's input-event wiring. At most one view
    /// per window is wired at any time.
    fn set_wired(&mut self, wired: bool);

    /// Give the view keyboard focus.
    fn focus(&mut self);

    /// Ask whether the page holds unsubmitted form data. The answer arrives
    /// asynchronously via the probe; it is never cached.
    fn query_modified_forms(&self, probe: FormsProbe);
}

/// Wraps one engine view and caches the page state the chrome needs.
///
/// Ownership is exclusive to the tab slot holding the handle. Teardown is
/// deterministic: input wiring is detached before the view is dropped, so
/// the engine never calls back into a half-dead tab.
pub struct EmbedHandle {
    view: Box<dyn EngineView>,
    url: String,
    title: String,
    load_state: LoadState,
    nav: NavCapabilities,
    security: SecurityLevel,
    status_message: Option<String>,
    icon_url: Option<String>,
    zoom: f32,
    wired: bool,
}

impl EmbedHandle {
    pub fn new(view: Box<dyn EngineView>) -> Self {
        Self {
            view,
            url: String::new(),
            title: String::new(),
            load_state: LoadState::Idle,
            nav: NavCapabilities::default(),
            security: SecurityLevel::Unknown,
            status_message: None,
            icon_url: None,
            zoom: 1.0,
            wired: false,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Page title, or "Untitled" while the page has not provided one.
    pub fn title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    pub fn nav_capabilities(&self) -> NavCapabilities {
        self.nav
    }

    pub fn security_level(&self) -> SecurityLevel {
        self.security
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn icon_url(&self) -> Option<&str> {
        self.icon_url.as_deref()
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn is_wired(&self) -> bool {
        self.wired
    }

    pub fn load(&mut self, url: &str) {
        self.view.load(url);
    }

    pub fn stop(&mut self) {
        self.view.stop();
    }

    pub fn go_back(&mut self) {
        self.view.go_back();
    }

    pub fn go_forward(&mut self) {
        self.view.go_forward();
    }

    pub fn reload(&mut self, bypass_cache: bool) {
        self.view.reload(bypass_cache);
    }

    pub fn set_zoom(&mut self, level: f32) {
        let clamped = level.clamp(ZOOM_MIN, ZOOM_MAX);
        if (clamped - self.zoom).abs() > f32::EPSILON {
            self.zoom = clamped;
            self.view.set_zoom(clamped);
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    pub fn zoom_reset(&mut self) {
        self.set_zoom(1.0);
    }

    pub fn focus(&mut self) {
        self.view.focus();
    }

    pub fn query_modified_forms(&self, probe: FormsProbe) {
        self.view.query_modified_forms(probe);
    }

    /// Attach the window's input wiring to this view. Idempotent.
    pub(crate) fn attach_wiring(&mut self) {
        if !self.wired {
            self.wired = true;
            self.view.set_wired(true);
        }
    }

    /// Detach the window's input wiring from this view. Idempotent.
    pub(crate) fn detach_wiring(&mut self) {
        if self.wired {
            self.wired = false;
            self.view.set_wired(false);
        }
    }

    /// Fold an engine event into the cached page state.
    pub(crate) fn apply_event(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::LoadStateChanged(state) => self.load_state = *state,
            EngineEvent::TitleChanged(title) => self.title = title.clone(),
            EngineEvent::AddressChanged(url) => self.url = url.clone(),
            EngineEvent::SecurityLevelChanged(level) => self.security = *level,
            EngineEvent::StatusMessageChanged(message) => {
                self.status_message = message.clone();
            }
            EngineEvent::IconChanged(icon_url) => self.icon_url = icon_url.clone(),
            EngineEvent::NavigationFlagsChanged(nav) => self.nav = *nav,
            _ => {}
        }
    }
}

impl Drop for EmbedHandle {
    fn drop(&mut self) {
        // Listener teardown before the view goes away.
        self.detach_wiring();
    }
}
