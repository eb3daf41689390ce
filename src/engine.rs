//! Engine runtime lifecycle and the offline placeholder backend.
//!
//! The real rendering engine lives outside this crate; adapters implement
//! [`EngineBackend`] to hand out views. Engine startup/shutdown timing is
//! owned by [`EngineRuntime`]: the engine comes up when the first window
//! acquires a guard and goes down when the last guard drops, instead of
//! being steered by ad hoc global counters.

use crate::embed::{
    EngineEvent, EngineView, EventProxy, FormsProbe, LoadState, NavCapabilities, TabAddress,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Creates engine views for new tabs.
pub trait EngineBackend {
    fn create_view(&self, address: TabAddress, proxy: EventProxy) -> Box<dyn EngineView>;
}

struct RuntimeInner {
    active: Mutex<usize>,
}

/// Process-wide engine lifecycle, expressed as a refcounted resource.
pub struct EngineRuntime {
    inner: Arc<RuntimeInner>,
}

impl Default for EngineRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineRuntime {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RuntimeInner {
                active: Mutex::new(0),
            }),
        }
    }

    /// Take a reference to the engine for the lifetime of one window.
    pub fn acquire(&self) -> EngineGuard {
        let mut active = self.inner.active.lock();
        *active += 1;
        if *active == 1 {
            log::info!("Engine runtime starting (first window)");
        }
        EngineGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn active_windows(&self) -> usize {
        *self.inner.active.lock()
    }
}

/// Keeps the engine alive while held. Dropped with the owning window.
pub struct EngineGuard {
    inner: Arc<RuntimeInner>,
}

impl Drop for EngineGuard {
    fn drop(&mut self) {
        let mut active = self.inner.active.lock();
        *active -= 1;
        if *active == 0 {
            log::info!("Engine runtime shutting down (last window closed)");
        }
    }
}

/// Backend used when no rendering engine is compiled in: the headless shell
/// binary and smoke tests run against it.
pub struct OfflineBackend {
    runtime: Arc<Runtime>,
}

impl OfflineBackend {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self { runtime }
    }
}

impl EngineBackend for OfflineBackend {
    fn create_view(&self, address: TabAddress, proxy: EventProxy) -> Box<dyn EngineView> {
        Box::new(OfflineView {
            address,
            proxy,
            runtime: Arc::clone(&self.runtime),
            current: None,
            back: Vec::new(),
            forward: Vec::new(),
        })
    }
}

/// Placeholder view: acknowledges navigation commands with synthetic
/// progress events and keeps a session-local back/forward list so the
/// navigation chrome has real flags to reflect.
pub struct OfflineView {
    address: TabAddress,
    proxy: EventProxy,
    runtime: Arc<Runtime>,
    current: Option<String>,
    back: Vec<String>,
    forward: Vec<String>,
}

impl OfflineView {
    fn commit(&mut self, url: String) {
        self.proxy
            .send(self.address, EngineEvent::LoadStateChanged(LoadState::Loading));
        self.proxy
            .send(self.address, EngineEvent::AddressChanged(url.clone()));
        self.proxy
            .send(self.address, EngineEvent::TitleChanged(display_title(&url)));
        self.current = Some(url);
        self.proxy
            .send(self.address, EngineEvent::LoadStateChanged(LoadState::Idle));
        self.sync_nav_flags();
    }

    fn sync_nav_flags(&self) {
        self.proxy.send(
            self.address,
            EngineEvent::NavigationFlagsChanged(NavCapabilities {
                can_go_back: !self.back.is_empty(),
                can_go_forward: !self.forward.is_empty(),
            }),
        );
    }
}

impl EngineView for OfflineView {
    fn load(&mut self, url: &str) {
        if let Some(current) = self.current.take() {
            self.back.push(current);
        }
        self.forward.clear();
        self.commit(url.to_string());
    }

    fn stop(&mut self) {
        self.proxy
            .send(self.address, EngineEvent::LoadStateChanged(LoadState::Idle));
    }

    fn go_back(&mut self) {
        let Some(previous) = self.back.pop() else {
            return;
        };
        if let Some(current) = self.current.take() {
            self.forward.push(current);
        }
        self.commit(previous);
    }

    fn go_forward(&mut self) {
        let Some(next) = self.forward.pop() else {
            return;
        };
        if let Some(current) = self.current.take() {
            self.back.push(current);
        }
        self.commit(next);
    }

    fn reload(&mut self, _bypass_cache: bool) {
        if let Some(current) = self.current.clone() {
            self.commit(current);
        }
    }

    fn set_zoom(&mut self, _level: f32) {}

    fn set_wired(&mut self, _wired: bool) {}

    fn focus(&mut self) {}

    fn query_modified_forms(&self, probe: FormsProbe) {
        // There are no forms to consult; resolve clean from the runtime so
        // the answer arrives on a later main-loop turn, the way a real
        // engine's would.
        self.runtime.spawn(async move {
            probe.resolve(Ok(false));
        });
    }
}

/// Human-readable fallback title for a URL.
fn display_title(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => parsed
            .host_str()
            .map(|host| host.to_string())
            .unwrap_or_else(|| url.to_string()),
        Err(_) => url.to_string(),
    }
}
