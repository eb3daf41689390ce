//! Navigation policy: decide where a requested navigation is carried out.
//!
//! The decision is a pure function of the [`NavigationRequest`] value. It is
//! invoked from several call sites (link clicks, engine new-window callbacks,
//! the programmatic open-link API) and must give identical results for
//! identical inputs, so no mutable context is consulted here.

use url::Url;

/// Schemes the shell is willing to load itself. Anything else is handed to
/// the OS default handler.
pub const WEB_SCHEMES: &[&str] = &["http", "https", "ftp", "file"];

/// What caused a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationTrigger {
    /// The user clicked a link inside a page.
    LinkClick,
    /// The user typed an address into the location bar.
    TypedAddress,
    /// The user activated a bookmark.
    Bookmark,
    /// The shell itself asked for the load (session restore, home page).
    Programmatic,
}

/// Mouse/keyboard modifier state at the time of a link activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickModifiers {
    pub control: bool,
    pub shift: bool,
    pub middle_button: bool,
}

/// A single navigation request, constructed and consumed within one policy
/// evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationRequest {
    /// Target URL, as given by the engine or the user.
    pub url: String,
    pub trigger: NavigationTrigger,
    pub modifiers: ClickModifiers,
    /// Whether the requesting window is a chrome-restricted popup.
    pub from_popup: bool,
    /// The application origin when the process runs in single-site
    /// application mode, `None` otherwise.
    pub app_origin: Option<String>,
}

impl NavigationRequest {
    /// A plain request with no modifiers and no mode restrictions.
    pub fn new(url: impl Into<String>, trigger: NavigationTrigger) -> Self {
        Self {
            url: url.into(),
            trigger,
            modifiers: ClickModifiers::default(),
            from_popup: false,
            app_origin: None,
        }
    }
}

/// Where a requested navigation is actually carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Load in the tab that produced the request.
    LoadInPlace,
    /// Open a new tab; `after_current` places it right after the active tab.
    OpenNewTab { after_current: bool },
    /// Open a new browser window.
    OpenNewWindow,
    /// Suppress the navigation and download the target resource instead.
    DownloadIntent,
    /// Hand the URL to the OS default handler; the shell takes no further
    /// action.
    HandOffToOs,
}

/// Whether the shell would load this URL itself rather than defer to the OS.
pub fn is_recognized_web_scheme(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => WEB_SCHEMES.contains(&parsed.scheme()),
        Err(_) => false,
    }
}

/// Compare the origins (scheme, host, port) of two URLs.
///
/// Opaque origins (e.g. `file:` URLs) never compare equal, which keeps
/// application mode scoped to real web origins.
pub fn same_origin(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => {
            let (a, b) = (a.origin(), b.origin());
            a.is_tuple() && a == b
        }
        _ => false,
    }
}

/// Decide the disposition for a navigation request.
///
/// Rules are evaluated in order; the first match wins:
/// 1. unrecognized scheme: hand off to the OS
/// 2. application mode, target outside the app origin: hand off to the OS
/// 3. link click with control+shift, or from a popup with control: new window
/// 4. link click with control alone, or a middle click: new tab after the
///    current one
/// 5. link click with shift alone: download intent
/// 6. otherwise: load in place
pub fn decide(request: &NavigationRequest) -> Disposition {
    if !is_recognized_web_scheme(&request.url) {
        return Disposition::HandOffToOs;
    }

    if let Some(app_origin) = &request.app_origin
        && !same_origin(&request.url, app_origin)
    {
        return Disposition::HandOffToOs;
    }

    if request.trigger == NavigationTrigger::LinkClick {
        let m = request.modifiers;

        if (m.control && m.shift) || (request.from_popup && m.control) {
            return Disposition::OpenNewWindow;
        }

        if m.middle_button || (m.control && !m.shift) {
            return Disposition::OpenNewTab {
                after_current: true,
            };
        }

        if m.shift && !m.control {
            return Disposition::DownloadIntent;
        }
    }

    Disposition::LoadInPlace
}
