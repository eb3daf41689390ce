//! History visit recording.
//!
//! Storage is an opaque collaborator: the controller records committed
//! navigations through [`HistoryStore`] and never blocks on the backend.
//! The in-memory store is the default when no persistent backend is wired
//! in (and what the tests observe).

use crate::navigation::NavigationTrigger;

/// How a page was reached, for history weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitType {
    Link,
    Typed,
    Bookmark,
    Redirect,
}

impl From<NavigationTrigger> for VisitType {
    fn from(trigger: NavigationTrigger) -> Self {
        match trigger {
            NavigationTrigger::LinkClick => VisitType::Link,
            NavigationTrigger::TypedAddress => VisitType::Typed,
            NavigationTrigger::Bookmark => VisitType::Bookmark,
            NavigationTrigger::Programmatic => VisitType::Redirect,
        }
    }
}

/// A recorded visit.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitRecord {
    pub url: String,
    pub title: String,
    pub visit: VisitType,
}

/// Sink for committed navigations.
pub trait HistoryStore {
    fn record_visit(&mut self, url: &str, title: &str, visit: VisitType);
}

/// In-memory visit log.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    visits: Vec<VisitRecord>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> &[VisitRecord] {
        &self.visits
    }
}

impl HistoryStore for MemoryHistory {
    fn record_visit(&mut self, url: &str, title: &str, visit: VisitType) {
        log::debug!("Recording {:?} visit to {}", visit, url);
        self.visits.push(VisitRecord {
            url: url.to_string(),
            title: title.to_string(),
            visit,
        });
    }
}
