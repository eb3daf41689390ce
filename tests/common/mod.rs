//! Shared test doubles: a scriptable engine backend plus recording
//! implementations of the shell's collaborator seams.
#![allow(dead_code)]

use gossamer::embed::{
    EngineEvent, EngineView, EventProxy, FormsProbe, LoadState, QueryError, TabAddress,
};
use gossamer::engine::EngineBackend;
use gossamer::history::{HistoryStore, VisitType};
use gossamer::shell::ExternalOpener;
use std::cell::RefCell;
use std::rc::Rc;

/// How a scripted view answers a modified-forms query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormsAnswer {
    /// Resolve immediately with "no modified forms".
    Clean,
    /// Resolve immediately with "has modified forms".
    Dirty,
    /// Resolve immediately with a query failure.
    Fail,
    /// Park the probe for the test to resolve by hand.
    Park,
}

#[derive(Default)]
pub struct BackendState {
    /// Per-view forms answers, keyed by view creation order. Views beyond
    /// the scripted range answer `Clean`.
    pub answers: Vec<FormsAnswer>,
    pub views_created: usize,
    /// Probes held back by `FormsAnswer::Park`, in arrival order.
    pub parked: Vec<(TabAddress, FormsProbe)>,
}

/// Engine backend whose views answer forms queries from a script and
/// acknowledge loads with synthetic progress events.
pub struct ScriptedBackend {
    pub state: Rc<RefCell<BackendState>>,
}

impl ScriptedBackend {
    pub fn new(answers: Vec<FormsAnswer>) -> (Self, Rc<RefCell<BackendState>>) {
        let state = Rc::new(RefCell::new(BackendState {
            answers,
            ..Default::default()
        }));
        (
            Self {
                state: Rc::clone(&state),
            },
            state,
        )
    }
}

impl EngineBackend for ScriptedBackend {
    fn create_view(&self, address: TabAddress, proxy: EventProxy) -> Box<dyn EngineView> {
        let index = {
            let mut state = self.state.borrow_mut();
            let index = state.views_created;
            state.views_created += 1;
            index
        };
        Box::new(ScriptedView {
            address,
            proxy,
            index,
            state: Rc::clone(&self.state),
        })
    }
}

pub struct ScriptedView {
    address: TabAddress,
    proxy: EventProxy,
    index: usize,
    state: Rc<RefCell<BackendState>>,
}

impl ScriptedView {
    fn commit(&self, url: &str) {
        self.proxy
            .send(self.address, EngineEvent::LoadStateChanged(LoadState::Loading));
        self.proxy
            .send(self.address, EngineEvent::AddressChanged(url.to_string()));
        self.proxy
            .send(self.address, EngineEvent::TitleChanged(url.to_string()));
        self.proxy
            .send(self.address, EngineEvent::LoadStateChanged(LoadState::Idle));
    }
}

impl EngineView for ScriptedView {
    fn load(&mut self, url: &str) {
        self.commit(url);
    }

    fn stop(&mut self) {}

    fn go_back(&mut self) {}

    fn go_forward(&mut self) {}

    fn reload(&mut self, _bypass_cache: bool) {}

    fn set_zoom(&mut self, _level: f32) {}

    fn set_wired(&mut self, _wired: bool) {}

    fn focus(&mut self) {}

    fn query_modified_forms(&self, probe: FormsProbe) {
        let answer = {
            let state = self.state.borrow();
            state
                .answers
                .get(self.index)
                .copied()
                .unwrap_or(FormsAnswer::Clean)
        };
        match answer {
            FormsAnswer::Clean => probe.resolve(Ok(false)),
            FormsAnswer::Dirty => probe.resolve(Ok(true)),
            FormsAnswer::Fail => probe.resolve(Err(QueryError("scripted failure".into()))),
            FormsAnswer::Park => {
                self.state.borrow_mut().parked.push((self.address, probe));
            }
        }
    }
}

/// Records every URL handed to the OS instead of opening anything.
pub struct RecordingOpener {
    pub opened: Rc<RefCell<Vec<String>>>,
}

impl RecordingOpener {
    pub fn new() -> (Self, Rc<RefCell<Vec<String>>>) {
        let opened = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                opened: Rc::clone(&opened),
            },
            opened,
        )
    }
}

impl ExternalOpener for RecordingOpener {
    fn open(&self, url: &str) -> anyhow::Result<()> {
        self.opened.borrow_mut().push(url.to_string());
        Ok(())
    }
}

/// History store backed by a shared vector the test can inspect.
pub struct RecordingHistory {
    pub visits: Rc<RefCell<Vec<(String, VisitType)>>>,
}

impl RecordingHistory {
    pub fn new() -> (Self, Rc<RefCell<Vec<(String, VisitType)>>>) {
        let visits = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                visits: Rc::clone(&visits),
            },
            visits,
        )
    }
}

impl HistoryStore for RecordingHistory {
    fn record_visit(&mut self, url: &str, _title: &str, visit: VisitType) {
        self.visits.borrow_mut().push((url.to_string(), visit));
    }
}
