//! Close confirmation workflow.
//!
//! Before a window may be destroyed, every tab is asked (asynchronously)
//! whether it holds unsubmitted form data, and the window is checked for
//! ongoing downloads. Each hazard found surfaces one blocking confirmation.
//! The whole sequence is cancellable: a superseded or already-answered
//! round discards late query completions instead of acting on them.
//!
//! Only one close attempt per window is in flight at a time; a second
//! request while one is pending is rejected and the window is treated as
//! "still closing".

use crate::embed::QueryError;
use gossamer_config::TabId;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation token for one round of forms queries.
///
/// Cancelling does not abort engine work already in flight; it marks every
/// still-pending completion of this round as moot so it cannot mutate the
/// workflow or re-prompt.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Terminal outcome of a close attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseResolution {
    /// Destroy the window.
    Proceed,
    /// Leave the window untouched; it may be asked to close again at once.
    Abort,
}

/// What the embedding GUI must do next on behalf of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseEffect {
    /// A tab reported unsubmitted form data: bring it to front and show the
    /// blocking "Close Document?" confirmation.
    PromptCloseDocument { tab: TabId },
    /// Ongoing downloads exist: show the blocking "downloads will be
    /// cancelled" confirmation.
    PromptAbortDownloads,
    Resolved(CloseResolution),
}

/// Result of asking the workflow to start a close attempt.
#[derive(Debug)]
pub enum CloseRequestOutcome {
    /// An attempt is already pending; this request is dropped.
    AlreadyClosing,
    /// Per-tab forms queries must be dispatched, tagged with this attempt
    /// and gated by this token.
    CheckingForms { attempt: u64, token: CancelToken },
    /// The forms stage was skipped; act on the effect directly.
    Effect(CloseEffect),
}

#[derive(Debug)]
enum Phase {
    Idle,
    CheckingForms {
        /// Queries still awaiting an answer in this round.
        pending: usize,
    },
    AwaitingFormsConfirm {
        tab: TabId,
    },
    AwaitingDownloadsConfirm,
}

/// Per-window close workflow state.
///
/// Created with the window, reset to `Idle` every time an attempt resolves.
#[derive(Debug)]
pub struct CloseConfirmationWorkflow {
    phase: Phase,
    attempt: u64,
    token: CancelToken,
    force_close: bool,
}

impl Default for CloseConfirmationWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl CloseConfirmationWorkflow {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            attempt: 0,
            token: CancelToken::default(),
            force_close: false,
        }
    }

    /// Whether a close attempt is currently pending.
    pub fn in_flight(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Start a close attempt for a window with `tab_count` tabs.
    ///
    /// `check_forms` is false when the user configuration disables the
    /// dirty-forms confirmation; `downloads_need_confirm` reflects both the
    /// configuration and whether any download is still running.
    pub fn begin(
        &mut self,
        tab_count: usize,
        check_forms: bool,
        downloads_need_confirm: bool,
    ) -> CloseRequestOutcome {
        if self.in_flight() {
            log::debug!("Close requested while attempt {} is pending", self.attempt);
            return CloseRequestOutcome::AlreadyClosing;
        }

        self.attempt += 1;
        self.token = CancelToken::default();
        self.force_close = false;

        if check_forms && tab_count > 0 {
            self.phase = Phase::CheckingForms { pending: tab_count };
            log::debug!(
                "Close attempt {}: querying {} tab(s) for modified forms",
                self.attempt,
                tab_count
            );
            CloseRequestOutcome::CheckingForms {
                attempt: self.attempt,
                token: self.token.clone(),
            }
        } else {
            CloseRequestOutcome::Effect(self.enter_downloads_stage(downloads_need_confirm))
        }
    }

    /// Feed one modified-forms completion into the workflow.
    ///
    /// Completions from older attempts or from a cancelled round are
    /// discarded without touching any state. A failed query counts as a
    /// clean tab: a broken engine must never prevent the user from closing
    /// the window.
    pub fn on_forms_result(
        &mut self,
        tab: TabId,
        attempt: u64,
        result: Result<bool, QueryError>,
        downloads_need_confirm: bool,
    ) -> Option<CloseEffect> {
        if attempt != self.attempt || self.token.is_cancelled() {
            log::debug!("Discarding stale forms result for tab {}", tab);
            return None;
        }

        let pending = match self.phase {
            Phase::CheckingForms { pending } => pending,
            _ => {
                log::debug!("Forms result for tab {} outside CheckingForms", tab);
                return None;
            }
        };

        let dirty = match result {
            Ok(dirty) => dirty,
            Err(error) => {
                log::warn!("Modified-forms query for tab {} failed: {}", tab, error);
                false
            }
        };

        if dirty && !self.force_close {
            // The remaining in-flight queries are moot; their completions
            // must not re-prompt or advance the workflow.
            self.token.cancel();
            self.phase = Phase::AwaitingFormsConfirm { tab };
            log::info!("Tab {} has modified forms, asking for confirmation", tab);
            return Some(CloseEffect::PromptCloseDocument { tab });
        }

        let pending = pending - 1;
        if pending == 0 {
            log::debug!("All tabs reported clean forms");
            return Some(self.enter_downloads_stage(downloads_need_confirm));
        }
        self.phase = Phase::CheckingForms { pending };
        None
    }

    /// Answer the "Close Document?" confirmation.
    pub fn on_document_response(
        &mut self,
        confirmed: bool,
        downloads_need_confirm: bool,
    ) -> Option<CloseEffect> {
        let Phase::AwaitingFormsConfirm { .. } = self.phase else {
            log::debug!("Document response with no pending prompt");
            return None;
        };

        if !confirmed {
            return Some(self.resolve(CloseResolution::Abort));
        }

        self.force_close = true;
        Some(self.enter_downloads_stage(downloads_need_confirm))
    }

    /// Answer the "ongoing downloads will be cancelled" confirmation.
    pub fn on_downloads_response(&mut self, confirmed: bool) -> Option<CloseEffect> {
        let Phase::AwaitingDownloadsConfirm = self.phase else {
            log::debug!("Downloads response with no pending prompt");
            return None;
        };

        let resolution = if confirmed {
            CloseResolution::Proceed
        } else {
            CloseResolution::Abort
        };
        Some(self.resolve(resolution))
    }

    /// Cancel a pending attempt (the window is going away through another
    /// path, or the attempt is being superseded). Late completions become
    /// no-ops; nothing double-resolves.
    pub fn cancel(&mut self) {
        if self.in_flight() {
            log::debug!("Cancelling close attempt {}", self.attempt);
        }
        self.token.cancel();
        self.phase = Phase::Idle;
        self.force_close = false;
    }

    fn enter_downloads_stage(&mut self, downloads_need_confirm: bool) -> CloseEffect {
        if downloads_need_confirm {
            self.phase = Phase::AwaitingDownloadsConfirm;
            log::info!("Ongoing downloads, asking for confirmation");
            CloseEffect::PromptAbortDownloads
        } else {
            self.resolve(CloseResolution::Proceed)
        }
    }

    fn resolve(&mut self, resolution: CloseResolution) -> CloseEffect {
        log::info!("Close attempt {} resolved: {:?}", self.attempt, resolution);
        self.token.cancel();
        self.phase = Phase::Idle;
        self.force_close = false;
        CloseEffect::Resolved(resolution)
    }
}
