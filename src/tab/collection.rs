//! Ordered tab strip for a single window.
//!
//! Insertion order is display order. Activation keeps two invariants at all
//! times: exactly one tab is active whenever the collection is non-empty,
//! and at most one engine view carries the window's input wiring. Switching
//! detaches the outgoing view strictly before attaching the incoming one,
//! with no intervening yield, so no observer ever sees two wired views or
//! none while tabs exist.

use super::{Tab, TabId};

/// Caller-side invariant violations. These are programmer errors elsewhere
/// in the GUI and are rejected loudly, never silently coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("popup windows hold a single tab")]
    PopupSecondTab,

    #[error("tab index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Outcome of removing (or detaching) a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub removed: TabId,
    /// The collection transitioned to empty. The owner must tear the window
    /// down; an empty collection is not a valid steady state.
    pub became_empty: bool,
}

/// The ordered sequence of tabs owned by one window.
pub struct TabCollection {
    tabs: Vec<Tab>,
    active_tab_id: Option<TabId>,
    next_tab_id: TabId,
    popup: bool,
}

impl TabCollection {
    pub fn new(popup: bool) -> Self {
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
            next_tab_id: 1,
            popup,
        }
    }

    /// Reserve the id the next added tab will carry.
    ///
    /// Ids are handed out before the engine view is created so events can be
    /// tagged with their tab from the first callback.
    pub fn allocate_id(&mut self) -> TabId {
        let id = self.next_tab_id;
        self.next_tab_id += 1;
        id
    }

    /// Insert a tab at `position` (append when `None` or out of range).
    ///
    /// The tab becomes active when `activate_and_focus` is set, and always
    /// when the collection was empty; with `activate_and_focus` the engine
    /// view also receives input focus. Returns the insertion index.
    pub fn add(
        &mut self,
        tab: Tab,
        position: Option<usize>,
        activate_and_focus: bool,
    ) -> Result<usize, PolicyError> {
        if self.popup && !self.tabs.is_empty() {
            return Err(PolicyError::PopupSecondTab);
        }

        let was_empty = self.tabs.is_empty();
        let index = match position {
            Some(position) if position <= self.tabs.len() => position,
            _ => self.tabs.len(),
        };

        let id = tab.id;
        self.tabs.insert(index, tab);
        log::info!("Added tab {} at index {} (total: {})", id, index, self.tabs.len());

        if activate_and_focus || was_empty {
            self.activate_id(id);
            if activate_and_focus
                && let Some(tab) = self.tab_by_id_mut(id)
            {
                tab.embed_mut().focus();
            }
        }

        Ok(index)
    }

    /// Insert a tab that was detached from another window.
    ///
    /// The tab keeps its id; the id counter is bumped past it so later
    /// allocations in this collection cannot collide.
    pub fn adopt(
        &mut self,
        tab: Tab,
        position: Option<usize>,
        activate_and_focus: bool,
    ) -> Result<usize, PolicyError> {
        self.next_tab_id = self.next_tab_id.max(tab.id + 1);
        self.add(tab, position, activate_and_focus)
    }

    /// Remove and destroy the tab at `index`.
    ///
    /// When the active tab is removed, activation moves to the previous tab
    /// if one exists, else to the tab that now occupies `index`. The
    /// `became_empty` outcome is the collection's only signal that the
    /// window must go; removal itself never destroys the window.
    pub fn remove(&mut self, index: usize) -> Result<RemoveOutcome, PolicyError> {
        let (tab, outcome) = self.take(index)?;
        log::info!("Closing tab {} (index {})", tab.id, index);
        drop(tab);
        Ok(outcome)
    }

    /// Remove the tab at `index` without destroying it, for re-insertion
    /// into another window. The returned tab has its input wiring detached.
    pub fn detach(&mut self, index: usize) -> Result<(Tab, RemoveOutcome), PolicyError> {
        let (tab, outcome) = self.take(index)?;
        log::info!("Detached tab {} (index {}) for transfer", tab.id, index);
        Ok((tab, outcome))
    }

    fn take(&mut self, index: usize) -> Result<(Tab, RemoveOutcome), PolicyError> {
        self.check_index(index)?;

        let mut tab = self.tabs.remove(index);
        let was_active = self.active_tab_id == Some(tab.id);

        if was_active {
            // Detach the outgoing view before wiring the successor.
            tab.embed_mut().detach_wiring();
            self.active_tab_id = None;

            if !self.tabs.is_empty() {
                let successor = if index > 0 { index - 1 } else { 0 };
                let successor_id = self.tabs[successor].id;
                self.activate_id(successor_id);
            }
        }

        let outcome = RemoveOutcome {
            removed: tab.id,
            became_empty: self.tabs.is_empty(),
        };
        Ok((tab, outcome))
    }

    /// Reorder a tab. Activation follows the tab itself, not its index.
    pub fn move_tab(&mut self, from: usize, to: usize) -> Result<(), PolicyError> {
        self.check_index(from)?;

        let to = to.min(self.tabs.len() - 1);
        if from == to {
            return Ok(());
        }

        let tab = self.tabs.remove(from);
        log::debug!("Moved tab {} from index {} to {}", tab.id, from, to);
        self.tabs.insert(to, tab);
        Ok(())
    }

    /// Make the tab at `index` the active tab.
    ///
    /// A no-op when it already is: no detach/attach traffic is produced.
    pub fn activate(&mut self, index: usize) -> Result<(), PolicyError> {
        self.check_index(index)?;
        let id = self.tabs[index].id;
        self.activate_id(id);
        Ok(())
    }

    /// Activate a tab by id. Unknown ids are ignored.
    pub fn activate_by_id(&mut self, id: TabId) {
        if self.position_of(id).is_some() {
            self.activate_id(id);
        }
    }

    /// Cycle to the next tab in strip order, wrapping at the end.
    pub fn next_tab(&mut self) {
        self.cycle(1);
    }

    /// Cycle to the previous tab in strip order, wrapping at the start.
    pub fn prev_tab(&mut self) {
        self.cycle(-1);
    }

    fn cycle(&mut self, direction: isize) {
        if self.tabs.len() <= 1 {
            return;
        }
        if let Some(current) = self.active_index() {
            let len = self.tabs.len() as isize;
            let next = (current as isize + direction).rem_euclid(len) as usize;
            let id = self.tabs[next].id;
            self.activate_id(id);
        }
    }

    // Deactivate-then-activate pairing. The detach of the outgoing view
    // completes fully before the incoming view is attached; there is no
    // suspension point in between.
    fn activate_id(&mut self, id: TabId) {
        if self.active_tab_id == Some(id) {
            return;
        }

        if let Some(old_id) = self.active_tab_id
            && let Some(old) = self.tab_by_id_mut(old_id)
        {
            old.embed_mut().detach_wiring();
        }

        if let Some(new) = self.tab_by_id_mut(id) {
            new.embed_mut().attach_wiring();
            self.active_tab_id = Some(id);
            log::debug!("Activated tab {}", id);
        }
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn is_popup(&self) -> bool {
        self.popup
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.active_tab_id
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_tab_id.and_then(|id| self.position_of(id))
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id.and_then(|id| self.tab_by_id(id))
    }

    pub fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        let id = self.active_tab_id?;
        self.tab_by_id_mut(id)
    }

    pub fn get(&self, index: usize) -> Option<&Tab> {
        self.tabs.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Tab> {
        self.tabs.get_mut(index)
    }

    pub fn tab_by_id(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    pub fn tab_by_id_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| tab.id == id)
    }

    pub fn position_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    fn check_index(&self, index: usize) -> Result<(), PolicyError> {
        if index >= self.tabs.len() {
            return Err(PolicyError::IndexOutOfRange {
                index,
                len: self.tabs.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::test_support::{Journal, RecordingView, ViewCall, ViewLog};
    use crate::embed::EmbedHandle;
    use std::rc::Rc;

    fn push_tab(collection: &mut TabCollection) -> (TabId, Rc<ViewLog>) {
        let (view, log) = RecordingView::new();
        let id = collection.allocate_id();
        collection
            .add(Tab::new(id, EmbedHandle::new(Box::new(view))), None, false)
            .unwrap();
        (id, log)
    }

    fn push_tab_journaled(collection: &mut TabCollection, journal: &Journal) -> TabId {
        let id = collection.allocate_id();
        let (view, _log) = RecordingView::with_journal(&id.to_string(), Rc::clone(journal));
        collection
            .add(Tab::new(id, EmbedHandle::new(Box::new(view))), None, false)
            .unwrap();
        id
    }

    fn collection_with(count: usize) -> TabCollection {
        let mut collection = TabCollection::new(false);
        for _ in 0..count {
            push_tab(&mut collection);
        }
        collection
    }

    #[test]
    fn first_tab_becomes_active_without_flag() {
        let mut collection = TabCollection::new(false);
        let (id, log) = push_tab(&mut collection);

        assert_eq!(collection.active_id(), Some(id));
        // Wired but not focused: activation came from the emptiness rule.
        assert_eq!(log.calls.borrow().as_slice(), &[ViewCall::SetWired(true)]);
    }

    #[test]
    fn add_with_focus_wires_and_focuses() {
        let mut collection = TabCollection::new(false);
        let (view, log) = RecordingView::new();
        let id = collection.allocate_id();
        collection
            .add(Tab::new(id, EmbedHandle::new(Box::new(view))), None, true)
            .unwrap();

        assert_eq!(
            log.calls.borrow().as_slice(),
            &[ViewCall::SetWired(true), ViewCall::Focus]
        );
    }

    #[test]
    fn out_of_range_position_appends() {
        let mut collection = collection_with(2);
        let (view, _log) = RecordingView::new();
        let id = collection.allocate_id();
        let index = collection
            .add(
                Tab::new(id, EmbedHandle::new(Box::new(view))),
                Some(99),
                false,
            )
            .unwrap();
        assert_eq!(index, 2);
    }

    #[test]
    fn popup_refuses_second_tab() {
        let mut collection = TabCollection::new(true);
        push_tab(&mut collection);

        let (view, _log) = RecordingView::new();
        let id = collection.allocate_id();
        let result = collection.add(Tab::new(id, EmbedHandle::new(Box::new(view))), None, true);
        assert_eq!(result, Err(PolicyError::PopupSecondTab));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn active_index_stays_in_bounds() {
        let mut collection = collection_with(4);
        collection.activate(3).unwrap();

        while !collection.is_empty() {
            let active = collection.active_index().unwrap();
            assert!(active < collection.len());
            collection.remove(active).unwrap();
        }
        assert_eq!(collection.active_id(), None);
    }

    #[test]
    fn removing_active_tab_selects_previous_neighbor() {
        // Scenario: four tabs, active at index 2; after removal the active
        // tab is the one that sat at index 1.
        let mut collection = collection_with(4);
        collection.activate(2).unwrap();
        let expected = collection.get(1).unwrap().id;

        let outcome = collection.remove(2).unwrap();
        assert!(!outcome.became_empty);
        assert_eq!(collection.active_index(), Some(1));
        assert_eq!(collection.active_id(), Some(expected));
    }

    #[test]
    fn removing_active_first_tab_selects_following() {
        let mut collection = collection_with(3);
        collection.activate(0).unwrap();
        let following = collection.get(1).unwrap().id;

        collection.remove(0).unwrap();
        assert_eq!(collection.active_id(), Some(following));
        assert_eq!(collection.active_index(), Some(0));
    }

    #[test]
    fn removing_inactive_tab_keeps_activation() {
        let mut collection = collection_with(3);
        collection.activate(2).unwrap();
        let active = collection.active_id();

        collection.remove(0).unwrap();
        assert_eq!(collection.active_id(), active);
        assert_eq!(collection.active_index(), Some(1));
    }

    #[test]
    fn removing_last_tab_reports_empty_exactly_once() {
        let mut collection = collection_with(1);
        let outcome = collection.remove(0).unwrap();
        assert!(outcome.became_empty);
        assert!(collection.is_empty());
        assert_eq!(collection.active_id(), None);
    }

    #[test]
    fn activate_out_of_range_is_rejected() {
        let mut collection = collection_with(2);
        assert_eq!(
            collection.activate(5),
            Err(PolicyError::IndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn activate_is_idempotent() {
        let journal: Journal = Default::default();
        let mut collection = TabCollection::new(false);
        push_tab_journaled(&mut collection, &journal);
        push_tab_journaled(&mut collection, &journal);

        collection.activate(1).unwrap();
        let events_after_first = journal.borrow().len();

        // Second activation of the already-active index: no wiring traffic.
        collection.activate(1).unwrap();
        assert_eq!(journal.borrow().len(), events_after_first);
    }

    #[test]
    fn activation_detaches_old_before_attaching_new() {
        let journal: Journal = Default::default();
        let mut collection = TabCollection::new(false);
        let first = push_tab_journaled(&mut collection, &journal);
        let second = push_tab_journaled(&mut collection, &journal);

        journal.borrow_mut().clear();
        collection.activate(1).unwrap();

        let entries = journal.borrow();
        assert_eq!(
            entries.as_slice(),
            &[
                (first.to_string(), ViewCall::SetWired(false)),
                (second.to_string(), ViewCall::SetWired(true)),
            ]
        );
    }

    #[test]
    fn move_tab_preserves_active_identity() {
        let mut collection = collection_with(3);
        collection.activate(0).unwrap();
        let active = collection.active_id();

        collection.move_tab(0, 2).unwrap();
        assert_eq!(collection.active_id(), active);
        assert_eq!(collection.active_index(), Some(2));
    }

    #[test]
    fn move_tab_clamps_target() {
        let mut collection = collection_with(3);
        let first = collection.get(0).unwrap().id;
        collection.move_tab(0, 99).unwrap();
        assert_eq!(collection.get(2).unwrap().id, first);
    }

    #[test]
    fn cycling_wraps_in_both_directions() {
        let mut collection = collection_with(3);
        collection.activate(2).unwrap();

        collection.next_tab();
        assert_eq!(collection.active_index(), Some(0));

        collection.prev_tab();
        assert_eq!(collection.active_index(), Some(2));
    }

    #[test]
    fn detach_returns_live_tab_with_wiring_detached() {
        let mut collection = collection_with(2);
        collection.activate(1).unwrap();

        let (tab, outcome) = collection.detach(1).unwrap();
        assert!(!tab.embed().is_wired());
        assert!(!outcome.became_empty);
        assert_eq!(collection.len(), 1);

        // The detached tab can join another collection and become active.
        let mut other = TabCollection::new(false);
        other.add(tab, None, true).unwrap();
        assert_eq!(other.active_index(), Some(0));
    }
}
