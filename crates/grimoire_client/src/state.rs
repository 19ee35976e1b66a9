//! View-local state container.
//!
//! # Invariants
//! - Only the completion of the most recent load may change `records`.
//! - A failed load keeps the previously displayed records.

use crate::query::ListControls;
use crate::view::ViewEntity;
use grimoire_core::query::AppliedFilters;
use grimoire_core::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Displaying,
}

/// Handle of one list load, ordered by issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone)]
pub struct ViewState<R> {
    phase: Phase,
    records: Vec<R>,
    error: Option<String>,
    controls: ListControls,
    applied: Option<AppliedFilters>,
    generation: u64,
    fallback: bool,
}

impl<R> Default for ViewState<R> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            records: Vec::new(),
            error: None,
            controls: ListControls::default(),
            applied: None,
            generation: 0,
            fallback: false,
        }
    }
}

impl<R> ViewState<R> {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Inline error indicator of the last load, if it failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn controls(&self) -> &ListControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut ListControls {
        &mut self.controls
    }

    /// Filter echo the server reported for the displayed records.
    pub fn applied_filters(&self) -> Option<&AppliedFilters> {
        self.applied.as_ref()
    }

    /// True while local sample records stand in for server data.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.phase = Phase::Loading;
        LoadTicket(self.generation)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Displays `records`. Returns false and changes nothing for a stale ticket.
    pub fn complete_load(&mut self, ticket: LoadTicket, records: Vec<R>) -> bool {
        self.complete_listing(ticket, records, None)
    }

    /// Displays server `records` together with the filter echo they came with.
    pub fn complete_listing(
        &mut self,
        ticket: LoadTicket,
        records: Vec<R>,
        applied: Option<AppliedFilters>,
    ) -> bool {
        let current = self.finish(ticket, Some(records), None, false);
        if current {
            self.applied = applied;
        }
        current
    }

    /// Shows `message` inline and keeps the displayed records.
    pub fn fail_load(&mut self, ticket: LoadTicket, message: impl Into<String>) -> bool {
        self.finish(ticket, None, Some(message.into()), false)
    }

    /// Displays local sample `records` with `message` as the indicator.
    pub fn complete_with_fallback(
        &mut self,
        ticket: LoadTicket,
        records: Vec<R>,
        message: impl Into<String>,
    ) -> bool {
        let current = self.finish(ticket, Some(records), Some(message.into()), true);
        if current {
            self.applied = None;
        }
        current
    }

    fn finish(
        &mut self,
        ticket: LoadTicket,
        records: Option<Vec<R>>,
        error: Option<String>,
        fallback: bool,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        if let Some(records) = records {
            self.records = records;
            self.fallback = fallback;
        }
        self.error = error;
        self.phase = Phase::Displaying;
        true
    }
}

impl<R: ViewEntity> ViewState<R> {
    pub fn find(&self, id: RecordId) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Phase, ViewState};

    #[test]
    fn stale_completion_is_discarded() {
        let mut state: ViewState<&str> = ViewState::default();
        let first = state.begin_load();
        let second = state.begin_load();

        assert!(state.complete_load(second, vec!["new"]));
        assert!(!state.complete_load(first, vec!["old"]));
        assert_eq!(state.records(), ["new"]);
        assert_eq!(state.phase(), Phase::Displaying);
    }

    #[test]
    fn failure_keeps_previous_records() {
        let mut state: ViewState<&str> = ViewState::default();
        let ticket = state.begin_load();
        state.complete_load(ticket, vec!["Lumos"]);

        let ticket = state.begin_load();
        assert_eq!(state.phase(), Phase::Loading);
        state.fail_load(ticket, "server error");
        assert_eq!(state.records(), ["Lumos"]);
        assert_eq!(state.error(), Some("server error"));
        assert_eq!(state.phase(), Phase::Displaying);
    }

    #[test]
    fn successful_load_clears_error_and_fallback() {
        let mut state: ViewState<&str> = ViewState::default();
        let ticket = state.begin_load();
        state.complete_with_fallback(ticket, vec!["sample"], "offline");
        assert!(state.is_fallback());

        let ticket = state.begin_load();
        state.complete_load(ticket, Vec::new());
        assert!(!state.is_fallback());
        assert_eq!(state.error(), None);
    }
}
