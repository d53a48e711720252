//! This module contains the guided-tour navigator, a small state machine
//! that sequences a user through a ranked hotspot list one step at a time.
//!
//! # Session Scope
//!
//! A navigator is owned by exactly one logical analysis session. It is not
//! designed for concurrent mutation; a new analysis run should replace the
//! navigator wholesale rather than mutate one that is mid-navigation.

use serde::Serialize;
use tracing::debug;

use crate::analyzer::hotspot::GasHotspot;

/// The position payload fired on every successful navigation move.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TourStep {
    /// The one-based position of the current hotspot, for display.
    pub position: usize,

    /// The total number of hotspots in the tour.
    pub total: usize,

    /// The hotspot at the current position.
    pub hotspot: GasHotspot,
}

/// The signal surfaced to the caller by each navigation call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "step")]
pub enum TourEvent {
    /// The tour moved to a new position.
    StepChanged(TourStep),

    /// The move was clamped at a boundary; the position is unchanged and is
    /// re-emitted for the caller's information.
    AtBoundary(TourStep),

    /// The tour was started with no hotspots to visit; nothing happened.
    NothingToTour,

    /// The call was ignored because no tour is active.
    Inactive,

    /// The tour ended. Fired exactly once per tour.
    Ended,
}

/// A state machine sequencing the user through a ranked hotspot list.
///
/// The lifecycle is: created idle, populated and activated by
/// [`Self::start`], advanced by [`Self::next`] / [`Self::previous`] /
/// [`Self::jump_to`], and terminated by [`Self::finish`], after which
/// navigation calls are no-ops until a new tour is started.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TourNavigator {
    hotspots: Vec<GasHotspot>,
    current_index: Option<usize>,
    active: bool,
}

impl TourNavigator {
    /// Constructs a new, idle navigator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a tour over the provided `hotspots`.
    ///
    /// The hotspots are ordered most severe first, ties broken by
    /// accumulated gas descending, and the tour is positioned on the first
    /// of them. Starting with an empty list is a no-op that leaves the
    /// navigator idle.
    pub fn start(&mut self, mut hotspots: Vec<GasHotspot>) -> TourEvent {
        if hotspots.is_empty() {
            debug!("tour requested over an empty hotspot list");
            return TourEvent::NothingToTour;
        }

        hotspots.sort_by_key(|hotspot| {
            (hotspot.severity.tour_rank(), std::cmp::Reverse(hotspot.gas_used))
        });

        self.hotspots = hotspots;
        self.current_index = Some(0);
        self.active = true;
        TourEvent::StepChanged(self.step_at(0))
    }

    /// Moves to the next hotspot.
    ///
    /// At the last hotspot the move is clamped: the current position is
    /// re-emitted unchanged as [`TourEvent::AtBoundary`].
    pub fn next(&mut self) -> TourEvent {
        let Some(index) = self.active_index() else {
            return TourEvent::Inactive;
        };
        if index + 1 >= self.hotspots.len() {
            return TourEvent::AtBoundary(self.step_at(index));
        }
        self.current_index = Some(index + 1);
        TourEvent::StepChanged(self.step_at(index + 1))
    }

    /// Moves to the previous hotspot.
    ///
    /// At the first hotspot the move is clamped: the current position is
    /// re-emitted unchanged as [`TourEvent::AtBoundary`].
    pub fn previous(&mut self) -> TourEvent {
        let Some(index) = self.active_index() else {
            return TourEvent::Inactive;
        };
        if index == 0 {
            return TourEvent::AtBoundary(self.step_at(0));
        }
        self.current_index = Some(index - 1);
        TourEvent::StepChanged(self.step_at(index - 1))
    }

    /// Jumps directly to the hotspot at the zero-based `index`.
    ///
    /// The jump is ignored when no tour is active; an out-of-bounds index
    /// leaves the position unchanged and re-emits it.
    pub fn jump_to(&mut self, index: usize) -> TourEvent {
        let Some(current) = self.active_index() else {
            return TourEvent::Inactive;
        };
        if index >= self.hotspots.len() {
            debug!(index, "ignoring out-of-bounds tour jump");
            return TourEvent::AtBoundary(self.step_at(current));
        }
        self.current_index = Some(index);
        TourEvent::StepChanged(self.step_at(index))
    }

    /// Ends the tour and discards its state.
    ///
    /// The ended signal fires exactly once; finishing an idle navigator is
    /// a no-op.
    pub fn finish(&mut self) -> TourEvent {
        if !self.active {
            return TourEvent::Inactive;
        }
        self.active = false;
        self.current_index = None;
        self.hotspots.clear();
        TourEvent::Ended
    }

    /// Checks whether a tour is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Gets the zero-based index of the current hotspot, if a tour is
    /// active and has been positioned.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current_index.filter(|_| self.active)
    }

    /// Gets the number of hotspots in the active tour.
    #[must_use]
    pub fn total(&self) -> usize {
        self.hotspots.len()
    }

    fn active_index(&self) -> Option<usize> {
        if self.active {
            self.current_index
        } else {
            None
        }
    }

    fn step_at(&self, index: usize) -> TourStep {
        TourStep {
            position: index + 1,
            total: self.hotspots.len(),
            hotspot: self.hotspots[index].clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TourEvent, TourNavigator};
    use crate::analyzer::hotspot::{GasHotspot, Severity, SourceRange};

    fn hotspot(start: u64, gas: u64) -> GasHotspot {
        GasHotspot {
            source_range: SourceRange::new(start, 10),
            gas_used: gas,
            severity: Severity::from_gas(gas),
            opcodes_involved: vec![],
            pattern: crate::analyzer::pattern::Pattern::None,
            recommendation: String::new(),
            suggested_fix: None,
        }
    }

    #[test]
    fn orders_most_severe_first() {
        let mut navigator = TourNavigator::new();
        let event = navigator.start(vec![
            hotspot(0, 500),
            hotspot(10, 25_000),
            hotspot(20, 6_000),
        ]);

        let TourEvent::StepChanged(step) = event else {
            panic!("expected a step change, got {event:?}");
        };
        assert_eq!(step.position, 1);
        assert_eq!(step.total, 3);
        assert_eq!(step.hotspot.gas_used, 25_000);
    }

    #[test]
    fn clamps_at_both_boundaries() {
        let mut navigator = TourNavigator::new();
        navigator.start(vec![hotspot(0, 100), hotspot(10, 200), hotspot(20, 300)]);

        // Going back before any forward step stays at the first hotspot.
        assert!(matches!(navigator.previous(), TourEvent::AtBoundary(_)));
        assert_eq!(navigator.current_index(), Some(0));

        assert!(matches!(navigator.next(), TourEvent::StepChanged(_)));
        assert!(matches!(navigator.next(), TourEvent::StepChanged(_)));
        // A third advance from index 0 stops at the last hotspot.
        assert!(matches!(navigator.next(), TourEvent::AtBoundary(_)));
        assert_eq!(navigator.current_index(), Some(2));
    }

    #[test]
    fn empty_input_leaves_the_navigator_idle() {
        let mut navigator = TourNavigator::new();
        assert_eq!(navigator.start(vec![]), TourEvent::NothingToTour);
        assert!(!navigator.is_active());
        assert_eq!(navigator.next(), TourEvent::Inactive);
    }

    #[test]
    fn jumping_is_bounded() {
        let mut navigator = TourNavigator::new();
        navigator.start(vec![hotspot(0, 100), hotspot(10, 200)]);

        assert!(matches!(navigator.jump_to(1), TourEvent::StepChanged(_)));
        assert!(matches!(navigator.jump_to(7), TourEvent::AtBoundary(_)));
        assert_eq!(navigator.current_index(), Some(1));
    }

    #[test]
    fn finish_fires_exactly_once() {
        let mut navigator = TourNavigator::new();
        navigator.start(vec![hotspot(0, 100)]);

        assert_eq!(navigator.finish(), TourEvent::Ended);
        assert_eq!(navigator.finish(), TourEvent::Inactive);
        assert_eq!(navigator.next(), TourEvent::Inactive);

        // A new tour always starts fresh.
        assert!(matches!(navigator.start(vec![hotspot(0, 5)]), TourEvent::StepChanged(_)));
        assert_eq!(navigator.current_index(), Some(0));
    }
}
