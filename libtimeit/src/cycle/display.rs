//! Pure derivations for rendering the countdown

use serde::Serialize;

use super::engine::CycleState;

/// Title shown while no cycle is counting down
pub const IDLE_TITLE: &str = "Time it - Free time tracking app";

/// Zero-padded minutes and seconds left on the active cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountdownDisplay {
    pub minutes: String,
    pub seconds: String,
}

impl std::fmt::Display for CountdownDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.minutes, self.seconds)
    }
}

/// Seconds left on the active cycle, 0 when idle
pub fn remaining_seconds(state: &CycleState) -> i64 {
    state
        .active_cycle()
        .map(|cycle| (cycle.total_seconds() - state.elapsed_seconds()).max(0))
        .unwrap_or(0)
}

pub fn derived_display(state: &CycleState) -> CountdownDisplay {
    let remaining = remaining_seconds(state);
    CountdownDisplay {
        minutes: format!("{:02}", remaining / 60),
        seconds: format!("{:02}", remaining % 60),
    }
}

/// `MM:SS - task` while running, [`IDLE_TITLE`] otherwise
pub fn window_title(state: &CycleState) -> String {
    match state.active_cycle() {
        Some(cycle) => format!("{} - {}", derived_display(state), cycle.task),
        None => IDLE_TITLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock, SequentialIdGenerator};
    use crate::cycle::CycleEngine;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn engine() -> (CycleEngine, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        let engine = CycleEngine::new(
            Arc::new(clock.clone()),
            Arc::new(SequentialIdGenerator::new("cycle")),
        );
        (engine, clock)
    }

    #[test]
    fn test_idle_display() {
        let state = CycleState::new();
        let display = derived_display(&state);
        assert_eq!(display.minutes, "00");
        assert_eq!(display.seconds, "00");
        assert_eq!(window_title(&state), IDLE_TITLE);
    }

    #[test]
    fn test_fresh_cycle_shows_full_duration() {
        let (engine, _) = engine();
        let (state, _) = engine.start(&CycleState::new(), "Write report", 60).unwrap();

        assert_eq!(derived_display(&state).to_string(), "60:00");
    }

    #[test]
    fn test_display_counts_down() {
        let (engine, clock) = engine();
        let (state, _) = engine.start(&CycleState::new(), "Write report", 25).unwrap();
        let (state, _) = engine.tick(&state, clock.now() + Duration::seconds(61));

        let display = derived_display(&state);
        assert_eq!(display.minutes, "23");
        assert_eq!(display.seconds, "59");
        assert_eq!(remaining_seconds(&state), 1439);
        assert_eq!(window_title(&state), "23:59 - Write report");
    }

    #[test]
    fn test_display_pads_single_digits() {
        let (engine, clock) = engine();
        let (state, _) = engine.start(&CycleState::new(), "Stretch", 5).unwrap();
        let (state, _) = engine.tick(&state, clock.now() + Duration::seconds(295));

        assert_eq!(derived_display(&state).to_string(), "00:05");
    }
}
