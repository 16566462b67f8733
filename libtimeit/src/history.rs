//! Cycle history queries
//!
//! Read-only views over the cycles recorded in a [`CycleState`]: filtered
//! listing, lookup by id and summary statistics for a dashboard.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cycle::{Cycle, CycleState, CycleStatus};
use crate::error::{Result, TimeitError};

/// Query parameters for filtering cycles
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub status: Option<CycleStatus>,
    /// Only cycles started at or after this instant
    pub since: Option<DateTime<Utc>>,
    /// Only cycles started before this instant
    pub until: Option<DateTime<Utc>>,
    /// Case-insensitive substring of the task name
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl HistoryQuery {
    fn matches(&self, cycle: &Cycle) -> bool {
        if let Some(status) = self.status {
            if cycle.status() != status {
                return false;
            }
        }
        if let Some(since) = self.since {
            if cycle.start_date < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if cycle.start_date >= until {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !cycle.task.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Statistics about recorded cycles
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total_cycles: usize,
    pub finished: usize,
    pub interrupted: usize,
    pub running: usize,
    /// Focus time of ended cycles plus the active cycle's elapsed time
    pub focused_seconds: i64,
    /// Finished share of ended cycles, 0.0 when none have ended
    pub completion_rate: f64,
}

pub struct CycleHistory<'a> {
    state: &'a CycleState,
}

impl<'a> CycleHistory<'a> {
    pub fn new(state: &'a CycleState) -> Self {
        Self { state }
    }

    /// Cycles matching the query, oldest first
    pub fn list(&self, query: &HistoryQuery) -> Vec<&'a Cycle> {
        self.state
            .cycles()
            .iter()
            .filter(|cycle| query.matches(cycle))
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no cycle has this id.
    pub fn get(&self, cycle_id: &str) -> Result<&'a Cycle> {
        self.state
            .find(cycle_id)
            .ok_or_else(|| TimeitError::not_found(format!("cycle {}", cycle_id)))
    }

    /// Number of cycles matching the query, ignoring offset and limit
    pub fn count(&self, query: &HistoryQuery) -> usize {
        self.state
            .cycles()
            .iter()
            .filter(|cycle| query.matches(cycle))
            .count()
    }

    pub fn stats(&self, query: &HistoryQuery) -> HistoryStats {
        let mut stats = HistoryStats::default();

        for cycle in self.state.cycles().iter().filter(|c| query.matches(c)) {
            stats.total_cycles += 1;
            match cycle.status() {
                CycleStatus::Finished => stats.finished += 1,
                CycleStatus::Interrupted => stats.interrupted += 1,
                CycleStatus::Running => {
                    stats.running += 1;
                    if self.state.active_cycle_id() == Some(cycle.id.as_str()) {
                        stats.focused_seconds += self.state.elapsed_seconds();
                    }
                }
            }
            stats.focused_seconds += cycle.focused_seconds().unwrap_or(0);
        }

        let ended = stats.finished + stats.interrupted;
        if ended > 0 {
            stats.completion_rate = stats.finished as f64 / ended as f64;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock, SequentialIdGenerator};
    use crate::cycle::CycleEngine;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    /// One finished, one interrupted after 5 minutes, one running for 2 minutes
    fn history_state() -> CycleState {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        let engine = CycleEngine::new(
            Arc::new(clock.clone()),
            Arc::new(SequentialIdGenerator::new("cycle")),
        );

        let (state, _) = engine.start(&CycleState::new(), "Write report", 25).unwrap();
        let (state, _) = engine.tick(&state, clock.now() + Duration::minutes(25));

        clock.advance(Duration::minutes(30));
        let (state, _) = engine.start(&state, "Review PR", 15).unwrap();
        clock.advance(Duration::minutes(5));
        let state = engine.interrupt(&state);

        clock.advance(Duration::minutes(10));
        let (state, _) = engine.start(&state, "Write tests", 25).unwrap();
        let (state, _) = engine.tick(&state, clock.now() + Duration::minutes(2));
        state
    }

    #[test]
    fn test_list_all_in_order() {
        let state = history_state();
        let history = CycleHistory::new(&state);

        let tasks: Vec<&str> = history
            .list(&HistoryQuery::default())
            .iter()
            .map(|c| c.task.as_str())
            .collect();
        assert_eq!(tasks, vec!["Write report", "Review PR", "Write tests"]);
    }

    #[test]
    fn test_filter_by_status_and_search() {
        let state = history_state();
        let history = CycleHistory::new(&state);

        let interrupted = history.list(&HistoryQuery {
            status: Some(CycleStatus::Interrupted),
            ..Default::default()
        });
        assert_eq!(interrupted.len(), 1);
        assert_eq!(interrupted[0].task, "Review PR");

        let write = HistoryQuery {
            search: Some("WRITE".to_string()),
            ..Default::default()
        };
        assert_eq!(history.count(&write), 2);
    }

    #[test]
    fn test_pagination() {
        let state = history_state();
        let history = CycleHistory::new(&state);

        let page = history.list(&HistoryQuery {
            offset: Some(1),
            limit: Some(1),
            ..Default::default()
        });
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "cycle-2");
    }

    #[test]
    fn test_time_window() {
        let state = history_state();
        let history = CycleHistory::new(&state);
        let nine_thirty = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

        let query = HistoryQuery {
            since: Some(nine_thirty),
            ..Default::default()
        };
        assert_eq!(history.count(&query), 2);

        let query = HistoryQuery {
            until: Some(nine_thirty),
            ..Default::default()
        };
        assert_eq!(history.count(&query), 1);
    }

    #[test]
    fn test_get_unknown_cycle() {
        let state = history_state();
        let history = CycleHistory::new(&state);

        assert_eq!(history.get("cycle-1").unwrap().task, "Write report");
        assert!(matches!(
            history.get("nope"),
            Err(TimeitError::NotFound(_))
        ));
    }

    #[test]
    fn test_stats() {
        let state = history_state();
        let stats = CycleHistory::new(&state).stats(&HistoryQuery::default());

        assert_eq!(stats.total_cycles, 3);
        assert_eq!(stats.finished, 1);
        assert_eq!(stats.interrupted, 1);
        assert_eq!(stats.running, 1);
        // 25 min finished + 5 min interrupted + 2 min running
        assert_eq!(stats.focused_seconds, (25 + 5 + 2) * 60);
        assert!((stats.completion_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_empty_history() {
        let state = CycleState::new();
        let stats = CycleHistory::new(&state).stats(&HistoryQuery::default());
        assert_eq!(stats, HistoryStats::default());
    }
}
