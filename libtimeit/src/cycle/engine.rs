//! Cycle state machine
//!
//! `CycleEngine` holds the collaborators (clock, id source, notification
//! sink); `CycleState` holds the data. Every transition borrows the current
//! state and returns a brand new one, so a host can keep old snapshots around
//! for replay or comparison.
//!
//! Elapsed time is always recomputed from `start_date` and the tick instant,
//! never accumulated, so missed or late ticks cannot make the countdown drift.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::model::{validate_new_cycle, Cycle, CycleId};
use crate::clock::{Clock, IdGenerator, SystemClock, Timestamp, TimestampIdGenerator};
use crate::config::CycleConfig;
use crate::error::{Result, TimeitError};
use crate::events::{CycleEvent, NotificationSink, NullSink};

/// What `start` does when a cycle is already counting down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    /// Refuse with a validation error; the caller must interrupt first
    #[default]
    Reject,
    /// Interrupt the running cycle, then start the new one
    InterruptActive,
}

/// Cycle history plus the single active countdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleState {
    cycles: Vec<Cycle>,
    active_cycle_id: Option<CycleId>,
    elapsed_seconds: i64,
}

impl CycleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// All cycles in the order they were started
    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    pub fn active_cycle_id(&self) -> Option<&str> {
        self.active_cycle_id.as_deref()
    }

    pub fn active_cycle(&self) -> Option<&Cycle> {
        let id = self.active_cycle_id.as_deref()?;
        self.find(id)
    }

    /// Seconds elapsed on the active cycle as of the last tick
    pub fn elapsed_seconds(&self) -> i64 {
        self.elapsed_seconds
    }

    pub fn find(&self, id: &str) -> Option<&Cycle> {
        self.cycles.iter().find(|cycle| cycle.id == id)
    }

    pub fn is_running(&self) -> bool {
        self.active_cycle_id.is_some()
    }

    fn replace_cycle(&self, updated: Cycle) -> Vec<Cycle> {
        self.cycles
            .iter()
            .map(|cycle| {
                if cycle.id == updated.id {
                    updated.clone()
                } else {
                    cycle.clone()
                }
            })
            .collect()
    }
}

/// Outcome of a single tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickResult {
    /// No cycle is active; nothing changed
    Idle,
    /// The active cycle is still counting down
    Running {
        elapsed_seconds: i64,
        remaining_seconds: i64,
    },
    /// The active cycle just reached its target and is now finished
    Completed { cycle_id: CycleId },
}

/// Drives cycles through `RUNNING -> FINISHED | INTERRUPTED`
#[derive(Clone)]
pub struct CycleEngine {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    sink: Arc<dyn NotificationSink>,
    start_policy: StartPolicy,
}

impl CycleEngine {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            clock,
            ids,
            sink: Arc::new(NullSink),
            start_policy: StartPolicy::default(),
        }
    }

    /// Engine on the system clock with millisecond-timestamp ids
    pub fn with_system_defaults() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(TimestampIdGenerator::new()))
    }

    pub fn from_config(
        config: &CycleConfig,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self::new(clock, ids).with_start_policy(config.on_start_while_active)
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_start_policy(mut self, policy: StartPolicy) -> Self {
        self.start_policy = policy;
        self
    }

    pub fn start_policy(&self) -> StartPolicy {
        self.start_policy
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Begin a new cycle and make it the active one
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the task is blank, the duration is outside
    /// 1..=60 minutes, or a cycle is already running under
    /// [`StartPolicy::Reject`]. The input state is left untouched.
    pub fn start(
        &self,
        state: &CycleState,
        task: &str,
        minutes_amount: u32,
    ) -> Result<(CycleState, CycleId)> {
        validate_new_cycle(task, minutes_amount)?;

        let base = match (state.active_cycle(), self.start_policy) {
            (None, _) => state.clone(),
            (Some(active), StartPolicy::Reject) => {
                warn!(cycle_id = %active.id, "start rejected, a cycle is already running");
                return Err(TimeitError::validation(format!(
                    "cycle {} ('{}') is still running; interrupt it first",
                    active.id, active.task
                )));
            }
            (Some(_), StartPolicy::InterruptActive) => self.interrupt(state),
        };

        let start_date = self.clock.now();
        let id = self.ids.next_id();
        let cycle = Cycle::new(id.clone(), task.to_string(), minutes_amount, start_date);

        info!(cycle_id = %id, task = %cycle.task, minutes = minutes_amount, "cycle started");

        let mut cycles = base.cycles;
        cycles.push(cycle);

        let next = CycleState {
            cycles,
            active_cycle_id: Some(id.clone()),
            elapsed_seconds: 0,
        };

        self.dispatch(CycleEvent::CycleStarted {
            cycle_id: id.clone(),
            task: task.to_string(),
            minutes_amount,
        });

        Ok((next, id))
    }

    /// Recompute the countdown as of `now`
    pub fn tick(&self, state: &CycleState, now: Timestamp) -> (CycleState, TickResult) {
        let Some(active) = state.active_cycle() else {
            return (state.clone(), TickResult::Idle);
        };

        let total = active.total_seconds();
        let seconds_diff = active.seconds_since_start(now);

        if seconds_diff >= total {
            let finished = active.finished_at(now);
            let cycle_id = finished.id.clone();

            info!(cycle_id = %cycle_id, task = %finished.task, "cycle finished");

            let event = CycleEvent::CycleCompleted {
                cycle_id: cycle_id.clone(),
                task: finished.task.clone(),
                finished_at: finished.finished_date.unwrap_or(now),
            };

            let next = CycleState {
                cycles: state.replace_cycle(finished),
                active_cycle_id: None,
                elapsed_seconds: total,
            };

            self.dispatch(event);
            return (next, TickResult::Completed { cycle_id });
        }

        // A clock that steps backwards must not rewind the display
        let elapsed_seconds = seconds_diff.max(state.elapsed_seconds);
        debug!(cycle_id = %active.id, elapsed_seconds, "tick");

        let next = CycleState {
            elapsed_seconds,
            ..state.clone()
        };

        (
            next,
            TickResult::Running {
                elapsed_seconds,
                remaining_seconds: total - elapsed_seconds,
            },
        )
    }

    /// Tick using the engine's own clock
    pub fn tick_now(&self, state: &CycleState) -> (CycleState, TickResult) {
        self.tick(state, self.clock.now())
    }

    /// Stop the active cycle before it completes
    ///
    /// Without an active cycle this returns an identical copy of `state`, so
    /// calling it twice is the same as calling it once.
    pub fn interrupt(&self, state: &CycleState) -> CycleState {
        let Some(active) = state.active_cycle() else {
            return state.clone();
        };

        let interrupted = active.interrupted_at(self.clock.now());
        let elapsed_seconds = interrupted
            .focused_seconds()
            .unwrap_or(state.elapsed_seconds);

        info!(cycle_id = %interrupted.id, elapsed_seconds, "cycle interrupted");

        let event = CycleEvent::CycleInterrupted {
            cycle_id: interrupted.id.clone(),
            task: interrupted.task.clone(),
            interrupted_at: interrupted.interrupted_date.unwrap_or(interrupted.start_date),
            elapsed_seconds,
        };

        let next = CycleState {
            cycles: state.replace_cycle(interrupted),
            active_cycle_id: None,
            elapsed_seconds: state.elapsed_seconds,
        };

        self.dispatch(event);
        next
    }

    fn dispatch(&self, event: CycleEvent) {
        if let Err(e) = self.sink.notify(&event) {
            debug!(event = event.kind(), error = %e, "notification not delivered");
        }
    }
}
