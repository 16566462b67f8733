//! Cycle records

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::error::{Result, TimeitError};

/// Opaque cycle identifier
pub type CycleId = String;

/// Shortest cycle a user may start, in minutes
pub const MIN_MINUTES: u32 = 1;

/// Longest cycle a user may start, in minutes
pub const MAX_MINUTES: u32 = 60;

/// Where a cycle is in its lifecycle, derived from its timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    Running,
    Finished,
    Interrupted,
}

impl CycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Running => "running",
            CycleStatus::Finished => "finished",
            CycleStatus::Interrupted => "interrupted",
        }
    }

    /// Finished and interrupted cycles never change again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CycleStatus::Running)
    }
}

impl std::fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One timed focus session
///
/// `interrupted_date` and `finished_date` are mutually exclusive and each is
/// written at most once; the only way to set them is through the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    pub id: CycleId,
    pub task: String,
    pub minutes_amount: u32,
    pub start_date: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupted_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_date: Option<Timestamp>,
}

impl Cycle {
    pub(crate) fn new(id: CycleId, task: String, minutes_amount: u32, start_date: Timestamp) -> Self {
        Self {
            id,
            task,
            minutes_amount,
            start_date,
            interrupted_date: None,
            finished_date: None,
        }
    }

    pub fn status(&self) -> CycleStatus {
        match (self.finished_date, self.interrupted_date) {
            (Some(_), _) => CycleStatus::Finished,
            (None, Some(_)) => CycleStatus::Interrupted,
            (None, None) => CycleStatus::Running,
        }
    }

    /// Neither terminal timestamp has been written yet
    pub fn is_open(&self) -> bool {
        self.finished_date.is_none() && self.interrupted_date.is_none()
    }

    /// Target duration in seconds
    pub fn total_seconds(&self) -> i64 {
        i64::from(self.minutes_amount) * 60
    }

    /// When the cycle reached a terminal state, if it has
    pub fn ended_at(&self) -> Option<Timestamp> {
        self.finished_date.or(self.interrupted_date)
    }

    /// Whole seconds between start and `now`, never negative
    pub fn seconds_since_start(&self, now: Timestamp) -> i64 {
        (now - self.start_date).num_seconds().max(0)
    }

    /// Seconds of focus this cycle accounts for once it has ended
    pub fn focused_seconds(&self) -> Option<i64> {
        match self.status() {
            CycleStatus::Finished => Some(self.total_seconds()),
            CycleStatus::Interrupted => self
                .interrupted_date
                .map(|at| self.seconds_since_start(at).min(self.total_seconds())),
            CycleStatus::Running => None,
        }
    }

    pub(crate) fn finished_at(&self, at: Timestamp) -> Self {
        debug_assert!(self.is_open());
        Self {
            finished_date: Some(at.max(self.start_date)),
            ..self.clone()
        }
    }

    pub(crate) fn interrupted_at(&self, at: Timestamp) -> Self {
        debug_assert!(self.is_open());
        Self {
            interrupted_date: Some(at.max(self.start_date)),
            ..self.clone()
        }
    }
}

/// Check the inputs of a new cycle
pub fn validate_new_cycle(task: &str, minutes_amount: u32) -> Result<()> {
    if task.trim().is_empty() {
        return Err(TimeitError::validation("Enter the task"));
    }

    if !(MIN_MINUTES..=MAX_MINUTES).contains(&minutes_amount) {
        return Err(TimeitError::validation(format!(
            "The cycle needs to be between {} and {} minutes (got {})",
            MIN_MINUTES, MAX_MINUTES, minutes_amount
        )));
    }

    Ok(())
}
