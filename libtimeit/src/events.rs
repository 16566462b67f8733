//! Cycle notifications
//!
//! The engine reports lifecycle changes to a [`NotificationSink`]. Delivery is
//! fire-and-forget: a failing sink is logged and otherwise ignored, so it can
//! never alter engine state.
//!
//! [`EventBus`] is the stock sink. It uses `tokio::sync::broadcast` so any
//! number of listeners (sound player, desktop notifier, terminal printer) can
//! subscribe; with no listeners the event is simply dropped.
//!
//! # Example
//!
//! ```no_run
//! use libtimeit::events::{CycleEvent, EventBus};
//!
//! # async fn example() {
//! let event_bus = EventBus::new(16);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(CycleEvent::CycleStarted {
//!     cycle_id: "1700000000000".to_string(),
//!     task: "Write report".to_string(),
//!     minutes_amount: 25,
//! });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::clock::Timestamp;
use crate::error::NotifyError;

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<CycleEvent>;

/// Lifecycle signals emitted by the cycle engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CycleEvent {
    /// A new cycle began counting down
    CycleStarted {
        cycle_id: String,
        task: String,
        minutes_amount: u32,
    },

    /// The countdown reached zero
    CycleCompleted {
        cycle_id: String,
        task: String,
        finished_at: Timestamp,
    },

    /// The cycle was stopped before reaching zero
    CycleInterrupted {
        cycle_id: String,
        task: String,
        interrupted_at: Timestamp,
        elapsed_seconds: i64,
    },
}

impl CycleEvent {
    pub fn cycle_id(&self) -> &str {
        match self {
            CycleEvent::CycleStarted { cycle_id, .. }
            | CycleEvent::CycleCompleted { cycle_id, .. }
            | CycleEvent::CycleInterrupted { cycle_id, .. } => cycle_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CycleEvent::CycleStarted { .. } => "cycle_started",
            CycleEvent::CycleCompleted { .. } => "cycle_completed",
            CycleEvent::CycleInterrupted { .. } => "cycle_interrupted",
        }
    }
}

/// Receiver of advisory cycle signals
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: &CycleEvent) -> Result<(), NotifyError>;
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _event: &CycleEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Broadcast fan-out for cycle events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CycleEvent>,
}

impl EventBus {
    /// Create a new event bus
    ///
    /// `capacity` is how many events each subscriber may fall behind before
    /// the oldest ones are dropped.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to every event emitted after this call
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers without blocking
    pub fn emit(&self, event: CycleEvent) {
        // send() only fails when nobody is listening
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl NotificationSink for EventBus {
    fn notify(&self, event: &CycleEvent) -> Result<(), NotifyError> {
        self.sender
            .send(event.clone())
            .map(|_| ())
            .map_err(|_| NotifyError::NoListeners(event.kind().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn started(id: &str) -> CycleEvent {
        CycleEvent::CycleStarted {
            cycle_id: id.to_string(),
            task: "Write report".to_string(),
            minutes_amount: 25,
        }
    }

    #[tokio::test]
    async fn test_event_emission_and_subscription() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        event_bus.emit(started("c-1"));

        let received = receiver.recv().await.unwrap();
        match received {
            CycleEvent::CycleStarted {
                cycle_id,
                task,
                minutes_amount,
            } => {
                assert_eq!(cycle_id, "c-1");
                assert_eq!(task, "Write report");
                assert_eq!(minutes_amount, 25);
            }
            _ => panic!("Wrong event type received"),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        event_bus.emit(started("c-2"));

        assert_eq!(receiver1.recv().await.unwrap().cycle_id(), "c-2");
        assert_eq!(receiver2.recv().await.unwrap().cycle_id(), "c-2");
    }

    #[tokio::test]
    async fn test_no_subscribers() {
        let event_bus = EventBus::new(10);

        // Emitting with nobody listening must not panic or block
        event_bus.emit(started("c-3"));
        assert_eq!(event_bus.subscriber_count(), 0);
    }

    #[test]
    fn test_sink_reports_missing_listeners() {
        let event_bus = EventBus::new(10);
        let result = event_bus.notify(&started("c-4"));
        assert_eq!(
            result,
            Err(NotifyError::NoListeners("cycle_started".to_string()))
        );
    }

    #[tokio::test]
    async fn test_sink_delivers_to_listener() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        assert!(event_bus.notify(&started("c-5")).is_ok());
        assert_eq!(receiver.recv().await.unwrap(), started("c-5"));
    }

    #[test]
    fn test_null_sink_accepts_everything() {
        assert!(NullSink.notify(&started("c-6")).is_ok());
    }

    #[test]
    fn test_event_serialization() {
        let event = CycleEvent::CycleInterrupted {
            cycle_id: "c-7".to_string(),
            task: "Review PR".to_string(),
            interrupted_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 10, 0).unwrap(),
            elapsed_seconds: 600,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"cycle_interrupted\""));
        assert!(json.contains("Review PR"));

        let deserialized: CycleEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }
}
