//! Time it - focus cycles and a sectioned task list
//!
//! Two independent state machines that a host (terminal, GUI, web) drives:
//!
//! - [`cycle::CycleEngine`] runs one countdown at a time and keeps an
//!   append-only history of finished and interrupted cycles.
//! - [`tasks::reduce`] applies add/update/delete/reorder actions to a
//!   [`tasks::TaskState`].
//!
//! Neither owns a timer or global state: the host keeps the current state
//! value, passes it in, and stores the state it gets back.

pub mod clock;
pub mod config;
pub mod cycle;
pub mod error;
pub mod events;
pub mod history;
pub mod logging;
pub mod tasks;

// Re-export commonly used types
pub use clock::{Clock, IdGenerator, ManualClock, SystemClock, Timestamp};
pub use config::Config;
pub use cycle::{CycleEngine, CycleState, CycleStatus, TickResult};
pub use error::{Result, TimeitError};
pub use events::{CycleEvent, EventBus, NotificationSink};
pub use history::{CycleHistory, HistoryQuery};
pub use tasks::{reduce, TaskAction, TaskData, TaskState};
