//! Focus cycles
//!
//! - `model`: the `Cycle` record and its derived status
//! - `engine`: `CycleEngine` transitions over an immutable `CycleState`
//! - `display`: countdown formatting and the window title

pub mod display;
pub mod engine;
pub mod model;

pub use display::{derived_display, remaining_seconds, window_title, CountdownDisplay, IDLE_TITLE};
pub use engine::{CycleEngine, CycleState, StartPolicy, TickResult};
pub use model::{validate_new_cycle, Cycle, CycleId, CycleStatus, MAX_MINUTES, MIN_MINUTES};
