//! Sectioned task list
//!
//! Same shape as any reducer-driven store:
//! - Actions: what can happen
//! - State: what is true right now
//! - Reducer: `(&State, Action) -> Result<State>`

pub mod actions;
pub mod reducer;
pub mod state;

pub use actions::{
    add_task, delete_task, reorder_tasks, set_active_task, update_task, DragMove, Location,
    TaskAction,
};
pub use reducer::reduce;
pub use state::{SectionId, TaskData, TaskId, TaskState};
