//! Pure reducer for task-state transitions
//!
//! `(&TaskState, TaskAction) -> Result<TaskState>`
//!
//! The reducer never touches the clock, the id source or any I/O. It either
//! returns a complete new state or an error; the input state is never
//! modified, so a rejected action leaves nothing half-applied.

use super::actions::{DragMove, TaskAction};
use super::state::{TaskData, TaskState};
use crate::error::{Result, TimeitError};

pub fn reduce(state: &TaskState, action: TaskAction) -> Result<TaskState> {
    match action {
        TaskAction::AddTask {
            section_id,
            task_id,
            description,
        } => {
            ensure_description(&description)?;
            if state.find(&task_id).is_some() {
                return Err(TimeitError::validation(format!(
                    "task id {} is already in use",
                    task_id
                )));
            }

            let mut next = state.clone();
            next.sections
                .entry(section_id.clone())
                .or_default()
                .push(TaskData {
                    id: task_id,
                    section_id,
                    description,
                });
            Ok(next)
        }

        TaskAction::UpdateTask { section_id, task } => {
            ensure_description(&task.description)?;
            let position = state.position(&section_id, &task.id).ok_or_else(|| {
                TimeitError::not_found(format!("task {} in section {}", task.id, section_id))
            })?;

            let mut next = state.clone();
            if let Some(list) = next.sections.get_mut(&section_id) {
                list[position] = TaskData { section_id, ..task };
            }
            Ok(next)
        }

        TaskAction::DeleteTask { section_id, id } => {
            let Some(position) = state.position(&section_id, &id) else {
                return Ok(state.clone());
            };

            let mut next = state.clone();
            if let Some(list) = next.sections.get_mut(&section_id) {
                list.remove(position);
            }
            next.prune_section(&section_id);
            if next.active_task_id.as_deref() == Some(id.as_str()) {
                next.active_task_id = None;
            }
            Ok(next)
        }

        TaskAction::SetActiveTask(task_id) => {
            if let Some(id) = &task_id {
                if state.find(id).is_none() {
                    return Err(TimeitError::not_found(format!("task {}", id)));
                }
            }
            Ok(TaskState {
                active_task_id: task_id,
                ..state.clone()
            })
        }

        TaskAction::ReorderTasks(drag) => reorder(state, drag),
    }
}

/// Move one task to a new position, possibly in another section
///
/// The destination index is read against the lists as they look after the
/// task has been taken out of its source.
fn reorder(state: &TaskState, drag: DragMove) -> Result<TaskState> {
    let DragMove {
        source,
        destination,
    } = drag;

    let Some(destination) = destination else {
        return Ok(state.clone());
    };

    let source_len = state.section(&source.section_id).len();
    if source.index >= source_len {
        return Err(TimeitError::validation(format!(
            "drag source index {} is out of bounds for section {} ({} tasks)",
            source.index, source.section_id, source_len
        )));
    }

    let mut next = state.clone();

    let mut moved = match next.sections.get_mut(&source.section_id) {
        Some(list) => list.remove(source.index),
        None => return Ok(state.clone()),
    };
    moved.section_id = destination.section_id.clone();

    let target = next
        .sections
        .entry(destination.section_id)
        .or_default();
    let index = destination.index.min(target.len());
    target.insert(index, moved);
    next.prune_section(&source.section_id);

    Ok(next)
}

fn ensure_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        return Err(TimeitError::validation("Task description cannot be empty"));
    }
    Ok(())
}
