//! Actions for the task reducer
//!
//! All task-list changes are described by a [`TaskAction`]. The functions at
//! the bottom of this module are the action constructors hosts should use;
//! `add_task` is the only one that touches a collaborator (the id source).

use serde::{Deserialize, Serialize};

use super::state::{SectionId, TaskData, TaskId};
use crate::clock::IdGenerator;

/// A position inside a section
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub section_id: SectionId,
    pub index: usize,
}

impl Location {
    pub fn new(section_id: impl Into<SectionId>, index: usize) -> Self {
        Self {
            section_id: section_id.into(),
            index,
        }
    }
}

/// Result of a drag gesture
///
/// `destination` is `None` when the item was dropped outside any list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragMove {
    pub source: Location,
    pub destination: Option<Location>,
}

impl DragMove {
    pub fn new(source: Location, destination: Location) -> Self {
        Self {
            source,
            destination: Some(destination),
        }
    }

    pub fn cancelled(source: Location) -> Self {
        Self {
            source,
            destination: None,
        }
    }
}

/// Actions that trigger task-state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    /// Append a task to the end of a section
    AddTask {
        section_id: SectionId,
        task_id: TaskId,
        description: String,
    },

    /// Replace a task in place
    UpdateTask { section_id: SectionId, task: TaskData },

    /// Remove a task permanently
    DeleteTask { section_id: SectionId, id: TaskId },

    /// Select a task, or clear the selection
    SetActiveTask(Option<TaskId>),

    /// Drag-and-drop move, possibly across sections
    ReorderTasks(DragMove),
}

pub fn add_task(
    ids: &dyn IdGenerator,
    section_id: impl Into<SectionId>,
    description: impl Into<String>,
) -> TaskAction {
    TaskAction::AddTask {
        section_id: section_id.into(),
        task_id: ids.next_id(),
        description: description.into(),
    }
}

pub fn update_task(section_id: impl Into<SectionId>, task: TaskData) -> TaskAction {
    TaskAction::UpdateTask {
        section_id: section_id.into(),
        task,
    }
}

pub fn delete_task(section_id: impl Into<SectionId>, id: impl Into<TaskId>) -> TaskAction {
    TaskAction::DeleteTask {
        section_id: section_id.into(),
        id: id.into(),
    }
}

pub fn set_active_task(task: Option<&TaskData>) -> TaskAction {
    TaskAction::SetActiveTask(task.map(|task| task.id.clone()))
}

pub fn reorder_tasks(drag: DragMove) -> TaskAction {
    TaskAction::ReorderTasks(drag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SequentialIdGenerator;

    #[test]
    fn test_add_task_draws_fresh_ids() {
        let ids = SequentialIdGenerator::new("task");

        let first = add_task(&ids, "todo", "Buy milk");
        let second = add_task(&ids, "todo", "Buy bread");

        assert_eq!(
            first,
            TaskAction::AddTask {
                section_id: "todo".to_string(),
                task_id: "task-1".to_string(),
                description: "Buy milk".to_string(),
            }
        );
        assert!(matches!(second, TaskAction::AddTask { ref task_id, .. } if task_id == "task-2"));
    }

    #[test]
    fn test_set_active_task_takes_id() {
        let task = TaskData::new("t-1", "todo", "Buy milk");
        assert_eq!(
            set_active_task(Some(&task)),
            TaskAction::SetActiveTask(Some("t-1".to_string()))
        );
        assert_eq!(set_active_task(None), TaskAction::SetActiveTask(None));
    }

    #[test]
    fn test_drag_move_deserializes_dropped_outside() {
        let json = r#"{"source":{"sectionId":"todo","index":2},"destination":null}"#;
        let drag: DragMove = serde_json::from_str(json).unwrap();
        assert_eq!(drag, DragMove::cancelled(Location::new("todo", 2)));
    }
}
