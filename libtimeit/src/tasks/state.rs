//! Task store state
//!
//! Immutable state structure; every change goes through the reducer
//! (see `reducer.rs`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque task identifier
pub type TaskId = String;

/// Opaque section identifier
pub type SectionId = String;

/// A single to-do entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskData {
    pub id: TaskId,
    pub section_id: SectionId,
    pub description: String,
}

impl TaskData {
    pub fn new(
        id: impl Into<TaskId>,
        section_id: impl Into<SectionId>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            section_id: section_id.into(),
            description: description.into(),
        }
    }
}

/// Tasks grouped by section, plus the selected task
///
/// Order inside a section is the position in its `Vec`; sections are
/// independent of one another. A section exists only while it holds at
/// least one task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskState {
    pub(crate) sections: BTreeMap<SectionId, Vec<TaskData>>,
    pub(crate) active_task_id: Option<TaskId>,
}

impl TaskState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from tasks listed in display order
    ///
    /// Each task lands at the end of its own section, so relative order
    /// within a section is preserved.
    pub fn from_tasks(tasks: impl IntoIterator<Item = TaskData>) -> Self {
        let mut sections: BTreeMap<SectionId, Vec<TaskData>> = BTreeMap::new();
        for task in tasks {
            sections.entry(task.section_id.clone()).or_default().push(task);
        }
        Self {
            sections,
            active_task_id: None,
        }
    }

    /// Drop the section if its last task was taken out
    pub(crate) fn prune_section(&mut self, section_id: &str) {
        if self.sections.get(section_id).is_some_and(Vec::is_empty) {
            self.sections.remove(section_id);
        }
    }

    /// Tasks of one section in order; empty for an unknown section
    pub fn section(&self, section_id: &str) -> &[TaskData] {
        self.sections
            .get(section_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Every task, section by section
    pub fn tasks(&self) -> impl Iterator<Item = &TaskData> {
        self.sections.values().flatten()
    }

    pub fn find(&self, id: &str) -> Option<&TaskData> {
        self.tasks().find(|task| task.id == id)
    }

    /// Position of a task inside its section
    pub fn position(&self, section_id: &str, id: &str) -> Option<usize> {
        self.section(section_id).iter().position(|task| task.id == id)
    }

    pub fn active_task_id(&self) -> Option<&str> {
        self.active_task_id.as_deref()
    }

    pub fn active_task(&self) -> Option<&TaskData> {
        self.find(self.active_task_id.as_deref()?)
    }

    pub fn len(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
