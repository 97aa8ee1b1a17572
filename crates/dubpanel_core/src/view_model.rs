use std::collections::BTreeMap;

use serde_json::Value;

use crate::{PollState, TaskProgress, TaskStatus};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub version: Option<String>,
    pub target_dir: Option<String>,
    pub proxy: String,
    pub tasks: Vec<TaskRowView>,
    pub poll: PollState,
    pub start_enabled: bool,
    pub open_widgets: Vec<String>,
    pub fields: BTreeMap<String, Value>,
    pub dirty: bool,
}

impl AppViewModel {
    /// Text of the selection counter next to the file picker.
    pub fn selection_label(&self) -> String {
        match self.tasks.len() {
            0 => "No video selected".to_string(),
            1 => "1 file selected".to_string(),
            count => format!("{count} files selected"),
        }
    }

    pub fn completed_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.progress.status == TaskStatus::Completed)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRowView {
    /// Display position.
    pub index: usize,
    pub order: usize,
    pub path: String,
    pub file_name: String,
    pub uuid: Option<String>,
    pub progress: TaskProgress,
}
