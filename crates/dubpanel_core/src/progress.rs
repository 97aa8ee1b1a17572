//! Per-task render state and the run termination rule.

use std::collections::BTreeMap;

use crate::queue::{TaskQueue, TaskUuid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Error,
    Stopped,
}

impl TaskStatus {
    /// Maps a backend status string. Anything unrecognized is in progress.
    pub fn from_wire(status: &str) -> Self {
        match status {
            "completed" => TaskStatus::Completed,
            "error" => TaskStatus::Error,
            "stopped" => TaskStatus::Stopped,
            _ => TaskStatus::Processing,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            TaskStatus::Pending => "task-status-pending",
            TaskStatus::Processing => "task-status-processing",
            TaskStatus::Completed => "task-status-completed",
            TaskStatus::Error => "task-status-error",
            TaskStatus::Stopped => "task-status-stopped",
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Waiting",
            TaskStatus::Processing => "Processing",
            TaskStatus::Completed => "Done",
            TaskStatus::Error => "Error",
            TaskStatus::Stopped => "Stopped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskProgress {
    pub percent: u8,
    pub status: TaskStatus,
    pub text: String,
}

impl TaskProgress {
    /// Percent is clamped into `0..=100`.
    pub fn new(percent: u32, status: TaskStatus, text: impl Into<String>) -> Self {
        Self {
            percent: percent.min(100) as u8,
            status,
            text: text.into(),
        }
    }

    pub fn pending() -> Self {
        Self::new(0, TaskStatus::Pending, "Waiting to start")
    }

    pub fn reached_completion(&self) -> bool {
        self.percent == 100 && self.status == TaskStatus::Completed
    }
}

/// One poll response: task id to its latest progress.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    entries: BTreeMap<TaskUuid, TaskProgress>,
}

impl ProgressSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uuid: impl Into<TaskUuid>, progress: TaskProgress) {
        self.entries.insert(uuid.into(), progress);
    }

    pub fn with(mut self, uuid: impl Into<TaskUuid>, progress: TaskProgress) -> Self {
        self.insert(uuid, progress);
        self
    }

    pub fn get(&self, uuid: &str) -> Option<&TaskProgress> {
        self.entries.get(uuid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(TaskUuid, TaskProgress)> for ProgressSnapshot {
    fn from_iter<I: IntoIterator<Item = (TaskUuid, TaskProgress)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Last known render state of every correlated task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressBoard {
    states: BTreeMap<TaskUuid, TaskProgress>,
}

impl ProgressBoard {
    pub fn get(&self, uuid: &str) -> Option<&TaskProgress> {
        self.states.get(uuid)
    }

    /// Overwrites the state of every queued uuid present in the snapshot.
    /// Queued uuids missing from it keep their previous state.
    ///
    /// Returns true when at least one queued task reached 100% completed in
    /// this snapshot.
    pub fn apply(&mut self, queue: &TaskQueue, snapshot: &ProgressSnapshot) -> bool {
        let mut reached = false;
        for uuid in queue.uuids() {
            if let Some(progress) = snapshot.get(uuid) {
                reached |= progress.reached_completion();
                self.states.insert(uuid.to_string(), progress.clone());
            }
        }
        reached
    }

    /// Drops states whose uuid is no longer in the queue.
    pub fn retain_queued(&mut self, queue: &TaskQueue) {
        let live: Vec<&str> = queue.uuids().collect();
        self.states.retain(|uuid, _| live.contains(&uuid.as_str()));
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}

/// True when every queued task has a uuid reported `completed` in `snapshot`.
pub fn run_complete(queue: &TaskQueue, snapshot: &ProgressSnapshot) -> bool {
    !queue.is_empty()
        && queue.records().iter().all(|record| {
            record
                .uuid
                .as_deref()
                .and_then(|uuid| snapshot.get(uuid))
                .is_some_and(|progress| progress.status == TaskStatus::Completed)
        })
}
