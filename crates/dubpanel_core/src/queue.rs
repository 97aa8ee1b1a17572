//! Ordered file selection and its correlation with backend task ids.

use panel_logging::{panel_debug, panel_trace};

pub type TaskUuid = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub path: String,
    pub uuid: Option<TaskUuid>,
    /// Position in the selection the record came from. Not renumbered on
    /// removal; display position is the record's index in the queue.
    pub order: usize,
}

/// `(path, uuid)` pair reported by the backend when a job starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    pub path: String,
    pub uuid: TaskUuid,
}

impl Correlation {
    pub fn new(path: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            uuid: uuid.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskQueue {
    records: Vec<TaskRecord>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn paths(&self) -> Vec<String> {
        self.records.iter().map(|r| r.path.clone()).collect()
    }

    /// Replaces the queue. Correlations survive only for paths still present.
    ///
    /// Duplicate paths are kept as separate records; a later correlation for
    /// that path attaches to every copy.
    pub fn set_selection(&mut self, paths: Vec<String>) {
        let previous = std::mem::take(&mut self.records);
        self.records = paths
            .into_iter()
            .enumerate()
            .map(|(order, path)| {
                let uuid = previous
                    .iter()
                    .find(|old| old.path == path)
                    .and_then(|old| old.uuid.clone());
                TaskRecord { path, uuid, order }
            })
            .collect();
        panel_trace!("Queue replaced with {} records", self.records.len());
    }

    /// Attaches backend ids by exact path match; unknown paths are ignored.
    /// Returns how many pairs matched a queued path.
    pub fn record_correlations(&mut self, pairs: &[Correlation]) -> usize {
        let mut matched = 0;
        for pair in pairs {
            let mut hit = false;
            for record in self.records.iter_mut().filter(|r| r.path == pair.path) {
                record.uuid = Some(pair.uuid.clone());
                hit = true;
            }
            if hit {
                matched += 1;
            } else {
                panel_debug!("Ignoring correlation for unqueued path {}", pair.path);
            }
        }
        matched
    }

    /// Removes the record at display position `index`.
    pub fn remove(&mut self, index: usize) -> Option<TaskRecord> {
        if index < self.records.len() {
            Some(self.records.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn uuids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().filter_map(|r| r.uuid.as_deref())
    }
}

/// File name shown for a path, split on either separator.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_handles_both_separators() {
        assert_eq!(file_name("C:\\videos\\a.mp4"), "a.mp4");
        assert_eq!(file_name("/home/u/b.mkv"), "b.mkv");
        assert_eq!(file_name("plain.mov"), "plain.mov");
    }
}
