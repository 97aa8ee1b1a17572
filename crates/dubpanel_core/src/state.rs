use std::collections::BTreeMap;

use serde_json::Value;

use crate::dom::Document;
use crate::options::{OptionCatalog, ALL_WIDGETS};
use crate::page::Page;
use crate::progress::{ProgressBoard, TaskProgress};
use crate::queue::{file_name, Correlation, TaskQueue};
use crate::render;
use crate::view_model::{AppViewModel, TaskRowView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollState {
    #[default]
    Idle,
    Polling,
    /// Terminal condition seen; waiting for the grace delay to clear the run.
    Draining,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InitState {
    pub version: Option<String>,
    pub target_dir: Option<String>,
    pub proxy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileSelection {
    pub files: Vec<String>,
    pub target_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StartOutcome {
    pub success: bool,
    pub correlations: Vec<Correlation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsReply {
    pub success: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    page: Page,
    queue: TaskQueue,
    board: ProgressBoard,
    catalog: Option<OptionCatalog>,
    poll: PollState,
    run: u64,
    start_in_flight: bool,
    version: Option<String>,
    target_dir: Option<String>,
    proxy: String,
    fields: BTreeMap<String, Value>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            page: Page::new(ALL_WIDGETS),
            queue: TaskQueue::new(),
            board: ProgressBoard::default(),
            catalog: None,
            poll: PollState::Idle,
            run: 0,
            start_in_flight: false,
            version: None,
            target_dir: None,
            proxy: String::new(),
            fields: BTreeMap::new(),
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let tasks = self
            .queue
            .records()
            .iter()
            .enumerate()
            .map(|(index, record)| TaskRowView {
                index,
                order: record.order,
                path: record.path.clone(),
                file_name: file_name(&record.path).to_string(),
                uuid: record.uuid.clone(),
                progress: record
                    .uuid
                    .as_deref()
                    .and_then(|uuid| self.board.get(uuid))
                    .cloned()
                    .unwrap_or_else(TaskProgress::pending),
            })
            .collect();

        AppViewModel {
            version: self.version.clone(),
            target_dir: self.target_dir.clone(),
            proxy: self.proxy.clone(),
            tasks,
            poll: self.poll,
            start_enabled: !self.start_in_flight,
            open_widgets: self
                .page
                .open_widgets()
                .into_iter()
                .map(str::to_string)
                .collect(),
            fields: self.fields.clone(),
            dirty: self.dirty,
        }
    }

    /// Widgets plus the task list projected from current state.
    pub fn render_document(&self) -> Document {
        let mut doc = self.page.document().clone();
        doc.set_container(render::task_list(&self.view().tasks));
        doc
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn target_dir(&self) -> Option<&str> {
        self.target_dir.as_deref()
    }

    pub fn poll_state(&self) -> PollState {
        self.poll
    }

    /// Option catalog from the latest successful load.
    pub fn catalog(&self) -> Option<&OptionCatalog> {
        self.catalog.as_ref()
    }

    pub fn run(&self) -> u64 {
        self.run
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub(crate) fn queue_mut(&mut self) -> &mut TaskQueue {
        &mut self.queue
    }

    pub(crate) fn parts_mut(&mut self) -> (&TaskQueue, &mut ProgressBoard) {
        (&self.queue, &mut self.board)
    }

    /// Drops render state of tasks that left the queue.
    pub(crate) fn prune_board(&mut self) {
        self.board.retain_queued(&self.queue);
    }

    pub(crate) fn set_catalog(&mut self, catalog: OptionCatalog) {
        self.catalog = Some(catalog);
    }

    pub(crate) fn set_field(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    pub(crate) fn apply_init_state(&mut self, init: InitState) {
        if init.version.is_some() {
            self.version = init.version;
        }
        if init.target_dir.is_some() {
            self.target_dir = init.target_dir;
        }
        if let Some(proxy) = init.proxy {
            self.proxy = proxy;
        }
    }

    pub(crate) fn set_target_dir(&mut self, dir: String) {
        self.target_dir = Some(dir);
    }

    pub(crate) fn start_in_flight(&self) -> bool {
        self.start_in_flight
    }

    pub(crate) fn set_start_in_flight(&mut self, in_flight: bool) {
        self.start_in_flight = in_flight;
    }

    /// Opens a new run and starts polling for it.
    pub(crate) fn begin_run(&mut self) -> u64 {
        self.run += 1;
        self.poll = PollState::Polling;
        self.run
    }

    pub(crate) fn set_poll_state(&mut self, poll: PollState) {
        self.poll = poll;
    }

    /// Empties the queue and every correlation and render state.
    pub(crate) fn clear_run(&mut self) {
        self.queue.clear();
        self.board.clear();
        self.poll = PollState::Idle;
    }
}
