//! Dubpanel core: pure state machine and view-model helpers for the
//! translation control panel.
pub mod dom;
mod effect;
mod msg;
pub mod options;
mod page;
mod progress;
mod queue;
pub mod render;
pub mod select;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, NoticeLevel, OptionsRequest, SettingsDialog};
pub use msg::{Failure, Msg};
pub use options::{CatalogError, OptionCatalog, SummaryFolder};
pub use page::{close_open_menus, ChangeEvent, Page};
pub use progress::{run_complete, ProgressBoard, ProgressSnapshot, TaskProgress, TaskStatus};
pub use queue::{file_name, Correlation, TaskQueue, TaskRecord, TaskUuid};
pub use select::{OptionEntry, PopulateError, SelectChange, SelectWidget};
pub use state::{
    AppState, FileSelection, InitState, PollState, SettingsReply, StartOutcome,
};
pub use update::{
    update, BUTTON_RECOGN_SETTINGS, BUTTON_SAVE_DIR, BUTTON_SELECT_VIDEO, BUTTON_START,
    BUTTON_SUMMARY_SETTINGS, BUTTON_TRANSLATE_SETTINGS, BUTTON_TTS_SETTINGS, LABEL_SAVE_DIR,
};
pub use view_model::{AppViewModel, TaskRowView};
