use serde_json::Value;

use crate::{
    FileSelection, InitState, OptionsRequest, ProgressSnapshot, SettingsDialog, SettingsReply,
    StartOutcome, SummaryFolder,
};

/// Bridge failures arrive as display text; the core only shows them.
pub type Failure = String;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Bridge connected; load initial state and option lists.
    Booted,
    InitStateLoaded(Result<InitState, Failure>),
    OptionsLoaded {
        request: OptionsRequest,
        result: Result<Value, Failure>,
    },
    SummaryFoldersLoaded(Result<Vec<SummaryFolder>, Failure>),
    /// User clicked the element with this id.
    PageClicked { target: String },
    SelectFilesClicked,
    FilesSelected(Result<FileSelection, Failure>),
    SaveDirClicked,
    SaveDirSelected(Result<String, Failure>),
    RemoveTaskClicked(usize),
    /// A plain input or checkbox changed.
    FieldChanged { key: String, value: Value },
    StartClicked,
    StartFinished(Result<StartOutcome, Failure>),
    /// Poll tick delivered a snapshot.
    ProgressFetched(ProgressSnapshot),
    /// Poll tick failed; the timer keeps running.
    ProgressFetchFailed(Failure),
    ResetGraceElapsed { run: u64 },
    SettingsClicked(SettingsDialog),
    SettingsOpened {
        dialog: SettingsDialog,
        result: Result<SettingsReply, Failure>,
    },
    /// Out-of-band event pushed by the backend.
    BridgeNotice { event: String },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
