use serde_json::{Map, Value};

/// Side effects requested by `update`; executed by the app against the bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadInitState,
    LoadOptions(OptionsRequest),
    LoadSummaryFolders,
    SelectFiles,
    SelectSaveDir,
    /// Push the current queue paths to the backend after a local edit.
    SyncQueue { paths: Vec<String> },
    SetParams(Map<String, Value>),
    SetSummaryFolder(String),
    StartJob,
    StartPolling,
    StopPolling,
    /// Deliver `Msg::ResetGraceElapsed { run }` after the grace delay.
    ScheduleReset { run: u64 },
    ResetStatus,
    OpenSettings {
        dialog: SettingsDialog,
        channel: Option<i64>,
    },
    Notify { level: NoticeLevel, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsRequest {
    /// Initial load: every catalog-backed widget.
    Bootstrap,
    /// Recognition channel changed: repopulate the model list only.
    ModelsFor(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsDialog {
    Translate,
    Tts,
    Recognition,
    Summary,
    /// Reveal the save directory in the host's file browser.
    SaveDir,
}

impl SettingsDialog {
    /// Widget whose hidden value selects the channel to configure.
    pub fn channel_widget(self) -> Option<&'static str> {
        match self {
            SettingsDialog::Translate => Some(crate::options::TRANSLATE_TYPE),
            SettingsDialog::Tts => Some(crate::options::TTS_TYPE),
            SettingsDialog::Recognition => Some(crate::options::RECOGN_TYPE),
            SettingsDialog::Summary | SettingsDialog::SaveDir => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SettingsDialog::Translate => "translation",
            SettingsDialog::Tts => "dubbing",
            SettingsDialog::Recognition => "recognition",
            SettingsDialog::Summary => "summary",
            SettingsDialog::SaveDir => "save directory",
        }
    }
}
