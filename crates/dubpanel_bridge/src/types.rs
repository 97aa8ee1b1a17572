use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Startup state shown in the panel header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireInitState {
    pub version: Option<String>,
    pub target_dir: Option<String>,
    pub proxy: Option<String>,
}

/// Reply of the file picker.
///
/// The backend may answer with a bare list of paths or with an object that
/// also carries the directory the files were picked from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "FileSelectionRepr")]
pub struct WireFileSelection {
    pub files: Vec<String>,
    pub target_dir: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FileSelectionRepr {
    List(Vec<String>),
    Full {
        #[serde(default)]
        files: Vec<String>,
        #[serde(default, rename = "targetDir")]
        target_dir: Option<String>,
    },
}

impl From<FileSelectionRepr> for WireFileSelection {
    fn from(repr: FileSelectionRepr) -> Self {
        match repr {
            FileSelectionRepr::List(files) => Self {
                files,
                target_dir: None,
            },
            FileSelectionRepr::Full { files, target_dir } => Self { files, target_dir },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WireTaskUuid {
    pub path: String,
    pub uuid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct WireStartResponse {
    pub success: bool,
    pub task_uuids: Vec<WireTaskUuid>,
}

/// One task's latest progress line. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct WireProgress {
    pub percent: f64,
    pub status: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl WireProgress {
    /// Percent rounded and clamped into `0..=100`.
    pub fn clamped_percent(&self) -> u32 {
        if self.percent.is_nan() {
            return 0;
        }
        self.percent.clamp(0.0, 100.0).round() as u32
    }
}

/// Progress snapshot keyed by task uuid.
pub type WireProgressMap = BTreeMap<String, WireProgress>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct WireSettingsReply {
    pub success: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct WireFolder {
    pub value: Option<Value>,
    pub label: String,
    pub count: u64,
}

impl WireFolder {
    /// Folder id as text; `null` (all folders) becomes `""`.
    pub fn value_text(&self) -> String {
        match &self.value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Advisory event pushed by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Notice {
    pub event: String,
    #[serde(default)]
    pub payload: Value,
}

/// Settings dialog the backend can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsTarget {
    Translate,
    Tts,
    Recognition,
    Summary,
    SaveDir,
}

impl SettingsTarget {
    pub fn method(self) -> &'static str {
        match self {
            SettingsTarget::Translate => "openTranslateSettings",
            SettingsTarget::Tts => "openTtsSettings",
            SettingsTarget::Recognition => "openRecognSettings",
            SettingsTarget::Summary => "openSummaryConfig",
            SettingsTarget::SaveDir => "openSaveDir",
        }
    }
}

/// A single request/response bridge call. Echoed back with its result.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    InitState,
    /// `recognition` is set when the reload was triggered by a recognition
    /// channel change.
    Options { recognition: Option<String> },
    SelectFiles,
    SelectSaveDir,
    SetVideoQueue(Vec<String>),
    SetParams(Map<String, Value>),
    SetSummaryFolder(String),
    StartJob,
    ResetStatus,
    OpenSettings {
        target: SettingsTarget,
        channel: Option<i64>,
    },
    SummaryFolders,
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Call::InitState => "getInitState",
            Call::Options { .. } => "getOptions",
            Call::SelectFiles => "selectVideo",
            Call::SelectSaveDir => "selectSaveDir",
            Call::SetVideoQueue(_) => "setVideoQueue",
            Call::SetParams(_) => "setParams",
            Call::SetSummaryFolder(_) => "setSummaryFolder",
            Call::StartJob => "startTranslate",
            Call::ResetStatus => "resetStatus",
            Call::OpenSettings { target, .. } => target.method(),
            Call::SummaryFolders => "getSummaryFolders",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    InitState(WireInitState),
    Options(Value),
    Files(WireFileSelection),
    SaveDir(String),
    Started(WireStartResponse),
    Settings(WireSettingsReply),
    Folders(Vec<WireFolder>),
    /// Fire-and-forget call acknowledged.
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    Completed {
        call: Call,
        result: Result<Reply, BridgeError>,
    },
    /// One poll tick finished.
    Progress(Result<WireProgressMap, BridgeError>),
    /// Grace delay for `run` elapsed.
    ResetDue { run: u64 },
    Notice(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("invalid bridge endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("bridge request timed out")]
    Timeout,
    #[error("bridge answered with http status {0}")]
    HttpStatus(u16),
    #[error("bridge transport error: {0}")]
    Transport(String),
    #[error("malformed bridge reply: {0}")]
    Decode(String),
}

impl fmt::Display for SettingsTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_selection_accepts_list_or_object() {
        let list: WireFileSelection = serde_json::from_value(json!(["/a.mp4"])).unwrap();
        assert_eq!(list.files, vec!["/a.mp4"]);
        assert_eq!(list.target_dir, None);

        let full: WireFileSelection =
            serde_json::from_value(json!({"files": ["/b.mp4"], "targetDir": "/out"})).unwrap();
        assert_eq!(full.files, vec!["/b.mp4"]);
        assert_eq!(full.target_dir.as_deref(), Some("/out"));
    }

    #[test]
    fn progress_percent_is_clamped() {
        let over = WireProgress {
            percent: 140.0,
            ..WireProgress::default()
        };
        let under = WireProgress {
            percent: -3.0,
            ..WireProgress::default()
        };
        assert_eq!(over.clamped_percent(), 100);
        assert_eq!(under.clamped_percent(), 0);
    }

    #[test]
    fn null_folder_value_is_empty_text() {
        let folder: WireFolder =
            serde_json::from_value(json!({"value": null, "label": "All", "count": 4})).unwrap();
        assert_eq!(folder.value_text(), "");
        let numbered: WireFolder =
            serde_json::from_value(json!({"value": 7, "label": "Talks"})).unwrap();
        assert_eq!(numbered.value_text(), "7");
    }
}
