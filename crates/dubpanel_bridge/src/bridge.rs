use std::time::Duration;

use serde_json::{Map, Value};

use crate::{
    BridgeError, Notice, SettingsTarget, WireFileSelection, WireFolder, WireInitState,
    WireProgressMap, WireSettingsReply, WireStartResponse,
};

#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8765".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// The backend as seen by the panel. Every method is one independent
/// request/response exchange.
#[async_trait::async_trait]
pub trait Bridge: Send + Sync {
    async fn get_init_state(&self) -> Result<WireInitState, BridgeError>;

    /// Raw option catalog; parsed by the core.
    async fn get_options(&self) -> Result<Value, BridgeError>;

    async fn select_files(&self) -> Result<WireFileSelection, BridgeError>;

    async fn select_save_dir(&self) -> Result<String, BridgeError>;

    async fn set_video_queue(&self, paths: &[String]) -> Result<(), BridgeError>;

    async fn set_params(&self, params: &Map<String, Value>) -> Result<(), BridgeError>;

    async fn set_summary_folder(&self, folder: &str) -> Result<(), BridgeError>;

    async fn start_job(&self) -> Result<WireStartResponse, BridgeError>;

    async fn task_progress(&self) -> Result<WireProgressMap, BridgeError>;

    async fn reset_status(&self) -> Result<(), BridgeError>;

    async fn open_settings(
        &self,
        target: SettingsTarget,
        channel: Option<i64>,
    ) -> Result<WireSettingsReply, BridgeError>;

    async fn summary_folders(&self) -> Result<Vec<WireFolder>, BridgeError>;

    /// Drains advisory events queued since the last call.
    async fn notices(&self) -> Result<Vec<Notice>, BridgeError>;
}
