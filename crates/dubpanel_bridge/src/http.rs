use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use url::Url;

use panel_logging::{panel_debug, panel_trace};

use crate::{
    Bridge, BridgeError, BridgeSettings, Notice, SettingsTarget, WireFileSelection, WireFolder,
    WireInitState, WireProgress, WireProgressMap, WireSettingsReply, WireStartResponse,
};

/// Bridge over JSON-RPC style HTTP: every call is a `POST {base}/rpc/{method}`
/// with a JSON object of arguments and a JSON reply.
#[derive(Debug, Clone)]
pub struct HttpBridge {
    client: reqwest::Client,
    base: Url,
}

impl HttpBridge {
    pub fn new(settings: &BridgeSettings) -> Result<Self, BridgeError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| BridgeError::InvalidEndpoint(format!("{}: {err}", settings.base_url)))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(BridgeError::InvalidEndpoint(settings.base_url.clone()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self { client, base })
    }

    fn endpoint(&self, method: &str) -> Result<Url, BridgeError> {
        self.base
            .join(&format!("rpc/{method}"))
            .map_err(|err| BridgeError::InvalidEndpoint(err.to_string()))
    }

    async fn invoke<T: DeserializeOwned>(&self, method: &str, args: Value) -> Result<T, BridgeError> {
        let url = self.endpoint(method)?;
        panel_trace!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(&args)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        // Fire-and-forget methods may answer with an empty body.
        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        serde_json::from_slice(body).map_err(|err| BridgeError::Decode(format!("{method}: {err}")))
    }
}

#[async_trait::async_trait]
impl Bridge for HttpBridge {
    async fn get_init_state(&self) -> Result<WireInitState, BridgeError> {
        self.invoke("getInitState", json!({})).await
    }

    async fn get_options(&self) -> Result<Value, BridgeError> {
        self.invoke("getOptions", json!({})).await
    }

    async fn select_files(&self) -> Result<WireFileSelection, BridgeError> {
        self.invoke("selectVideo", json!({})).await
    }

    async fn select_save_dir(&self) -> Result<String, BridgeError> {
        let dir: Option<String> = self.invoke("selectSaveDir", json!({})).await?;
        Ok(dir.unwrap_or_default())
    }

    async fn set_video_queue(&self, paths: &[String]) -> Result<(), BridgeError> {
        self.invoke::<Value>("setVideoQueue", json!({ "files": paths }))
            .await
            .map(drop)
    }

    async fn set_params(&self, params: &Map<String, Value>) -> Result<(), BridgeError> {
        self.invoke::<Value>("setParams", json!({ "params": params }))
            .await
            .map(drop)
    }

    async fn set_summary_folder(&self, folder: &str) -> Result<(), BridgeError> {
        self.invoke::<Value>("setSummaryFolder", json!({ "folder": folder }))
            .await
            .map(drop)
    }

    async fn start_job(&self) -> Result<WireStartResponse, BridgeError> {
        self.invoke("startTranslate", json!({})).await
    }

    async fn task_progress(&self) -> Result<WireProgressMap, BridgeError> {
        let raw: Option<BTreeMap<String, Value>> =
            self.invoke("getTaskProgress", json!({})).await?;
        // A malformed entry only costs that task its update for this tick.
        let map = raw
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(uuid, entry)| match serde_json::from_value::<WireProgress>(entry) {
                Ok(progress) => Some((uuid, progress)),
                Err(err) => {
                    panel_debug!("Skipping progress entry {}: {}", uuid, err);
                    None
                }
            })
            .collect();
        Ok(map)
    }

    async fn reset_status(&self) -> Result<(), BridgeError> {
        self.invoke::<Value>("resetStatus", json!({})).await.map(drop)
    }

    async fn open_settings(
        &self,
        target: SettingsTarget,
        channel: Option<i64>,
    ) -> Result<WireSettingsReply, BridgeError> {
        let args = match channel {
            Some(channel) => json!({ "channel": channel }),
            None => json!({}),
        };
        self.invoke(target.method(), args).await
    }

    async fn summary_folders(&self) -> Result<Vec<WireFolder>, BridgeError> {
        let folders: Option<Vec<WireFolder>> = self.invoke("getSummaryFolders", json!({})).await?;
        Ok(folders.unwrap_or_default())
    }

    async fn notices(&self) -> Result<Vec<Notice>, BridgeError> {
        let notices: Option<Vec<Notice>> = self.invoke("pollNotices", json!({})).await?;
        Ok(notices.unwrap_or_default())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> BridgeError {
    if err.is_timeout() {
        return BridgeError::Timeout;
    }
    BridgeError::Transport(err.to_string())
}
