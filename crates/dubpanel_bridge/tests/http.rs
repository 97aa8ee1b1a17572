use std::time::Duration;

use dubpanel_bridge::{
    Bridge, BridgeError, BridgeSettings, HttpBridge, SettingsTarget, WireProgress, WireTaskUuid,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bridge_for(server: &MockServer) -> HttpBridge {
    HttpBridge::new(&BridgeSettings {
        base_url: server.uri(),
        ..BridgeSettings::default()
    })
    .expect("valid endpoint")
}

#[tokio::test]
async fn start_job_decodes_task_uuids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/startTranslate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "task_uuids": [
                {"path": "/v/a.mp4", "uuid": "u1"},
                {"path": "/v/b.mp4", "uuid": "u2"}
            ]
        })))
        .mount(&server)
        .await;

    let reply = bridge_for(&server).start_job().await.expect("start ok");

    assert!(reply.success);
    assert_eq!(
        reply.task_uuids,
        vec![
            WireTaskUuid {
                path: "/v/a.mp4".to_string(),
                uuid: "u1".to_string(),
            },
            WireTaskUuid {
                path: "/v/b.mp4".to_string(),
                uuid: "u2".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn progress_entries_are_decoded_leniently() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/getTaskProgress"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "u1": {"percent": 100, "status": "completed", "text": "done", "type": "succeed"},
            "u2": {"percent": 37.6, "status": "processing"},
            "u3": {}
        })))
        .mount(&server)
        .await;

    let snapshot = bridge_for(&server).task_progress().await.expect("progress ok");

    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot["u1"].status, "completed");
    assert_eq!(snapshot["u1"].kind.as_deref(), Some("succeed"));
    assert_eq!(snapshot["u2"].clamped_percent(), 38);
    assert_eq!(snapshot["u2"].text, "");
    assert_eq!(snapshot["u3"], WireProgress::default());
}

#[tokio::test]
async fn malformed_progress_entry_skips_only_that_task() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/getTaskProgress"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "u1": {"percent": 40, "status": "processing", "text": "dubbing"},
            "u2": null,
            "u3": "broken",
            "u4": {"percent": "half"}
        })))
        .mount(&server)
        .await;

    let snapshot = bridge_for(&server).task_progress().await.expect("progress ok");

    assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["u1"]);
    assert_eq!(snapshot["u1"].clamped_percent(), 40);
    assert_eq!(snapshot["u1"].text, "dubbing");
}

#[tokio::test]
async fn set_params_posts_the_partial_map() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/setParams"))
        .and(body_json(json!({"params": {"tts_type": 2}})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut params = Map::new();
    params.insert("tts_type".to_string(), Value::from(2));

    bridge_for(&server)
        .set_params(&params)
        .await
        .expect("empty reply accepted");
}

#[tokio::test]
async fn settings_call_passes_channel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/openTtsSettings"))
        .and(body_json(json!({"channel": 3})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "No configuration needed"})),
        )
        .mount(&server)
        .await;

    let reply = bridge_for(&server)
        .open_settings(SettingsTarget::Tts, Some(3))
        .await
        .expect("settings ok");

    assert!(!reply.success);
    assert_eq!(reply.message.as_deref(), Some("No configuration needed"));
}

#[tokio::test]
async fn select_files_accepts_bare_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/selectVideo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["/v/a.mp4", "/v/b.mp4"])))
        .mount(&server)
        .await;

    let selection = bridge_for(&server).select_files().await.expect("files ok");

    assert_eq!(selection.files, vec!["/v/a.mp4", "/v/b.mp4"]);
    assert_eq!(selection.target_dir, None);
}

#[tokio::test]
async fn http_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/getOptions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = bridge_for(&server).get_options().await.unwrap_err();
    assert_eq!(err, BridgeError::HttpStatus(500));
}

#[tokio::test]
async fn malformed_reply_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/startTranslate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = bridge_for(&server).start_job().await.unwrap_err();
    assert!(matches!(err, BridgeError::Decode(_)));
}

#[tokio::test]
async fn slow_reply_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/getTaskProgress"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    let bridge = HttpBridge::new(&BridgeSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
    })
    .unwrap();

    let err = bridge.task_progress().await.unwrap_err();
    assert_eq!(err, BridgeError::Timeout);
}

#[tokio::test]
async fn null_folder_list_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc/getSummaryFolders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
        .mount(&server)
        .await;

    let folders = bridge_for(&server).summary_folders().await.expect("folders ok");
    assert!(folders.is_empty());
}

#[test]
fn invalid_endpoint_is_rejected() {
    let err = HttpBridge::new(&BridgeSettings {
        base_url: "not a url".to_string(),
        ..BridgeSettings::default()
    })
    .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidEndpoint(_)));

    let err = HttpBridge::new(&BridgeSettings {
        base_url: "ftp://example.com".to_string(),
        ..BridgeSettings::default()
    })
    .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidEndpoint(_)));
}
