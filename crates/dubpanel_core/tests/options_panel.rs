use std::sync::Once;

use dubpanel_core::options::{
    MODEL_NAME, RECOGN_TYPE, SUMMARY_FOLDER, TARGET_LANGUAGE, TRANSLATE_TYPE, VOICE_ROLE,
};
use dubpanel_core::{
    update, AppState, Effect, InitState, Msg, NoticeLevel, OptionsRequest, SettingsDialog,
    SettingsReply, SummaryFolder, BUTTON_TRANSLATE_SETTINGS, LABEL_SAVE_DIR,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(panel_logging::initialize_for_tests);
}

fn options_payload() -> Value {
    json!({
        "translateTypes": [
            {"value": 0, "label": "Google"},
            {"value": 1, "label": "Baidu"}
        ],
        "languages": [
            {"value": "zh-cn", "label": "Chinese"},
            {"value": "en", "label": "English"},
            {"value": "auto", "label": "Auto detect"}
        ],
        "recognitionTypes": [
            {"value": 0, "label": "faster-whisper"},
            {"value": 2, "label": "FunASR"}
        ],
        "whisperModels": [
            {"value": "tiny", "label": "tiny"},
            {"value": "base", "label": "base"}
        ],
        "funasrModels": [
            {"value": "paraformer-zh", "label": "paraformer-zh"}
        ],
        "splitTypes": {"all": "Overall", "avg": "Equal"},
        "ttsTypes": [{"value": 0, "label": "Edge-TTS"}],
        "subtitleTypes": [
            {"value": 0, "label": "None"},
            {"value": 1, "label": "Hard"}
        ],
        "selected": {
            "translate_type": 1,
            "source_language": "en",
            "target_language": "zh-cn",
            "recogn_type": 0,
            "model_name": "base",
            "split_type": "all",
            "tts_type": 0,
            "subtitle_type": 1,
            "voice_rate": "+0%",
            "enable_cuda": false
        }
    })
}

fn bootstrapped() -> AppState {
    let (state, effects) = update(
        AppState::new(),
        Msg::OptionsLoaded {
            request: OptionsRequest::Bootstrap,
            result: Ok(options_payload()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify {
            level: NoticeLevel::Success,
            message: "Configuration loaded".to_string(),
        }]
    );
    state
}

fn click(state: AppState, target: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::PageClicked {
            target: target.to_string(),
        },
    )
}

fn params(key: &str, value: Value) -> Effect {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Effect::SetParams(map)
}

#[test]
fn booted_requests_initial_loads() {
    init_logging();
    let (_, effects) = update(AppState::new(), Msg::Booted);

    assert_eq!(
        effects,
        vec![
            Effect::LoadInitState,
            Effect::LoadOptions(OptionsRequest::Bootstrap),
            Effect::LoadSummaryFolders,
        ]
    );
}

#[test]
fn init_state_fills_header_fields() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::InitStateLoaded(Ok(InitState {
            version: Some("v3.2".to_string()),
            target_dir: Some("/out".to_string()),
            proxy: Some("http://127.0.0.1:7890".to_string()),
        })),
    );

    let view = state.view();
    assert_eq!(view.version.as_deref(), Some("v3.2"));
    assert_eq!(view.target_dir.as_deref(), Some("/out"));
    assert_eq!(view.proxy, "http://127.0.0.1:7890");
}

#[test]
fn bootstrap_populates_widgets_from_catalog() {
    init_logging();
    let state = bootstrapped();
    let page = state.page();

    assert_eq!(page.widget(TRANSLATE_TYPE).unwrap().current_value(), "1");
    assert_eq!(page.hidden_value(TRANSLATE_TYPE), Some("1"));
    assert_eq!(page.widget(MODEL_NAME).unwrap().current_value(), "base");

    let targets: Vec<&str> = page
        .widget(TARGET_LANGUAGE)
        .unwrap()
        .options()
        .iter()
        .map(|entry| entry.value.as_str())
        .collect();
    assert_eq!(targets, vec!["-", "zh-cn", "en"]);
    assert_eq!(page.widget(TARGET_LANGUAGE).unwrap().current_value(), "zh-cn");

    // No voice roles delivered: a single "No" entry stands in.
    assert_eq!(page.widget(VOICE_ROLE).unwrap().current_value(), "No");

    let fields = state.view().fields;
    assert_eq!(fields.get("voice_rate"), Some(&json!("+0%")));
    assert_eq!(fields.get("enable_cuda"), Some(&json!(false)));
    assert!(state.catalog().is_some());
}

#[test]
fn backend_error_payload_is_reported() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::OptionsLoaded {
            request: OptionsRequest::Bootstrap,
            result: Ok(json!({"error": "config missing"})),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::Notify {
            level: NoticeLevel::Error,
            message: "Loading options failed: backend reported an error: config missing"
                .to_string(),
        }]
    );
    assert!(state.page().widget(TRANSLATE_TYPE).is_none());
}

#[test]
fn picking_an_item_forwards_coerced_param() {
    init_logging();
    let state = bootstrapped();
    let (state, _) = click(state, TRANSLATE_TYPE);
    let (state, effects) = click(state, "translate-type__item_0");

    assert_eq!(effects, vec![params("translate_type", json!(0))]);
    assert!(state.page().open_widgets().is_empty());
}

#[test]
fn recognition_change_reloads_and_rebinds_models() {
    init_logging();
    let state = bootstrapped();
    let (state, _) = click(state, RECOGN_TYPE);
    let (state, effects) = click(state, "recogn-type__item_1");

    assert_eq!(
        effects,
        vec![
            Effect::LoadOptions(OptionsRequest::ModelsFor("2".to_string())),
            params("recogn_type", json!(2)),
        ]
    );

    let (state, effects) = update(
        state,
        Msg::OptionsLoaded {
            request: OptionsRequest::ModelsFor("2".to_string()),
            result: Ok(options_payload()),
        },
    );
    assert!(effects.is_empty());

    let models = state.page().widget(MODEL_NAME).unwrap();
    assert_eq!(models.options().len(), 1);
    assert_eq!(models.current_value(), "");

    let (state, _) = click(state, MODEL_NAME);
    let (_, effects) = click(state, "model-name__item_0");
    assert_eq!(effects, vec![params("model_name", json!("paraformer-zh"))]);
}

#[test]
fn model_reply_for_superseded_recognition_is_dropped() {
    init_logging();
    let state = bootstrapped();
    let (state, _) = click(state, RECOGN_TYPE);
    let (state, _) = click(state, "recogn-type__item_1");
    let (state, _) = click(state, RECOGN_TYPE);
    let (state, _) = click(state, "recogn-type__item_0");
    assert_eq!(state.page().hidden_value(RECOGN_TYPE), Some("0"));

    let reload = |state, recognition: &str| {
        update(
            state,
            Msg::OptionsLoaded {
                request: OptionsRequest::ModelsFor(recognition.to_string()),
                result: Ok(options_payload()),
            },
        )
    };
    let (state, effects) = reload(state, "0");
    assert!(effects.is_empty());
    let (state, effects) = reload(state, "2");
    assert!(effects.is_empty());

    let models: Vec<_> = state
        .page()
        .widget(MODEL_NAME)
        .unwrap()
        .options()
        .iter()
        .map(|entry| entry.value.clone())
        .collect();
    assert_eq!(models, vec!["tiny", "base"]);
    assert_eq!(state.page().hidden_value(MODEL_NAME), Some("base"));
}

#[test]
fn field_change_is_forwarded_and_kept() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::FieldChanged {
            key: "volume".to_string(),
            value: json!("+10%"),
        },
    );

    assert_eq!(effects, vec![params("volume", json!("+10%"))]);
    assert_eq!(state.view().fields.get("volume"), Some(&json!("+10%")));
}

#[test]
fn settings_button_passes_selected_channel() {
    init_logging();
    let state = bootstrapped();

    let (state, effects) = click(state, BUTTON_TRANSLATE_SETTINGS);
    assert_eq!(
        effects,
        vec![Effect::OpenSettings {
            dialog: SettingsDialog::Translate,
            channel: Some(1),
        }]
    );

    let (_, effects) = update(state, Msg::SettingsClicked(SettingsDialog::Summary));
    assert_eq!(
        effects,
        vec![Effect::OpenSettings {
            dialog: SettingsDialog::Summary,
            channel: None,
        }]
    );
}

#[test]
fn settings_without_populated_channel_does_nothing() {
    init_logging();
    let (_, effects) = update(AppState::new(), Msg::SettingsClicked(SettingsDialog::Tts));
    assert!(effects.is_empty());
}

#[test]
fn settings_reply_is_reported() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::SettingsOpened {
            dialog: SettingsDialog::Tts,
            result: Ok(SettingsReply {
                success: true,
                message: None,
            }),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify {
            level: NoticeLevel::Success,
            message: "Opened dubbing settings".to_string(),
        }]
    );

    let (_, effects) = update(
        state,
        Msg::SettingsOpened {
            dialog: SettingsDialog::Summary,
            result: Ok(SettingsReply {
                success: false,
                message: Some("Configure an AI channel first".to_string()),
            }),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify {
            level: NoticeLevel::Error,
            message: "Configure an AI channel first".to_string(),
        }]
    );
}

#[test]
fn save_dir_label_opens_folder_once_a_directory_is_set() {
    init_logging();
    let (state, effects) = click(AppState::new(), LABEL_SAVE_DIR);
    assert_eq!(
        effects,
        vec![Effect::Notify {
            level: NoticeLevel::Info,
            message: "Select a save directory first".to_string(),
        }]
    );

    let (state, _) = update(state, Msg::SaveDirSelected(Ok("/out".to_string())));
    let (state, effects) = click(state, LABEL_SAVE_DIR);
    assert_eq!(
        effects,
        vec![Effect::OpenSettings {
            dialog: SettingsDialog::SaveDir,
            channel: None,
        }]
    );

    let (state, effects) = update(
        state,
        Msg::SettingsOpened {
            dialog: SettingsDialog::SaveDir,
            result: Ok(SettingsReply {
                success: true,
                message: None,
            }),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify {
            level: NoticeLevel::Success,
            message: "Opened save directory".to_string(),
        }]
    );

    let (_, effects) = update(
        state,
        Msg::SettingsOpened {
            dialog: SettingsDialog::SaveDir,
            result: Ok(SettingsReply::default()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify {
            level: NoticeLevel::Error,
            message: "Opening save directory failed".to_string(),
        }]
    );
}

#[test]
fn summary_folders_show_counts_and_forward_choice() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::SummaryFoldersLoaded(Ok(vec![
            SummaryFolder {
                value: String::new(),
                label: "All folders".to_string(),
                count: 0,
            },
            SummaryFolder {
                value: "talks".to_string(),
                label: "Talks".to_string(),
                count: 3,
            },
        ])),
    );

    let labels: Vec<&str> = state
        .page()
        .widget(SUMMARY_FOLDER)
        .unwrap()
        .options()
        .iter()
        .map(|entry| entry.label.as_str())
        .collect();
    assert_eq!(labels, vec!["All folders", "Talks (3)"]);
    assert_eq!(
        state.page().document().find(SUMMARY_FOLDER).unwrap().text(),
        "All folders"
    );

    let (state, _) = click(state, SUMMARY_FOLDER);
    let (_, effects) = click(state, "summary-folder__item_1");
    assert_eq!(effects, vec![Effect::SetSummaryFolder("talks".to_string())]);
}

#[test]
fn proxy_notice_is_reported() {
    init_logging();
    let (_, effects) = update(
        AppState::new(),
        Msg::BridgeNotice {
            event: "proxyChanged".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify {
            level: NoticeLevel::Success,
            message: "Proxy updated".to_string(),
        }]
    );
}
