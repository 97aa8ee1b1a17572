use serde_json::{Map, Value};

use panel_logging::{panel_debug, panel_info, panel_warn};

use crate::options::{
    populate_catalog, populate_folders, populate_models, OptionCatalog, FIELD_KEYS, RECOGN_TYPE,
};
use crate::page::ChangeEvent;
use crate::progress::run_complete;
use crate::render::REMOVE_PREFIX;
use crate::select::{ChangeListener, Coercion};
use crate::{
    AppState, Effect, Msg, NoticeLevel, OptionsRequest, PollState, SettingsDialog, SettingsReply,
};

pub const BUTTON_SELECT_VIDEO: &str = "btn-select-video";
pub const BUTTON_SAVE_DIR: &str = "btn-save-dir";
pub const BUTTON_START: &str = "btn-start";
pub const BUTTON_TRANSLATE_SETTINGS: &str = "btn-translate-settings";
pub const BUTTON_TTS_SETTINGS: &str = "btn-tts-settings";
pub const BUTTON_RECOGN_SETTINGS: &str = "btn-recogn-settings";
pub const BUTTON_SUMMARY_SETTINGS: &str = "btn-summary-config";
/// The save directory label; clicking it opens the folder.
pub const LABEL_SAVE_DIR: &str = "save-dir";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Booted => vec![
            Effect::LoadInitState,
            Effect::LoadOptions(OptionsRequest::Bootstrap),
            Effect::LoadSummaryFolders,
        ],
        Msg::InitStateLoaded(Ok(init)) => {
            state.apply_init_state(init);
            state.mark_dirty();
            Vec::new()
        }
        Msg::InitStateLoaded(Err(err)) => vec![notify(
            NoticeLevel::Error,
            format!("Initialization failed: {err}"),
        )],
        Msg::OptionsLoaded { request, result } => on_options_loaded(&mut state, request, result),
        Msg::SummaryFoldersLoaded(Ok(folders)) => {
            if folders.is_empty() {
                panel_warn!("No summary folders available");
                return (state, Vec::new());
            }
            if populate_folders(state.page_mut(), &folders).is_ok() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SummaryFoldersLoaded(Err(err)) => vec![notify(
            NoticeLevel::Error,
            format!("Loading folders failed: {err}"),
        )],
        Msg::PageClicked { target } => {
            // Every click passes through the page first so outside clicks
            // close open menus.
            let change = state.page_mut().click(&target);
            state.mark_dirty();
            if let Some(event) = change {
                change_effects(event)
            } else if let Some(routed) = route_click(&target) {
                return update(state, routed);
            } else {
                Vec::new()
            }
        }
        Msg::SelectFilesClicked => vec![Effect::SelectFiles],
        Msg::FilesSelected(Ok(selection)) => {
            let count = selection.files.len();
            state.queue_mut().set_selection(selection.files);
            state.prune_board();
            if let Some(dir) = selection.target_dir {
                state.set_target_dir(dir);
            }
            state.mark_dirty();
            if count > 0 {
                vec![notify(
                    NoticeLevel::Success,
                    format!("Selected {count} videos"),
                )]
            } else {
                Vec::new()
            }
        }
        Msg::FilesSelected(Err(err)) => vec![notify(
            NoticeLevel::Error,
            format!("Selecting videos failed: {err}"),
        )],
        Msg::SaveDirClicked => vec![Effect::SelectSaveDir],
        Msg::SaveDirSelected(Ok(dir)) => {
            if dir.is_empty() {
                return (state, Vec::new());
            }
            state.set_target_dir(dir);
            state.mark_dirty();
            vec![notify(NoticeLevel::Success, "Save directory updated")]
        }
        Msg::SaveDirSelected(Err(err)) => vec![notify(
            NoticeLevel::Error,
            format!("Selecting save directory failed: {err}"),
        )],
        Msg::RemoveTaskClicked(index) => {
            if state.queue_mut().remove(index).is_none() {
                return (state, Vec::new());
            }
            state.prune_board();
            state.mark_dirty();
            vec![
                Effect::SyncQueue {
                    paths: state.queue().paths(),
                },
                notify(NoticeLevel::Info, "Task removed"),
            ]
        }
        Msg::FieldChanged { key, value } => {
            state.set_field(&key, value.clone());
            state.mark_dirty();
            let mut params = Map::new();
            params.insert(key, value);
            vec![Effect::SetParams(params)]
        }
        Msg::StartClicked => {
            if state.start_in_flight() {
                return (state, Vec::new());
            }
            if state.queue().is_empty() {
                return (
                    state,
                    vec![notify(NoticeLevel::Error, "Select at least one video first")],
                );
            }
            state.set_start_in_flight(true);
            state.mark_dirty();
            vec![Effect::StartJob]
        }
        Msg::StartFinished(result) => {
            state.set_start_in_flight(false);
            state.mark_dirty();
            match result {
                Ok(outcome) if outcome.success => {
                    if outcome.correlations.is_empty() {
                        panel_warn!("Start succeeded without task ids");
                    }
                    let matched = state.queue_mut().record_correlations(&outcome.correlations);
                    state.prune_board();
                    let run = state.begin_run();
                    panel_info!(
                        "Run {} started: {} of {} correlations matched",
                        run,
                        matched,
                        outcome.correlations.len()
                    );
                    vec![
                        notify(NoticeLevel::Success, "Processing started"),
                        Effect::StartPolling,
                    ]
                }
                Ok(_) => vec![notify(
                    NoticeLevel::Error,
                    "Start failed, check the settings",
                )],
                Err(err) => vec![notify(NoticeLevel::Error, format!("Start failed: {err}"))],
            }
        }
        Msg::ProgressFetched(snapshot) => {
            let (queue, board) = state.parts_mut();
            let reached = board.apply(queue, &snapshot);
            state.mark_dirty();
            if reached
                && state.poll_state() == PollState::Polling
                && run_complete(state.queue(), &snapshot)
            {
                state.set_poll_state(PollState::Draining);
                panel_info!("All tasks of run {} completed", state.run());
                vec![
                    Effect::StopPolling,
                    notify(NoticeLevel::Success, "All tasks completed"),
                    Effect::ScheduleReset { run: state.run() },
                ]
            } else {
                Vec::new()
            }
        }
        Msg::ProgressFetchFailed(err) => {
            panel_warn!("Failed to fetch progress: {}", err);
            Vec::new()
        }
        Msg::ResetGraceElapsed { run } => {
            if run != state.run() || state.poll_state() != PollState::Draining {
                panel_debug!("Ignoring stale reset for run {}", run);
                return (state, Vec::new());
            }
            state.clear_run();
            state.mark_dirty();
            vec![Effect::ResetStatus]
        }
        Msg::SettingsClicked(SettingsDialog::SaveDir)
            if state.target_dir().unwrap_or_default().is_empty() =>
        {
            vec![notify(NoticeLevel::Info, "Select a save directory first")]
        }
        Msg::SettingsClicked(dialog) => {
            let channel = match dialog.channel_widget() {
                Some(widget) => match state.page().hidden_value(widget) {
                    Some(value) => value.parse::<i64>().ok(),
                    None => return (state, Vec::new()),
                },
                None => None,
            };
            vec![Effect::OpenSettings { dialog, channel }]
        }
        Msg::SettingsOpened { dialog, result } => vec![settings_notice(dialog, result)],
        Msg::BridgeNotice { event } => {
            if event == "proxyChanged" {
                vec![notify(NoticeLevel::Success, "Proxy updated")]
            } else {
                panel_debug!("Ignoring bridge notice {}", event);
                Vec::new()
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn notify(level: NoticeLevel, message: impl Into<String>) -> Effect {
    Effect::Notify {
        level,
        message: message.into(),
    }
}

fn on_options_loaded(
    state: &mut AppState,
    request: OptionsRequest,
    result: Result<Value, String>,
) -> Vec<Effect> {
    if let OptionsRequest::ModelsFor(recognition) = &request {
        // Replies may arrive out of order; only the current choice counts.
        let current = state.page().hidden_value(RECOGN_TYPE);
        if current != Some(recognition.as_str()) {
            panel_debug!(
                "Dropping model list for recognition {} (now {:?})",
                recognition,
                current
            );
            return Vec::new();
        }
    }
    let payload = match result {
        Ok(payload) => payload,
        Err(err) => {
            return vec![notify(
                NoticeLevel::Error,
                format!("Loading options failed: {err}"),
            )]
        }
    };
    let catalog = match OptionCatalog::from_json(&payload) {
        Ok(catalog) => catalog,
        Err(err) => {
            return match request {
                OptionsRequest::Bootstrap => vec![notify(
                    NoticeLevel::Error,
                    format!("Loading options failed: {err}"),
                )],
                OptionsRequest::ModelsFor(_) => {
                    panel_warn!("Model reload skipped: {}", err);
                    Vec::new()
                }
            };
        }
    };

    state.mark_dirty();
    match request {
        OptionsRequest::Bootstrap => {
            let failures = populate_catalog(state.page_mut(), &catalog);
            if !failures.is_empty() {
                panel_warn!("{} widgets could not be populated", failures.len());
            }
            for key in FIELD_KEYS {
                if let Some(value) = catalog.selected_raw(key) {
                    state.set_field(key, value.clone());
                }
            }
            state.set_catalog(catalog);
            vec![notify(NoticeLevel::Success, "Configuration loaded")]
        }
        OptionsRequest::ModelsFor(recognition) => {
            // Failures are logged by the widget; nothing else to do.
            let _ = populate_models(state.page_mut(), &catalog, &recognition);
            state.set_catalog(catalog);
            Vec::new()
        }
    }
}

/// Maps a click on a panel button or task row to the message it stands for.
fn route_click(target: &str) -> Option<Msg> {
    match target {
        BUTTON_SELECT_VIDEO => Some(Msg::SelectFilesClicked),
        BUTTON_SAVE_DIR => Some(Msg::SaveDirClicked),
        BUTTON_START => Some(Msg::StartClicked),
        BUTTON_TRANSLATE_SETTINGS => Some(Msg::SettingsClicked(SettingsDialog::Translate)),
        BUTTON_TTS_SETTINGS => Some(Msg::SettingsClicked(SettingsDialog::Tts)),
        BUTTON_RECOGN_SETTINGS => Some(Msg::SettingsClicked(SettingsDialog::Recognition)),
        BUTTON_SUMMARY_SETTINGS => Some(Msg::SettingsClicked(SettingsDialog::Summary)),
        LABEL_SAVE_DIR => Some(Msg::SettingsClicked(SettingsDialog::SaveDir)),
        other => other
            .strip_prefix(REMOVE_PREFIX)
            .and_then(|index| index.parse().ok())
            .map(Msg::RemoveTaskClicked),
    }
}

fn change_effects(event: ChangeEvent) -> Vec<Effect> {
    let mut effects = Vec::new();
    for listener in event.listeners {
        match listener {
            ChangeListener::Param { key, coercion } => {
                let value = match coercion {
                    Coercion::Text => Value::String(event.change.value.clone()),
                    Coercion::Integer => match event.change.value.trim().parse::<i64>() {
                        Ok(number) => Value::from(number),
                        Err(_) => {
                            panel_warn!(
                                "Non-numeric value {:?} for {}",
                                event.change.value,
                                key
                            );
                            continue;
                        }
                    },
                };
                let mut params = Map::new();
                params.insert(key, value);
                effects.push(Effect::SetParams(params));
            }
            ChangeListener::ReloadOptions => effects.push(Effect::LoadOptions(
                OptionsRequest::ModelsFor(event.change.value.clone()),
            )),
            ChangeListener::SummaryFolder => {
                effects.push(Effect::SetSummaryFolder(event.change.value.clone()))
            }
        }
    }
    effects
}

fn settings_notice(dialog: SettingsDialog, result: Result<SettingsReply, String>) -> Effect {
    if dialog == SettingsDialog::SaveDir {
        return match result {
            Ok(reply) if reply.success => notify(NoticeLevel::Success, "Opened save directory"),
            Ok(reply) => notify(
                NoticeLevel::Error,
                reply
                    .message
                    .unwrap_or_else(|| "Opening save directory failed".to_string()),
            ),
            Err(err) => notify(
                NoticeLevel::Error,
                format!("Opening save directory failed: {err}"),
            ),
        };
    }
    match result {
        Ok(reply) if reply.success => notify(
            NoticeLevel::Success,
            format!("Opened {} settings", dialog.label()),
        ),
        Ok(reply) => {
            let level = if dialog == SettingsDialog::Summary {
                NoticeLevel::Error
            } else {
                NoticeLevel::Info
            };
            let message = reply
                .message
                .unwrap_or_else(|| "No configuration needed".to_string());
            notify(level, message)
        }
        Err(err) => notify(
            NoticeLevel::Error,
            format!("Opening settings failed: {err}"),
        ),
    }
}
