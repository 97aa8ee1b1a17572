use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use dubpanel_bridge::{
    BridgeError, BridgeEvent, BridgeHandle, Call, Reply, SettingsTarget, WireProgressMap,
};
use dubpanel_core::{
    Correlation, Effect, Failure, FileSelection, InitState, Msg, NoticeLevel, OptionsRequest,
    ProgressSnapshot, SettingsDialog, SettingsReply, StartOutcome, SummaryFolder, TaskProgress,
    TaskStatus,
};
use panel_logging::{panel_error, panel_info, panel_trace};

/// Executes core effects against the bridge and feeds bridge events back as
/// messages.
pub struct EffectRunner {
    bridge: BridgeHandle,
}

impl EffectRunner {
    pub fn new(bridge: BridgeHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self { bridge };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            panel_trace!("Effect {:?}", effect);
            match effect {
                Effect::StartPolling => self.bridge.start_polling(),
                Effect::StopPolling => self.bridge.stop_polling(),
                Effect::ScheduleReset { run } => self.bridge.schedule_reset(run),
                Effect::Notify { level, message } => notify(level, &message),
                other => {
                    if let Some(call) = effect_call(other) {
                        self.bridge.call(call);
                    }
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let bridge = self.bridge.clone();
        thread::spawn(move || loop {
            match bridge.recv_timeout(Duration::from_millis(50)) {
                Some(event) => {
                    if let Some(msg) = event_msg(event) {
                        if msg_tx.send(msg).is_err() {
                            break;
                        }
                    }
                }
                None => thread::sleep(Duration::from_millis(5)),
            }
        });
    }
}

fn notify(level: NoticeLevel, message: &str) {
    match level {
        NoticeLevel::Error => panel_error!("{}", message),
        NoticeLevel::Info | NoticeLevel::Success => panel_info!("{}", message),
    }
    let tag = match level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
    };
    println!("[{tag}] {message}");
}

/// Bridge call for an effect; `None` for effects handled elsewhere.
pub(crate) fn effect_call(effect: Effect) -> Option<Call> {
    let call = match effect {
        Effect::LoadInitState => Call::InitState,
        Effect::LoadOptions(OptionsRequest::Bootstrap) => Call::Options { recognition: None },
        Effect::LoadOptions(OptionsRequest::ModelsFor(recognition)) => Call::Options {
            recognition: Some(recognition),
        },
        Effect::LoadSummaryFolders => Call::SummaryFolders,
        Effect::SelectFiles => Call::SelectFiles,
        Effect::SelectSaveDir => Call::SelectSaveDir,
        Effect::SyncQueue { paths } => Call::SetVideoQueue(paths),
        Effect::SetParams(params) => Call::SetParams(params),
        Effect::SetSummaryFolder(folder) => Call::SetSummaryFolder(folder),
        Effect::StartJob => Call::StartJob,
        Effect::ResetStatus => Call::ResetStatus,
        Effect::OpenSettings { dialog, channel } => Call::OpenSettings {
            target: settings_target(dialog),
            channel,
        },
        Effect::StartPolling
        | Effect::StopPolling
        | Effect::ScheduleReset { .. }
        | Effect::Notify { .. } => return None,
    };
    Some(call)
}

fn settings_target(dialog: SettingsDialog) -> SettingsTarget {
    match dialog {
        SettingsDialog::Translate => SettingsTarget::Translate,
        SettingsDialog::Tts => SettingsTarget::Tts,
        SettingsDialog::Recognition => SettingsTarget::Recognition,
        SettingsDialog::Summary => SettingsTarget::Summary,
        SettingsDialog::SaveDir => SettingsTarget::SaveDir,
    }
}

fn settings_dialog(target: SettingsTarget) -> SettingsDialog {
    match target {
        SettingsTarget::Translate => SettingsDialog::Translate,
        SettingsTarget::Tts => SettingsDialog::Tts,
        SettingsTarget::Recognition => SettingsDialog::Recognition,
        SettingsTarget::Summary => SettingsDialog::Summary,
        SettingsTarget::SaveDir => SettingsDialog::SaveDir,
    }
}

/// Message for a bridge event. Acknowledgements of fire-and-forget calls
/// carry nothing for the core and map to `None`.
pub(crate) fn event_msg(event: BridgeEvent) -> Option<Msg> {
    let msg = match event {
        BridgeEvent::Completed { call, result } => return completed_msg(call, result),
        BridgeEvent::Progress(Ok(map)) => Msg::ProgressFetched(snapshot(map)),
        BridgeEvent::Progress(Err(err)) => Msg::ProgressFetchFailed(err.to_string()),
        BridgeEvent::ResetDue { run } => Msg::ResetGraceElapsed { run },
        BridgeEvent::Notice(notice) => Msg::BridgeNotice {
            event: notice.event,
        },
    };
    Some(msg)
}

fn completed_msg(call: Call, result: Result<Reply, BridgeError>) -> Option<Msg> {
    let msg = match call {
        Call::InitState => Msg::InitStateLoaded(pick(result, |reply| match reply {
            Reply::InitState(init) => Some(InitState {
                version: init.version,
                target_dir: init.target_dir,
                proxy: init.proxy,
            }),
            _ => None,
        })),
        Call::Options { recognition } => Msg::OptionsLoaded {
            request: match recognition {
                Some(recognition) => OptionsRequest::ModelsFor(recognition),
                None => OptionsRequest::Bootstrap,
            },
            result: pick(result, |reply| match reply {
                Reply::Options(payload) => Some(payload),
                _ => None,
            }),
        },
        Call::SelectFiles => Msg::FilesSelected(pick(result, |reply| match reply {
            Reply::Files(selection) => Some(FileSelection {
                files: selection.files,
                target_dir: selection.target_dir,
            }),
            _ => None,
        })),
        Call::SelectSaveDir => Msg::SaveDirSelected(pick(result, |reply| match reply {
            Reply::SaveDir(dir) => Some(dir),
            _ => None,
        })),
        Call::StartJob => Msg::StartFinished(pick(result, |reply| match reply {
            Reply::Started(started) => Some(StartOutcome {
                success: started.success,
                correlations: started
                    .task_uuids
                    .into_iter()
                    .map(|pair| Correlation::new(pair.path, pair.uuid))
                    .collect(),
            }),
            _ => None,
        })),
        Call::OpenSettings { target, .. } => Msg::SettingsOpened {
            dialog: settings_dialog(target),
            result: pick(result, |reply| match reply {
                Reply::Settings(settings) => Some(SettingsReply {
                    success: settings.success,
                    message: settings.message,
                }),
                _ => None,
            }),
        },
        Call::SummaryFolders => Msg::SummaryFoldersLoaded(pick(result, |reply| match reply {
            Reply::Folders(folders) => Some(
                folders
                    .into_iter()
                    .map(|folder| SummaryFolder {
                        value: folder.value_text(),
                        label: folder.label,
                        count: folder.count,
                    })
                    .collect(),
            ),
            _ => None,
        })),
        Call::SetVideoQueue(_)
        | Call::SetParams(_)
        | Call::SetSummaryFolder(_)
        | Call::ResetStatus => return None,
    };
    Some(msg)
}

fn pick<T>(
    result: Result<Reply, BridgeError>,
    select: impl FnOnce(Reply) -> Option<T>,
) -> Result<T, Failure> {
    match result {
        Ok(reply) => select(reply).ok_or_else(|| "unexpected bridge reply".to_string()),
        Err(err) => Err(err.to_string()),
    }
}

fn snapshot(map: WireProgressMap) -> ProgressSnapshot {
    map.into_iter()
        .map(|(uuid, progress)| {
            let percent = progress.clamped_percent();
            (
                uuid,
                TaskProgress::new(
                    percent,
                    TaskStatus::from_wire(&progress.status),
                    progress.text,
                ),
            )
        })
        .collect()
}
