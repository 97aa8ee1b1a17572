use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use tokio::runtime::Runtime;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use panel_logging::{panel_debug, panel_error, panel_info, panel_warn};

use crate::{Bridge, BridgeError, BridgeEvent, Call, Reply};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    pub poll_interval: Duration,
    pub reset_grace: Duration,
    /// Cadence of the advisory notice listener; `None` disables it.
    pub notice_interval: Option<Duration>,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            reset_grace: Duration::from_millis(2000),
            notice_interval: Some(Duration::from_secs(1)),
        }
    }
}

enum HandleCommand {
    Call(Call),
    StartPolling,
    StopPolling,
    ScheduleReset { run: u64 },
}

/// Runs bridge calls and timers on a background tokio runtime and hands the
/// results back as [`BridgeEvent`]s.
#[derive(Clone)]
pub struct BridgeHandle {
    cmd_tx: mpsc::Sender<HandleCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<BridgeEvent>>>,
}

impl BridgeHandle {
    pub fn new(bridge: Arc<dyn Bridge>, timing: PollTiming) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    panel_error!("Failed to start bridge runtime: {}", err);
                    return;
                }
            };
            let mut worker = Worker {
                bridge,
                timing,
                event_tx,
                poll: None,
            };
            worker.spawn_notice_listener(&runtime);
            while let Ok(command) = cmd_rx.recv() {
                worker.handle(&runtime, command);
            }
            worker.stop_polling();
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn call(&self, call: Call) {
        let _ = self.cmd_tx.send(HandleCommand::Call(call));
    }

    /// Starts the progress timer; a no-op while it is already running.
    pub fn start_polling(&self) {
        let _ = self.cmd_tx.send(HandleCommand::StartPolling);
    }

    /// Cancels the progress timer. Fetches already in flight still report.
    pub fn stop_polling(&self) {
        let _ = self.cmd_tx.send(HandleCommand::StopPolling);
    }

    pub fn schedule_reset(&self, run: u64) {
        let _ = self.cmd_tx.send(HandleCommand::ScheduleReset { run });
    }

    pub fn try_recv(&self) -> Option<BridgeEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<BridgeEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

struct Worker {
    bridge: Arc<dyn Bridge>,
    timing: PollTiming,
    event_tx: mpsc::Sender<BridgeEvent>,
    poll: Option<CancellationToken>,
}

impl Worker {
    fn handle(&mut self, runtime: &Runtime, command: HandleCommand) {
        match command {
            HandleCommand::Call(call) => {
                let bridge = self.bridge.clone();
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    let result = execute(bridge.as_ref(), &call).await;
                    if let Err(err) = &result {
                        panel_warn!("Bridge call {} failed: {}", call.name(), err);
                    }
                    let _ = event_tx.send(BridgeEvent::Completed { call, result });
                });
            }
            HandleCommand::StartPolling => {
                if self.poll.is_some() {
                    panel_debug!("Progress polling already running");
                    return;
                }
                let token = CancellationToken::new();
                runtime.spawn(poll_progress(
                    self.bridge.clone(),
                    self.timing.poll_interval,
                    token.clone(),
                    self.event_tx.clone(),
                ));
                self.poll = Some(token);
                panel_info!(
                    "Progress polling started every {:?}",
                    self.timing.poll_interval
                );
            }
            HandleCommand::StopPolling => self.stop_polling(),
            HandleCommand::ScheduleReset { run } => {
                let grace = self.timing.reset_grace;
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(grace).await;
                    let _ = event_tx.send(BridgeEvent::ResetDue { run });
                });
            }
        }
    }

    fn stop_polling(&mut self) {
        if let Some(token) = self.poll.take() {
            token.cancel();
        }
    }

    fn spawn_notice_listener(&self, runtime: &Runtime) {
        let Some(period) = self.timing.notice_interval else {
            return;
        };
        let bridge = self.bridge.clone();
        let event_tx = self.event_tx.clone();
        runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match bridge.notices().await {
                    Ok(notices) => {
                        for notice in notices {
                            if event_tx.send(BridgeEvent::Notice(notice)).is_err() {
                                return;
                            }
                        }
                    }
                    Err(err) => panel_debug!("Notice poll failed: {}", err),
                }
            }
        });
    }
}

/// Fixed-cadence progress timer. Each tick spawns its own fetch, so a slow
/// fetch never delays the next tick and results may overlap.
async fn poll_progress(
    bridge: Arc<dyn Bridge>,
    period: Duration,
    token: CancellationToken,
    event_tx: mpsc::Sender<BridgeEvent>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                let bridge = bridge.clone();
                let event_tx = event_tx.clone();
                tokio::spawn(async move {
                    let result = bridge.task_progress().await;
                    if let Err(err) = &result {
                        panel_warn!("Progress fetch failed: {}", err);
                    }
                    let _ = event_tx.send(BridgeEvent::Progress(result));
                });
            }
        }
    }
    panel_debug!("Progress polling stopped");
}

async fn execute(bridge: &dyn Bridge, call: &Call) -> Result<Reply, BridgeError> {
    match call {
        Call::InitState => bridge.get_init_state().await.map(Reply::InitState),
        Call::Options { .. } => bridge.get_options().await.map(Reply::Options),
        Call::SelectFiles => bridge.select_files().await.map(Reply::Files),
        Call::SelectSaveDir => bridge.select_save_dir().await.map(Reply::SaveDir),
        Call::SetVideoQueue(paths) => bridge.set_video_queue(paths).await.map(|()| Reply::Done),
        Call::SetParams(params) => bridge.set_params(params).await.map(|()| Reply::Done),
        Call::SetSummaryFolder(folder) => bridge
            .set_summary_folder(folder)
            .await
            .map(|()| Reply::Done),
        Call::StartJob => bridge.start_job().await.map(Reply::Started),
        Call::ResetStatus => bridge.reset_status().await.map(|()| Reply::Done),
        Call::OpenSettings { target, channel } => bridge
            .open_settings(*target, *channel)
            .await
            .map(Reply::Settings),
        Call::SummaryFolders => bridge.summary_folders().await.map(Reply::Folders),
    }
}
