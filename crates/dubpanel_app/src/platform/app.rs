use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use dubpanel_bridge::{BridgeHandle, HttpBridge};
use dubpanel_core::{update, AppState, Msg};
use panel_logging::{panel_debug, panel_info, panel_warn};

use super::config::{config_path, load_config, PanelConfig};
use super::console::{parse_line, ConsoleCommand, HELP};
use super::effects::EffectRunner;
use super::snapshot;

enum Input {
    Msg(Msg),
    Quit,
}

pub fn run_app() -> anyhow::Result<()> {
    let path = config_path(std::env::args());
    let config = load_config(&path);
    init_logging(&config);
    panel_info!("Starting dubpanel against {}", config.bridge_url);

    let bridge = HttpBridge::new(&config.bridge_settings())
        .with_context(|| format!("bridge endpoint from {}", path.display()))?;
    let handle = BridgeHandle::new(Arc::new(bridge), config.poll_timing());

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(handle, msg_tx.clone());

    spawn_forwarder(msg_rx, input_tx.clone());
    spawn_console(input_tx.clone());

    // Background tick to coalesce rendering.
    let tick_tx = input_tx.clone();
    thread::spawn(move || {
        let interval = Duration::from_millis(100);
        while tick_tx.send(Input::Msg(Msg::Tick)).is_ok() {
            thread::sleep(interval);
        }
    });

    let _ = msg_tx.send(Msg::Booted);
    println!("{HELP}");

    let mut state = AppState::new();
    let mut renderer = Renderer::new(config.render_path.clone());
    while let Ok(input) = input_rx.recv() {
        let msg = match input {
            Input::Msg(msg) => msg,
            Input::Quit => break,
        };
        let (next, effects) = update(state, msg);
        state = next;
        runner.enqueue(effects);
        if state.consume_dirty() {
            renderer.render(&state);
        }
    }

    panel_info!("Shutting down");
    Ok(())
}

fn init_logging(config: &PanelConfig) {
    let log_file = config
        .log_file
        .clone()
        .unwrap_or_else(panel_logging::default_log_file);
    panel_logging::initialize(
        config.log_destination,
        panel_logging::parse_level(&config.log_level),
        &log_file,
    );
}

fn spawn_forwarder(msg_rx: mpsc::Receiver<Msg>, input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        while let Ok(msg) = msg_rx.recv() {
            if input_tx.send(Input::Msg(msg)).is_err() {
                break;
            }
        }
    });
}

fn spawn_console(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    panel_warn!("Failed to read stdin: {}", err);
                    break;
                }
            };
            let input = match parse_line(&line) {
                Ok(Some(ConsoleCommand::Dispatch(msg))) => Input::Msg(msg),
                Ok(Some(ConsoleCommand::Quit)) => Input::Quit,
                Ok(Some(ConsoleCommand::Help)) => {
                    println!("{HELP}");
                    continue;
                }
                Ok(None) => continue,
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            };
            if input_tx.send(input).is_err() {
                break;
            }
        }
        // End of input quits like the command does.
        let _ = input_tx.send(Input::Quit);
    });
}

struct Renderer {
    html_path: Option<PathBuf>,
    last_summary: Vec<String>,
}

impl Renderer {
    fn new(html_path: Option<PathBuf>) -> Self {
        Self {
            html_path,
            last_summary: Vec::new(),
        }
    }

    fn render(&mut self, state: &AppState) {
        let summary = snapshot::summary_lines(&state.view());
        if summary != self.last_summary {
            for line in &summary {
                println!("{line}");
            }
            self.last_summary = summary;
        }

        if let Some(path) = &self.html_path {
            match snapshot::write_html(path, &state.render_document()) {
                Ok(()) => panel_debug!("Wrote page snapshot to {:?}", path),
                Err(err) => panel_warn!("Failed to write page snapshot to {:?}: {}", path, err),
            }
        }
    }
}
