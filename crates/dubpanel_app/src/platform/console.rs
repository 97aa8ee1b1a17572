//! Line commands read from stdin, translated into core messages.

use dubpanel_core::{Msg, SettingsDialog};
use serde_json::Value;
use thiserror::Error;

pub(crate) const HELP: &str = "\
commands:
  select              pick videos
  start               start processing the queue
  remove N            remove task N from the queue
  click ID            click the element with id ID
  set KEY VALUE       change a plain field
  settings KIND       open translate|tts|recogn|summary settings
  settings opendir    open the save directory
  savedir             pick the output directory
  quit";

const INTEGER_FIELDS: [&str; 3] = ["voice_rate", "volume", "pitch"];
const FLOAT_FIELDS: [&str; 2] = ["trim_start", "trim_end"];
const CHECKBOX_FIELDS: [&str; 7] = [
    "voice_autorate",
    "video_autorate",
    "enable_cuda",
    "enable_hearsight",
    "enable_preprocess",
    "aisendsrt",
    "remove_noise",
];

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ConsoleCommand {
    Dispatch(Msg),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ConsoleError {
    #[error("unknown command {0:?}, try help")]
    Unknown(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid task index {0:?}")]
    InvalidIndex(String),
    #[error("unknown settings dialog {0:?}")]
    UnknownDialog(String),
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

/// Parses one input line; blank lines yield `None`.
pub(crate) fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, ConsoleError> {
    let line = line.trim();
    let Some((command, rest)) = split_word(line) else {
        return Ok(None);
    };

    let parsed = match command {
        "select" => ConsoleCommand::Dispatch(Msg::SelectFilesClicked),
        "start" => ConsoleCommand::Dispatch(Msg::StartClicked),
        "savedir" => ConsoleCommand::Dispatch(Msg::SaveDirClicked),
        "remove" => {
            let raw = required(rest, "remove")?;
            let index = raw
                .parse()
                .map_err(|_| ConsoleError::InvalidIndex(raw.to_string()))?;
            ConsoleCommand::Dispatch(Msg::RemoveTaskClicked(index))
        }
        "click" => ConsoleCommand::Dispatch(Msg::PageClicked {
            target: required(rest, "click")?.to_string(),
        }),
        "set" => {
            let (key, value) =
                split_word(rest).ok_or(ConsoleError::MissingArgument("set"))?;
            ConsoleCommand::Dispatch(Msg::FieldChanged {
                key: key.to_string(),
                value: field_value(key, value)?,
            })
        }
        "settings" => {
            let kind = required(rest, "settings")?;
            let dialog = match kind {
                "translate" => SettingsDialog::Translate,
                "tts" => SettingsDialog::Tts,
                "recogn" => SettingsDialog::Recognition,
                "summary" => SettingsDialog::Summary,
                "opendir" => SettingsDialog::SaveDir,
                other => return Err(ConsoleError::UnknownDialog(other.to_string())),
            };
            ConsoleCommand::Dispatch(Msg::SettingsClicked(dialog))
        }
        "help" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(ConsoleError::Unknown(other.to_string())),
    };
    Ok(Some(parsed))
}

fn split_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => Some((word, rest.trim())),
        None => Some((text, "")),
    }
}

fn required<'a>(rest: &'a str, command: &'static str) -> Result<&'a str, ConsoleError> {
    if rest.is_empty() {
        Err(ConsoleError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}

/// Converts raw field text into the JSON type the backend expects for `key`.
/// Empty numeric input counts as zero.
pub(crate) fn field_value(key: &str, raw: &str) -> Result<Value, ConsoleError> {
    let raw = raw.trim();
    let invalid = || ConsoleError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    };

    if INTEGER_FIELDS.contains(&key) {
        if raw.is_empty() {
            return Ok(Value::from(0));
        }
        return raw.parse::<i64>().map(Value::from).map_err(|_| invalid());
    }
    if FLOAT_FIELDS.contains(&key) {
        if raw.is_empty() {
            return Ok(Value::from(0.0));
        }
        return raw
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(Value::from)
            .ok_or_else(invalid);
    }
    if CHECKBOX_FIELDS.contains(&key) {
        return match raw.to_ascii_lowercase().as_str() {
            "true" | "on" | "1" | "yes" => Ok(Value::Bool(true)),
            "false" | "off" | "0" | "no" | "" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        };
    }
    Ok(Value::String(raw.to_string()))
}
