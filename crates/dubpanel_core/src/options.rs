//! Option lists delivered by the backend and the widgets they feed.

use serde_json::{Map, Value};
use thiserror::Error;

use panel_logging::panel_error;

use crate::page::Page;
use crate::select::{value_string, ChangeListener, Coercion, OptionEntry, PopulateError};

pub const TRANSLATE_TYPE: &str = "translate-type";
pub const SOURCE_LANGUAGE: &str = "source-language";
pub const TARGET_LANGUAGE: &str = "target-language";
pub const RECOGN_TYPE: &str = "recogn-type";
pub const MODEL_NAME: &str = "model-name";
pub const SPLIT_TYPE: &str = "split-type";
pub const TTS_TYPE: &str = "tts-type";
pub const SUBTITLE_TYPE: &str = "subtitle-type";
pub const VOICE_ROLE: &str = "voice-role";
pub const SUMMARY_FOLDER: &str = "summary-folder";

/// Every select widget the panel mounts.
pub const ALL_WIDGETS: [&str; 10] = [
    TRANSLATE_TYPE,
    SOURCE_LANGUAGE,
    TARGET_LANGUAGE,
    RECOGN_TYPE,
    MODEL_NAME,
    SPLIT_TYPE,
    TTS_TYPE,
    SUBTITLE_TYPE,
    VOICE_ROLE,
    SUMMARY_FOLDER,
];

/// Plain input fields whose initial values come from the `selected` map.
pub const FIELD_KEYS: [&str; 12] = [
    "voice_rate",
    "volume",
    "pitch",
    "trim_start",
    "trim_end",
    "voice_autorate",
    "video_autorate",
    "enable_cuda",
    "enable_hearsight",
    "enable_preprocess",
    "aisendsrt",
    "remove_noise",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("backend reported an error: {0}")]
    Backend(String),
    #[error("option payload is not an object")]
    NotAnObject,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptionCatalog {
    pub languages: Vec<OptionEntry>,
    pub translate_types: Vec<OptionEntry>,
    pub tts_types: Vec<OptionEntry>,
    pub recognition_types: Vec<OptionEntry>,
    pub whisper_models: Vec<OptionEntry>,
    pub funasr_models: Vec<OptionEntry>,
    pub deepgram_models: Vec<OptionEntry>,
    pub subtitle_types: Vec<OptionEntry>,
    pub split_types: Vec<OptionEntry>,
    pub voice_roles: Vec<OptionEntry>,
    selected: Map<String, Value>,
}

impl OptionCatalog {
    /// Parses the `get options` payload. Missing lists come back empty so
    /// the widgets depending on them stay unpopulated.
    pub fn from_json(payload: &Value) -> Result<Self, CatalogError> {
        let Some(object) = payload.as_object() else {
            return Err(CatalogError::NotAnObject);
        };
        if let Some(error) = object.get("error") {
            return Err(CatalogError::Backend(value_string(error)));
        }

        let split_types = object
            .get("splitTypes")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .map(|(key, label)| OptionEntry::new(key.clone(), value_string(label)))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            languages: entries(object, "languages"),
            translate_types: entries(object, "translateTypes"),
            tts_types: entries(object, "ttsTypes"),
            recognition_types: entries(object, "recognitionTypes"),
            whisper_models: entries(object, "whisperModels"),
            funasr_models: entries(object, "funasrModels"),
            deepgram_models: entries(object, "deepgramModels"),
            subtitle_types: entries(object, "subtitleTypes"),
            split_types,
            voice_roles: entries(object, "voiceRoles"),
            selected: object
                .get("selected")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// String form of the backend's current choice for `key`.
    pub fn selected(&self, key: &str) -> String {
        self.selected.get(key).map(value_string).unwrap_or_default()
    }

    pub fn selected_raw(&self, key: &str) -> Option<&Value> {
        self.selected.get(key)
    }

    /// Model list for a recognition channel index.
    pub fn models_for(&self, recognition: &str) -> &[OptionEntry] {
        match recognition {
            "2" => &self.funasr_models,
            "3" => &self.deepgram_models,
            _ => &self.whisper_models,
        }
    }

    /// Target languages: a `-` (no translation) entry followed by every
    /// language but the last.
    pub fn target_languages(&self) -> Vec<OptionEntry> {
        let mut targets = vec![OptionEntry::new("-", "-")];
        let keep = self.languages.len().saturating_sub(1);
        targets.extend(self.languages.iter().take(keep).cloned());
        targets
    }
}

fn entries(object: &Map<String, Value>, key: &str) -> Vec<OptionEntry> {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(index, item)| OptionEntry::from_json(index, item))
                .collect()
        })
        .unwrap_or_default()
}

/// Folder entry for the summary-folder widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryFolder {
    pub value: String,
    pub label: String,
    pub count: u64,
}

/// Populates every catalog-backed widget and re-binds its listeners.
/// Failures are per widget; the rest are still populated.
pub fn populate_catalog(page: &mut Page, catalog: &OptionCatalog) -> Vec<PopulateError> {
    let target_selected = match catalog.selected("target_language") {
        empty if empty.is_empty() => "-".to_string(),
        value => value,
    };
    let voice_roles = if catalog.voice_roles.is_empty() {
        vec![OptionEntry::new("No", "No")]
    } else {
        catalog.voice_roles.clone()
    };
    let voice_selected = match catalog.selected("voice_role") {
        empty if empty.is_empty() => voice_roles[0].value.clone(),
        value => value,
    };

    let plan: Vec<(&str, Vec<OptionEntry>, String)> = vec![
        (
            TRANSLATE_TYPE,
            catalog.translate_types.clone(),
            catalog.selected("translate_type"),
        ),
        (
            SOURCE_LANGUAGE,
            catalog.languages.clone(),
            catalog.selected("source_language"),
        ),
        (TARGET_LANGUAGE, catalog.target_languages(), target_selected),
        (
            RECOGN_TYPE,
            catalog.recognition_types.clone(),
            catalog.selected("recogn_type"),
        ),
        (
            SPLIT_TYPE,
            catalog.split_types.clone(),
            catalog.selected("split_type"),
        ),
        (
            TTS_TYPE,
            catalog.tts_types.clone(),
            catalog.selected("tts_type"),
        ),
        (
            SUBTITLE_TYPE,
            catalog.subtitle_types.clone(),
            catalog.selected("subtitle_type"),
        ),
        (VOICE_ROLE, voice_roles, voice_selected),
    ];

    let mut failures = Vec::new();
    for (id, options, selected) in plan {
        match page.populate(id, options, &selected) {
            Ok(()) => bind_widget(page, id),
            Err(err) => failures.push(err),
        }
    }
    if let Err(err) = populate_models(page, catalog, &catalog.selected("recogn_type")) {
        failures.push(err);
    }
    failures
}

/// Repopulates model-name for a recognition channel.
pub fn populate_models(
    page: &mut Page,
    catalog: &OptionCatalog,
    recognition: &str,
) -> Result<(), PopulateError> {
    let models = catalog.models_for(recognition).to_vec();
    page.populate(MODEL_NAME, models, &catalog.selected("model_name"))?;
    bind_widget(page, MODEL_NAME);
    Ok(())
}

/// Populates the summary-folder widget, first entry (all folders) selected.
pub fn populate_folders(page: &mut Page, folders: &[SummaryFolder]) -> Result<(), PopulateError> {
    let options = folders
        .iter()
        .map(|folder| {
            let label = if folder.count > 0 {
                format!("{} ({})", folder.label, folder.count)
            } else {
                folder.label.clone()
            };
            OptionEntry::new(folder.value.clone(), label)
        })
        .collect();
    page.populate(SUMMARY_FOLDER, options, "")?;
    bind_widget(page, SUMMARY_FOLDER);
    Ok(())
}

fn bind_widget(page: &mut Page, id: &str) {
    for listener in listeners_for(id) {
        if !page.bind(id, listener) {
            // Empty option list: nothing rendered to bind to.
            break;
        }
    }
}

/// Listeners a freshly populated widget gets.
pub fn listeners_for(id: &str) -> Vec<ChangeListener> {
    let param = |key: &str, coercion| ChangeListener::Param {
        key: key.to_string(),
        coercion,
    };
    match id {
        TRANSLATE_TYPE => vec![param("translate_type", Coercion::Integer)],
        SOURCE_LANGUAGE => vec![param("source_language", Coercion::Text)],
        TARGET_LANGUAGE => vec![param("target_language", Coercion::Text)],
        RECOGN_TYPE => vec![
            ChangeListener::ReloadOptions,
            param("recogn_type", Coercion::Integer),
        ],
        MODEL_NAME => vec![param("model_name", Coercion::Text)],
        SPLIT_TYPE => vec![param("split_type", Coercion::Text)],
        TTS_TYPE => vec![param("tts_type", Coercion::Integer)],
        SUBTITLE_TYPE => vec![param("subtitle_type", Coercion::Integer)],
        VOICE_ROLE => vec![param("voice_role", Coercion::Text)],
        SUMMARY_FOLDER => vec![ChangeListener::SummaryFolder],
        other => {
            panel_error!("No listeners defined for widget {}", other);
            Vec::new()
        }
    }
}
