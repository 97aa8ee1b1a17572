//! Dropdown widget built from plain elements.
//!
//! A widget named `id` lives in the container `{id}-container` and renders:
//! - a trigger `div#{id}` showing the selected label,
//! - a menu `div#{id}__menu` with one `div#{id}__item_{n}` per option,
//! - a hidden `input#{id}__value` holding the selected value.
//!
//! Every populate rebuilds the container from scratch, so listeners bound to
//! a previous instance are gone afterwards.

use serde_json::Value;
use thiserror::Error;

use panel_logging::{panel_debug, panel_error, panel_warn};

use crate::dom::{Document, Element};

pub const TRIGGER_CLASS: &str = "custom-select-trigger";
pub const MENU_CLASS: &str = "custom-select-menu";
pub const ITEM_CLASS: &str = "custom-select-item";
pub const OPEN_CLASS: &str = "open";
pub const SELECTED_CLASS: &str = "selected";
pub const PLACEHOLDER_LABEL: &str = "Select...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    pub value: String,
    pub label: String,
}

impl OptionEntry {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Lenient conversion of one backend list item.
    ///
    /// A missing `value` falls back to the item's position and a missing
    /// `label` to the item itself rendered as text.
    pub fn from_json(index: usize, item: &Value) -> Self {
        let value = match item.get("value") {
            Some(value) => value_string(value),
            None => index.to_string(),
        };
        let label = match item.get("label") {
            Some(label) => value_string(label),
            None => value_string(item),
        };
        Self { value, label }
    }
}

/// String form used for every value comparison; `null` becomes `""`.
pub fn value_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Emitted when the user picks an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectChange {
    pub widget: String,
    pub value: String,
    pub label: String,
}

/// How a bound change value is converted before it is forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Text,
    Integer,
}

/// What a widget change is forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeListener {
    Param { key: String, coercion: Coercion },
    ReloadOptions,
    SummaryFolder,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PopulateError {
    #[error("container {0} not found")]
    MissingContainer(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectWidget {
    id: String,
    options: Vec<OptionEntry>,
    current_value: String,
    is_open: bool,
    listeners: Vec<ChangeListener>,
}

pub fn container_id(id: &str) -> String {
    format!("{id}-container")
}

pub fn menu_id(id: &str) -> String {
    format!("{id}__menu")
}

pub fn hidden_id(id: &str) -> String {
    format!("{id}__value")
}

pub fn item_id(id: &str, index: usize) -> String {
    format!("{id}__item_{index}")
}

impl SelectWidget {
    /// Replaces whatever the container held with a fresh widget.
    ///
    /// Returns `Ok(None)` for an empty option list: the container is left
    /// empty and no trigger exists to click.
    pub fn populate(
        doc: &mut Document,
        id: &str,
        options: Vec<OptionEntry>,
        selected: &str,
    ) -> Result<Option<Self>, PopulateError> {
        let container_id = container_id(id);
        let Some(container) = doc.container_mut(&container_id) else {
            panel_error!("Select container {} not found", container_id);
            return Err(PopulateError::MissingContainer(container_id));
        };
        container.clear_children();

        if options.is_empty() {
            panel_warn!("Option list for {} is empty", id);
            return Ok(None);
        }

        let selected_index = options.iter().position(|entry| entry.value == selected);
        let current_value = selected_index
            .map(|index| options[index].value.clone())
            .unwrap_or_default();
        let trigger_label = selected_index
            .map(|index| options[index].label.clone())
            .unwrap_or_else(|| PLACEHOLDER_LABEL.to_string());

        let mut menu = Element::new("div")
            .with_id(menu_id(id))
            .with_class(MENU_CLASS);
        for (index, entry) in options.iter().enumerate() {
            let mut item = Element::new("div")
                .with_id(item_id(id, index))
                .with_class(ITEM_CLASS)
                .with_attr("data-value", entry.value.clone())
                .with_text(entry.label.clone());
            if Some(index) == selected_index {
                item.add_class(SELECTED_CLASS);
            }
            menu.push_child(item);
        }

        container.push_child(
            Element::new("div")
                .with_id(id)
                .with_class(TRIGGER_CLASS)
                .with_attr("tabindex", "0")
                .with_text(trigger_label),
        );
        container.push_child(menu);
        container.push_child(
            Element::new("input")
                .with_id(hidden_id(id))
                .with_attr("type", "hidden")
                .with_attr("value", current_value.clone()),
        );

        panel_debug!(
            "Populated {} with {} options, selected {:?}",
            id,
            options.len(),
            current_value
        );

        Ok(Some(Self {
            id: id.to_string(),
            options,
            current_value,
            is_open: false,
            listeners: Vec::new(),
        }))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &[OptionEntry] {
        &self.options
    }

    pub fn current_value(&self) -> &str {
        &self.current_value
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn listeners(&self) -> &[ChangeListener] {
        &self.listeners
    }

    pub fn bind(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    pub fn open(&mut self, doc: &mut Document) {
        self.set_open(doc, true);
    }

    pub fn close(&mut self, doc: &mut Document) {
        self.set_open(doc, false);
    }

    /// Records a close already applied to the markup by a page-wide sweep.
    pub(crate) fn mark_closed(&mut self) {
        self.is_open = false;
    }

    fn set_open(&mut self, doc: &mut Document, open: bool) {
        self.is_open = open;
        let Some(container) = doc.container_mut(&container_id(&self.id)) else {
            return;
        };
        for el in container.children_mut() {
            if el.has_class(MENU_CLASS) || el.has_class(TRIGGER_CLASS) {
                if open {
                    el.add_class(OPEN_CLASS);
                } else {
                    el.remove_class(OPEN_CLASS);
                }
            }
        }
    }

    /// Applies a pick of item `index` and returns the change to emit.
    pub fn select(&mut self, doc: &mut Document, index: usize) -> Option<SelectChange> {
        let entry = self.options.get(index)?.clone();
        let container = doc.container_mut(&container_id(&self.id))?;

        if let Some(hidden) = container.find_mut(&hidden_id(&self.id)) {
            hidden.set_attr("value", entry.value.clone());
        }
        if let Some(trigger) = container.find_mut(&self.id) {
            trigger.set_text(entry.label.clone());
        }
        if let Some(menu) = container.find_mut(&menu_id(&self.id)) {
            for (position, item) in menu.children_mut().iter_mut().enumerate() {
                if position == index {
                    item.add_class(SELECTED_CLASS);
                } else {
                    item.remove_class(SELECTED_CLASS);
                }
            }
        }

        self.current_value = entry.value.clone();
        self.close(doc);

        Some(SelectChange {
            widget: self.id.clone(),
            value: entry.value,
            label: entry.label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_string_normalizes_scalars() {
        assert_eq!(value_string(&json!(null)), "");
        assert_eq!(value_string(&json!("x")), "x");
        assert_eq!(value_string(&json!(3)), "3");
        assert_eq!(value_string(&json!(true)), "true");
    }

    #[test]
    fn option_entry_falls_back_to_index_and_item_text() {
        assert_eq!(
            OptionEntry::from_json(4, &json!("plain")),
            OptionEntry::new("4", "plain")
        );
        assert_eq!(
            OptionEntry::from_json(0, &json!({"value": 2, "label": "Azure"})),
            OptionEntry::new("2", "Azure")
        );
    }
}
