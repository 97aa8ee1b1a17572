//! The rendered page: the document plus the live select widgets in it.
//!
//! At most one menu is open at a time. That is enforced by sweeping the
//! document for open menus whenever a trigger is clicked, so it holds no
//! matter which widgets were created or replaced since the last click.

use std::collections::BTreeMap;

use panel_logging::panel_trace;

use crate::dom::{Document, Element};
use crate::select::{
    container_id, hidden_id, menu_id, ChangeListener, OptionEntry, PopulateError, SelectChange,
    SelectWidget, MENU_CLASS, OPEN_CLASS, TRIGGER_CLASS,
};

/// Result of a click that picked an item: the change plus whatever was bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub change: SelectChange,
    pub listeners: Vec<ChangeListener>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    doc: Document,
    widgets: BTreeMap<String, SelectWidget>,
}

impl Page {
    /// Page with an empty container mounted for each widget id.
    pub fn new<'a>(widget_ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            doc: Document::with_containers(widget_ids.into_iter().map(container_id)),
            widgets: BTreeMap::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn widget(&self, id: &str) -> Option<&SelectWidget> {
        self.widgets.get(id)
    }

    /// Open widgets, in id order.
    pub fn open_widgets(&self) -> Vec<&str> {
        self.widgets
            .values()
            .filter(|widget| widget.is_open())
            .map(SelectWidget::id)
            .collect()
    }

    /// Rebuilds widget `id`. The previous instance and its listeners are
    /// dropped even when the new option list is empty.
    pub fn populate(
        &mut self,
        id: &str,
        options: Vec<OptionEntry>,
        selected: &str,
    ) -> Result<(), PopulateError> {
        let widget = SelectWidget::populate(&mut self.doc, id, options, selected)?;
        self.widgets.remove(id);
        if let Some(widget) = widget {
            self.widgets.insert(id.to_string(), widget);
        }
        Ok(())
    }

    /// Binds a listener to the current instance; false when none is rendered.
    pub fn bind(&mut self, id: &str, listener: ChangeListener) -> bool {
        match self.widgets.get_mut(id) {
            Some(widget) => {
                widget.bind(listener);
                true
            }
            None => false,
        }
    }

    /// Current string in the widget's hidden value holder.
    pub fn hidden_value(&self, id: &str) -> Option<&str> {
        self.doc.find(&hidden_id(id))?.attr("value")
    }

    /// Routes a click on the element with id `target`.
    ///
    /// Widgets not containing the target are closed first, then the target
    /// itself is handled if it is a trigger or a menu item.
    pub fn click(&mut self, target: &str) -> Option<ChangeEvent> {
        for widget in self.widgets.values_mut() {
            let inside = self
                .doc
                .container(&container_id(widget.id()))
                .is_some_and(|container| container.contains(target));
            if !inside && widget.is_open() {
                widget.close(&mut self.doc);
            }
        }

        if self.widgets.contains_key(target) {
            self.click_trigger(target);
            return None;
        }

        let (id, index) = self.resolve_item(target)?;
        let widget = self.widgets.get_mut(&id)?;
        let change = widget.select(&mut self.doc, index)?;
        Some(ChangeEvent {
            change,
            listeners: widget.listeners().to_vec(),
        })
    }

    fn click_trigger(&mut self, id: &str) {
        let own_menu = menu_id(id);
        let was_open = self
            .doc
            .find(&own_menu)
            .is_some_and(|menu| menu.has_class(OPEN_CLASS));

        for closed in close_open_menus(&mut self.doc, Some(&own_menu)) {
            if let Some(widget) = self.widgets.get_mut(&closed) {
                widget.mark_closed();
            }
        }

        if let Some(widget) = self.widgets.get_mut(id) {
            if was_open {
                widget.close(&mut self.doc);
            } else {
                widget.open(&mut self.doc);
            }
        }
    }

    fn resolve_item(&self, target: &str) -> Option<(String, usize)> {
        self.widgets.keys().find_map(|id| {
            let index = target.strip_prefix(id.as_str())?.strip_prefix("__item_")?;
            Some((id.clone(), index.parse().ok()?))
        })
    }
}

/// Closes every open menu in the document except `except`, clearing the open
/// marker on triggers that share its parent. Returns the owning widget ids.
pub fn close_open_menus(doc: &mut Document, except: Option<&str>) -> Vec<String> {
    let mut closed = Vec::new();
    for (_, container) in doc.containers_mut() {
        container.walk_mut(&mut |parent: &mut Element| {
            let mut swept = false;
            for child in parent.children_mut().iter_mut() {
                let is_open_menu = child.has_class(MENU_CLASS) && child.has_class(OPEN_CLASS);
                if is_open_menu && child.id() != except {
                    child.remove_class(OPEN_CLASS);
                    if let Some(widget) = child.id().and_then(|id| id.strip_suffix("__menu")) {
                        closed.push(widget.to_string());
                    }
                    swept = true;
                }
            }
            if swept {
                for child in parent.children_mut().iter_mut() {
                    if child.has_class(TRIGGER_CLASS) {
                        child.remove_class(OPEN_CLASS);
                    }
                }
            }
        });
    }
    if !closed.is_empty() {
        panel_trace!("Exclusivity sweep closed {:?}", closed);
    }
    closed
}
