//! Minimal element tree the panel renders into.
//!
//! Widgets build their markup from these primitives and the page treats the
//! tree as the rendered state: exclusivity sweeps and click routing read it
//! back instead of keeping side tables.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    id: Option<String>,
    classes: BTreeSet<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: BTreeSet::new(),
            attrs: BTreeMap::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attrs.insert(name.to_string(), value.into());
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    /// Depth-first lookup by id, including `self`.
    pub fn find(&self, id: &str) -> Option<&Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// True when `id` names this element or one of its descendants.
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Visits every element in the subtree, parents before children.
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut Element)) {
        visit(self);
        for child in &mut self.children {
            child.walk_mut(visit);
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        if let Some(id) = &self.id {
            let _ = write!(out, " id=\"{}\"", escape(id));
        }
        if !self.classes.is_empty() {
            let joined = self.classes.iter().cloned().collect::<Vec<_>>().join(" ");
            let _ = write!(out, " class=\"{}\"", escape(&joined));
        }
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        out.push('>');
        if self.tag == "input" {
            return;
        }
        out.push_str(&escape(&self.text));
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// The page: a set of named mount points (containers), each a `div`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    containers: BTreeMap<String, Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document with an empty container mounted for every id.
    pub fn with_containers<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut doc = Self::new();
        for id in ids {
            doc.mount(id);
        }
        doc
    }

    /// Mounts an empty container unless one already exists under `id`.
    pub fn mount(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.containers
            .entry(id.clone())
            .or_insert_with(|| Element::new("div").with_id(id));
    }

    /// Inserts `container` under its own id, replacing any previous one.
    /// Elements without an id are ignored.
    pub fn set_container(&mut self, container: Element) {
        if let Some(id) = container.id().map(str::to_string) {
            self.containers.insert(id, container);
        }
    }

    pub fn container(&self, id: &str) -> Option<&Element> {
        self.containers.get(id)
    }

    pub fn container_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.containers.get_mut(id)
    }

    pub fn containers_mut(&mut self) -> impl Iterator<Item = (&str, &mut Element)> {
        self.containers.iter_mut().map(|(id, el)| (id.as_str(), el))
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        self.containers.values().find_map(|el| el.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.containers.values_mut().find_map(|el| el.find_mut(id))
    }

    pub fn to_html(&self) -> String {
        self.containers.values().map(Element::to_html).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_descends_into_children() {
        let tree = Element::new("div")
            .with_id("outer")
            .with_child(Element::new("span").with_id("inner").with_text("hi"));
        assert_eq!(tree.find("inner").map(Element::text), Some("hi"));
        assert!(tree.contains("outer"));
        assert!(!tree.contains("missing"));
    }

    #[test]
    fn html_escapes_text_and_attributes() {
        let el = Element::new("div")
            .with_attr("data-path", "a\"b")
            .with_text("<x> & y");
        assert_eq!(
            el.to_html(),
            "<div data-path=\"a&quot;b\">&lt;x&gt; &amp; y</div>"
        );
    }

    #[test]
    fn mount_does_not_replace_existing_container() {
        let mut doc = Document::with_containers(["a"]);
        doc.container_mut("a")
            .unwrap()
            .push_child(Element::new("span"));
        doc.mount("a");
        assert_eq!(doc.container("a").unwrap().children().len(), 1);
    }
}
