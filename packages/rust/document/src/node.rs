//! Immutable element tree handed to the conversion engine.

use quick_xml::escape::{escape, partial_escape};

/// One item of an element's ordered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Element(Node),
    Text(String),
}

/// A parsed element: name, ordered attributes, ordered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    content: Vec<Content>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            content: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Builder-style child element.
    pub fn with_child(mut self, child: Node) -> Self {
        self.push_child(child);
        self
    }

    /// Builder-style text run.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(&text.into());
        self
    }

    pub(crate) fn push_child(&mut self, child: Node) {
        self.content.push(Content::Element(child));
    }

    /// Append text, merging with a preceding text run.
    pub(crate) fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.content.last_mut() {
            Some(Content::Text(existing)) => existing.push_str(text),
            _ => self.content.push(Content::Text(text.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by (namespace-stripped) name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Ordered content: child elements interleaved with text runs.
    pub fn content(&self) -> &[Content] {
        &self.content
    }

    /// Child elements only, in document order.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.content.iter().filter_map(|c| match c {
            Content::Element(node) => Some(node),
            Content::Text(_) => None,
        })
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children().find(|c| c.name == name)
    }

    /// Concatenated text of all descendants, entities resolved.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for item in &self.content {
            match item {
                Content::Text(text) => out.push_str(text),
                Content::Element(node) => node.collect_text(out),
            }
        }
    }

    /// Markup of the content, without this element's own tags.
    pub fn inner_xml(&self) -> String {
        let mut out = String::new();
        for item in &self.content {
            write_content(item, &mut out);
        }
        out
    }

    /// Markup of the element including its own tags.
    pub fn outer_xml(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }
}

fn write_content(item: &Content, out: &mut String) {
    match item {
        Content::Text(text) => out.push_str(&partial_escape(text.as_str())),
        Content::Element(node) => write_element(node, out),
    }
}

fn write_element(node: &Node, out: &mut String) {
    out.push('<');
    out.push_str(&node.name);
    for (key, value) in &node.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }

    if node.content.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for item in &node.content {
        write_content(item, out);
    }
    out.push_str("</");
    out.push_str(&node.name);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::new("physdesc")
            .with_attribute("altrender", "part")
            .with_child(Node::new("extent").with_text("5 boxes"))
            .with_text(" and ")
            .with_child(Node::new("lb"))
            .with_child(Node::new("note").with_text("R&D <misc>"))
    }

    #[test]
    fn attribute_lookup() {
        let node = sample();
        assert_eq!(node.attr("altrender"), Some("part"));
        assert_eq!(node.attr("id"), None);
    }

    #[test]
    fn children_skip_text_runs() {
        let names: Vec<_> = sample().children().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["extent", "lb", "note"]);
    }

    #[test]
    fn text_concatenates_descendants() {
        assert_eq!(sample().text(), "5 boxes and R&D <misc>");
    }

    #[test]
    fn inner_xml_escapes_and_self_closes() {
        assert_eq!(
            sample().inner_xml(),
            "<extent>5 boxes</extent> and <lb/><note>R&amp;D &lt;misc&gt;</note>"
        );
    }

    #[test]
    fn outer_xml_includes_attributes() {
        let node = Node::new("dao").with_attribute("title", "Say \"hi\"");
        assert_eq!(node.outer_xml(), "<dao title=\"Say &quot;hi&quot;\"/>");
    }

    #[test]
    fn adjacent_text_runs_merge() {
        let node = Node::new("p").with_text("a").with_text("b");
        assert_eq!(node.content(), &[Content::Text("ab".into())]);
    }
}
