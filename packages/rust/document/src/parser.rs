//! XML → [`Node`] tree.
//!
//! Namespace prefixes are stripped from element and attribute names so rules
//! can match `c01` and `href` whether or not the file uses `ead:`/`xlink:`.
//! Namespace declarations, comments, processing instructions and the doctype
//! are dropped; CDATA is kept as text.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use eadbridge_shared::{EadBridgeError, Result};

use crate::node::Node;

/// Parse an XML string and return its root element.
pub(crate) fn parse_str(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(open_element(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                // Self-closing tag: open + close
                let node = open_element(e)?;
                close_element(&mut stack, &mut root, node)?;
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| EadBridgeError::parse("closing tag without opening tag"))?;
                close_element(&mut stack, &mut root, node)?;
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| EadBridgeError::parse(format!("at byte {position}: {err}")))?;
                if let Some(parent) = stack.last_mut() {
                    parent.push_text(&text);
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push_text(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(EadBridgeError::parse(format!("at byte {position}: {err}")));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(EadBridgeError::parse(format!(
            "unexpected end of document inside <{}>",
            open.name()
        )));
    }

    root.ok_or_else(|| EadBridgeError::parse("document has no root element"))
}

/// Build a node from an opening tag.
fn open_element(e: &BytesStart<'_>) -> Result<Node> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
    let mut node = Node::new(name);

    for attr in e.attributes() {
        let attr = attr.map_err(|err| EadBridgeError::parse(format!("bad attribute: {err}")))?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| EadBridgeError::parse(format!("bad attribute value: {err}")))?;
        node = node.with_attribute(key, value.into_owned());
    }

    Ok(node)
}

/// Attach a finished element to its parent, or make it the root.
fn close_element(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push_child(node),
        None if root.is_none() => *root = Some(node),
        None => {
            return Err(EadBridgeError::parse(format!(
                "second root element <{}>",
                node.name()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Content;

    #[test]
    fn parses_nested_elements_and_text() {
        let root = parse_str("<c01 level=\"file\"><did><unittitle>Letters</unittitle></did></c01>")
            .expect("parse");
        assert_eq!(root.name(), "c01");
        assert_eq!(root.attr("level"), Some("file"));
        let did = root.child("did").expect("did");
        assert_eq!(did.child("unittitle").expect("unittitle").text(), "Letters");
    }

    #[test]
    fn strips_namespace_prefixes() {
        let xml = r#"<ead:dao xmlns:ead="urn:isbn:1-931666-22-9" xmlns:xlink="http://www.w3.org/1999/xlink" xlink:href="http://x/1" xlink:show="new"/>"#;
        let root = parse_str(xml).expect("parse");
        assert_eq!(root.name(), "dao");
        assert_eq!(root.attr("href"), Some("http://x/1"));
        assert_eq!(root.attr("show"), Some("new"));
        assert_eq!(root.attributes().len(), 2);
    }

    #[test]
    fn resolves_entities_in_text_and_attributes() {
        let root = parse_str("<p title=\"A &amp; B\">Smith &amp; Sons</p>").expect("parse");
        assert_eq!(root.attr("title"), Some("A & B"));
        assert_eq!(root.text(), "Smith & Sons");
        assert_eq!(root.inner_xml(), "Smith &amp; Sons");
    }

    #[test]
    fn keeps_whitespace_and_cdata() {
        let root = parse_str("<p>a <![CDATA[<b>]]> c</p>").expect("parse");
        assert_eq!(root.content(), &[Content::Text("a <b> c".into())]);
    }

    #[test]
    fn skips_prolog_and_comments() {
        let xml = "<?xml version=\"1.0\"?>\n<!-- generated -->\n<ead><archdesc/></ead>\n";
        let root = parse_str(xml).expect("parse");
        assert_eq!(root.name(), "ead");
        assert_eq!(root.children().count(), 1);
    }

    #[test]
    fn mismatched_tags_are_parse_errors() {
        let err = parse_str("<a><b></a>").unwrap_err();
        assert!(matches!(err, EadBridgeError::Parse { .. }));
    }

    #[test]
    fn unclosed_document_is_parse_error() {
        let err = parse_str("<a><b>").unwrap_err();
        assert!(matches!(err, EadBridgeError::Parse { .. }));
    }

    #[test]
    fn empty_document_is_parse_error() {
        let err = parse_str("   ").unwrap_err();
        assert!(err.to_string().contains("no root element"));
    }
}
