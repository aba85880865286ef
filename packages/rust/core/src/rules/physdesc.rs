//! `<physdesc>`: an extent when one can be read, a note for everything else.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use eadbridge_document::Content;
use eadbridge_shared::{Collection, Extent, NoteSinglepart, Portion, Result};

use super::{RESOURCE_OR_AO, note_content, squash};
use crate::registry::{Rule, RuleRegistry};
use crate::scope::{NodeView, RuleContext};

/// `<number> <type>`, e.g. `5 linear feet`.
static EXTENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9.]+)\s+(.*)$").expect("valid regex"));

pub(super) fn register(registry: &mut RuleRegistry) -> Result<()> {
    registry.register(Rule::profile("physdesc", physdesc))
}

/// What the children of a physdesc amount to.
#[derive(Debug, Default, PartialEq)]
struct Reading {
    number_and_type: Option<(String, String)>,
    other_extents: Vec<String>,
    has_other_content: bool,
}

fn read_children(node: &NodeView<'_>) -> Reading {
    let mut reading = Reading::default();

    for item in node.node().content() {
        match item {
            Content::Element(child) if child.name() == "extent" => {
                let text = squash(&child.text());
                if reading.number_and_type.is_none() {
                    if let Some(caps) = EXTENT_RE.captures(&text) {
                        reading.number_and_type = Some((caps[1].to_string(), caps[2].to_string()));
                        continue;
                    }
                }
                if !text.is_empty() {
                    reading.other_extents.push(text);
                }
            }
            Content::Element(child) => {
                if !child.text().trim().is_empty() {
                    reading.has_other_content = true;
                }
            }
            Content::Text(text) => {
                if !text.trim().is_empty() {
                    reading.has_other_content = true;
                }
            }
        }
    }

    reading
}

fn physdesc(ctx: &mut RuleContext<'_>, node: &NodeView<'_>) -> Result<()> {
    let reading = read_children(node);
    let make_note = reading.has_other_content || reading.number_and_type.is_none();

    if let Some((number, extent_type)) = reading.number_and_type {
        let container_summary =
            (!reading.other_extents.is_empty()).then(|| reading.other_extents.join("; "));
        let extent = ctx.make(Extent {
            number,
            extent_type,
            portion: Portion::from_altrender(node.attr("altrender")),
            container_summary,
        });
        ctx.set(extent, RESOURCE_OR_AO, Collection::Extents)?;
    }

    if make_note {
        let content = note_content(node.inner_xml().trim());
        if content.is_empty() {
            debug!("empty physdesc, no note");
            return Ok(());
        }
        let note = ctx.make(NoteSinglepart {
            note_type: "physdesc".into(),
            persistent_id: node.attr_non_empty("id").map(String::from),
            content,
        });
        ctx.set(note, RESOURCE_OR_AO, Collection::Notes)?;
    }

    Ok(())
}
