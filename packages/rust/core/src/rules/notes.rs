//! Narrative notes: one multipart note with a single text subnote each.

use eadbridge_shared::{Collection, NoteMultipart, NoteText, Result};

use super::{RESOURCE_OR_AO, note_content};
use crate::registry::{Rule, RuleRegistry};
use crate::scope::{NodeView, RuleContext};

/// Elements converted to multipart notes. The note type is the element name.
pub(crate) const NOTE_TAGS: &[&str] = &[
    "accessrestrict",
    "accessrestrict/legalstatus",
    "accruals",
    "acqinfo",
    "altformavail",
    "appraisal",
    "arrangement",
    "bioghist",
    "custodhist",
    "dimensions",
    "fileplan",
    "odd",
    "otherfindaid",
    "originalsloc",
    "phystech",
    "prefercite",
    "processinfo",
    "relatedmaterial",
    "scopecontent",
    "separatedmaterial",
    "userestrict",
];

pub(super) fn register(registry: &mut RuleRegistry) -> Result<()> {
    for pattern in NOTE_TAGS {
        registry.register(Rule::profile(*pattern, multipart_note))?;
    }
    Ok(())
}

fn multipart_note(ctx: &mut RuleContext<'_>, node: &NodeView<'_>) -> Result<()> {
    let content = note_content(&node.inner_xml());

    let note = ctx.make(NoteMultipart {
        note_type: node.name().to_string(),
        persistent_id: node.attr_non_empty("id").map(String::from),
    });
    ctx.set(note, RESOURCE_OR_AO, Collection::Notes)?;

    let text = ctx.make(NoteText { content });
    ctx.set_on(text, note, Collection::Subnotes)
}
