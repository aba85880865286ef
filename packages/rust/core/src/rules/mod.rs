//! The BHL EAD rule set.
//!
//! `structure` holds the stock rules that create resources, components and
//! index notes. The other modules are profile rules layered on top of them.

mod dao;
mod index;
mod lists;
mod notes;
mod physdesc;
mod rights;
mod structure;

use eadbridge_shared::{RecordKind, Result};

use crate::registry::RuleRegistry;

/// Records that own notes, extents, instances and children.
pub(crate) const RESOURCE_OR_AO: &[RecordKind] = &[RecordKind::Resource, RecordKind::ArchivalObject];

/// Build the registry for the `bhl_ead_xml` format.
///
/// Registration order matters: rights derivation reads the notes built by
/// the `accessrestrict` rule, and `Rule::after` enforces that.
pub fn bhl_registry() -> Result<RuleRegistry> {
    let mut registry = RuleRegistry::new();
    structure::register(&mut registry)?;
    physdesc::register(&mut registry)?;
    notes::register(&mut registry)?;
    rights::register(&mut registry)?;
    lists::register(&mut registry)?;
    index::register(&mut registry)?;
    dao::register(&mut registry)?;
    Ok(registry)
}

/// Collapse whitespace runs to single spaces.
pub(crate) fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized note body: leading `<head>` removed, then cleaned.
pub(crate) fn note_content(markup: &str) -> String {
    eadbridge_text::normalize_str(&eadbridge_text::strip_head(markup))
}
