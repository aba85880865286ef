//! One index item per `<indexentry>`.
//!
//! The stock rules emit a separate item for every field and every `<ref>`
//! of an entry. Here the per-field rules only flag their node ignored, which
//! suppresses the stock items, and the entry rule emits a single item that
//! pairs the labeled value with its reference.

use eadbridge_shared::{Collection, NoteIndexItem, RecordKind, Result};

use super::squash;
use super::structure::{INDEX_FIELDS, index_item_type};
use crate::registry::{Rule, RuleRegistry};
use crate::scope::{NodeView, RuleContext};

pub(super) fn register(registry: &mut RuleRegistry) -> Result<()> {
    for (tag, _) in INDEX_FIELDS {
        registry.register(Rule::profile(format!("indexentry/{tag}"), suppress))?;
    }
    registry.register(Rule::profile("indexentry/ref", suppress))?;
    registry.register(Rule::profile("indexentry", index_entry))
}

fn suppress(ctx: &mut RuleContext<'_>, _: &NodeView<'_>) -> Result<()> {
    ctx.ignore();
    Ok(())
}

/// One merged item per `<indexentry>`: the first labeled child gives type and
/// value, every `<ref>` is joined into `reference_text`.
///
/// An entry with neither a labeled child nor a non-empty ref yields no item
/// at all, rather than an item with every field blank.
fn index_entry(ctx: &mut RuleContext<'_>, node: &NodeView<'_>) -> Result<()> {
    let mut entry: Option<(&str, String)> = None;
    let mut references = Vec::new();

    for child in node.children() {
        if child.name() == "ref" {
            let text = squash(&child.text());
            if !text.is_empty() {
                references.push(text);
            }
        } else if entry.is_none() {
            entry = index_item_type(child.name()).map(|item_type| (item_type, squash(&child.text())));
        }
    }

    if entry.is_none() && references.is_empty() {
        return Ok(());
    }
    let (item_type, value) = entry.unwrap_or_default();

    let item = ctx.make(NoteIndexItem {
        item_type: item_type.to_string(),
        value,
        reference_text: references.join("; "),
    });
    ctx.set(item, &[RecordKind::NoteIndex], Collection::Items)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::convert;
    use eadbridge_shared::Record;

    fn items(xml: &str) -> Vec<NoteIndexItem> {
        let output = convert(xml);
        let graph = &output.graph;
        let (index, _) = graph
            .of_kind(RecordKind::NoteIndex)
            .into_iter()
            .next()
            .expect("index");
        graph
            .collection(index, Collection::Items)
            .iter()
            .filter_map(|id| match graph.get(*id) {
                Some(Record::NoteIndexItem(item)) => Some(item.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn entry_becomes_one_merged_item() {
        let found = items(
            "<archdesc><index><indexentry><persname>Jane Doe</persname><ref>Box 3</ref></indexentry></index></archdesc>",
        );
        assert_eq!(
            found,
            vec![NoteIndexItem {
                item_type: "person".into(),
                value: "Jane Doe".into(),
                reference_text: "Box 3".into(),
            }]
        );
    }

    #[test]
    fn first_labeled_field_wins_and_refs_join() {
        let found = items(
            "<archdesc><index><indexentry><corpname>Acme Co.</corpname><subject>Trade</subject><ref>Box 1</ref><ref>Box 2</ref></indexentry></index></archdesc>",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].item_type, "corporate_entity");
        assert_eq!(found[0].value, "Acme Co.");
        assert_eq!(found[0].reference_text, "Box 1; Box 2");
    }

    #[test]
    fn entries_keep_document_order() {
        let found = items(
            "<archdesc><index>
                <indexentry><geogname>Ann Arbor</geogname></indexentry>
                <indexentry><genreform>Photographs</genreform><ref>Box 9</ref></indexentry>
                <indexentry><note>unlabeled</note></indexentry>
            </index></archdesc>",
        );
        let types: Vec<_> = found.iter().map(|i| i.item_type.as_str()).collect();
        assert_eq!(types, vec!["geographic_name", "genre_form"]);
        assert_eq!(found[0].reference_text, "");
    }

    #[test]
    fn entry_outside_index_is_dropped() {
        let output = convert(
            "<archdesc><indexentry><persname>Nobody</persname></indexentry></archdesc>",
        );
        assert_eq!(output.stats.count("note_index_item"), 0);
        assert_eq!(output.stats.unattached, 1);
    }
}
