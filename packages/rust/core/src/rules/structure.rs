//! Stock rules: the collection hierarchy and its descriptive fields.

use tracing::trace;

use eadbridge_shared::{
    ArchivalObject, Collection, DateEntry, DateType, NoteIndex, NoteIndexItem, Record, RecordKind,
    Resource, Result,
};

use super::{RESOURCE_OR_AO, squash};
use crate::registry::{Guard, Rule, RuleRegistry};
use crate::scope::{NodeView, RuleContext};

/// Index entry child elements and the item type each one produces.
pub(crate) const INDEX_FIELDS: &[(&str, &str)] = &[
    ("name", "name"),
    ("persname", "person"),
    ("famname", "family"),
    ("corpname", "corporate_entity"),
    ("subject", "subject"),
    ("function", "function"),
    ("occupation", "occupation"),
    ("genreform", "genre_form"),
    ("title", "title"),
    ("geogname", "geographic_name"),
];

/// Item type for an index entry child, if it is a labeled field.
pub(crate) fn index_item_type(element: &str) -> Option<&'static str> {
    INDEX_FIELDS
        .iter()
        .find(|(tag, _)| *tag == element)
        .map(|(_, item_type)| *item_type)
}

const COMPONENT_TAGS: &[&str] = &[
    "c", "c01", "c02", "c03", "c04", "c05", "c06", "c07", "c08", "c09", "c10", "c11", "c12",
];

pub(super) fn register(registry: &mut RuleRegistry) -> Result<()> {
    registry.register(Rule::structure("archdesc", |ctx, node| {
        ctx.make(Resource {
            level: node.attr_non_empty("level").map(String::from),
            ..Default::default()
        });
        Ok(())
    }))?;

    for tag in COMPONENT_TAGS {
        registry.register(Rule::structure(*tag, component))?;
    }

    registry.register(Rule::structure("did/unittitle", |ctx, node| {
        let title = squash(&node.text());
        if title.is_empty() {
            return Ok(());
        }
        update_described(ctx, |record| match record {
            Record::Resource(r) => r.title = Some(title),
            Record::ArchivalObject(ao) => ao.title = Some(title),
            _ => {}
        })
    }))?;

    registry.register(Rule::structure("did/unitid", |ctx, node| {
        let id = squash(&node.text());
        if id.is_empty() {
            return Ok(());
        }
        update_described(ctx, |record| match record {
            Record::Resource(r) => r.id_0 = Some(id),
            Record::ArchivalObject(ao) => ao.component_id = Some(id),
            _ => {}
        })
    }))?;

    registry.register(Rule::structure("did/unitdate", |ctx, node| {
        let Some(date) = date_entry(node) else {
            return Ok(());
        };
        update_described(ctx, |record| match record {
            Record::Resource(r) => r.dates.push(date),
            Record::ArchivalObject(ao) => ao.dates.push(date),
            _ => {}
        })
    }))?;

    registry.register(Rule::structure("index", |ctx, node| {
        let label = node
            .node()
            .child("head")
            .map(|head| squash(&head.text()))
            .filter(|label| !label.is_empty());
        let index = ctx.make(NoteIndex {
            persistent_id: node.attr_non_empty("id").map(String::from),
            label,
        });
        ctx.set(index, RESOURCE_OR_AO, Collection::Notes)?;
        Ok(())
    }))?;

    // One item per labeled field; the BHL profile replaces these with a
    // single merged item per entry.
    for (tag, item_type) in INDEX_FIELDS {
        registry.register(
            Rule::structure(format!("indexentry/{tag}"), move |ctx, node| {
                index_item(ctx, item_type, squash(&node.text()), String::new())
            })
            .guard(Guard::UnlessIgnored),
        )?;
    }
    registry.register(
        Rule::structure("indexentry/ref", |ctx, node| {
            let text = squash(&node.text());
            index_item(ctx, "name", text.clone(), text)
        })
        .guard(Guard::UnlessIgnored),
    )?;

    Ok(())
}

fn component(ctx: &mut RuleContext<'_>, node: &NodeView<'_>) -> Result<()> {
    let ao = ctx.make(ArchivalObject {
        level: node.attr_non_empty("level").map(String::from),
        ref_id: node.attr_non_empty("id").map(String::from),
        ..Default::default()
    });
    if !ctx.set(ao, RESOURCE_OR_AO, Collection::Children)? {
        trace!(component = node.name(), "component outside any resource");
    }
    Ok(())
}

fn index_item(
    ctx: &mut RuleContext<'_>,
    item_type: &str,
    value: String,
    reference_text: String,
) -> Result<()> {
    let item = ctx.make(NoteIndexItem {
        item_type: item_type.to_string(),
        value,
        reference_text,
    });
    ctx.set(item, &[RecordKind::NoteIndex], Collection::Items)?;
    Ok(())
}

/// Apply `f` to the nearest resource or archival object, if any.
fn update_described(ctx: &mut RuleContext<'_>, f: impl FnOnce(&mut Record)) -> Result<()> {
    if let Some(id) = ctx.ancestor_any(RESOURCE_OR_AO) {
        f(ctx.record_mut(id)?);
    }
    Ok(())
}

/// A `<unitdate>`: text is the expression, `normal` holds `begin[/end]`.
fn date_entry(node: &NodeView<'_>) -> Option<DateEntry> {
    let expression = Some(squash(&node.text())).filter(|e| !e.is_empty());
    let (begin, end) = match node.attr_non_empty("normal") {
        Some(normal) => match normal.split_once('/') {
            Some((begin, end)) => (non_empty(begin), non_empty(end)),
            None => (non_empty(normal), None),
        },
        None => (None, None),
    };
    if expression.is_none() && begin.is_none() {
        return None;
    }

    let date_type = if node.attr("type") == Some("bulk") {
        DateType::Bulk
    } else if end.is_some() && begin != end {
        DateType::Inclusive
    } else {
        DateType::Single
    };

    Some(DateEntry {
        expression,
        begin,
        end,
        date_type,
        label: "creation".into(),
    })
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{convert, records_of};

    #[test]
    fn builds_hierarchy_with_titles_and_ids() {
        let output = convert(
            r#"<ead><archdesc level="collection">
                <did><unittitle>Smith Family Papers</unittitle><unitid>85123 Aa 2</unitid></did>
                <dsc>
                  <c01 level="series" id="ser1">
                    <did><unittitle>Correspondence</unittitle></did>
                    <c02 level="file"><did><unittitle>Letters</unittitle><unitid>1</unitid></did></c02>
                  </c01>
                </dsc>
            </archdesc></ead>"#,
        );
        let graph = &output.graph;

        let roots = graph.roots();
        assert_eq!(roots.len(), 1);
        let Some(Record::Resource(resource)) = graph.get(roots[0]) else {
            panic!("expected resource root");
        };
        assert_eq!(resource.title.as_deref(), Some("Smith Family Papers"));
        assert_eq!(resource.id_0.as_deref(), Some("85123 Aa 2"));
        assert_eq!(resource.level.as_deref(), Some("collection"));

        let series = graph.collection(roots[0], Collection::Children);
        assert_eq!(series.len(), 1);
        let Some(Record::ArchivalObject(ser)) = graph.get(series[0]) else {
            panic!("expected archival object");
        };
        assert_eq!(ser.ref_id.as_deref(), Some("ser1"));
        assert_eq!(ser.title.as_deref(), Some("Correspondence"));

        let files = graph.collection(series[0], Collection::Children);
        let Some(Record::ArchivalObject(file)) = graph.get(files[0]) else {
            panic!("expected archival object");
        };
        assert_eq!(file.title.as_deref(), Some("Letters"));
        assert_eq!(file.component_id.as_deref(), Some("1"));
        assert_eq!(file.level.as_deref(), Some("file"));
    }

    #[test]
    fn unitdate_forms() {
        let output = convert(
            r#"<archdesc><c>
                <did>
                  <unitdate normal="1920/1925"/>
                  <unitdate normal="1950/1950">1950</unitdate>
                  <unitdate type="bulk" normal="1921/1923">bulk 1921-1923</unitdate>
                  <unitdate></unitdate>
                </did>
            </c></archdesc>"#,
        );
        let aos = records_of(&output, RecordKind::ArchivalObject);
        let dates = aos[0].dates();
        assert_eq!(dates.len(), 3);

        assert_eq!(dates[0].begin.as_deref(), Some("1920"));
        assert_eq!(dates[0].end.as_deref(), Some("1925"));
        assert_eq!(dates[0].expression, None);
        assert_eq!(dates[0].date_type, DateType::Inclusive);

        assert_eq!(dates[1].expression.as_deref(), Some("1950"));
        assert_eq!(dates[1].date_type, DateType::Single);

        assert_eq!(dates[2].date_type, DateType::Bulk);
        assert_eq!(dates[2].label, "creation");
    }

    #[test]
    fn unitdate_nested_in_unittitle_is_a_date() {
        let output = convert(
            r#"<archdesc><c><did>
                <unittitle>Letters, <unitdate normal="1920/1925">1920-1925</unitdate></unittitle>
            </did></c></archdesc>"#,
        );
        let aos = records_of(&output, RecordKind::ArchivalObject);
        let dates = aos[0].dates();
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].expression.as_deref(), Some("1920-1925"));
        assert_eq!(dates[0].begin.as_deref(), Some("1920"));
        assert_eq!(dates[0].end.as_deref(), Some("1925"));
        assert_eq!(aos[0].title(), Some("Letters, 1920-1925"));
    }

    #[test]
    fn unittitle_outside_did_is_not_a_title() {
        let output = convert("<archdesc><c><unittitle>stray</unittitle></c></archdesc>");
        let aos = records_of(&output, RecordKind::ArchivalObject);
        assert_eq!(aos[0].title(), None);
    }

    #[test]
    fn index_note_takes_head_as_label() {
        let output = convert(
            r#"<archdesc><index id="idx1"><head>Index of Correspondents</head></index></archdesc>"#,
        );
        let resource = output.graph.roots()[0];
        let notes = output.graph.collection(resource, Collection::Notes);
        let Some(Record::NoteIndex(index)) = output.graph.get(notes[0]) else {
            panic!("expected note_index");
        };
        assert_eq!(index.label.as_deref(), Some("Index of Correspondents"));
        assert_eq!(index.persistent_id.as_deref(), Some("idx1"));
    }

    #[test]
    fn index_item_types() {
        assert_eq!(index_item_type("persname"), Some("person"));
        assert_eq!(index_item_type("genreform"), Some("genre_form"));
        assert_eq!(index_item_type("ref"), None);
    }
}
