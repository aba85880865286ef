//! `<dao>`: a digital object instance, titled even when the source is not.
//!
//! Digital object titles are mandatory downstream. When the `<dao>` has no
//! `title` attribute the title is built from the enclosing component's title
//! and dates, e.g. `Letters, 1920 - 1925`.

use tracing::debug;

use eadbridge_shared::{
    Collection, DigitalObject, FileVersion, Instance, Record, RecordKind, Result,
};

use super::RESOURCE_OR_AO;
use crate::registry::{Rule, RuleRegistry};
use crate::scope::{NodeView, RuleContext};

pub(super) fn register(registry: &mut RuleRegistry) -> Result<()> {
    registry.register(Rule::profile("dao", digital_object))
}

/// `"<title>, <dates>"`, or whichever of the two exists.
fn display_string(component: &Record, date_separator: &str) -> Option<String> {
    let title = component.title().filter(|t| !t.is_empty());
    let dates: Vec<String> = component
        .dates()
        .iter()
        .filter_map(|date| date.display_label())
        .collect();
    let date = (!dates.is_empty()).then(|| dates.join(date_separator));

    match (title, date) {
        (Some(title), Some(date)) => Some(format!("{title}, {date}")),
        (Some(title), None) => Some(title.to_string()),
        (None, date) => date,
    }
}

fn digital_object(ctx: &mut RuleContext<'_>, node: &NodeView<'_>) -> Result<()> {
    let display = ctx
        .ancestor_with(RecordKind::ArchivalObject, |ctx, ao| {
            Ok(display_string(ctx.record(ao)?, &ctx.config().date_separator))
        })?
        .flatten();

    let instance = ctx.make(Instance {
        instance_type: "digital_object".into(),
    });
    ctx.set(instance, RESOURCE_OR_AO, Collection::Instances)?;

    let href = node.attr_non_empty("href");
    let title = node
        .attr_non_empty("title")
        .map(String::from)
        .or(display)
        .or_else(|| href.map(String::from))
        .unwrap_or_else(|| ctx.config().fallback_title.clone());

    let digital_object_id = ctx.next_identifier();
    debug!(%digital_object_id, %title, "digital object");

    let object = ctx.make(DigitalObject {
        digital_object_id,
        title,
        file_versions: vec![FileVersion {
            use_statement: node.attr_non_empty("role").map(String::from),
            file_uri: href.map(String::from),
            xlink_actuate_attribute: node.attr_non_empty("actuate").map(String::from),
            xlink_show_attribute: node.attr_non_empty("show").map(String::from),
        }],
    });
    ctx.set_on(object, instance, Collection::DigitalObject)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::testing::{convert, records_of};
    use eadbridge_shared::{ArchivalObject, DateEntry, DateType};

    fn objects(xml: &str) -> Vec<DigitalObject> {
        records_of(&convert(xml), RecordKind::DigitalObject)
            .into_iter()
            .filter_map(|r| match r {
                Record::DigitalObject(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    fn component(title: Option<&str>, dates: &[(Option<&str>, Option<&str>, Option<&str>)]) -> Record {
        ArchivalObject {
            title: title.map(String::from),
            dates: dates
                .iter()
                .map(|(expression, begin, end)| DateEntry {
                    expression: expression.map(String::from),
                    begin: begin.map(String::from),
                    end: end.map(String::from),
                    date_type: DateType::Inclusive,
                    label: "creation".into(),
                })
                .collect(),
            ..Default::default()
        }
        .into()
    }

    #[test]
    fn title_from_component_title_and_range() {
        let found = objects(
            r#"<archdesc><c><did>
                <unittitle>Letters</unittitle>
                <unitdate normal="1920/1925"/>
                <dao href="http://example.org/letters" role="reference" show="new" actuate="onRequest"/>
            </did></c></archdesc>"#,
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Letters, 1920 - 1925");

        let version = &found[0].file_versions[0];
        assert_eq!(version.file_uri.as_deref(), Some("http://example.org/letters"));
        assert_eq!(version.use_statement.as_deref(), Some("reference"));
        assert_eq!(version.xlink_show_attribute.as_deref(), Some("new"));
        assert_eq!(version.xlink_actuate_attribute.as_deref(), Some("onRequest"));
    }

    #[test]
    fn title_attribute_wins() {
        let found = objects(
            r#"<archdesc><c><did><unittitle>Letters</unittitle><dao title="Scans" href="x"/></did></c></archdesc>"#,
        );
        assert_eq!(found[0].title, "Scans");
    }

    #[test]
    fn fallbacks_never_leave_title_empty() {
        let found = objects(
            r#"<archdesc><c><dao href="http://example.org/1"/></c><dao/></archdesc>"#,
        );
        assert_eq!(found[0].title, "http://example.org/1");
        assert_eq!(found[1].title, "Untitled");
        assert!(found.iter().all(|d| !d.title.is_empty()));
    }

    #[test]
    fn instance_and_object_are_linked() {
        let output = convert(
            r#"<archdesc><c><did><unittitle>Photos</unittitle><dao href="a"/><dao href="b"/></did></c></archdesc>"#,
        );
        let graph = &output.graph;
        let resource = graph.roots()[0];
        let ao = graph.collection(resource, Collection::Children)[0];
        let instances = graph.collection(ao, Collection::Instances);
        assert_eq!(instances.len(), 2);
        for instance in instances {
            assert_eq!(graph.collection(*instance, Collection::DigitalObject).len(), 1);
        }
    }

    #[test]
    fn identifiers_are_unique_per_run() {
        let found = objects(
            r#"<archdesc><c><dao href="a"/><dao href="b"/><c><dao href="c"/></c></c></archdesc>"#,
        );
        let ids: HashSet<_> = found.iter().map(|d| d.digital_object_id.clone()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn display_string_precedence() {
        let sep = ", ";
        assert_eq!(
            display_string(&component(Some("Letters"), &[(None, Some("1920"), Some("1920"))]), sep)
                .as_deref(),
            Some("Letters, 1920")
        );
        assert_eq!(
            display_string(&component(None, &[(Some("circa 1900"), Some("1899"), None)]), sep)
                .as_deref(),
            Some("circa 1900")
        );
        assert_eq!(
            display_string(
                &component(
                    Some("Diaries"),
                    &[(Some("1930s"), None, None), (None, Some("1945"), Some("1950"))]
                ),
                "; "
            )
            .as_deref(),
            Some("Diaries, 1930s; 1945 - 1950")
        );
        assert_eq!(display_string(&component(None, &[]), sep), None);
    }
}
