//! Rights statements derived from dated access restrictions.
//!
//! An `<accessrestrict>` containing a `<date normal="…">`, usually inside a
//! `<p>`, also yields a
//! rights statement per text subnote of the component's access notes, with
//! the date as the restriction end. The notes must already exist when the
//! date is reached, so this rule is registered after the note rule.

use tracing::debug;

use eadbridge_shared::{Collection, Record, RecordKind, Result, RightsStatement, RightsType};

use crate::graph::RecordId;
use crate::registry::{Rule, RuleRegistry};
use crate::scope::{NodeView, RuleContext};

pub(super) fn register(registry: &mut RuleRegistry) -> Result<()> {
    registry.register(Rule::profile("accessrestrict/date", rights_statement).after("accessrestrict"))
}

fn rights_statement(ctx: &mut RuleContext<'_>, node: &NodeView<'_>) -> Result<()> {
    let Some(end_date) = node.attr_non_empty("normal") else {
        return Ok(());
    };

    ctx.ancestor_with(RecordKind::ArchivalObject, |ctx, ao| {
        let restrictions = access_restrictions(ctx, ao)?;
        debug!(count = restrictions.len(), end_date, "deriving rights statements");

        for text in restrictions {
            let rights = ctx.make(RightsStatement {
                rights_type: RightsType::InstitutionalPolicy,
                restrictions: text,
                restriction_end_date: end_date.to_string(),
            });
            ctx.set_on(rights, ao, Collection::RightsStatements)?;
        }
        Ok(())
    })?;

    Ok(())
}

/// Text of every subnote of the `accessrestrict` notes already on `ao`.
fn access_restrictions(ctx: &RuleContext<'_>, ao: RecordId) -> Result<Vec<String>> {
    let mut texts = Vec::new();
    for note in ctx.attached(ao, Collection::Notes) {
        if ctx.record(note)?.note_type() != Some("accessrestrict") {
            continue;
        }
        for subnote in ctx.attached(note, Collection::Subnotes) {
            if let Record::NoteText(text) = ctx.record(subnote)? {
                texts.push(text.content.clone());
            }
        }
    }
    Ok(texts)
}
