//! `<list>` elements become list subnotes.
//!
//! Inside a multipart note the list's markup is cut out of the note's last
//! text subnote: the text before it stays, the list follows as its own
//! subnote, and the text after it is appended again behind the list. Lists
//! inside an index are left alone, and lists anywhere else get a new `odd`
//! note to live in.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use eadbridge_document::Node;
use eadbridge_shared::{
    Collection, DefinedListItem, NoteDefinedlist, NoteMultipart, NoteOrderedlist, NoteText, Record,
    RecordKind, Result,
};
use eadbridge_text::normalize_str;

use super::RESOURCE_OR_AO;
use crate::graph::RecordId;
use crate::registry::{Guard, Rule, RuleRegistry};
use crate::scope::{NodeView, RuleContext};

/// Opening, closing or self-closing `list` tag.
static LIST_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)list(?:\s[^>]*?)?(/?)>").expect("valid regex"));

pub(super) fn register(registry: &mut RuleRegistry) -> Result<()> {
    registry.register(Rule::profile("list", list).guard(Guard::UnlessIgnored))
}

fn list(ctx: &mut RuleContext<'_>, node: &NodeView<'_>) -> Result<()> {
    let (host, leftover) = if let Some(note) = ctx.ancestor(RecordKind::NoteMultipart) {
        (note, split_last_subnote(ctx, note)?)
    } else if ctx.ancestor(RecordKind::NoteIndex).is_some() {
        // Index references may carry lists of their own.
        ctx.ignore();
        return Ok(());
    } else {
        let note = ctx.make(NoteMultipart {
            note_type: "odd".into(),
            persistent_id: node.attr_non_empty("id").map(String::from),
        });
        ctx.set(note, RESOURCE_OR_AO, Collection::Notes)?;
        (note, None)
    };

    let title = node
        .node()
        .child("head")
        .map(|head| normalize_str(&head.inner_xml()))
        .filter(|title| !title.is_empty());

    let subnote = if is_defined_list(node) {
        ctx.make(NoteDefinedlist {
            title,
            items: defined_items(node.node()),
        })
    } else {
        ctx.make(NoteOrderedlist {
            title,
            enumeration: node.attr_non_empty("numeration").map(String::from),
            items: node
                .children()
                .filter(|child| child.name() == "item")
                .map(|item| normalize_str(&item.inner_xml()))
                .collect(),
        })
    };
    ctx.set_on(subnote, host, Collection::Subnotes)?;

    if let Some(content) = leftover.filter(|c| !c.is_empty()) {
        let text = ctx.make(NoteText { content });
        ctx.set_on(text, host, Collection::Subnotes)?;
    }
    Ok(())
}

/// `type="deflist"`, or no type and a definition list inside.
fn is_defined_list(node: &NodeView<'_>) -> bool {
    match node.attr("type") {
        Some(list_type) => list_type == "deflist",
        None => {
            let markup = node.inner_xml();
            markup.contains("<deflist>") || markup.contains("<defitem")
        }
    }
}

/// `defitem` children, directly or wrapped in a `deflist`.
fn defined_items(list: &Node) -> Vec<DefinedListItem> {
    let mut items = Vec::new();
    for child in list.children() {
        match child.name() {
            "defitem" => items.extend(defined_item(child)),
            "deflist" => items.extend(child.children().filter_map(defined_item)),
            _ => {}
        }
    }
    items
}

fn defined_item(defitem: &Node) -> Option<DefinedListItem> {
    if defitem.name() != "defitem" {
        return None;
    }
    let part = |name: &str| {
        defitem
            .child(name)
            .map(|n| normalize_str(&n.inner_xml()))
            .unwrap_or_default()
    };
    Some(DefinedListItem {
        label: part("label"),
        value: part("item"),
    })
}

/// Cut the first list out of `note`'s last text subnote.
///
/// The subnote keeps the text before the list (and is dropped if that is
/// empty); the text after it is returned.
fn split_last_subnote(ctx: &mut RuleContext<'_>, note: RecordId) -> Result<Option<String>> {
    let Some(&last) = ctx.attached(note, Collection::Subnotes).last() else {
        return Ok(None);
    };
    let Record::NoteText(text) = ctx.record(last)? else {
        return Ok(None);
    };
    let Some((start, end)) = list_span(&text.content) else {
        trace!(%note, "no list markup in last subnote");
        return Ok(None);
    };

    let before = normalize_str(&text.content[..start]);
    let after = normalize_str(&text.content[end..]);

    ctx.detach_last(note, Collection::Subnotes);
    if !before.is_empty() {
        if let Record::NoteText(text) = ctx.record_mut(last)? {
            text.content = before;
        }
        ctx.set_on(last, note, Collection::Subnotes)?;
    }
    Ok(Some(after))
}

/// Byte range of the first complete `<list>…</list>` in `markup`, nested
/// lists included.
fn list_span(markup: &str) -> Option<(usize, usize)> {
    let mut start = None;
    let mut depth = 0usize;

    for caps in LIST_TAG_RE.captures_iter(markup) {
        let tag = caps.get(0)?;
        let closing = !caps[1].is_empty();
        let self_closing = !caps[2].is_empty();

        match start {
            None if closing => continue,
            None if self_closing => return Some((tag.start(), tag.end())),
            None => {
                start = Some(tag.start());
                depth = 1;
            }
            Some(_) if self_closing => {}
            Some(_) if closing => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|s| (s, tag.end()));
                }
            }
            Some(_) => depth += 1,
        }
    }
    None
}
