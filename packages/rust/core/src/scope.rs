//! What a rule handler sees while it runs.
//!
//! [`NodeView`] is the read-only node being dispatched. [`RuleContext`] is the
//! handler's window onto the conversion: building and attaching records,
//! ancestor lookups, and the ignore flag of the current node scope.

use eadbridge_document::Node;
use eadbridge_shared::{Collection, ConversionConfig, Record, RecordKind, Result};

use crate::builder::RecordBuilder;
use crate::engine::IdGenerator;
use crate::graph::RecordId;

// ---------------------------------------------------------------------------
// NodeScope
// ---------------------------------------------------------------------------

/// Per-node walker state.
///
/// `ignored` starts as the parent's value and is handed down to children,
/// so it covers exactly the node's subtree. `pushed` counts the frames built
/// while dispatching the node; the walker pops them when the subtree ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeScope {
    pub ignored: bool,
    pub pushed: usize,
}

impl NodeScope {
    pub fn inherit(ignored: bool) -> Self {
        Self { ignored, pushed: 0 }
    }
}

// ---------------------------------------------------------------------------
// NodeView
// ---------------------------------------------------------------------------

/// A document node together with the chain of elements enclosing it.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    node: &'a Node,
    /// Open ancestors, outermost first; the last one is the direct parent.
    ancestors: &'a [&'a Node],
}

impl<'a> NodeView<'a> {
    pub fn new(node: &'a Node, ancestors: &'a [&'a Node]) -> Self {
        Self { node, ancestors }
    }

    pub fn name(&self) -> &'a str {
        self.node.name()
    }

    /// Name of the direct parent element.
    pub fn parent_name(&self) -> Option<&'a str> {
        self.ancestors.last().map(|parent| parent.name())
    }

    /// Names of the enclosing elements, innermost first.
    pub fn enclosing_names(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        self.ancestors.iter().rev().map(|ancestor| ancestor.name())
    }

    pub fn attr(&self, key: &str) -> Option<&'a str> {
        self.node.attr(key)
    }

    /// Attribute value, `None` when absent or blank.
    pub fn attr_non_empty(&self, key: &str) -> Option<&'a str> {
        self.attr(key).filter(|v| !v.trim().is_empty())
    }

    pub fn inner_xml(&self) -> String {
        self.node.inner_xml()
    }

    pub fn text(&self) -> String {
        self.node.text()
    }

    pub fn node(&self) -> &'a Node {
        self.node
    }

    pub fn children(self) -> impl Iterator<Item = &'a Node> {
        self.node.children()
    }
}

// ---------------------------------------------------------------------------
// RuleContext
// ---------------------------------------------------------------------------

pub struct RuleContext<'a> {
    builder: &'a mut RecordBuilder,
    scope: &'a mut NodeScope,
    config: &'a ConversionConfig,
    ids: &'a dyn IdGenerator,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        builder: &'a mut RecordBuilder,
        scope: &'a mut NodeScope,
        config: &'a ConversionConfig,
        ids: &'a dyn IdGenerator,
    ) -> Self {
        Self {
            builder,
            scope,
            config,
            ids,
        }
    }

    /// Suppress `UnlessIgnored` rules for the rest of this node and its subtree.
    pub fn ignore(&mut self) {
        self.scope.ignored = true;
    }

    pub fn is_ignored(&self) -> bool {
        self.scope.ignored
    }

    /// Build a record and open it as a context frame for this node's subtree.
    pub fn make(&mut self, record: impl Into<Record>) -> RecordId {
        self.scope.pushed += 1;
        self.builder.build(record)
    }

    /// Attach `record` to the nearest ancestor of any of `kinds`.
    /// `Ok(false)` when there is none.
    pub fn set(&mut self, record: RecordId, kinds: &[RecordKind], collection: Collection) -> Result<bool> {
        self.builder.attach(record, kinds, collection)
    }

    /// Attach `record` to an explicit parent.
    pub fn set_on(&mut self, record: RecordId, parent: RecordId, collection: Collection) -> Result<()> {
        self.builder.attach_to(record, parent, collection)
    }

    pub fn ancestor(&self, kind: RecordKind) -> Option<RecordId> {
        self.builder.nearest(kind)
    }

    pub fn ancestor_any(&self, kinds: &[RecordKind]) -> Option<RecordId> {
        self.builder.nearest_any(kinds)
    }

    /// Run `f` with the nearest ancestor of `kind`; skipped when there is none.
    pub fn ancestor_with<R>(
        &mut self,
        kind: RecordKind,
        f: impl FnOnce(&mut Self, RecordId) -> Result<R>,
    ) -> Result<Option<R>> {
        match self.ancestor(kind) {
            Some(id) => f(self, id).map(Some),
            None => Ok(None),
        }
    }

    pub fn record(&self, id: RecordId) -> Result<&Record> {
        self.builder.record(id)
    }

    pub fn record_mut(&mut self, id: RecordId) -> Result<&mut Record> {
        self.builder.record_mut(id)
    }

    /// Snapshot of the records already attached to `parent`'s collection.
    pub fn attached(&self, parent: RecordId, collection: Collection) -> Vec<RecordId> {
        self.builder.collection(parent, collection).to_vec()
    }

    pub fn detach_last(&mut self, parent: RecordId, collection: Collection) -> Option<RecordId> {
        self.builder.detach_last(parent, collection)
    }

    pub fn next_identifier(&self) -> String {
        self.ids.next_id()
    }

    pub fn config(&self) -> &ConversionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SequentialIds;
    use eadbridge_shared::{ArchivalObject, NoteIndex, Resource};

    #[test]
    fn view_exposes_node_and_parent() {
        let parent = Node::new("did").with_child(Node::new("unitid").with_attribute("type", "call"));
        let child = parent.child("unitid").expect("child");
        let chain = [&parent];
        let view = NodeView::new(child, &chain);

        assert_eq!(view.name(), "unitid");
        assert_eq!(view.parent_name(), Some("did"));
        assert_eq!(view.enclosing_names().collect::<Vec<_>>(), ["did"]);
        assert_eq!(view.attr("type"), Some("call"));
        assert_eq!(view.attr_non_empty("missing"), None);
    }

    #[test]
    fn make_counts_pushed_frames() {
        let mut builder = RecordBuilder::new();
        let mut scope = NodeScope::default();
        let config = ConversionConfig::default();
        let ids = SequentialIds::default();
        let mut ctx = RuleContext::new(&mut builder, &mut scope, &config, &ids);

        let resource = ctx.make(Resource::default());
        let ao = ctx.make(ArchivalObject::default());
        assert!(ctx
            .set(ao, &[RecordKind::Resource], Collection::Children)
            .expect("set"));
        assert_eq!(ctx.attached(resource, Collection::Children), vec![ao]);

        drop(ctx);
        assert_eq!(scope.pushed, 2);
        assert_eq!(builder.stack().depth(), 2);
    }

    #[test]
    fn ancestor_with_skips_when_absent() {
        let mut builder = RecordBuilder::new();
        let mut scope = NodeScope::default();
        let config = ConversionConfig::default();
        let ids = SequentialIds::default();
        let mut ctx = RuleContext::new(&mut builder, &mut scope, &config, &ids);

        let missing = ctx
            .ancestor_with(RecordKind::NoteIndex, |_, _| Ok(1))
            .expect("lookup");
        assert_eq!(missing, None);

        let index = ctx.make(NoteIndex::default());
        let found = ctx
            .ancestor_with(RecordKind::NoteIndex, |_, id| Ok(id))
            .expect("lookup");
        assert_eq!(found, Some(index));
    }

    #[test]
    fn ignore_sets_scope_flag() {
        let mut builder = RecordBuilder::new();
        let mut scope = NodeScope::inherit(false);
        let config = ConversionConfig::default();
        let ids = SequentialIds::default();
        let mut ctx = RuleContext::new(&mut builder, &mut scope, &config, &ids);

        assert!(!ctx.is_ignored());
        ctx.ignore();
        assert!(ctx.is_ignored());
        drop(ctx);
        assert!(scope.ignored);
    }
}
