//! Record construction and attachment.
//!
//! The builder owns the record graph and the context stack of one conversion.
//! Building a record also makes it the innermost context frame, so rules run
//! on descendant nodes can find it.

use tracing::trace;

use eadbridge_shared::{Collection, EadBridgeError, Record, RecordKind, Result};

use crate::context::ContextStack;
use crate::graph::{RecordGraph, RecordId};

#[derive(Debug, Default)]
pub struct RecordBuilder {
    graph: RecordGraph,
    stack: ContextStack,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `record` to the graph and push it as the innermost frame.
    pub fn build(&mut self, record: impl Into<Record>) -> RecordId {
        let record = record.into();
        let kind = record.kind();
        let id = self.graph.insert(record);
        self.stack.push(kind, id);
        trace!(%kind, %id, depth = self.stack.depth(), "built record");
        id
    }

    /// Attach `record` to the innermost ancestor whose kind is in `kinds`.
    ///
    /// The record's own frame is never a candidate. Returns `Ok(false)` when no
    /// such ancestor is open.
    pub fn attach(
        &mut self,
        record: RecordId,
        kinds: &[RecordKind],
        collection: Collection,
    ) -> Result<bool> {
        let parent = self
            .stack
            .find(|frame| frame.record != record && kinds.contains(&frame.kind));

        match parent {
            Some(frame) => {
                self.attach_to(record, frame.record, collection)?;
                Ok(true)
            }
            None => {
                trace!(%record, %collection, "no ancestor to attach to");
                Ok(false)
            }
        }
    }

    /// Attach `record` to an explicit parent.
    pub fn attach_to(&mut self, record: RecordId, parent: RecordId, collection: Collection) -> Result<()> {
        self.graph.attach(parent, collection, record)?;
        trace!(%record, %parent, %collection, "attached record");
        Ok(())
    }

    pub fn nearest(&self, kind: RecordKind) -> Option<RecordId> {
        self.stack.nearest(kind)
    }

    pub fn nearest_any(&self, kinds: &[RecordKind]) -> Option<RecordId> {
        self.stack.nearest_any(kinds)
    }

    pub fn stack(&self) -> &ContextStack {
        &self.stack
    }

    /// Pop the innermost frame. Called by the walker when a subtree ends.
    pub fn pop_frame(&mut self) {
        if let Some(frame) = self.stack.pop() {
            trace!(kind = %frame.kind, record = %frame.record, "popped frame");
        }
    }

    pub fn record(&self, id: RecordId) -> Result<&Record> {
        self.graph
            .get(id)
            .ok_or_else(|| EadBridgeError::Graph(format!("unknown record {id}")))
    }

    pub fn record_mut(&mut self, id: RecordId) -> Result<&mut Record> {
        self.graph
            .get_mut(id)
            .ok_or_else(|| EadBridgeError::Graph(format!("unknown record {id}")))
    }

    /// Records already attached to `parent`'s collection.
    pub fn collection(&self, parent: RecordId, collection: Collection) -> &[RecordId] {
        self.graph.collection(parent, collection)
    }

    pub fn detach_last(&mut self, parent: RecordId, collection: Collection) -> Option<RecordId> {
        self.graph.detach_last(parent, collection)
    }

    pub fn graph(&self) -> &RecordGraph {
        &self.graph
    }

    pub fn into_graph(self) -> RecordGraph {
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eadbridge_shared::{ArchivalObject, NoteMultipart, Resource};

    const HIERARCHY: &[RecordKind] = &[RecordKind::Resource, RecordKind::ArchivalObject];

    #[test]
    fn nested_component_skips_its_own_frame() {
        let mut builder = RecordBuilder::new();
        let outer = builder.build(ArchivalObject::default());
        let inner = builder.build(ArchivalObject::default());

        let attached = builder
            .attach(inner, HIERARCHY, Collection::Children)
            .expect("attach");

        assert!(attached);
        assert_eq!(builder.collection(outer, Collection::Children), &[inner]);
    }

    #[test]
    fn missing_ancestor_is_a_no_op() {
        let mut builder = RecordBuilder::new();
        let note = builder.build(NoteMultipart {
            note_type: "odd".into(),
            persistent_id: None,
        });

        let attached = builder
            .attach(note, HIERARCHY, Collection::Notes)
            .expect("attach");

        assert!(!attached);
        assert!(builder.graph().roots().is_empty());
    }

    #[test]
    fn pop_frame_closes_scope() {
        let mut builder = RecordBuilder::new();
        let resource = builder.build(Resource::default());
        let ao = builder.build(ArchivalObject::default());

        assert_eq!(builder.nearest_any(HIERARCHY), Some(ao));
        builder.pop_frame();
        assert_eq!(builder.nearest_any(HIERARCHY), Some(resource));
    }

    #[test]
    fn unknown_record_is_graph_error() {
        let builder = RecordBuilder::new();
        let err = builder.record(RecordId::from_index(9)).unwrap_err();
        assert!(matches!(err, EadBridgeError::Graph(_)));
    }
}
