//! Chain of enclosing records while the document is walked.
//!
//! Frames are pushed when a rule builds a record and popped, in reverse,
//! once the subtree of the node that built them is finished. Lookups scan
//! innermost to outermost. A missing ancestor is a normal outcome.

use eadbridge_shared::RecordKind;

use crate::graph::RecordId;

/// One enclosing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub kind: RecordKind,
    pub record: RecordId,
}

/// Stack of frames private to a single conversion.
#[derive(Debug, Default)]
pub struct ContextStack {
    frames: Vec<Frame>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `record` the innermost frame.
    pub fn push(&mut self, kind: RecordKind, record: RecordId) {
        self.frames.push(Frame { kind, record });
    }

    /// Remove the innermost frame.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Innermost record of the given kind.
    pub fn nearest(&self, kind: RecordKind) -> Option<RecordId> {
        self.nearest_any(&[kind])
    }

    /// Innermost record whose kind is any of `kinds`.
    pub fn nearest_any(&self, kinds: &[RecordKind]) -> Option<RecordId> {
        self.find(|frame| kinds.contains(&frame.kind))
            .map(|frame| frame.record)
    }

    /// Run `f` with the innermost record of `kind`; `None` when there is none.
    pub fn nearest_with<R>(&self, kind: RecordKind, f: impl FnOnce(RecordId) -> R) -> Option<R> {
        self.nearest(kind).map(f)
    }

    /// Innermost frame matching a predicate.
    pub fn find(&self, mut pred: impl FnMut(&Frame) -> bool) -> Option<Frame> {
        self.frames.iter().rev().find(|frame| pred(*frame)).copied()
    }
}
