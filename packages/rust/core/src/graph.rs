//! Arena of output records and the collections that link them.
//!
//! Records are addressed by [`RecordId`]. Each record is owned by at most one
//! parent collection; ownership is checked on attach so a record can never
//! end up in two places.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use eadbridge_shared::{Collection, EadBridgeError, Record, RecordKind, Result};

/// Index of a record inside a [`RecordGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(usize);

impl RecordId {
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    record: Record,
    parent: Option<(RecordId, Collection)>,
    collections: BTreeMap<Collection, Vec<RecordId>>,
}

/// All records produced by one conversion.
#[derive(Debug, Clone, Default)]
pub struct RecordGraph {
    entries: Vec<Entry>,
}

impl RecordGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record; it starts out unattached.
    pub fn insert(&mut self, record: Record) -> RecordId {
        let id = RecordId(self.entries.len());
        self.entries.push(Entry {
            record,
            parent: None,
            collections: BTreeMap::new(),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.entries.get(id.0).map(|e| &e.record)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.entries.get_mut(id.0).map(|e| &mut e.record)
    }

    pub fn kind(&self, id: RecordId) -> Option<RecordKind> {
        self.get(id).map(Record::kind)
    }

    /// Parent record and collection `id` is attached to.
    pub fn parent_of(&self, id: RecordId) -> Option<(RecordId, Collection)> {
        self.entries.get(id.0).and_then(|e| e.parent)
    }

    /// Records in `parent`'s collection, in insertion order.
    pub fn collection(&self, parent: RecordId, collection: Collection) -> &[RecordId] {
        self.entries
            .get(parent.0)
            .and_then(|e| e.collections.get(&collection))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Append `child` to `parent`'s collection.
    pub fn attach(&mut self, parent: RecordId, collection: Collection, child: RecordId) -> Result<()> {
        let parent_kind = self
            .kind(parent)
            .ok_or_else(|| EadBridgeError::Graph(format!("unknown parent record {parent}")))?;
        let child_kind = self
            .kind(child)
            .ok_or_else(|| EadBridgeError::Graph(format!("unknown record {child}")))?;

        if parent == child {
            return Err(EadBridgeError::Graph(format!(
                "{child_kind} {child} cannot be attached to itself"
            )));
        }
        if !parent_kind.owns(collection) {
            return Err(EadBridgeError::Graph(format!(
                "{parent_kind} has no '{collection}' collection"
            )));
        }
        if let Some((owner, owned_by)) = self.parent_of(child) {
            return Err(EadBridgeError::Graph(format!(
                "{child_kind} {child} is already attached to {owner}.{owned_by}"
            )));
        }
        if collection.is_single() && !self.collection(parent, collection).is_empty() {
            return Err(EadBridgeError::Graph(format!(
                "{parent_kind} {parent} already has a '{collection}'"
            )));
        }

        self.entries[parent.0]
            .collections
            .entry(collection)
            .or_default()
            .push(child);
        self.entries[child.0].parent = Some((parent, collection));
        Ok(())
    }

    /// Remove and return the last record of `parent`'s collection.
    pub fn detach_last(&mut self, parent: RecordId, collection: Collection) -> Option<RecordId> {
        let child = self
            .entries
            .get_mut(parent.0)?
            .collections
            .get_mut(&collection)?
            .pop()?;
        self.entries[child.0].parent = None;
        Some(child)
    }

    /// All records, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &Record)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (RecordId(i), &e.record))
    }

    /// Records of one kind, in creation order.
    pub fn of_kind(&self, kind: RecordKind) -> Vec<(RecordId, &Record)> {
        self.iter().filter(|(_, r)| r.kind() == kind).collect()
    }

    /// Top of the output: resources, plus archival objects that found no parent.
    pub fn roots(&self) -> Vec<RecordId> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                e.parent.is_none()
                    && matches!(
                        e.record.kind(),
                        RecordKind::Resource | RecordKind::ArchivalObject
                    )
            })
            .map(|(i, _)| RecordId(i))
            .collect()
    }

    /// Records reachable from a root (the ones that make it into the output).
    pub fn reachable(&self) -> Vec<RecordId> {
        let mut seen = Vec::new();
        let mut pending: Vec<RecordId> = self.roots().into_iter().rev().collect();
        while let Some(id) = pending.pop() {
            seen.push(id);
            for children in self.entries[id.0].collections.values().rev() {
                pending.extend(children.iter().rev());
            }
        }
        seen
    }

    /// Nested JSON for one record and everything it owns.
    pub fn to_json(&self, id: RecordId) -> Result<Value> {
        let entry = self
            .entries
            .get(id.0)
            .ok_or_else(|| EadBridgeError::Graph(format!("unknown record {id}")))?;

        let mut object = match serde_json::to_value(&entry.record)? {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".into(), other);
                map
            }
        };

        for (collection, children) in &entry.collections {
            let value = if collection.is_single() {
                match children.first() {
                    Some(child) => self.to_json(*child)?,
                    None => continue,
                }
            } else {
                Value::Array(
                    children
                        .iter()
                        .map(|child| self.to_json(*child))
                        .collect::<Result<Vec<_>>>()?,
                )
            };
            object.insert(collection.as_str().to_string(), value);
        }

        Ok(Value::Object(object))
    }

    /// JSON array of every root.
    pub fn roots_to_json(&self) -> Result<Value> {
        Ok(Value::Array(
            self.roots()
                .into_iter()
                .map(|root| self.to_json(root))
                .collect::<Result<Vec<_>>>()?,
        ))
    }
}
