//! Output record types produced by the conversion engine.
//!
//! Records carry only their own attributes. Which record owns which is kept
//! by the record graph in `eadbridge-core`; the [`Collection`] names here are
//! the keys records are nested under when the graph is exported.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RecordKind / Collection
// ---------------------------------------------------------------------------

/// Discriminant of a [`Record`], used for context lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Resource,
    ArchivalObject,
    Extent,
    NoteSinglepart,
    NoteMultipart,
    NoteText,
    NoteDefinedlist,
    NoteOrderedlist,
    NoteIndex,
    NoteIndexItem,
    RightsStatement,
    Instance,
    DigitalObject,
}

impl RecordKind {
    /// The `jsonmodel_type` name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::ArchivalObject => "archival_object",
            Self::Extent => "extent",
            Self::NoteSinglepart => "note_singlepart",
            Self::NoteMultipart => "note_multipart",
            Self::NoteText => "note_text",
            Self::NoteDefinedlist => "note_definedlist",
            Self::NoteOrderedlist => "note_orderedlist",
            Self::NoteIndex => "note_index",
            Self::NoteIndexItem => "note_index_item",
            Self::RightsStatement => "rights_statement",
            Self::Instance => "instance",
            Self::DigitalObject => "digital_object",
        }
    }

    /// Whether records of this kind own the given collection.
    pub fn owns(self, collection: Collection) -> bool {
        match self {
            Self::Resource | Self::ArchivalObject => matches!(
                collection,
                Collection::Children
                    | Collection::Extents
                    | Collection::Notes
                    | Collection::RightsStatements
                    | Collection::Instances
            ),
            Self::NoteMultipart => collection == Collection::Subnotes,
            Self::NoteIndex => collection == Collection::Items,
            Self::Instance => collection == Collection::DigitalObject,
            _ => false,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, ordered collection on a parent record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Children,
    Extents,
    Notes,
    RightsStatements,
    Instances,
    Subnotes,
    Items,
    /// Single-valued: an instance links at most one digital object.
    DigitalObject,
}

impl Collection {
    /// Key used when the collection is exported.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Children => "children",
            Self::Extents => "extents",
            Self::Notes => "notes",
            Self::RightsStatements => "rights_statements",
            Self::Instances => "instances",
            Self::Subnotes => "subnotes",
            Self::Items => "items",
            Self::DigitalObject => "digital_object",
        }
    }

    /// Whether the collection holds at most one record.
    pub fn is_single(self) -> bool {
        self == Self::DigitalObject
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One output record, tagged with its `jsonmodel_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "jsonmodel_type", rename_all = "snake_case")]
pub enum Record {
    Resource(Resource),
    ArchivalObject(ArchivalObject),
    Extent(Extent),
    NoteSinglepart(NoteSinglepart),
    NoteMultipart(NoteMultipart),
    NoteText(NoteText),
    NoteDefinedlist(NoteDefinedlist),
    NoteOrderedlist(NoteOrderedlist),
    NoteIndex(NoteIndex),
    NoteIndexItem(NoteIndexItem),
    RightsStatement(RightsStatement),
    Instance(Instance),
    DigitalObject(DigitalObject),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Resource(_) => RecordKind::Resource,
            Self::ArchivalObject(_) => RecordKind::ArchivalObject,
            Self::Extent(_) => RecordKind::Extent,
            Self::NoteSinglepart(_) => RecordKind::NoteSinglepart,
            Self::NoteMultipart(_) => RecordKind::NoteMultipart,
            Self::NoteText(_) => RecordKind::NoteText,
            Self::NoteDefinedlist(_) => RecordKind::NoteDefinedlist,
            Self::NoteOrderedlist(_) => RecordKind::NoteOrderedlist,
            Self::NoteIndex(_) => RecordKind::NoteIndex,
            Self::NoteIndexItem(_) => RecordKind::NoteIndexItem,
            Self::RightsStatement(_) => RecordKind::RightsStatement,
            Self::Instance(_) => RecordKind::Instance,
            Self::DigitalObject(_) => RecordKind::DigitalObject,
        }
    }

    /// Title of a resource or archival object.
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Resource(r) => r.title.as_deref(),
            Self::ArchivalObject(ao) => ao.title.as_deref(),
            _ => None,
        }
    }

    /// Date entries of a resource or archival object.
    pub fn dates(&self) -> &[DateEntry] {
        match self {
            Self::Resource(r) => &r.dates,
            Self::ArchivalObject(ao) => &ao.dates,
            _ => &[],
        }
    }

    /// Note type of a singlepart or multipart note.
    pub fn note_type(&self) -> Option<&str> {
        match self {
            Self::NoteSinglepart(n) => Some(&n.note_type),
            Self::NoteMultipart(n) => Some(&n.note_type),
            _ => None,
        }
    }
}

macro_rules! impl_from_record {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Record {
                fn from(value: $variant) -> Self {
                    Record::$variant(value)
                }
            }
        )*
    };
}

impl_from_record!(
    Resource,
    ArchivalObject,
    Extent,
    NoteSinglepart,
    NoteMultipart,
    NoteText,
    NoteDefinedlist,
    NoteOrderedlist,
    NoteIndex,
    NoteIndexItem,
    RightsStatement,
    Instance,
    DigitalObject,
);

// ---------------------------------------------------------------------------
// Hierarchy records
// ---------------------------------------------------------------------------

/// The collection-level description (`<archdesc>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Collection identifier (`did/unitid`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_0: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<DateEntry>,
}

/// A component (`<c>`, `<c01>`…`<c12>`) in the collection hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchivalObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<DateEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateType {
    Single,
    Inclusive,
    Bulk,
}

/// A `<unitdate>` on a resource or archival object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub date_type: DateType,
    pub label: String,
}

impl DateEntry {
    /// Human-readable label: the expression if present, else `begin - end`
    /// when both exist and differ, else `begin`.
    pub fn display_label(&self) -> Option<String> {
        fn non_empty(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.is_empty())
        }

        if let Some(expression) = non_empty(&self.expression) {
            return Some(expression.to_string());
        }
        match (non_empty(&self.begin), non_empty(&self.end)) {
            (Some(begin), Some(end)) if begin != end => Some(format!("{begin} - {end}")),
            (Some(begin), _) => Some(begin.to_string()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Extents and notes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Portion {
    Whole,
    Part,
}

impl Portion {
    /// Interpret an `altrender` attribute. Absent or unrecognized values are `Whole`.
    pub fn from_altrender(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "part" || v == "partial" => Self::Part,
            _ => Self::Whole,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub number: String,
    pub extent_type: String,
    pub portion: Portion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSinglepart {
    #[serde(rename = "type")]
    pub note_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_id: Option<String>,
    pub content: String,
}

/// Structured note; its subnotes live in the graph's `subnotes` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteMultipart {
    #[serde(rename = "type")]
    pub note_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteText {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinedListItem {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteDefinedlist {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<DefinedListItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteOrderedlist {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteIndex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteIndexItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub value: String,
    pub reference_text: String,
}

// ---------------------------------------------------------------------------
// Rights, instances, digital objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RightsType {
    InstitutionalPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RightsStatement {
    pub rights_type: RightsType,
    pub restrictions: String,
    pub restriction_end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub instance_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_statement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xlink_actuate_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xlink_show_attribute: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalObject {
    pub digital_object_id: String,
    pub title: String,
    pub file_versions: Vec<FileVersion>,
}

// ---------------------------------------------------------------------------
// Import formats
// ---------------------------------------------------------------------------

/// One entry of the import-format listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub name: String,
    pub description: String,
}
