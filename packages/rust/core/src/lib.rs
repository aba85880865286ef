//! Rule-driven conversion of EAD finding aids into ArchivesSpace records.
//!
//! The document is walked depth-first. At each element the [`RuleRegistry`]
//! runs the rules whose path pattern matches; rules build records through a
//! [`RuleContext`] and hang them on their nearest enclosing records. The
//! result is a [`RecordGraph`] rooted at resources and archival objects.

pub mod builder;
pub mod context;
pub mod engine;
pub mod formats;
pub mod graph;
pub mod registry;
pub mod rules;
pub mod scope;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::RecordBuilder;
pub use context::{ContextStack, Frame};
pub use engine::{
    ConversionOutput, ConversionReport, ConversionStats, Converter, IdGenerator, UuidGenerator,
};
pub use formats::{BHL_EAD_XML, import_types, instance_for, profile, require_instance};
pub use graph::{RecordGraph, RecordId};
pub use registry::{Guard, Handler, Layer, PathPattern, Rule, RuleRegistry};
pub use rules::bhl_registry;
pub use scope::{NodeScope, NodeView, RuleContext};
