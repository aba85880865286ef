//! Shared types, error model, and configuration for EAD Bridge.
//!
//! This crate is the foundation depended on by all other EAD Bridge crates.
//! It provides:
//! - [`EadBridgeError`] as the unified error type
//! - Output record types ([`Record`], [`RecordKind`], [`Collection`])
//! - Configuration ([`AppConfig`], [`ConversionConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ConversionConfig, ConversionSection, DefaultsConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{EadBridgeError, Result};
pub use types::{
    ArchivalObject, Collection, DateEntry, DateType, DefinedListItem, DigitalObject, Extent,
    FileVersion, FormatDescriptor, Instance, NoteDefinedlist, NoteIndex, NoteIndexItem,
    NoteMultipart, NoteOrderedlist, NoteSinglepart, NoteText, Portion, Record, RecordKind,
    Resource, RightsStatement, RightsType,
};
