//! Document model and XML loading for EAD Bridge.
//!
//! The conversion engine only reads [`Node`] trees; this crate is the thin
//! layer that gets a file from disk into one.

mod node;
mod parser;

use std::path::Path;

use tracing::{debug, instrument};

use eadbridge_shared::{EadBridgeError, Result};

pub use node::{Content, Node};

/// Parse an XML document held in memory.
pub fn parse(xml: &str) -> Result<Node> {
    parser::parse_str(xml)
}

/// Read and parse an XML file.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load(path: &Path) -> Result<Node> {
    let xml = std::fs::read_to_string(path).map_err(|e| EadBridgeError::io(path, e))?;
    debug!(bytes = xml.len(), "read input file");

    let root = parse(&xml)?;
    debug!(root = root.name(), "parsed document");
    Ok(root)
}
