//! Import formats this crate can convert, and the factory for their converters.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use eadbridge_shared::{ConversionConfig, EadBridgeError, FormatDescriptor, Result};

use crate::engine::Converter;
use crate::rules::bhl_registry;

/// EAD XML as written by the Bentley Historical Library.
pub const BHL_EAD_XML: &str = "bhl_ead_xml";

pub fn import_types() -> Vec<FormatDescriptor> {
    vec![FormatDescriptor {
        name: BHL_EAD_XML.into(),
        description: "Import BHL EAD records from an XML file".into(),
    }]
}

/// What the converters produce.
pub fn profile() -> &'static str {
    "Convert EAD To ArchivesSpace JSONModel records"
}

/// A ready-to-run converter for `format`, or `None` if the format is unknown.
pub fn instance_for(
    format: &str,
    input: &Path,
    config: &ConversionConfig,
) -> Result<Option<Converter>> {
    if format != BHL_EAD_XML {
        debug!(format, "no converter for format");
        return Ok(None);
    }
    let registry = bhl_registry()?;
    debug!(format, rules = registry.len(), "built converter");
    Ok(Some(Converter::new(
        Arc::new(registry),
        Some(input.to_path_buf()),
        config.clone(),
    )))
}

/// Like [`instance_for`], with an unknown format as an error.
pub fn require_instance(format: &str, input: &Path, config: &ConversionConfig) -> Result<Converter> {
    instance_for(format, input, config)?
        .ok_or_else(|| EadBridgeError::UnsupportedFormat(format.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_bhl_format() {
        let types = import_types();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name, "bhl_ead_xml");
        assert_eq!(types[0].description, "Import BHL EAD records from an XML file");
        assert_eq!(profile(), "Convert EAD To ArchivesSpace JSONModel records");
    }

    #[test]
    fn known_format_yields_converter() {
        let config = ConversionConfig::default();
        let converter = instance_for(BHL_EAD_XML, Path::new("fa.xml"), &config)
            .expect("instance")
            .expect("supported");
        assert_eq!(converter.input(), Some(Path::new("fa.xml")));
    }

    #[test]
    fn unknown_format_is_none_or_error() {
        let config = ConversionConfig::default();
        assert!(
            instance_for("marcxml", Path::new("x.xml"), &config)
                .expect("no error")
                .is_none()
        );
        let err = require_instance("marcxml", Path::new("x.xml"), &config).unwrap_err();
        assert!(matches!(err, EadBridgeError::UnsupportedFormat(f) if f == "marcxml"));
    }

    #[test]
    fn converter_runs_from_file() {
        let dir = std::env::temp_dir().join(format!("eadbridge-formats-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("finding-aid.xml");
        std::fs::write(
            &path,
            r#"<ead><archdesc level="collection"><did><unittitle>Papers</unittitle></did></archdesc></ead>"#,
        )
        .expect("write");

        let converter =
            require_instance(BHL_EAD_XML, &path, &ConversionConfig::default()).expect("converter");
        let output = converter.run().expect("run");
        assert_eq!(output.stats.count("resource"), 1);
        assert_eq!(output.graph.roots().len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }
}
