//! Test helpers shared by the engine and rule tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use eadbridge_shared::{ConversionConfig, Record, RecordKind};

use crate::engine::{ConversionOutput, Converter, IdGenerator};
use crate::rules::bhl_registry;

/// Predictable identifiers: `do-1`, `do-2`, …
#[derive(Debug, Default)]
pub(crate) struct SequentialIds(AtomicUsize);

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        format!("do-{}", self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

pub(crate) fn bhl_converter() -> Converter {
    Converter::new(
        Arc::new(bhl_registry().expect("registry")),
        None,
        ConversionConfig::default(),
    )
    .with_ids(Arc::new(SequentialIds::default()))
}

pub(crate) fn convert(xml: &str) -> ConversionOutput {
    bhl_converter().convert_str(xml).expect("convert")
}

/// Every record of `kind`, reachable or not, in creation order.
pub(crate) fn records_of(output: &ConversionOutput, kind: RecordKind) -> Vec<Record> {
    output
        .graph
        .of_kind(kind)
        .into_iter()
        .map(|(_, record)| record.clone())
        .collect()
}
