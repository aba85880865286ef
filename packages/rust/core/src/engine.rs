//! The conversion engine: walks a document and dispatches rules.
//!
//! A [`Converter`] holds the rule registry, the runtime config, and the
//! identifier source. Every call to [`Converter::convert_document`] starts a
//! fresh session (record graph and context stack), so one converter can be
//! reused, and converters on different threads share nothing mutable.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use eadbridge_document::Node;
use eadbridge_shared::{ConversionConfig, EadBridgeError, Result};

use crate::builder::RecordBuilder;
use crate::graph::RecordGraph;
use crate::registry::RuleRegistry;
use crate::scope::{NodeScope, NodeView, RuleContext};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Source of digital object identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Time-ordered UUIDs; unique across threads without coordination.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::now_v7().to_string()
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Record counts of one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Records reachable from a root, per `jsonmodel_type`.
    pub records: BTreeMap<String, usize>,
    /// Records built but never attached anywhere (missing ancestors).
    pub unattached: usize,
}

impl ConversionStats {
    fn from_graph(graph: &RecordGraph) -> Self {
        let reachable = graph.reachable();
        let mut records = BTreeMap::new();
        for id in &reachable {
            if let Some(kind) = graph.kind(*id) {
                *records.entry(kind.as_str().to_string()).or_insert(0) += 1;
            }
        }
        Self {
            records,
            unattached: graph.len() - reachable.len(),
        }
    }

    /// Reachable records of one kind.
    pub fn count(&self, kind: &str) -> usize {
        self.records.get(kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.records.values().sum()
    }
}

#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub graph: RecordGraph,
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// The root records as a JSON array, collections nested.
    pub fn to_json(&self) -> Result<Value> {
        self.graph.roots_to_json()
    }

    /// Wrap the output in a report envelope.
    pub fn report(&self, format: &str, source: Option<&Path>) -> Result<ConversionReport> {
        Ok(ConversionReport {
            format: format.to_string(),
            source: source.map(|p| p.display().to_string()),
            converted_at: Utc::now(),
            stats: self.stats.clone(),
            records: self.to_json()?,
        })
    }
}

/// What the CLI writes per converted file.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub converted_at: DateTime<Utc>,
    pub stats: ConversionStats,
    pub records: Value,
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

pub struct Converter {
    registry: Arc<RuleRegistry>,
    input: Option<PathBuf>,
    config: ConversionConfig,
    ids: Arc<dyn IdGenerator>,
}

impl Converter {
    pub fn new(registry: Arc<RuleRegistry>, input: Option<PathBuf>, config: ConversionConfig) -> Self {
        Self {
            registry,
            input,
            config,
            ids: Arc::new(UuidGenerator),
        }
    }

    /// Replace the identifier source.
    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Load the input file and convert it.
    pub fn run(&self) -> Result<ConversionOutput> {
        let input = self
            .input
            .as_deref()
            .ok_or_else(|| EadBridgeError::config("converter has no input file"))?;
        let root = eadbridge_document::load(input)?;
        self.convert_document(&root)
    }

    /// Parse and convert an in-memory document.
    pub fn convert_str(&self, xml: &str) -> Result<ConversionOutput> {
        let root = eadbridge_document::parse(xml)?;
        self.convert_document(&root)
    }

    #[instrument(skip_all, fields(root = root.name()))]
    pub fn convert_document(&self, root: &Node) -> Result<ConversionOutput> {
        let mut builder = RecordBuilder::new();
        self.walk(root, &mut Vec::new(), &mut builder, false)?;

        if !builder.stack().is_empty() {
            return Err(EadBridgeError::Graph(format!(
                "{} context frames left open after the walk",
                builder.stack().depth()
            )));
        }

        let graph = builder.into_graph();
        let stats = ConversionStats::from_graph(&graph);
        if stats.unattached > 0 {
            warn!(
                unattached = stats.unattached,
                "some records had no ancestor to attach to"
            );
        }
        info!(
            records = stats.total(),
            roots = graph.roots().len(),
            "conversion complete"
        );
        Ok(ConversionOutput { graph, stats })
    }

    /// `ancestors` holds the open elements above `node`, outermost first.
    fn walk<'n>(
        &self,
        node: &'n Node,
        ancestors: &mut Vec<&'n Node>,
        builder: &mut RecordBuilder,
        ignored: bool,
    ) -> Result<()> {
        let mut scope = NodeScope::inherit(ignored);
        let view = NodeView::new(node, ancestors.as_slice());

        let mut ctx = RuleContext::new(builder, &mut scope, &self.config, self.ids.as_ref());
        let invoked = self.registry.dispatch(&view, &mut ctx)?;
        if invoked > 0 {
            debug!(node = node.name(), invoked, "dispatched");
        }

        ancestors.push(node);
        for child in node.children() {
            self.walk(child, ancestors, builder, scope.ignored)?;
        }
        ancestors.pop();

        for _ in 0..scope.pushed {
            builder.pop_frame();
        }
        Ok(())
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("input", &self.input)
            .field("rules", &self.registry.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
