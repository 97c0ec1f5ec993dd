//! # Statement Flow
//!
//! A library for normalizing noisy income-statement extractions (from
//! PDFs/documents via LLM) into consistent, renderable flow graphs.
//!
//! ## Core Concepts
//!
//! - **Raw Statement**: a loosely-shaped record from the extraction service;
//!   values may be numbers, currency-formatted strings, the sentinel
//!   `"Unknown"`, or simply absent
//! - **Normalization**: tolerant per-field parsing into clean numbers;
//!   unresolvable fields are omitted, never zeroed
//! - **Reconciliation**: a deterministic single-pass derivation that fills
//!   gaps from domain ratios, with direct values always winning over
//!   derived ones
//! - **Flow Graph**: a layered DAG of line items whose edge widths are
//!   floored so degenerate flows stay visible, while true signed magnitudes
//!   are kept for display
//! - **Conservation**: each junction's inflow should equal its outflows;
//!   violations are reported as advisory diagnostics, never corrected and
//!   never fatal
//!
//! ## Example
//!
//! ```rust
//! use statement_flow::{analyze_statement, RawStatement};
//!
//! let raw: RawStatement = [("Revenue", 1000.0), ("Net_Income", 100.0)]
//!     .into_iter()
//!     .collect();
//!
//! let analysis = analyze_statement(&raw);
//! assert_eq!(analysis.statement.cost_of_revenue, 650.0);
//! assert!(analysis.graph.endpoints_valid());
//! ```

pub mod error;
pub mod graph;
pub mod ingestion;
pub mod metrics;
pub mod normalizer;
pub mod reconciler;
pub mod schema;
pub mod utils;
pub mod validator;

pub use error::{Result, StatementFlowError};
pub use graph::{build_graph, FlowEdge, FlowGraph, FlowNode};
pub use ingestion::{raw_statement_from_json, raw_statement_from_value};
pub use metrics::{
    compute_margins, compute_metrics, waterfall_rows, DataQuality, MarginSet, StatementMetrics,
    WaterfallRow,
};
pub use normalizer::normalize;
pub use reconciler::{reconcile, ReconcilePolicy};
pub use schema::*;
pub use utils::format_currency;
pub use validator::{validate, Diagnostic, Junction, DEFAULT_TOLERANCE};

use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Everything one pipeline run produces. Recomputed in full for every new
/// raw statement; no state is shared across requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatementAnalysis {
    /// Fields that resolved to clean numbers. Callers wanting a "not enough
    /// data to visualize" state can key off this map's size; the pipeline
    /// itself never refuses an input.
    pub cleaned: CleanedMap,
    /// The fully-derived statement, for tabular display.
    pub statement: CanonicalStatement,
    /// Aggregate of all non-canonical line items.
    pub residual: f64,
    /// The renderable flow graph.
    pub graph: FlowGraph,
    /// Advisory junction-imbalance reports.
    pub diagnostics: Vec<Diagnostic>,
    /// Margins and summary figures.
    pub metrics: StatementMetrics,
    /// How much of the statement rests on real data vs. derivation.
    pub quality: DataQuality,
}

pub struct StatementAnalyzer;

impl StatementAnalyzer {
    /// Runs the full pipeline with the default policy. Infallible: malformed
    /// input degrades to an all-floor graph plus diagnostics, never an error.
    pub fn analyze(raw: &RawStatement) -> StatementAnalysis {
        run_pipeline(raw, &ReconcilePolicy::default())
    }

    /// Runs the full pipeline with a caller-supplied policy. The only error
    /// is a policy that fails validation up front.
    pub fn analyze_with_policy(
        raw: &RawStatement,
        policy: &ReconcilePolicy,
    ) -> Result<StatementAnalysis> {
        policy.validate()?;
        Ok(run_pipeline(raw, policy))
    }
}

pub fn analyze_statement(raw: &RawStatement) -> StatementAnalysis {
    StatementAnalyzer::analyze(raw)
}

pub fn analyze_with_policy(
    raw: &RawStatement,
    policy: &ReconcilePolicy,
) -> Result<StatementAnalysis> {
    StatementAnalyzer::analyze_with_policy(raw, policy)
}

fn run_pipeline(raw: &RawStatement, policy: &ReconcilePolicy) -> StatementAnalysis {
    info!("Analyzing statement with {} raw fields", raw.len());

    let cleaned = normalizer::normalize(raw);
    debug!(
        "{} of {} fields resolved to numbers",
        cleaned.len(),
        raw.len()
    );

    let (statement, residual) = reconciler::reconcile(&cleaned, policy);
    let graph = graph::build_graph(&statement, residual, Some(policy.floor_for(statement.revenue)));
    let diagnostics = validator::validate(&statement, residual, policy.tolerance);

    if !diagnostics.is_empty() {
        debug!("{} conservation diagnostics emitted", diagnostics.len());
    }

    let metrics = metrics::compute_metrics(&statement);
    let quality = DataQuality::grade(&statement);

    StatementAnalysis {
        cleaned,
        statement,
        residual,
        graph,
        diagnostics,
        metrics,
        quality,
    }
}
