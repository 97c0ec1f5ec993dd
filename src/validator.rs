use crate::schema::CanonicalStatement;
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Graph junctions where inflow must equal the sum of outflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum Junction {
    Revenue,
    GrossProfit,
    OperatingIncome,
}

/// An advisory conservation violation. Never blocks graph construction;
/// surfaced to the caller for a "data validation issues" notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Diagnostic {
    pub junction: Junction,
    pub inflow: f64,
    pub outflow: f64,
    pub delta: f64,
}

pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Checks each junction for inflow/outflow balance within `tolerance`,
/// using the true signed magnitudes. The residual bucket counts as Revenue
/// outflow when present, matching the Revenue → Other edge in the graph.
pub fn validate(stmt: &CanonicalStatement, residual: f64, tolerance: f64) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let revenue_outflow = stmt.cost_of_revenue
        + stmt.gross_profit
        + if residual > 0.0 { residual } else { 0.0 };
    check(
        &mut diagnostics,
        Junction::Revenue,
        stmt.revenue,
        revenue_outflow,
        tolerance,
    );

    check(
        &mut diagnostics,
        Junction::GrossProfit,
        stmt.gross_profit,
        stmt.operating_expenses + stmt.operating_income,
        tolerance,
    );

    let taxes_and_other = stmt.operating_income - stmt.net_income;
    check(
        &mut diagnostics,
        Junction::OperatingIncome,
        stmt.operating_income,
        taxes_and_other + stmt.net_income,
        tolerance,
    );

    diagnostics
}

fn check(
    diagnostics: &mut Vec<Diagnostic>,
    junction: Junction,
    inflow: f64,
    outflow: f64,
    tolerance: f64,
) {
    let delta = (inflow - outflow).abs();
    if delta > tolerance {
        warn!(
            "Conservation mismatch at {:?}: inflow {} vs outflow {} (delta {})",
            junction, inflow, outflow, delta
        );
        diagnostics.push(Diagnostic {
            junction,
            inflow,
            outflow,
            delta,
        });
    }
}
