use crate::schema::CanonicalStatement;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Profitability margins as percentages of Revenue. All zero when Revenue
/// is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarginSet {
    pub gross_margin: f64,
    pub operating_margin: f64,
    pub net_margin: f64,
}

/// One bar of the waterfall view: costs carry a negative sign so the chart
/// steps down through the statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WaterfallRow {
    pub name: String,
    pub value: f64,
}

/// Summary figures for tabular display next to the flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatementMetrics {
    pub total_revenue: f64,
    pub total_costs: f64,
    pub final_profit: f64,
    pub margins: MarginSet,
}

/// Coarse grade of how much of the statement came from real data rather
/// than derivation fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum DataQuality {
    High,
    Medium,
    Low,
}

impl DataQuality {
    pub fn grade(stmt: &CanonicalStatement) -> Self {
        if stmt.values().iter().all(|v| *v > 0.0) {
            DataQuality::High
        } else if stmt.net_income > 0.0 {
            DataQuality::Medium
        } else {
            DataQuality::Low
        }
    }
}

pub fn compute_margins(stmt: &CanonicalStatement) -> MarginSet {
    if stmt.revenue == 0.0 {
        return MarginSet::default();
    }

    MarginSet {
        gross_margin: stmt.gross_profit / stmt.revenue * 100.0,
        operating_margin: stmt.operating_income / stmt.revenue * 100.0,
        net_margin: stmt.net_income / stmt.revenue * 100.0,
    }
}

pub fn waterfall_rows(stmt: &CanonicalStatement) -> Vec<WaterfallRow> {
    let row = |name: &str, value: f64| WaterfallRow {
        name: name.to_string(),
        value,
    };

    vec![
        row("Revenue", stmt.revenue),
        row("Cost of Revenue", -stmt.cost_of_revenue),
        row("Gross Profit", stmt.gross_profit),
        row("Operating Expenses", -stmt.operating_expenses),
        row("Operating Income", stmt.operating_income),
        row("Net Income", stmt.net_income),
    ]
}

pub fn compute_metrics(stmt: &CanonicalStatement) -> StatementMetrics {
    StatementMetrics {
        total_revenue: stmt.revenue,
        total_costs: stmt.cost_of_revenue + stmt.operating_expenses,
        final_profit: stmt.net_income,
        margins: compute_margins(stmt),
    }
}
