use crate::reconciler::ReconcilePolicy;
use crate::schema::CanonicalStatement;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Fixed node order. Other is appended only when the residual bucket is
// non-empty.
pub const NODE_REVENUE: usize = 0;
pub const NODE_COST_OF_REVENUE: usize = 1;
pub const NODE_GROSS_PROFIT: usize = 2;
pub const NODE_OPERATING_EXPENSES: usize = 3;
pub const NODE_OPERATING_INCOME: usize = 4;
pub const NODE_TAXES_AND_OTHER: usize = 5;
pub const NODE_NET_INCOME: usize = 6;
pub const NODE_OTHER: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlowNode {
    pub name: String,

    #[schemars(description = "Signed magnitude shown in labels and tooltips")]
    pub display_value: f64,
}

impl FlowNode {
    fn new(name: &str, display_value: f64) -> Self {
        Self {
            name: name.to_string(),
            display_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlowEdge {
    pub source: usize,
    pub target: usize,

    #[schemars(description = "Floored magnitude driving the rendered link width; always >= the floor")]
    pub visual_value: f64,

    #[schemars(description = "True signed flow, preserved for display even when negative or zero")]
    pub actual_value: f64,
}

impl FlowEdge {
    fn floored(source: usize, target: usize, actual: f64, floor: f64) -> Self {
        Self {
            source,
            target,
            visual_value: floor.max(actual.abs()),
            actual_value: actual,
        }
    }
}

/// A simple layered DAG mirroring the canonical statement's split structure:
/// Revenue → {CostOfRevenue, GrossProfit}, GrossProfit →
/// {OperatingExpenses, OperatingIncome}, OperatingIncome →
/// {TaxesAndOther, NetIncome}, plus Revenue → Other when the residual
/// bucket is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,

    #[schemars(description = "The visibility floor the edges were built with")]
    pub floor: f64,
}

impl FlowGraph {
    /// True when every edge references an existing node.
    pub fn endpoints_valid(&self) -> bool {
        self.edges
            .iter()
            .all(|e| e.source < self.nodes.len() && e.target < self.nodes.len())
    }
}

/// Builds the renderable flow graph. `floor` defaults to
/// `max(1, |Revenue| × 0.01)` (the default policy's visibility floor).
///
/// Arithmetic producing negative differences never fails: negative actuals
/// are preserved as-is and only their magnitudes are floored for the visual
/// channel, so a zero or loss-making statement still renders.
pub fn build_graph(stmt: &CanonicalStatement, residual: f64, floor: Option<f64>) -> FlowGraph {
    let floor = floor.unwrap_or_else(|| ReconcilePolicy::default().floor_for(stmt.revenue));

    // May go negative when non-operating gains push NetIncome above
    // OperatingIncome.
    let taxes_and_other = stmt.operating_income - stmt.net_income;

    let mut nodes = vec![
        FlowNode::new("Revenue", stmt.revenue),
        FlowNode::new("Cost of Revenue", stmt.cost_of_revenue),
        FlowNode::new("Gross Profit", stmt.gross_profit),
        FlowNode::new("Operating Expenses", stmt.operating_expenses),
        FlowNode::new("Operating Income", stmt.operating_income),
        FlowNode::new("Taxes & Other", taxes_and_other),
        FlowNode::new("Net Income", stmt.net_income),
    ];

    let mut edges = vec![
        FlowEdge::floored(NODE_REVENUE, NODE_COST_OF_REVENUE, stmt.cost_of_revenue, floor),
        FlowEdge::floored(NODE_REVENUE, NODE_GROSS_PROFIT, stmt.gross_profit, floor),
        FlowEdge::floored(
            NODE_GROSS_PROFIT,
            NODE_OPERATING_EXPENSES,
            stmt.operating_expenses,
            floor,
        ),
        FlowEdge::floored(
            NODE_GROSS_PROFIT,
            NODE_OPERATING_INCOME,
            stmt.operating_income,
            floor,
        ),
        FlowEdge::floored(
            NODE_OPERATING_INCOME,
            NODE_TAXES_AND_OTHER,
            taxes_and_other,
            floor,
        ),
        FlowEdge::floored(NODE_OPERATING_INCOME, NODE_NET_INCOME, stmt.net_income, floor),
    ];

    if residual > 0.0 {
        nodes.push(FlowNode::new("Other", residual));
        edges.push(FlowEdge::floored(NODE_REVENUE, NODE_OTHER, residual, floor));
    }

    FlowGraph {
        nodes,
        edges,
        floor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_statement() -> CanonicalStatement {
        CanonicalStatement {
            revenue: 1000.0,
            cost_of_revenue: 650.0,
            gross_profit: 350.0,
            operating_expenses: 245.0,
            operating_income: 105.0,
            net_income: 100.0,
        }
    }

    #[test]
    fn test_node_order_fixed() {
        let graph = build_graph(&sample_statement(), 0.0, None);

        let names: Vec<&str> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Revenue",
                "Cost of Revenue",
                "Gross Profit",
                "Operating Expenses",
                "Operating Income",
                "Taxes & Other",
                "Net Income",
            ]
        );
        assert_eq!(graph.edges.len(), 6);
        assert!(graph.endpoints_valid());
    }

    #[test]
    fn test_default_floor() {
        let graph = build_graph(&sample_statement(), 0.0, None);
        assert_eq!(graph.floor, 10.0);

        let zero = build_graph(&CanonicalStatement::default(), 0.0, None);
        assert_eq!(zero.floor, 1.0);
    }

    #[test]
    fn test_taxes_and_other_edge() {
        let graph = build_graph(&sample_statement(), 0.0, None);

        let taxes = &graph.edges[4];
        assert_eq!(taxes.source, NODE_OPERATING_INCOME);
        assert_eq!(taxes.target, NODE_TAXES_AND_OTHER);
        assert!((taxes.actual_value - 5.0).abs() < 1e-9);
        // 5 is below the floor of 10, so the visual channel is floored.
        assert_eq!(taxes.visual_value, 10.0);
    }

    #[test]
    fn test_negative_taxes_and_other_preserved() {
        // Non-operating gains: NetIncome above OperatingIncome.
        let stmt = CanonicalStatement {
            net_income: 150.0,
            ..sample_statement()
        };
        let graph = build_graph(&stmt, 0.0, None);

        let taxes = &graph.edges[4];
        assert_eq!(taxes.actual_value, -45.0);
        assert_eq!(taxes.visual_value, 45.0);
    }

    #[test]
    fn test_residual_adds_other_node_and_edge() {
        let graph = build_graph(&sample_statement(), 50.0, None);

        assert_eq!(graph.nodes.len(), 8);
        assert_eq!(graph.nodes[NODE_OTHER].name, "Other");
        assert_eq!(graph.nodes[NODE_OTHER].display_value, 50.0);

        let other = graph.edges.last().unwrap();
        assert_eq!(other.source, NODE_REVENUE);
        assert_eq!(other.target, NODE_OTHER);
        assert_eq!(other.actual_value, 50.0);
        assert_eq!(other.visual_value, 50.0);
        assert!(graph.endpoints_valid());
    }

    #[test]
    fn test_zero_residual_omits_other() {
        let graph = build_graph(&sample_statement(), 0.0, None);
        assert_eq!(graph.nodes.len(), 7);
        assert!(graph.nodes.iter().all(|n| n.name != "Other"));
    }

    #[test]
    fn test_all_visuals_at_least_floor() {
        let cases = [
            (sample_statement(), 0.0),
            (sample_statement(), 3.0),
            (CanonicalStatement::default(), 0.0),
            (
                CanonicalStatement {
                    revenue: 100.0,
                    net_income: -40.0,
                    ..CanonicalStatement::default()
                },
                12.5,
            ),
        ];

        for (stmt, residual) in cases {
            let graph = build_graph(&stmt, residual, None);
            for edge in &graph.edges {
                assert!(
                    edge.visual_value >= graph.floor,
                    "edge {} -> {} visual {} below floor {}",
                    edge.source,
                    edge.target,
                    edge.visual_value,
                    graph.floor
                );
            }
        }
    }

    #[test]
    fn test_explicit_floor_override() {
        let graph = build_graph(&sample_statement(), 0.0, Some(200.0));
        assert_eq!(graph.floor, 200.0);
        assert!(graph.edges.iter().all(|e| e.visual_value >= 200.0));
        // Actuals are untouched by the floor.
        assert_eq!(graph.edges[0].actual_value, 650.0);
    }

    #[test]
    fn test_degenerate_statement_still_renders() {
        let graph = build_graph(&CanonicalStatement::default(), 0.0, None);

        assert_eq!(graph.nodes.len(), 7);
        for edge in &graph.edges {
            assert_eq!(edge.visual_value, 1.0);
            assert_eq!(edge.actual_value, 0.0);
        }
    }

    #[test]
    fn test_layered_dag_structure() {
        let graph = build_graph(&sample_statement(), 25.0, None);

        // Every edge points strictly forward in node order, so the graph is
        // acyclic by construction.
        for edge in &graph.edges {
            assert!(edge.source < edge.target);
        }
    }
}
