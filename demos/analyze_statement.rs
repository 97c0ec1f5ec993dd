use anyhow::Result;
use statement_flow::*;

fn main() -> Result<()> {
    println!("📊 Statement Flow Demo\n");
    println!("This walks a noisy extraction through the full pipeline:");
    println!("normalize -> reconcile -> build graph -> validate.\n");

    // A typical messy payload: mixed value types, an unknown sentinel, an
    // unrecognized line item and an extraction-level error note.
    let payload = r#"{
        "Revenue": "4,500,000",
        "Cost_of_Revenue": 2900000,
        "Gross_Profit": "Unknown",
        "Operating_Expenses": "(1,100,000)",
        "Stock_Based_Comp": "250,000",
        "error": "page 3 unreadable"
    }"#;

    let raw = raw_statement_from_json(payload)?;
    let analysis = analyze_statement(&raw);

    println!("📋 Canonical statement:");
    for field in CanonicalField::ALL {
        println!(
            "  {:<20} {}",
            field.display_name(),
            format_currency(analysis.statement.get(field))
        );
    }

    println!("\n🪣 Residual bucket: {}", format_currency(analysis.residual));
    println!("🏷️  Data quality: {:?}", analysis.quality);

    println!("\n🕸️  Flow graph (floor = {}):", analysis.graph.floor);
    for edge in &analysis.graph.edges {
        let source = &analysis.graph.nodes[edge.source].name;
        let target = &analysis.graph.nodes[edge.target].name;
        println!(
            "  {} -> {}: visual {:.2}, actual {}",
            source,
            target,
            edge.visual_value,
            format_currency(edge.actual_value)
        );
    }

    if analysis.diagnostics.is_empty() {
        println!("\n✅ All junctions balance within tolerance.");
    } else {
        println!("\n⚠️  Conservation diagnostics:");
        for d in &analysis.diagnostics {
            println!(
                "  {:?}: inflow {:.2}, outflow {:.2}, delta {:.2}",
                d.junction, d.inflow, d.outflow, d.delta
            );
        }
    }

    println!("\n📈 Margins:");
    println!("  Gross:     {:.1}%", analysis.metrics.margins.gross_margin);
    println!("  Operating: {:.1}%", analysis.metrics.margins.operating_margin);
    println!("  Net:       {:.1}%", analysis.metrics.margins.net_margin);

    println!("\n🌊 Waterfall:");
    for row in waterfall_rows(&analysis.statement) {
        println!("  {:<20} {}", row.name, format_currency(row.value));
    }

    Ok(())
}
