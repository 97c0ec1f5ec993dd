/// Formats a monetary value the way the dashboard displays it: billions and
/// millions to two decimals, smaller amounts grouped by thousands.
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();

    if magnitude >= 1_000_000_000.0 {
        format!("{}${:.2} billion", sign, magnitude / 1_000_000_000.0)
    } else if magnitude >= 1_000_000.0 {
        format!("{}${:.2} million", sign, magnitude / 1_000_000.0)
    } else {
        format!("{}${}", sign, group_thousands(magnitude))
    }
}

fn group_thousands(magnitude: f64) -> String {
    let cents = (magnitude * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if fraction > 0 {
        grouped.push_str(&format!(".{:02}", fraction));
    }

    grouped
}
