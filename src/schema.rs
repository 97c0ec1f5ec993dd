use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel string the extraction service emits for fields it could not read.
pub const UNKNOWN_SENTINEL: &str = "Unknown";

/// Reserved key carrying an extraction-level error message. Excluded from
/// all numeric processing.
pub const ERROR_KEY: &str = "error";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RawValue {
    #[schemars(description = "A plain numeric value, taken as-is")]
    Numeric(f64),

    #[schemars(
        description = "A string-encoded value: currency formatting, thousands separators and parenthesized negatives are tolerated. The literal \"Unknown\" marks a field the extractor could not resolve."
    )]
    Text(String),

    #[schemars(description = "Any other JSON value. Never resolves to a number.")]
    Other(serde_json::Value),
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Numeric(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// A financial record as delivered by the extraction service. Keys are not
/// constrained to a fixed schema; unrecognized keys are kept and later
/// aggregated into the residual bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawStatement {
    #[serde(flatten)]
    #[schemars(
        description = "Line items keyed by name (e.g. 'Revenue', 'Cost_of_Revenue'). Values may be numbers, formatted strings, or the sentinel \"Unknown\". A reserved 'error' key is ignored."
    )]
    pub fields: BTreeMap<String, RawValue>,
}

impl RawStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(RawStatement)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawStatement {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Fields that survived normalization. Omission and "is zero" are distinct
/// facts here: a key that could not be resolved is simply absent.
pub type CleanedMap = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum CanonicalField {
    Revenue,
    CostOfRevenue,
    GrossProfit,
    OperatingExpenses,
    OperatingIncome,
    NetIncome,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::Revenue,
        CanonicalField::CostOfRevenue,
        CanonicalField::GrossProfit,
        CanonicalField::OperatingExpenses,
        CanonicalField::OperatingIncome,
        CanonicalField::NetIncome,
    ];

    /// Matches an input key against the canonical six. Case, spaces,
    /// underscores and hyphens are ignored: the extraction backend emits
    /// "Cost of Revenue" while the older frontend used "Cost_of_Revenue".
    pub fn from_key(key: &str) -> Option<Self> {
        let folded: String = key
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match folded.as_str() {
            "revenue" => Some(CanonicalField::Revenue),
            "costofrevenue" => Some(CanonicalField::CostOfRevenue),
            "grossprofit" => Some(CanonicalField::GrossProfit),
            "operatingexpenses" => Some(CanonicalField::OperatingExpenses),
            "operatingincome" => Some(CanonicalField::OperatingIncome),
            "netincome" => Some(CanonicalField::NetIncome),
            _ => None,
        }
    }

    /// Human-readable label, used for flow-graph node names.
    pub fn display_name(&self) -> &'static str {
        match self {
            CanonicalField::Revenue => "Revenue",
            CanonicalField::CostOfRevenue => "Cost of Revenue",
            CanonicalField::GrossProfit => "Gross Profit",
            CanonicalField::OperatingExpenses => "Operating Expenses",
            CanonicalField::OperatingIncome => "Operating Income",
            CanonicalField::NetIncome => "Net Income",
        }
    }
}

/// The fully-derived statement. Every field holds a concrete signed number;
/// nothing is "absent" past reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct CanonicalStatement {
    pub revenue: f64,
    pub cost_of_revenue: f64,
    pub gross_profit: f64,
    pub operating_expenses: f64,
    pub operating_income: f64,
    pub net_income: f64,
}

impl CanonicalStatement {
    pub fn get(&self, field: CanonicalField) -> f64 {
        match field {
            CanonicalField::Revenue => self.revenue,
            CanonicalField::CostOfRevenue => self.cost_of_revenue,
            CanonicalField::GrossProfit => self.gross_profit,
            CanonicalField::OperatingExpenses => self.operating_expenses,
            CanonicalField::OperatingIncome => self.operating_income,
            CanonicalField::NetIncome => self.net_income,
        }
    }

    pub fn values(&self) -> [f64; 6] {
        [
            self.revenue,
            self.cost_of_revenue,
            self.gross_profit,
            self.operating_expenses,
            self.operating_income,
            self.net_income,
        ]
    }
}
