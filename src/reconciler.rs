use crate::error::{Result, StatementFlowError};
use crate::schema::{CanonicalField, CanonicalStatement, CleanedMap, ERROR_KEY};
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tunable derivation policy. The ratios are industry rules of thumb, not
/// fixed truths; swapping them must never require touching the structural
/// reconciliation code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReconcilePolicy {
    #[schemars(description = "Assumed net margin used to back out Revenue from NetIncome (Revenue = |NetIncome| / ratio)")]
    pub net_margin_floor: f64,

    #[schemars(description = "Typical cost-of-goods share of Revenue, used when CostOfRevenue is missing")]
    pub cost_of_revenue_ratio: f64,

    #[schemars(description = "Typical operating-expense share of GrossProfit, used when OperatingExpenses is missing")]
    pub operating_expense_ratio: f64,

    #[schemars(description = "Effective after-tax share of OperatingIncome, used when NetIncome is missing")]
    pub after_tax_ratio: f64,

    #[schemars(description = "Visibility floor as a fraction of |Revenue|")]
    pub floor_fraction: f64,

    #[schemars(description = "Absolute lower bound for the visibility floor")]
    pub floor_minimum: f64,

    #[schemars(description = "Junction imbalance below this magnitude is not reported")]
    pub tolerance: f64,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            net_margin_floor: 0.15,
            cost_of_revenue_ratio: 0.65,
            operating_expense_ratio: 0.70,
            after_tax_ratio: 0.75,
            floor_fraction: 0.01,
            floor_minimum: 1.0,
            tolerance: 0.1,
        }
    }
}

impl ReconcilePolicy {
    /// Rejects ratios a reconciliation pass cannot work with. A zero
    /// net-margin floor would divide by zero; a non-positive floor minimum
    /// would let degenerate flows vanish from the rendered graph.
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("net_margin_floor", self.net_margin_floor),
            ("cost_of_revenue_ratio", self.cost_of_revenue_ratio),
            ("operating_expense_ratio", self.operating_expense_ratio),
            ("after_tax_ratio", self.after_tax_ratio),
            ("floor_fraction", self.floor_fraction),
            ("floor_minimum", self.floor_minimum),
        ];

        for (name, value) in ratios {
            if !value.is_finite() || value <= 0.0 {
                return Err(StatementFlowError::InvalidPolicyRatio { name, value });
            }
        }

        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(StatementFlowError::InvalidTolerance(self.tolerance));
        }

        Ok(())
    }

    /// Minimum visual magnitude for graph edges: `max(minimum, |Revenue| × fraction)`.
    pub fn floor_for(&self, revenue: f64) -> f64 {
        self.floor_minimum.max(revenue.abs() * self.floor_fraction)
    }
}

/// Derives a complete canonical statement from whatever fields survived
/// normalization, and aggregates everything unrecognized into the residual
/// bucket.
///
/// The six rules run once, in fixed dependency order, so the result does not
/// depend on input key ordering. Precedence at each field is direct value >
/// arithmetic derivation > ratio estimate. A supplied literal zero counts as
/// "unset" for rule firing; any other supplied value is never overwritten.
pub fn reconcile(cleaned: &CleanedMap, policy: &ReconcilePolicy) -> (CanonicalStatement, f64) {
    let mut revenue = supplied(cleaned, CanonicalField::Revenue);
    let mut cost_of_revenue = supplied(cleaned, CanonicalField::CostOfRevenue);
    let mut gross_profit = supplied(cleaned, CanonicalField::GrossProfit);
    let mut operating_expenses = supplied(cleaned, CanonicalField::OperatingExpenses);
    let mut operating_income = supplied(cleaned, CanonicalField::OperatingIncome);
    let mut net_income = supplied(cleaned, CanonicalField::NetIncome);

    // 1. Revenue backed out of NetIncome at the assumed margin floor.
    if revenue.is_none() {
        if let Some(ni) = net_income {
            let estimate = ni.abs() / policy.net_margin_floor;
            debug!("Revenue missing; estimated {} from NetIncome {}", estimate, ni);
            revenue = Some(estimate);
        }
    }

    if let Some(rev) = revenue {
        // 2. CostOfRevenue: exact subtraction when GrossProfit is supplied,
        //    ratio estimate otherwise.
        if cost_of_revenue.is_none() {
            let estimate = match gross_profit {
                Some(gp) => rev - gp,
                None => rev * policy.cost_of_revenue_ratio,
            };
            debug!("CostOfRevenue missing; derived {}", estimate);
            cost_of_revenue = Some(estimate);
        } else if let (Some(cor), Some(gp)) = (cost_of_revenue, gross_profit) {
            let drift = (rev - gp - cor).abs();
            if drift > policy.tolerance {
                warn!(
                    "Supplied CostOfRevenue {} disagrees with Revenue - GrossProfit = {} (keeping the supplied value)",
                    cor,
                    rev - gp
                );
            }
        }

        // 3. GrossProfit from the values known or estimated so far.
        if gross_profit.is_none() {
            let derived = rev - cost_of_revenue.unwrap_or(0.0);
            debug!("GrossProfit missing; derived {}", derived);
            gross_profit = Some(derived);
        }
    }

    // 4. OperatingExpenses: exact when OperatingIncome is supplied, ratio
    //    estimate otherwise.
    if operating_expenses.is_none() {
        if let Some(gp) = gross_profit {
            let estimate = match operating_income {
                Some(oi) => gp - oi,
                None => gp * policy.operating_expense_ratio,
            };
            debug!("OperatingExpenses missing; derived {}", estimate);
            operating_expenses = Some(estimate);
        }
    }

    // 5. OperatingIncome as whatever GrossProfit did not go to expenses.
    if operating_income.is_none() {
        if let (Some(gp), Some(oe)) = (gross_profit, operating_expenses) {
            let derived = gp - oe;
            debug!("OperatingIncome missing; derived {}", derived);
            operating_income = Some(derived);
        }
    }

    // 6. NetIncome at the effective after-tax ratio.
    if net_income.is_none() {
        if let Some(oi) = operating_income {
            let estimate = oi * policy.after_tax_ratio;
            debug!("NetIncome missing; estimated {}", estimate);
            net_income = Some(estimate);
        }
    }

    let statement = CanonicalStatement {
        revenue: revenue.unwrap_or(0.0),
        cost_of_revenue: cost_of_revenue.unwrap_or(0.0),
        gross_profit: gross_profit.unwrap_or(0.0),
        operating_expenses: operating_expenses.unwrap_or(0.0),
        operating_income: operating_income.unwrap_or(0.0),
        net_income: net_income.unwrap_or(0.0),
    };

    (statement, residual_bucket(cleaned))
}

/// Direct value for a canonical field, with zero treated as unset. Input key
/// spelling is folded via [`CanonicalField::from_key`]; the first matching
/// key wins and later duplicates are flagged.
fn supplied(cleaned: &CleanedMap, field: CanonicalField) -> Option<f64> {
    let mut found: Option<(&String, f64)> = None;

    for (key, &value) in cleaned {
        if CanonicalField::from_key(key) != Some(field) {
            continue;
        }
        match found {
            None => found = Some((key, value)),
            Some((first_key, first_value)) => {
                if value != first_value {
                    warn!(
                        "Keys '{}' and '{}' both map to {:?} with different values; keeping '{}'",
                        first_key, key, field, first_key
                    );
                }
            }
        }
    }

    found.map(|(_, value)| value).filter(|v| *v != 0.0)
}

/// Sum of absolute values of all cleaned entries outside the canonical six.
fn residual_bucket(cleaned: &CleanedMap) -> f64 {
    cleaned
        .iter()
        .filter(|(key, _)| key.as_str() != ERROR_KEY && CanonicalField::from_key(key).is_none())
        .map(|(_, value)| value.abs())
        .sum()
}
