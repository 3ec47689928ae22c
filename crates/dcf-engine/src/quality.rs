use serde::{Deserialize, Serialize};
use valuation_core::{DataQualityReport, FinancialInputs, ReliabilityTier};

const POINTS_PER_FIELD: u8 = 20;
const HIGH_THRESHOLD: u8 = 80;
const MEDIUM_THRESHOLD: u8 = 60;

/// Which earnings figure counts toward completeness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityBasis {
    /// Cash-flow seeded projection: net income is the fifth field
    CashFlow,
    /// Revenue-driven projection: revenue is the fifth field
    Revenue,
}

pub fn reliability_tier(completeness_percent: u8) -> ReliabilityTier {
    if completeness_percent >= HIGH_THRESHOLD {
        ReliabilityTier::High
    } else if completeness_percent >= MEDIUM_THRESHOLD {
        ReliabilityTier::Medium
    } else {
        ReliabilityTier::Low
    }
}

/// Score how complete the key inputs are. Advisory only; never blocks a valuation.
pub fn score(financials: &FinancialInputs, basis: QualityBasis) -> DataQualityReport {
    let earnings_check = match basis {
        QualityBasis::CashFlow => (
            "net_income",
            financials.net_income.map_or(false, |n| n != 0.0 && n.is_finite()),
        ),
        QualityBasis::Revenue => ("revenue", financials.revenue > 0.0),
    };

    let checks = [
        ("operating_cash_flow", financials.operating_cash_flow != 0.0),
        ("total_liabilities", financials.total_liabilities != 0.0),
        ("cash_and_equivalents", financials.cash_and_equivalents != 0.0),
        ("shares_outstanding", financials.shares_outstanding > 0.0),
        earnings_check,
    ];

    let mut completeness_percent = 0u8;
    let mut missing_fields = Vec::new();
    for (field, present) in checks {
        if present {
            completeness_percent += POINTS_PER_FIELD;
        } else {
            missing_fields.push(field.to_string());
        }
    }

    DataQualityReport {
        completeness_percent,
        reliability_tier: reliability_tier(completeness_percent),
        as_of: financials.last_updated,
        missing_fields,
    }
}
