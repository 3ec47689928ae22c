use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::params::{GrowthSchedule, SensitivityMode};

/// Financial statement snapshot supplied by the data provider.
///
/// Monetary fields that a provider may omit deserialize to `0.0`; the quality
/// scorer treats zero and absent alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialInputs {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub current_price: f64,
    #[serde(default)]
    pub shares_outstanding: f64,
    #[serde(default)]
    pub operating_cash_flow: f64,
    /// Reported capex (positive outflow). `None` or zero falls back to investing cash flow.
    #[serde(default)]
    pub capital_expenditure: Option<f64>,
    #[serde(default)]
    pub investing_cash_flow: f64,
    #[serde(default)]
    pub total_liabilities: f64,
    #[serde(default)]
    pub cash_and_equivalents: f64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub operating_margin: f64,
    #[serde(default)]
    pub net_income: Option<f64>,
    pub last_updated: DateTime<Utc>,
}

/// Where the capex figure used for free cash flow came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapexSource {
    Reported,
    InvestingCashFlow,
}

/// Baseline figures derived from [`FinancialInputs`] and parameter overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedInputs {
    /// Positive value the projection compounds from.
    pub start_value: f64,
    /// Operating cash flow minus capex, before any substitution.
    pub raw_free_cash_flow: f64,
    pub capex: f64,
    pub capex_source: CapexSource,
    pub operating_cash_flow: f64,
    pub revenue: f64,
    pub current_price: f64,
    pub shares_outstanding: f64,
    pub debt: f64,
    pub cash: f64,
    pub minority_interests: f64,
    pub warnings: Vec<ValuationWarning>,
}

impl NormalizedInputs {
    pub fn net_debt(&self) -> f64 {
        self.debt - self.cash
    }
}

/// Projected cash flows, one entry per projection year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSeries {
    pub year: Vec<u32>,
    pub free_cash_flow: Vec<f64>,
    pub discounted_cash_flow: Vec<f64>,
    /// Revenue build-up, present only for operating-model projections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating: Option<OperatingProjection>,
}

impl ProjectionSeries {
    pub fn len(&self) -> usize {
        self.year.len()
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_empty()
    }

    pub fn final_free_cash_flow(&self) -> Option<f64> {
        self.free_cash_flow.last().copied()
    }

    pub fn present_value(&self) -> f64 {
        self.discounted_cash_flow.iter().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatingProjection {
    pub revenue: Vec<f64>,
    pub operating_income: Vec<f64>,
    pub net_income: Vec<f64>,
}

/// Gordon-growth terminal value and its present value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerminalValue {
    pub final_year_fcf: f64,
    pub terminal_growth_rate: f64,
    pub undiscounted_terminal_value: f64,
    pub discounted_terminal_value: f64,
}

/// Discrete investment rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Recommendation {
    pub fn to_label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::Hold => "Hold",
            Recommendation::Sell => "Sell",
            Recommendation::StrongSell => "Strong Sell",
        }
    }

    pub fn is_bullish(&self) -> bool {
        matches!(self, Recommendation::StrongBuy | Recommendation::Buy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReliabilityTier {
    Low,
    Medium,
    High,
}

/// Non-fatal substitutions made while valuing. A result carrying any of these
/// should be disclosed as lower confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValuationWarning {
    /// Free cash flow was non-positive; a share of operating cash flow was used instead.
    FreeCashFlowProxy { computed: f64, substituted: f64 },
    /// Equity value was non-positive; a share of enterprise value was used instead.
    EquityValueFloor { computed: f64, substituted: f64 },
    /// No current price, so upside is reported as zero.
    MissingCurrentPrice,
}

impl ValuationWarning {
    pub fn message(&self) -> String {
        match self {
            ValuationWarning::FreeCashFlowProxy { computed, substituted } => format!(
                "Free cash flow {:.2} was not positive; using {:.2} from operating cash flow",
                computed, substituted
            ),
            ValuationWarning::EquityValueFloor { computed, substituted } => format!(
                "Equity value {:.2} was not positive; using {:.2} from enterprise value",
                computed, substituted
            ),
            ValuationWarning::MissingCurrentPrice => {
                "Current price unavailable; upside reported as zero".to_string()
            }
        }
    }
}

/// Which valuation assumption a sensitivity row perturbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityAxis {
    GrowthRate,
    DiscountRate,
    TerminalGrowthRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub delta: f64,
    pub perturbed_rate: f64,
    /// `None` when the perturbed assumptions admit no valuation.
    pub value_per_share: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    pub growth_rate: Vec<SensitivityPoint>,
    pub discount_rate: Vec<SensitivityPoint>,
    pub terminal_growth_rate: Vec<SensitivityPoint>,
}

impl SensitivityGrid {
    pub fn axis(&self, axis: SensitivityAxis) -> &[SensitivityPoint] {
        match axis {
            SensitivityAxis::GrowthRate => &self.growth_rate,
            SensitivityAxis::DiscountRate => &self.discount_rate,
            SensitivityAxis::TerminalGrowthRate => &self.terminal_growth_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityReport {
    /// 0 to 100
    pub completeness_percent: u8,
    pub reliability_tier: ReliabilityTier,
    pub as_of: DateTime<Utc>,
    pub missing_fields: Vec<String>,
}

/// Parameters that produced a valuation, echoed for the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationAssumptions {
    pub growth: GrowthSchedule,
    pub discount_rate: f64,
    pub terminal_growth_rate: f64,
    pub margin_of_safety: f64,
    pub projection_years: usize,
    pub sensitivity_mode: SensitivityMode,
}

/// Output of a single valuation call. Never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub assumptions: ValuationAssumptions,
    pub start_value: f64,
    pub projection: ProjectionSeries,
    pub terminal_value: TerminalValue,
    pub present_value_of_cash_flows: f64,
    pub terminal_value_pv: f64,
    pub enterprise_value: f64,
    pub net_debt: f64,
    pub equity_value: f64,
    pub value_per_share: f64,
    pub buy_under_price: f64,
    pub upside_downside_percent: f64,
    pub margin_of_safety_percent: f64,
    pub recommendation: Recommendation,
    pub sensitivity_analysis: SensitivityGrid,
    pub data_quality: DataQualityReport,
    pub warnings: Vec<ValuationWarning>,
}

impl ValuationResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn equity_value_floored(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ValuationWarning::EquityValueFloor { .. }))
    }

    pub fn free_cash_flow_substituted(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ValuationWarning::FreeCashFlowProxy { .. }))
    }
}
