//! DCF Engine
//!
//! Discounted cash flow valuation as a pure computation: normalize financial
//! inputs, project free cash flow, discount it, add a Gordon growth terminal
//! value, bridge to equity and per-share value, rate the result, then attach a
//! sensitivity grid and a data quality report. No I/O and no shared state.

pub mod batch;
pub mod discount;
pub mod engine;
pub mod normalizer;
pub mod policy;
pub mod projection;
pub mod quality;
pub mod recommendation;
pub mod sensitivity;
pub mod synthesis;
pub mod terminal;

pub use discount::{discount, discount_factor, discount_series};
pub use engine::DcfEngine;
pub use normalizer::{effective_capex, free_cash_flow, normalize};
pub use policy::{
    apply_conservative_fcf_floor, apply_equity_value_floor, EquityFloorPolicy, FcfFloorPolicy,
    PolicyOutcome, ValuationPolicy,
};
pub use projection::{project, project_operating};
pub use quality::{score, QualityBasis};
pub use recommendation::{classify, recommend, RecommendationPolicy};
pub use sensitivity::analyze_sensitivity;
pub use synthesis::{synthesize, Synthesis};
pub use terminal::{gordon_growth_value, terminal_value};

use valuation_core::{DcfParameters, FinancialInputs, ValuationError, ValuationResult};

/// Value `financials` with the default engine policies.
pub fn compute_valuation(
    financials: &FinancialInputs,
    params: &DcfParameters,
) -> Result<ValuationResult, ValuationError> {
    DcfEngine::new().compute_valuation(financials, params)
}
