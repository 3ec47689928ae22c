//! Substitution policies.
//!
//! By default the engine never seeds a projection with a non-positive cash flow
//! and never reports a non-positive equity value. Either rule can be retuned or
//! switched off through [`ValuationPolicy`].

use serde::{Deserialize, Serialize};
use valuation_core::ValuationWarning;

use crate::recommendation::RecommendationPolicy;

/// Share of operating cash flow used when free cash flow is not positive
pub const FCF_PROXY_RATIO: f64 = 0.8;
/// Share of enterprise value used when equity value is not positive
pub const EQUITY_FLOOR_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FcfFloorPolicy {
    /// Replace a non-positive FCF with `operating_cash_flow × ratio`
    OperatingCashFlowProxy { ratio: f64 },
    Disabled,
}

impl Default for FcfFloorPolicy {
    fn default() -> Self {
        FcfFloorPolicy::OperatingCashFlowProxy {
            ratio: FCF_PROXY_RATIO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EquityFloorPolicy {
    /// Replace a non-positive equity value with `enterprise_value × ratio`
    EnterpriseValueShare { ratio: f64 },
    Disabled,
}

impl Default for EquityFloorPolicy {
    fn default() -> Self {
        EquityFloorPolicy::EnterpriseValueShare {
            ratio: EQUITY_FLOOR_RATIO,
        }
    }
}

/// Policy bundle applied by [`crate::DcfEngine`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationPolicy {
    pub fcf_floor: FcfFloorPolicy,
    pub equity_floor: EquityFloorPolicy,
    pub recommendation: RecommendationPolicy,
}

impl ValuationPolicy {
    /// No substitutions: raw arithmetic flows straight through.
    pub fn passthrough() -> Self {
        Self {
            fcf_floor: FcfFloorPolicy::Disabled,
            equity_floor: EquityFloorPolicy::Disabled,
            recommendation: RecommendationPolicy::UpsideOnly,
        }
    }
}

/// Value after a policy ran, plus the warning to surface if it substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyOutcome {
    pub value: f64,
    pub warning: Option<ValuationWarning>,
}

impl PolicyOutcome {
    fn unchanged(value: f64) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn substituted(&self) -> bool {
        self.warning.is_some()
    }
}

pub fn apply_conservative_fcf_floor(
    free_cash_flow: f64,
    operating_cash_flow: f64,
    policy: FcfFloorPolicy,
) -> PolicyOutcome {
    match policy {
        FcfFloorPolicy::OperatingCashFlowProxy { ratio } if free_cash_flow <= 0.0 => {
            let substituted = operating_cash_flow * ratio;
            tracing::warn!(
                free_cash_flow,
                substituted,
                "Free cash flow not positive, using operating cash flow proxy"
            );
            PolicyOutcome {
                value: substituted,
                warning: Some(ValuationWarning::FreeCashFlowProxy {
                    computed: free_cash_flow,
                    substituted,
                }),
            }
        }
        _ => PolicyOutcome::unchanged(free_cash_flow),
    }
}

/// Does not log; [`crate::DcfEngine`] reports the substitution for the base
/// valuation only, not for every sensitivity point.
pub fn apply_equity_value_floor(
    equity_value: f64,
    enterprise_value: f64,
    policy: EquityFloorPolicy,
) -> PolicyOutcome {
    match policy {
        EquityFloorPolicy::EnterpriseValueShare { ratio } if equity_value <= 0.0 => {
            let substituted = enterprise_value * ratio;
            PolicyOutcome {
                value: substituted,
                warning: Some(ValuationWarning::EquityValueFloor {
                    computed: equity_value,
                    substituted,
                }),
            }
        }
        _ => PolicyOutcome::unchanged(equity_value),
    }
}
