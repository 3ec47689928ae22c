use valuation_core::{CapexSource, DcfParameters, FinancialInputs, NormalizedInputs, ValuationError};

use crate::policy::{apply_conservative_fcf_floor, FcfFloorPolicy};

/// Capex actually subtracted from operating cash flow.
///
/// Reported capex wins when non-zero; otherwise the investing cash flow stands
/// in. Both are taken as outflow magnitudes, whatever sign the provider used.
pub fn effective_capex(financials: &FinancialInputs) -> (f64, CapexSource) {
    match financials.capital_expenditure {
        Some(capex) if capex != 0.0 => (capex.abs(), CapexSource::Reported),
        _ => (
            financials.investing_cash_flow.abs(),
            CapexSource::InvestingCashFlow,
        ),
    }
}

/// Operating cash flow minus capex, without any substitution.
pub fn free_cash_flow(financials: &FinancialInputs) -> f64 {
    let (capex, _) = effective_capex(financials);
    financials.operating_cash_flow - capex
}

fn ensure_finite(label: &str, value: f64) -> Result<(), ValuationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValuationError::invalid(format!("{} must be a finite number", label)))
    }
}

/// Validate raw financials and derive the baseline figures the projection needs.
pub fn normalize(
    financials: &FinancialInputs,
    params: &DcfParameters,
    fcf_floor: FcfFloorPolicy,
) -> Result<NormalizedInputs, ValuationError> {
    ensure_finite("operating cash flow", financials.operating_cash_flow)?;
    ensure_finite("investing cash flow", financials.investing_cash_flow)?;
    ensure_finite("total liabilities", financials.total_liabilities)?;
    ensure_finite("cash and equivalents", financials.cash_and_equivalents)?;
    if params.operating_model.is_some() {
        ensure_finite("revenue", financials.revenue)?;
    }
    if let Some(capex) = financials.capital_expenditure {
        ensure_finite("capital expenditure", capex)?;
    }
    // Zero or negative price means "no quote"; synthesis reports zero upside.
    ensure_finite("current price", financials.current_price)?;

    let shares_outstanding = params
        .shares_outstanding
        .unwrap_or(financials.shares_outstanding);
    if !shares_outstanding.is_finite() || shares_outstanding <= 0.0 {
        return Err(ValuationError::invalid(format!(
            "shares outstanding {} must be positive for a per-share value",
            shares_outstanding
        )));
    }

    let (capex, capex_source) = effective_capex(financials);
    let raw_free_cash_flow = financials.operating_cash_flow - capex;
    let mut warnings = Vec::new();

    let start_value = match (params.start_value, &params.operating_model) {
        (Some(seed), _) => seed,
        (None, Some(_)) => {
            if financials.revenue <= 0.0 {
                return Err(ValuationError::invalid(
                    "operating model projection needs positive revenue",
                ));
            }
            financials.revenue
        }
        (None, None) => {
            let outcome = apply_conservative_fcf_floor(
                raw_free_cash_flow,
                financials.operating_cash_flow,
                fcf_floor,
            );
            warnings.extend(outcome.warning);
            outcome.value
        }
    };

    // A disabled floor may deliberately pass a non-positive seed through.
    if start_value <= 0.0 && fcf_floor != FcfFloorPolicy::Disabled {
        return Err(ValuationError::invalid(format!(
            "no positive cash flow to project: free cash flow {:.2}, operating cash flow {:.2}",
            raw_free_cash_flow, financials.operating_cash_flow
        )));
    }

    tracing::debug!(
        symbol = %financials.symbol,
        operating_cash_flow = financials.operating_cash_flow,
        capex,
        ?capex_source,
        raw_free_cash_flow,
        start_value,
        "Inputs normalized"
    );

    Ok(NormalizedInputs {
        start_value,
        raw_free_cash_flow,
        capex,
        capex_source,
        operating_cash_flow: financials.operating_cash_flow,
        revenue: financials.revenue,
        current_price: financials.current_price,
        shares_outstanding,
        debt: params.debt.unwrap_or(financials.total_liabilities),
        cash: params.cash.unwrap_or(financials.cash_and_equivalents),
        minority_interests: params.minority_interests.unwrap_or(0.0),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::financials;
    use valuation_core::ValuationWarning;

    #[test]
    fn test_reported_capex_used_when_non_zero() {
        let f = financials(100.0, Some(20.0));
        assert_eq!(effective_capex(&f), (20.0, CapexSource::Reported));
        assert_eq!(free_cash_flow(&f), 80.0);
    }

    #[test]
    fn test_investing_cash_flow_fallback() {
        let mut f = financials(100.0, Some(0.0));
        f.investing_cash_flow = -30.0;
        assert_eq!(effective_capex(&f), (30.0, CapexSource::InvestingCashFlow));
        assert_eq!(free_cash_flow(&f), 70.0);

        f.capital_expenditure = None;
        assert_eq!(free_cash_flow(&f), 70.0);
    }

    #[test]
    fn test_negative_reported_capex_treated_as_outflow() {
        let f = financials(100.0, Some(-20.0));
        assert_eq!(free_cash_flow(&f), 80.0);
    }

    #[test]
    fn test_positive_fcf_no_substitution() {
        let mut f = financials(50.0, Some(0.0));
        f.investing_cash_flow = 0.0;
        let n = normalize(&f, &DcfParameters::default(), FcfFloorPolicy::default()).unwrap();
        assert_eq!(n.start_value, 50.0);
        assert!(n.warnings.is_empty());
    }

    #[test]
    fn test_negative_fcf_substitutes_proxy() {
        let f = financials(50.0, Some(60.0));
        let n = normalize(&f, &DcfParameters::default(), FcfFloorPolicy::default()).unwrap();
        assert_eq!(n.raw_free_cash_flow, -10.0);
        assert_eq!(n.start_value, 40.0);
        assert_eq!(
            n.warnings,
            vec![ValuationWarning::FreeCashFlowProxy {
                computed: -10.0,
                substituted: 40.0
            }]
        );
    }

    #[test]
    fn test_negative_operating_cash_flow_is_rejected() {
        let f = financials(-50.0, Some(10.0));
        let err = normalize(&f, &DcfParameters::default(), FcfFloorPolicy::default()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_zero_shares_rejected() {
        let mut f = financials(100.0, Some(20.0));
        f.shares_outstanding = 0.0;
        let err = normalize(&f, &DcfParameters::default(), FcfFloorPolicy::default()).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidInput(_)));
    }

    #[test]
    fn test_parameter_overrides_take_precedence() {
        let f = financials(100.0, Some(20.0));
        let mut params = DcfParameters::default().with_start_value(500.0);
        params.debt = Some(70.0);
        params.cash = Some(5.0);
        params.minority_interests = Some(3.0);
        params.shares_outstanding = Some(50.0);

        let n = normalize(&f, &params, FcfFloorPolicy::default()).unwrap();
        assert_eq!(n.start_value, 500.0);
        assert_eq!(n.raw_free_cash_flow, 80.0);
        assert_eq!(n.net_debt(), 65.0);
        assert_eq!(n.minority_interests, 3.0);
        assert_eq!(n.shares_outstanding, 50.0);
    }

    #[test]
    fn test_operating_model_seeds_from_revenue() {
        let mut f = financials(100.0, Some(20.0));
        f.revenue = 1000.0;
        let n = normalize(
            &f,
            &DcfParameters::legacy_operating_model(),
            FcfFloorPolicy::default(),
        )
        .unwrap();
        assert_eq!(n.start_value, 1000.0);

        f.revenue = 0.0;
        assert!(normalize(
            &f,
            &DcfParameters::legacy_operating_model(),
            FcfFloorPolicy::default()
        )
        .is_err());
    }

    #[test]
    fn test_revenue_ignored_in_cash_flow_mode() {
        let mut f = financials(100.0, Some(20.0));
        f.revenue = f64::NAN;
        let n = normalize(&f, &DcfParameters::default(), FcfFloorPolicy::default()).unwrap();
        assert_eq!(n.start_value, 80.0);

        let err = normalize(
            &f,
            &DcfParameters::legacy_operating_model(),
            FcfFloorPolicy::default(),
        )
        .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_negative_price_is_not_an_error() {
        let mut f = financials(100.0, Some(20.0));
        f.current_price = -1.0;
        let n = normalize(&f, &DcfParameters::default(), FcfFloorPolicy::default()).unwrap();
        assert_eq!(n.current_price, -1.0);

        f.current_price = f64::INFINITY;
        assert!(normalize(&f, &DcfParameters::default(), FcfFloorPolicy::default()).is_err());
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let mut f = financials(100.0, Some(20.0));
        f.total_liabilities = f64::NAN;
        assert!(normalize(&f, &DcfParameters::default(), FcfFloorPolicy::default()).is_err());
    }
}
