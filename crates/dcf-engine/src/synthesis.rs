use serde::{Deserialize, Serialize};
use valuation_core::{NormalizedInputs, ProjectionSeries, TerminalValue, ValuationError, ValuationWarning};

use crate::policy::{apply_equity_value_floor, EquityFloorPolicy};

/// Enterprise-to-equity bridge and per-share figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synthesis {
    pub present_value_of_cash_flows: f64,
    pub terminal_value_pv: f64,
    pub enterprise_value: f64,
    pub net_debt: f64,
    pub equity_value: f64,
    pub value_per_share: f64,
    pub buy_under_price: f64,
    /// Fraction, 0.25 = 25% upside. Zero when no price is available.
    pub upside_downside_percent: f64,
    /// Percent of fair value the price sits below it. Zero when no price is available.
    pub margin_of_safety_percent: f64,
    pub warnings: Vec<ValuationWarning>,
}

pub fn synthesize(
    projection: &ProjectionSeries,
    terminal: &TerminalValue,
    normalized: &NormalizedInputs,
    margin_of_safety: f64,
    equity_floor: EquityFloorPolicy,
) -> Result<Synthesis, ValuationError> {
    if !normalized.shares_outstanding.is_finite() || normalized.shares_outstanding <= 0.0 {
        return Err(ValuationError::invalid(
            "shares outstanding must be positive for a per-share value",
        ));
    }

    let present_value_of_cash_flows = projection.present_value();
    let terminal_value_pv = terminal.discounted_terminal_value;
    let enterprise_value = present_value_of_cash_flows + terminal_value_pv;

    let net_debt = normalized.net_debt();
    let computed_equity = enterprise_value - net_debt - normalized.minority_interests;
    let floored = apply_equity_value_floor(computed_equity, enterprise_value, equity_floor);
    let mut warnings: Vec<ValuationWarning> = floored.warning.into_iter().collect();
    let equity_value = floored.value;

    let value_per_share = equity_value / normalized.shares_outstanding;
    let buy_under_price = value_per_share * (1.0 - margin_of_safety);

    let price = normalized.current_price;
    let (upside_downside_percent, margin_of_safety_percent) = if price > 0.0 {
        let upside = (value_per_share - price) / price;
        let margin = if value_per_share != 0.0 {
            (value_per_share - price) / value_per_share * 100.0
        } else {
            0.0
        };
        (upside, margin)
    } else {
        warnings.push(ValuationWarning::MissingCurrentPrice);
        (0.0, 0.0)
    };

    tracing::debug!(
        present_value_of_cash_flows,
        terminal_value_pv,
        enterprise_value,
        net_debt,
        equity_value,
        value_per_share,
        "Valuation synthesized"
    );

    Ok(Synthesis {
        present_value_of_cash_flows,
        terminal_value_pv,
        enterprise_value,
        net_debt,
        equity_value,
        value_per_share,
        buy_under_price,
        upside_downside_percent,
        margin_of_safety_percent,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use valuation_core::CapexSource;

    fn normalized(price: f64, debt: f64, cash: f64) -> NormalizedInputs {
        NormalizedInputs {
            start_value: 80.0,
            raw_free_cash_flow: 80.0,
            capex: 20.0,
            capex_source: CapexSource::Reported,
            operating_cash_flow: 100.0,
            revenue: 0.0,
            current_price: price,
            shares_outstanding: 100.0,
            debt,
            cash,
            minority_interests: 0.0,
            warnings: Vec::new(),
        }
    }

    fn projection() -> ProjectionSeries {
        ProjectionSeries {
            year: vec![1, 2],
            free_cash_flow: vec![110.0, 121.0],
            discounted_cash_flow: vec![100.0, 100.0],
            operating: None,
        }
    }

    fn terminal(pv: f64) -> TerminalValue {
        TerminalValue {
            final_year_fcf: 121.0,
            terminal_growth_rate: 0.03,
            undiscounted_terminal_value: pv * 1.21,
            discounted_terminal_value: pv,
        }
    }

    #[test]
    fn test_equity_bridge() {
        let s = synthesize(
            &projection(),
            &terminal(800.0),
            &normalized(8.0, 50.0, 10.0),
            0.20,
            EquityFloorPolicy::default(),
        )
        .unwrap();
        assert_eq!(s.present_value_of_cash_flows, 200.0);
        assert_eq!(s.enterprise_value, 1000.0);
        assert_eq!(s.net_debt, 40.0);
        assert_eq!(s.equity_value, 960.0);
        assert_relative_eq!(s.value_per_share, 9.6, max_relative = 1e-12);
        assert_relative_eq!(s.buy_under_price, 7.68, max_relative = 1e-12);
        assert_relative_eq!(s.upside_downside_percent, 0.2, max_relative = 1e-9);
        assert_relative_eq!(s.margin_of_safety_percent, 1.6 / 9.6 * 100.0, max_relative = 1e-9);
        assert!(s.warnings.is_empty());
    }

    #[test]
    fn test_minority_interests_reduce_equity() {
        let mut n = normalized(8.0, 0.0, 0.0);
        n.minority_interests = 100.0;
        let s = synthesize(&projection(), &terminal(800.0), &n, 0.2, EquityFloorPolicy::default())
            .unwrap();
        assert_eq!(s.equity_value, 900.0);
    }

    #[test]
    fn test_negative_equity_is_floored() {
        let s = synthesize(
            &projection(),
            &terminal(800.0),
            &normalized(8.0, 5000.0, 0.0),
            0.2,
            EquityFloorPolicy::default(),
        )
        .unwrap();
        assert_eq!(s.equity_value, 500.0);
        assert_eq!(s.value_per_share, 5.0);
        assert!(matches!(
            s.warnings[0],
            ValuationWarning::EquityValueFloor { computed, substituted }
                if computed == -4000.0 && substituted == 500.0
        ));
    }

    #[test]
    fn test_floor_disabled_keeps_negative_equity() {
        let s = synthesize(
            &projection(),
            &terminal(800.0),
            &normalized(8.0, 5000.0, 0.0),
            0.2,
            EquityFloorPolicy::Disabled,
        )
        .unwrap();
        assert_eq!(s.equity_value, -4000.0);
    }

    #[test]
    fn test_missing_price_reports_zero_upside() {
        let s = synthesize(
            &projection(),
            &terminal(800.0),
            &normalized(0.0, 0.0, 0.0),
            0.2,
            EquityFloorPolicy::default(),
        )
        .unwrap();
        assert_eq!(s.upside_downside_percent, 0.0);
        assert_eq!(s.margin_of_safety_percent, 0.0);
        assert_eq!(s.warnings, vec![ValuationWarning::MissingCurrentPrice]);
    }

    #[test]
    fn test_zero_shares_is_domain_error() {
        let mut n = normalized(8.0, 0.0, 0.0);
        n.shares_outstanding = 0.0;
        let err = synthesize(&projection(), &terminal(800.0), &n, 0.2, EquityFloorPolicy::default())
            .unwrap_err();
        assert!(err.is_invalid_input());
    }
}
