//! Sensitivity of fair value to growth, discount and terminal growth rates.
//!
//! Full mode re-values the company for every perturbed assumption. Linear mode
//! scales the base value by a fixed coefficient per axis instead; it is kept
//! for callers that need the old approximate grid.

use valuation_core::{
    DcfParameters, SensitivityAxis, SensitivityGrid, SensitivityMode, SensitivityPoint,
    ValuationError,
};

pub const GROWTH_DELTAS: [f64; 5] = [-0.05, -0.02, 0.0, 0.02, 0.05];
pub const DISCOUNT_DELTAS: [f64; 5] = [-0.02, -0.01, 0.0, 0.01, 0.02];
pub const TERMINAL_DELTAS: [f64; 5] = [-0.01, -0.005, 0.0, 0.005, 0.01];

/// Per-axis slope used by the linear approximation
fn linear_coefficient(axis: SensitivityAxis) -> f64 {
    match axis {
        SensitivityAxis::GrowthRate => 2.0,
        SensitivityAxis::DiscountRate => -3.0,
        SensitivityAxis::TerminalGrowthRate => 5.0,
    }
}

pub fn deltas(axis: SensitivityAxis) -> &'static [f64] {
    match axis {
        SensitivityAxis::GrowthRate => &GROWTH_DELTAS,
        SensitivityAxis::DiscountRate => &DISCOUNT_DELTAS,
        SensitivityAxis::TerminalGrowthRate => &TERMINAL_DELTAS,
    }
}

/// Base parameters with one assumption moved by `delta`; everything else held.
pub fn perturb(params: &DcfParameters, axis: SensitivityAxis, delta: f64) -> DcfParameters {
    let mut perturbed = params.clone();
    match axis {
        SensitivityAxis::GrowthRate => perturbed.growth = params.growth.shifted(delta),
        SensitivityAxis::DiscountRate => perturbed.discount_rate += delta,
        SensitivityAxis::TerminalGrowthRate => perturbed.terminal_growth_rate += delta,
    }
    perturbed
}

fn headline_rate(params: &DcfParameters, axis: SensitivityAxis) -> f64 {
    match axis {
        SensitivityAxis::GrowthRate => params.growth.headline_rate(),
        SensitivityAxis::DiscountRate => params.discount_rate,
        SensitivityAxis::TerminalGrowthRate => params.terminal_growth_rate,
    }
}

fn analyze_axis<F>(
    params: &DcfParameters,
    base_value_per_share: f64,
    axis: SensitivityAxis,
    revalue: &F,
) -> Vec<SensitivityPoint>
where
    F: Fn(&DcfParameters) -> Result<f64, ValuationError>,
{
    deltas(axis)
        .iter()
        .map(|&delta| {
            let perturbed = perturb(params, axis, delta);
            let value_per_share = if delta == 0.0 {
                Some(base_value_per_share)
            } else if let Err(e) = perturbed.validate() {
                tracing::debug!(?axis, delta, error = %e, "Sensitivity point has no valuation");
                None
            } else {
                match params.sensitivity_mode {
                    SensitivityMode::LinearProxy => {
                        Some(base_value_per_share * (1.0 + delta * linear_coefficient(axis)))
                    }
                    SensitivityMode::FullRecompute => match revalue(&perturbed) {
                        Ok(value) => Some(value),
                        Err(e) => {
                            tracing::debug!(?axis, delta, error = %e, "Sensitivity revaluation failed");
                            None
                        }
                    },
                }
            };
            SensitivityPoint {
                delta,
                perturbed_rate: headline_rate(&perturbed, axis),
                value_per_share,
            }
        })
        .collect()
}

/// Build the sensitivity grid around `base_value_per_share`.
///
/// `revalue` runs the projection-to-per-share pipeline for a parameter set; it
/// is only called in [`SensitivityMode::FullRecompute`].
pub fn analyze_sensitivity<F>(
    params: &DcfParameters,
    base_value_per_share: f64,
    revalue: F,
) -> SensitivityGrid
where
    F: Fn(&DcfParameters) -> Result<f64, ValuationError>,
{
    SensitivityGrid {
        growth_rate: analyze_axis(params, base_value_per_share, SensitivityAxis::GrowthRate, &revalue),
        discount_rate: analyze_axis(
            params,
            base_value_per_share,
            SensitivityAxis::DiscountRate,
            &revalue,
        ),
        terminal_growth_rate: analyze_axis(
            params,
            base_value_per_share,
            SensitivityAxis::TerminalGrowthRate,
            &revalue,
        ),
    }
}
