use valuation_core::{TerminalValue, ValuationError, TERMINAL_SPREAD_EPSILON};

use crate::discount::discount;

/// Gordon growth perpetuity: `fcf × (1 + g) / (r − g)`.
///
/// Undefined unless `r` exceeds `g` by more than [`TERMINAL_SPREAD_EPSILON`].
pub fn gordon_growth_value(
    final_year_fcf: f64,
    terminal_growth_rate: f64,
    discount_rate: f64,
) -> Result<f64, ValuationError> {
    if !discount_rate.is_finite()
        || !terminal_growth_rate.is_finite()
        || discount_rate <= terminal_growth_rate + TERMINAL_SPREAD_EPSILON
    {
        return Err(ValuationError::TerminalValueUndefined {
            discount_rate,
            terminal_growth_rate,
        });
    }
    Ok(final_year_fcf * (1.0 + terminal_growth_rate) / (discount_rate - terminal_growth_rate))
}

/// Terminal value at the end of year `periods`, discounted back to today.
pub fn terminal_value(
    final_year_fcf: f64,
    terminal_growth_rate: f64,
    discount_rate: f64,
    periods: u32,
) -> Result<TerminalValue, ValuationError> {
    let undiscounted = gordon_growth_value(final_year_fcf, terminal_growth_rate, discount_rate)?;
    let discounted = discount(undiscounted, discount_rate, periods)?;

    tracing::debug!(
        final_year_fcf,
        terminal_value = undiscounted,
        discounted_terminal_value = discounted,
        "Terminal value computed"
    );

    Ok(TerminalValue {
        final_year_fcf,
        terminal_growth_rate,
        undiscounted_terminal_value: undiscounted,
        discounted_terminal_value: discounted,
    })
}
