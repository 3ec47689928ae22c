use valuation_core::ValuationError;

/// `(1 + rate)^periods`. Fails for `rate <= -1`, where the base is not positive.
pub fn discount_factor(rate: f64, periods: u32) -> Result<f64, ValuationError> {
    if !rate.is_finite() || rate <= -1.0 {
        return Err(ValuationError::InvalidDiscountRate(rate));
    }
    let exponent = i32::try_from(periods)
        .map_err(|_| ValuationError::invalid(format!("{} discount periods is out of range", periods)))?;
    Ok((1.0_f64 + rate).powi(exponent))
}

/// Present value of `value` received `periods` years from now.
pub fn discount(value: f64, rate: f64, periods: u32) -> Result<f64, ValuationError> {
    Ok(value / discount_factor(rate, periods)?)
}

/// Discount a yearly series; element `i` is received at the end of year `i + 1`.
pub fn discount_series(values: &[f64], rate: f64) -> Result<Vec<f64>, ValuationError> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| discount(*v, rate, i as u32 + 1))
        .collect()
}
