use valuation_core::{GrowthSchedule, OperatingModel, OperatingProjection, ProjectionSeries, ValuationError};

use crate::discount::discount_series;

/// Compound `start_value` forward year by year.
///
/// Year `i` (zero-based) is the previous year's value grown by that year's rate.
pub fn project_values(start_value: f64, growth: &GrowthSchedule, years: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(years);
    let mut current = start_value;
    for i in 0..years {
        current *= 1.0 + growth.rate_for_year(i);
        values.push(current);
    }
    values
}

/// Project free cash flow from `start_value` and discount each year.
///
/// `years = 0` yields an empty series; the caller seeds the terminal value from
/// `start_value` directly in that case.
pub fn project(
    start_value: f64,
    growth: &GrowthSchedule,
    years: usize,
    discount_rate: f64,
) -> Result<ProjectionSeries, ValuationError> {
    if let GrowthSchedule::PerYear(rates) = growth {
        if rates.len() != years {
            return Err(ValuationError::invalid(format!(
                "growth schedule has {} rates for {} projection years",
                rates.len(),
                years
            )));
        }
    }

    let free_cash_flow = project_values(start_value, growth, years);
    let discounted_cash_flow = discount_series(&free_cash_flow, discount_rate)?;

    for (i, (fcf, dcf)) in free_cash_flow.iter().zip(&discounted_cash_flow).enumerate() {
        tracing::debug!(year = i + 1, fcf, discounted = dcf, "Projected cash flow");
    }

    Ok(ProjectionSeries {
        year: (1..=years as u32).collect(),
        free_cash_flow,
        discounted_cash_flow,
        operating: None,
    })
}

/// Project revenue, then derive free cash flow through the operating model:
/// `revenue × margin × (1 − tax) × fcf_conversion`.
pub fn project_operating(
    starting_revenue: f64,
    growth: &GrowthSchedule,
    model: &OperatingModel,
    years: usize,
    discount_rate: f64,
) -> Result<ProjectionSeries, ValuationError> {
    if model.operating_margin.len() != years || model.tax_rate.len() != years {
        return Err(ValuationError::invalid(format!(
            "operating model schedules must cover {} projection years",
            years
        )));
    }
    if years == 0 {
        return Err(ValuationError::invalid(
            "operating model projection needs at least one year",
        ));
    }

    let mut series = project(starting_revenue, growth, years, discount_rate)?;
    let revenue = std::mem::take(&mut series.free_cash_flow);

    let operating_income: Vec<f64> = revenue
        .iter()
        .zip(&model.operating_margin)
        .map(|(r, m)| r * m)
        .collect();
    let net_income: Vec<f64> = operating_income
        .iter()
        .zip(&model.tax_rate)
        .map(|(oi, t)| oi * (1.0 - t))
        .collect();
    let free_cash_flow: Vec<f64> = net_income
        .iter()
        .map(|ni| ni * model.fcf_conversion)
        .collect();

    series.discounted_cash_flow = discount_series(&free_cash_flow, discount_rate)?;
    series.free_cash_flow = free_cash_flow;
    series.operating = Some(OperatingProjection {
        revenue,
        operating_income,
        net_income,
    });
    Ok(series)
}
