use serde::{Deserialize, Serialize};

use crate::error::ValuationError;

/// Minimum spread required between discount rate and terminal growth rate.
/// Anything tighter is float noise around an undefined perpetuity.
pub const TERMINAL_SPREAD_EPSILON: f64 = 1e-9;

pub const DEFAULT_GROWTH_RATE: f64 = 0.10;
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.10;
pub const DEFAULT_TERMINAL_GROWTH_RATE: f64 = 0.03;
pub const DEFAULT_PROJECTION_YEARS: usize = 5;
/// Margin of safety used by the standard report path.
pub const STANDARD_MARGIN_OF_SAFETY: f64 = 0.20;
/// Margin of safety used by the detailed valuation path.
pub const CONSERVATIVE_MARGIN_OF_SAFETY: f64 = 0.25;

/// Growth applied to the projected quantity each year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "rates", rename_all = "snake_case")]
pub enum GrowthSchedule {
    /// Same rate every year
    Flat(f64),
    /// One rate per projection year
    PerYear(Vec<f64>),
}

impl GrowthSchedule {
    /// Five-year revenue schedule used by the legacy report model.
    pub fn legacy_revenue_default() -> Self {
        GrowthSchedule::PerYear(vec![0.15, 0.12, 0.10, 0.08, 0.05])
    }

    /// Growth for zero-based year index `i`. Per-year schedules must already be
    /// validated against the projection length.
    pub fn rate_for_year(&self, i: usize) -> f64 {
        match self {
            GrowthSchedule::Flat(rate) => *rate,
            GrowthSchedule::PerYear(rates) => rates.get(i).copied().unwrap_or(0.0),
        }
    }

    /// The rate reported as "the" growth assumption: the flat rate, or year one.
    pub fn headline_rate(&self) -> f64 {
        match self {
            GrowthSchedule::Flat(rate) => *rate,
            GrowthSchedule::PerYear(rates) => rates.first().copied().unwrap_or(0.0),
        }
    }

    /// Every year's rate moved by `delta`.
    pub fn shifted(&self, delta: f64) -> Self {
        match self {
            GrowthSchedule::Flat(rate) => GrowthSchedule::Flat(rate + delta),
            GrowthSchedule::PerYear(rates) => {
                GrowthSchedule::PerYear(rates.iter().map(|r| r + delta).collect())
            }
        }
    }

    fn validate(&self, years: usize) -> Result<(), ValuationError> {
        let rates: &[f64] = match self {
            GrowthSchedule::Flat(rate) => std::slice::from_ref(rate),
            GrowthSchedule::PerYear(rates) => {
                if rates.len() != years {
                    return Err(ValuationError::invalid(format!(
                        "growth schedule has {} rates but projection covers {} years",
                        rates.len(),
                        years
                    )));
                }
                rates
            }
        };
        for rate in rates {
            if !rate.is_finite() || *rate <= -1.0 {
                return Err(ValuationError::invalid(format!(
                    "growth rate {} must be finite and greater than -100%",
                    rate
                )));
            }
        }
        Ok(())
    }
}

/// Revenue-driven projection: revenue compounds by the growth schedule and is
/// converted to free cash flow through margin, tax and a cash conversion ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingModel {
    pub operating_margin: Vec<f64>,
    pub tax_rate: Vec<f64>,
    /// Share of net income that turns into free cash flow
    pub fcf_conversion: f64,
}

impl OperatingModel {
    pub fn legacy_default() -> Self {
        Self {
            operating_margin: vec![0.20, 0.22, 0.24, 0.25, 0.25],
            tax_rate: vec![0.25; 5],
            fcf_conversion: 0.8,
        }
    }

    fn validate(&self, years: usize) -> Result<(), ValuationError> {
        if self.operating_margin.len() != years || self.tax_rate.len() != years {
            return Err(ValuationError::invalid(format!(
                "operating model needs {} margins and tax rates, got {} and {}",
                years,
                self.operating_margin.len(),
                self.tax_rate.len()
            )));
        }
        if self.operating_margin.iter().any(|m| !m.is_finite()) {
            return Err(ValuationError::invalid("operating margins must be finite"));
        }
        if self
            .tax_rate
            .iter()
            .any(|t| !t.is_finite() || *t < 0.0 || *t >= 1.0)
        {
            return Err(ValuationError::invalid("tax rates must lie in [0, 1)"));
        }
        if !self.fcf_conversion.is_finite() || self.fcf_conversion <= 0.0 {
            return Err(ValuationError::invalid("fcf conversion must be positive"));
        }
        Ok(())
    }
}

/// How the sensitivity grid is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityMode {
    /// Re-run projection, terminal value and synthesis for every point
    #[default]
    FullRecompute,
    /// Scale the base value linearly; cheap but approximate
    LinearProxy,
}

impl std::str::FromStr for SensitivityMode {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" | "full_recompute" => Ok(SensitivityMode::FullRecompute),
            "linear" | "linear_proxy" => Ok(SensitivityMode::LinearProxy),
            other => Err(ValuationError::invalid(format!(
                "unknown sensitivity mode '{}'",
                other
            ))),
        }
    }
}

/// Caller-supplied DCF assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfParameters {
    pub growth: GrowthSchedule,
    /// WACC, 0 < r < 1
    pub discount_rate: f64,
    /// Must stay strictly below `discount_rate`
    pub terminal_growth_rate: f64,
    /// 0 <= m < 1
    pub margin_of_safety: f64,
    pub projection_years: usize,
    #[serde(default)]
    pub operating_model: Option<OperatingModel>,
    #[serde(default)]
    pub sensitivity_mode: SensitivityMode,
    /// Explicit projection seed, bypassing the free cash flow derivation
    #[serde(default)]
    pub start_value: Option<f64>,
    #[serde(default)]
    pub debt: Option<f64>,
    #[serde(default)]
    pub cash: Option<f64>,
    #[serde(default)]
    pub minority_interests: Option<f64>,
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
}

impl Default for DcfParameters {
    fn default() -> Self {
        Self {
            growth: GrowthSchedule::Flat(DEFAULT_GROWTH_RATE),
            discount_rate: DEFAULT_DISCOUNT_RATE,
            terminal_growth_rate: DEFAULT_TERMINAL_GROWTH_RATE,
            margin_of_safety: CONSERVATIVE_MARGIN_OF_SAFETY,
            projection_years: DEFAULT_PROJECTION_YEARS,
            operating_model: None,
            sensitivity_mode: SensitivityMode::FullRecompute,
            start_value: None,
            debt: None,
            cash: None,
            minority_interests: None,
            shares_outstanding: None,
        }
    }
}

impl DcfParameters {
    /// Defaults with the 20% margin of safety of the standard report
    pub fn standard() -> Self {
        Self {
            margin_of_safety: STANDARD_MARGIN_OF_SAFETY,
            ..Self::default()
        }
    }

    /// Defaults with the 25% margin of safety of the detailed valuation
    pub fn conservative() -> Self {
        Self::default()
    }

    /// Legacy revenue-driven model: per-year growth, margin and tax schedules
    pub fn legacy_operating_model() -> Self {
        Self {
            growth: GrowthSchedule::legacy_revenue_default(),
            margin_of_safety: STANDARD_MARGIN_OF_SAFETY,
            operating_model: Some(OperatingModel::legacy_default()),
            ..Self::default()
        }
    }

    pub fn with_growth(mut self, growth: GrowthSchedule) -> Self {
        self.growth = growth;
        self
    }

    pub fn with_growth_rate(self, rate: f64) -> Self {
        self.with_growth(GrowthSchedule::Flat(rate))
    }

    pub fn with_discount_rate(mut self, rate: f64) -> Self {
        self.discount_rate = rate;
        self
    }

    pub fn with_terminal_growth_rate(mut self, rate: f64) -> Self {
        self.terminal_growth_rate = rate;
        self
    }

    pub fn with_margin_of_safety(mut self, margin: f64) -> Self {
        self.margin_of_safety = margin;
        self
    }

    pub fn with_projection_years(mut self, years: usize) -> Self {
        self.projection_years = years;
        self
    }

    pub fn with_sensitivity_mode(mut self, mode: SensitivityMode) -> Self {
        self.sensitivity_mode = mode;
        self
    }

    pub fn with_start_value(mut self, value: f64) -> Self {
        self.start_value = Some(value);
        self
    }

    /// Reject parameter sets that cannot produce a valuation.
    pub fn validate(&self) -> Result<(), ValuationError> {
        if !self.discount_rate.is_finite() || self.discount_rate <= 0.0 || self.discount_rate >= 1.0 {
            return Err(ValuationError::invalid(format!(
                "discount rate {} must lie in (0, 1)",
                self.discount_rate
            )));
        }
        if !self.terminal_growth_rate.is_finite() || self.terminal_growth_rate <= -1.0 {
            return Err(ValuationError::invalid(format!(
                "terminal growth rate {} must be finite and greater than -100%",
                self.terminal_growth_rate
            )));
        }
        if self.discount_rate <= self.terminal_growth_rate + TERMINAL_SPREAD_EPSILON {
            return Err(ValuationError::TerminalValueUndefined {
                discount_rate: self.discount_rate,
                terminal_growth_rate: self.terminal_growth_rate,
            });
        }
        if !self.margin_of_safety.is_finite()
            || self.margin_of_safety < 0.0
            || self.margin_of_safety >= 1.0
        {
            return Err(ValuationError::invalid(format!(
                "margin of safety {} must lie in [0, 1)",
                self.margin_of_safety
            )));
        }
        self.growth.validate(self.projection_years)?;
        if let Some(model) = &self.operating_model {
            if self.projection_years == 0 {
                return Err(ValuationError::invalid(
                    "operating model projection needs at least one year",
                ));
            }
            model.validate(self.projection_years)?;
        }
        if let Some(seed) = self.start_value {
            if !seed.is_finite() || seed <= 0.0 {
                return Err(ValuationError::invalid(format!(
                    "start value override {} must be positive",
                    seed
                )));
            }
        }
        if let Some(shares) = self.shares_outstanding {
            if !shares.is_finite() || shares <= 0.0 {
                return Err(ValuationError::invalid(format!(
                    "shares outstanding override {} must be positive",
                    shares
                )));
            }
        }
        for (label, value) in [
            ("debt", self.debt),
            ("cash", self.cash),
            ("minority interests", self.minority_interests),
        ] {
            if matches!(value, Some(v) if !v.is_finite()) {
                return Err(ValuationError::invalid(format!("{} override must be finite", label)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_report_conventions() {
        let params = DcfParameters::default();
        assert_eq!(params.growth, GrowthSchedule::Flat(0.10));
        assert_eq!(params.discount_rate, 0.10);
        assert_eq!(params.terminal_growth_rate, 0.03);
        assert_eq!(params.margin_of_safety, 0.25);
        assert_eq!(params.projection_years, 5);
        assert_eq!(DcfParameters::standard().margin_of_safety, 0.20);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_terminal_growth_at_discount_rate_is_undefined() {
        let params = DcfParameters::default()
            .with_discount_rate(0.08)
            .with_terminal_growth_rate(0.08);
        assert!(matches!(
            params.validate(),
            Err(ValuationError::TerminalValueUndefined { .. })
        ));

        let above = DcfParameters::default().with_terminal_growth_rate(0.12);
        assert!(matches!(
            above.validate(),
            Err(ValuationError::TerminalValueUndefined { .. })
        ));
    }

    #[test]
    fn test_non_positive_discount_rate_rejected() {
        let params = DcfParameters::default()
            .with_discount_rate(0.0)
            .with_terminal_growth_rate(-0.02);
        assert!(matches!(params.validate(), Err(ValuationError::InvalidInput(_))));
    }

    #[test]
    fn test_margin_of_safety_bounds() {
        assert!(DcfParameters::default().with_margin_of_safety(0.0).validate().is_ok());
        assert!(DcfParameters::default().with_margin_of_safety(1.0).validate().is_err());
        assert!(DcfParameters::default().with_margin_of_safety(-0.1).validate().is_err());
    }

    #[test]
    fn test_per_year_schedule_length_must_match() {
        let params = DcfParameters::default()
            .with_growth(GrowthSchedule::PerYear(vec![0.1, 0.1, 0.1]))
            .with_projection_years(5);
        assert!(params.validate().is_err());

        let ok = params.with_projection_years(3);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_legacy_operating_model_is_valid() {
        let params = DcfParameters::legacy_operating_model();
        assert!(params.validate().is_ok());

        let mut broken = params.clone();
        if let Some(model) = broken.operating_model.as_mut() {
            model.tax_rate.pop();
        }
        assert!(broken.validate().is_err());
    }

    #[test]
    fn test_schedule_shift_and_headline() {
        let schedule = GrowthSchedule::PerYear(vec![0.15, 0.10]);
        let shifted = schedule.shifted(0.02);
        assert!((shifted.headline_rate() - 0.17).abs() < 1e-12);
        assert!((shifted.rate_for_year(1) - 0.12).abs() < 1e-12);
        assert_eq!(GrowthSchedule::Flat(0.1).rate_for_year(7), 0.1);
    }

    #[test]
    fn test_sensitivity_mode_parse() {
        assert_eq!("linear".parse::<SensitivityMode>().unwrap(), SensitivityMode::LinearProxy);
        assert_eq!("FULL".parse::<SensitivityMode>().unwrap(), SensitivityMode::FullRecompute);
        assert!("exact".parse::<SensitivityMode>().is_err());
    }

    #[test]
    fn test_long_horizons_are_allowed() {
        assert!(DcfParameters::default().with_projection_years(60).validate().is_ok());
    }

    #[test]
    fn test_start_value_override_must_be_positive() {
        assert!(DcfParameters::default().with_start_value(-5.0).validate().is_err());
        assert!(DcfParameters::default().with_start_value(5.0).validate().is_ok());
    }
}
