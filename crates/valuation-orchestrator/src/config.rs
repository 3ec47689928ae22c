use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use valuation_core::{DcfParameters, SensitivityMode};

/// Runtime configuration for the valuation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// Default assumptions applied when a request brings none
    pub params: DcfParameters,
    /// Upper bound on symbols valued at once
    pub max_concurrency: usize,
    /// Per-symbol financial data fetch timeout
    pub fetch_timeout: Duration,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            params: DcfParameters::default(),
            max_concurrency: 8,
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
        None => Ok(default),
    }
}

impl ValuationConfig {
    /// Load from the process environment (after `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source. Unset variables keep their defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let base = defaults.params.clone();

        let params = DcfParameters {
            discount_rate: parse_var(&lookup, "DCF_DISCOUNT_RATE", base.discount_rate)?,
            terminal_growth_rate: parse_var(
                &lookup,
                "DCF_TERMINAL_GROWTH_RATE",
                base.terminal_growth_rate,
            )?,
            margin_of_safety: parse_var(&lookup, "DCF_MARGIN_OF_SAFETY", base.margin_of_safety)?,
            projection_years: parse_var(&lookup, "DCF_PROJECTION_YEARS", base.projection_years)?,
            sensitivity_mode: parse_var(
                &lookup,
                "DCF_SENSITIVITY_MODE",
                SensitivityMode::FullRecompute,
            )?,
            ..base
        }
        .with_growth_rate(parse_var(
            &lookup,
            "DCF_GROWTH_RATE",
            valuation_core::DEFAULT_GROWTH_RATE,
        )?);

        params
            .validate()
            .context("DCF parameters from environment are invalid")?;

        let max_concurrency: usize =
            parse_var(&lookup, "VALUATION_MAX_CONCURRENCY", defaults.max_concurrency)?;
        if max_concurrency == 0 {
            anyhow::bail!("VALUATION_MAX_CONCURRENCY must be at least 1");
        }
        let timeout_secs: u64 = parse_var(
            &lookup,
            "VALUATION_FETCH_TIMEOUT_SECS",
            defaults.fetch_timeout.as_secs(),
        )?;

        Ok(Self {
            params,
            max_concurrency,
            fetch_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
