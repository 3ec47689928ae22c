//! Async service layer around the DCF engine: fetches financials from a
//! provider, values single symbols under a timeout and whole portfolios with
//! bounded concurrency.

pub mod config;
pub mod portfolio;
pub mod provider;
pub mod telemetry;

pub use config::ValuationConfig;
pub use portfolio::{PortfolioValuation, PortfolioValuator, ValuationFailure};
pub use provider::{FinancialDataProvider, InMemoryProvider};
pub use telemetry::init_tracing;

use anyhow::{Context, Result};
use dcf_engine::DcfEngine;
use std::sync::Arc;
use valuation_core::{DcfParameters, ValuationResult};

pub struct ValuationOrchestrator {
    provider: Arc<dyn FinancialDataProvider>,
    engine: DcfEngine,
    config: ValuationConfig,
}

impl ValuationOrchestrator {
    pub fn new(provider: Arc<dyn FinancialDataProvider>, config: ValuationConfig) -> Self {
        Self {
            provider,
            engine: DcfEngine::new(),
            config,
        }
    }

    pub fn with_engine(mut self, engine: DcfEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Fetch financials for `symbol` and value them.
    ///
    /// Uses the configured default parameters when `params` is `None`.
    pub async fn value_symbol(
        &self,
        symbol: &str,
        params: Option<&DcfParameters>,
    ) -> Result<ValuationResult> {
        let financials = tokio::time::timeout(
            self.config.fetch_timeout,
            self.provider.fetch_financials(symbol),
        )
        .await
        .with_context(|| {
            format!(
                "Timed out after {:?} fetching financials for {}",
                self.config.fetch_timeout, symbol
            )
        })?
        .with_context(|| format!("Failed to fetch financials for {}", symbol))?;

        let params = params.unwrap_or(&self.config.params);
        let valuation = self
            .engine
            .compute_valuation(&financials, params)
            .with_context(|| format!("Failed to value {}", symbol))?;

        Ok(valuation)
    }

    /// Shorthand for [`PortfolioValuator::value_portfolio`] on a shared orchestrator.
    pub async fn value_portfolio(
        self: Arc<Self>,
        symbols: &[String],
        params: Option<DcfParameters>,
    ) -> PortfolioValuation {
        PortfolioValuator::new(self)
            .value_portfolio(symbols, params)
            .await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{TimeZone, Utc};
    use valuation_core::FinancialInputs;

    /// 100 shares, capex 20, liabilities 50, cash 10
    pub fn financials(symbol: &str, operating_cash_flow: f64, price: f64) -> FinancialInputs {
        FinancialInputs {
            symbol: symbol.to_string(),
            name: format!("{} Corp", symbol),
            current_price: price,
            shares_outstanding: 100.0,
            operating_cash_flow,
            capital_expenditure: Some(20.0),
            investing_cash_flow: 0.0,
            total_liabilities: 50.0,
            cash_and_equivalents: 10.0,
            revenue: 500.0,
            operating_margin: 0.0,
            net_income: Some(60.0),
            last_updated: Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap(),
        }
    }
}
