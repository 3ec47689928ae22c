use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use valuation_core::{DcfParameters, ValuationResult};

use crate::ValuationOrchestrator;

/// A symbol that could not be valued, with the reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationFailure {
    pub symbol: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioValuation {
    /// Successful valuations, most undervalued first
    pub valuations: Vec<ValuationResult>,
    pub failures: Vec<ValuationFailure>,
    pub total_requested: usize,
    pub timestamp: DateTime<Utc>,
}

impl PortfolioValuation {
    pub fn undervalued(&self) -> impl Iterator<Item = &ValuationResult> {
        self.valuations
            .iter()
            .filter(|v| v.upside_downside_percent > 0.0)
    }
}

/// Values many symbols concurrently, bounded by the configured concurrency.
pub struct PortfolioValuator {
    orchestrator: Arc<ValuationOrchestrator>,
}

impl PortfolioValuator {
    pub fn new(orchestrator: Arc<ValuationOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Value every symbol with the same parameters (configured defaults when `None`).
    ///
    /// Failures do not abort the run; each one is recorded once and never retried.
    pub async fn value_portfolio(
        &self,
        symbols: &[String],
        params: Option<DcfParameters>,
    ) -> PortfolioValuation {
        let total_requested = symbols.len();
        let params = Arc::new(params.unwrap_or_else(|| self.orchestrator.config().params.clone()));
        let semaphore = Arc::new(Semaphore::new(self.orchestrator.config().max_concurrency));

        tracing::info!("Valuing portfolio of {} symbols", total_requested);

        let mut tasks = JoinSet::new();
        let mut symbols_by_task = HashMap::with_capacity(total_requested);
        for symbol in symbols {
            let orchestrator = Arc::clone(&self.orchestrator);
            let params = Arc::clone(&params);
            let sem = Arc::clone(&semaphore);
            let task_symbol = symbol.clone();
            let handle = tasks.spawn(async move {
                match sem.acquire_owned().await {
                    Ok(_permit) => {
                        orchestrator
                            .value_symbol(&task_symbol, Some(params.as_ref()))
                            .await
                    }
                    Err(e) => Err(anyhow::anyhow!("Concurrency limiter closed: {}", e)),
                }
            });
            symbols_by_task.insert(handle.id(), symbol.clone());
        }

        let mut valuations = Vec::new();
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_id, Ok(valuation))) => valuations.push(valuation),
                Ok((id, Err(e))) => {
                    let symbol = symbols_by_task.remove(&id).unwrap_or_default();
                    tracing::warn!("Failed to value {}: {:#}", symbol, e);
                    failures.push(ValuationFailure {
                        symbol,
                        error: format!("{:#}", e),
                    });
                }
                Err(e) => {
                    let symbol = symbols_by_task.remove(&e.id()).unwrap_or_default();
                    tracing::error!("Valuation task for {} failed: {}", symbol, e);
                    failures.push(ValuationFailure {
                        symbol,
                        error: e.to_string(),
                    });
                }
            }
        }

        valuations.sort_by(|a, b| {
            b.upside_downside_percent
                .partial_cmp(&a.upside_downside_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        failures.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        tracing::info!(
            "Portfolio valuation complete: {}/{} valued, {} failed",
            valuations.len(),
            total_requested,
            failures.len()
        );

        PortfolioValuation {
            valuations,
            failures,
            total_requested,
            timestamp: Utc::now(),
        }
    }
}
