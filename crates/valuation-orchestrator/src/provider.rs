use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use valuation_core::FinancialInputs;

/// Source of the financial inputs a valuation runs on
#[async_trait]
pub trait FinancialDataProvider: Send + Sync {
    async fn fetch_financials(&self, symbol: &str) -> Result<FinancialInputs>;
}

/// Provider backed by a fixed set of financials, keyed by upper-cased symbol.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    financials: HashMap<String, FinancialInputs>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, financials: FinancialInputs) -> Self {
        self.insert(financials);
        self
    }

    pub fn insert(&mut self, financials: FinancialInputs) {
        self.financials
            .insert(financials.symbol.to_uppercase(), financials);
    }

    pub fn len(&self) -> usize {
        self.financials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.financials.is_empty()
    }
}

impl FromIterator<FinancialInputs> for InMemoryProvider {
    fn from_iter<I: IntoIterator<Item = FinancialInputs>>(iter: I) -> Self {
        let mut provider = Self::new();
        for financials in iter {
            provider.insert(financials);
        }
        provider
    }
}

#[async_trait]
impl FinancialDataProvider for InMemoryProvider {
    async fn fetch_financials(&self, symbol: &str) -> Result<FinancialInputs> {
        self.financials
            .get(&symbol.to_uppercase())
            .cloned()
            .ok_or_else(|| anyhow!("No financial data for {}", symbol))
    }
}
