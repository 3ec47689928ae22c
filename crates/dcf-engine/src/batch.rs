use rayon::prelude::*;
use valuation_core::{DcfParameters, FinancialInputs, ValuationError, ValuationResult};

use crate::engine::DcfEngine;

impl DcfEngine {
    /// Value many companies in parallel. Results keep input order; one failing
    /// company does not affect the others.
    pub fn value_batch(
        &self,
        inputs: &[(FinancialInputs, DcfParameters)],
    ) -> Vec<Result<ValuationResult, ValuationError>> {
        let results: Vec<_> = inputs
            .par_iter()
            .map(|(financials, params)| self.compute_valuation(financials, params))
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        tracing::info!(
            total = inputs.len(),
            failed,
            "Batch valuation complete"
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::golden_financials;

    #[test]
    fn test_batch_matches_sequential_and_keeps_order() {
        let engine = DcfEngine::new();
        let inputs: Vec<(FinancialInputs, DcfParameters)> = (1..=20)
            .map(|i| {
                let mut f = golden_financials();
                f.symbol = format!("SYM{}", i);
                f.shares_outstanding = 10.0 * i as f64;
                (f, DcfParameters::default())
            })
            .collect();

        let batch = engine.value_batch(&inputs);
        assert_eq!(batch.len(), 20);
        for ((f, p), result) in inputs.iter().zip(&batch) {
            let sequential = engine.compute_valuation(f, p).unwrap();
            let parallel = result.as_ref().unwrap();
            assert_eq!(parallel.symbol, f.symbol);
            assert_eq!(parallel, &sequential);
        }
    }

    #[test]
    fn test_batch_isolates_failures() {
        let engine = DcfEngine::new();
        let mut broken = golden_financials();
        broken.shares_outstanding = -1.0;
        let inputs = vec![
            (golden_financials(), DcfParameters::default()),
            (broken, DcfParameters::default()),
            (
                golden_financials(),
                DcfParameters::default().with_terminal_growth_rate(0.2),
            ),
        ];

        let results = engine.value_batch(&inputs);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ValuationError::InvalidInput(_))));
        assert!(matches!(
            results[2],
            Err(ValuationError::TerminalValueUndefined { .. })
        ));
    }
}
