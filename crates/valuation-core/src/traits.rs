use crate::{DcfParameters, FinancialInputs, ValuationError, ValuationResult};

/// Trait for valuation engines. Implementations are pure: no I/O, no shared
/// mutable state, safe to call from many threads at once.
pub trait Valuator: Send + Sync {
    fn value(
        &self,
        financials: &FinancialInputs,
        params: &DcfParameters,
    ) -> Result<ValuationResult, ValuationError>;
}
