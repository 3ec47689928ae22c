use valuation_core::{
    DcfParameters, FinancialInputs, NormalizedInputs, ProjectionSeries, TerminalValue,
    ValuationAssumptions, ValuationError, ValuationResult, ValuationWarning, Valuator,
};

use crate::normalizer::normalize;
use crate::policy::ValuationPolicy;
use crate::projection::{project, project_operating};
use crate::quality::{score, QualityBasis};
use crate::recommendation::recommend;
use crate::sensitivity::analyze_sensitivity;
use crate::synthesis::{synthesize, Synthesis};
use crate::terminal::terminal_value;

/// Projection, terminal value and synthesis for one parameter set
#[derive(Debug, Clone)]
struct PipelineOutput {
    projection: ProjectionSeries,
    terminal: TerminalValue,
    synthesis: Synthesis,
}

/// Discounted cash flow valuation engine.
///
/// Stateless apart from its substitution policies; one instance can value any
/// number of companies from any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct DcfEngine {
    policy: ValuationPolicy,
}

impl DcfEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ValuationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValuationPolicy {
        &self.policy
    }

    /// Value with [`DcfParameters::default`].
    pub fn compute_valuation_with_defaults(
        &self,
        financials: &FinancialInputs,
    ) -> Result<ValuationResult, ValuationError> {
        self.compute_valuation(financials, &DcfParameters::default())
    }

    /// Full valuation: normalize, project, discount, terminal value, synthesize,
    /// classify, then attach sensitivity grid and data quality report.
    pub fn compute_valuation(
        &self,
        financials: &FinancialInputs,
        params: &DcfParameters,
    ) -> Result<ValuationResult, ValuationError> {
        params.validate()?;
        let normalized = normalize(financials, params, self.policy.fcf_floor)?;
        let PipelineOutput {
            projection,
            terminal,
            synthesis,
        } = self.run_pipeline(&normalized, params)?;

        let recommendation = recommend(
            self.policy.recommendation,
            synthesis.upside_downside_percent,
            normalized.current_price,
            synthesis.buy_under_price,
        );

        let sensitivity_analysis = analyze_sensitivity(params, synthesis.value_per_share, |p| {
            self.revalue(&normalized, p)
        });

        let basis = if params.operating_model.is_some() {
            QualityBasis::Revenue
        } else {
            QualityBasis::CashFlow
        };
        let data_quality = score(financials, basis);

        for warning in &synthesis.warnings {
            if let ValuationWarning::EquityValueFloor { .. } = warning {
                tracing::warn!(symbol = %financials.symbol, "{}", warning.message());
            }
        }

        let mut warnings = normalized.warnings.clone();
        warnings.extend(synthesis.warnings.iter().cloned());

        tracing::info!(
            symbol = %financials.symbol,
            value_per_share = synthesis.value_per_share,
            upside = synthesis.upside_downside_percent,
            recommendation = recommendation.to_label(),
            warnings = warnings.len(),
            "DCF valuation complete"
        );

        Ok(ValuationResult {
            symbol: financials.symbol.clone(),
            name: financials.name.clone(),
            current_price: normalized.current_price,
            assumptions: ValuationAssumptions {
                growth: params.growth.clone(),
                discount_rate: params.discount_rate,
                terminal_growth_rate: params.terminal_growth_rate,
                margin_of_safety: params.margin_of_safety,
                projection_years: params.projection_years,
                sensitivity_mode: params.sensitivity_mode,
            },
            start_value: normalized.start_value,
            projection,
            terminal_value: terminal,
            present_value_of_cash_flows: synthesis.present_value_of_cash_flows,
            terminal_value_pv: synthesis.terminal_value_pv,
            enterprise_value: synthesis.enterprise_value,
            net_debt: synthesis.net_debt,
            equity_value: synthesis.equity_value,
            value_per_share: synthesis.value_per_share,
            buy_under_price: synthesis.buy_under_price,
            upside_downside_percent: synthesis.upside_downside_percent,
            margin_of_safety_percent: synthesis.margin_of_safety_percent,
            recommendation,
            sensitivity_analysis,
            data_quality,
            warnings,
        })
    }

    /// Per-share value for an alternative parameter set over the same inputs.
    fn revalue(
        &self,
        normalized: &NormalizedInputs,
        params: &DcfParameters,
    ) -> Result<f64, ValuationError> {
        params.validate()?;
        Ok(self.run_pipeline(normalized, params)?.synthesis.value_per_share)
    }

    fn run_pipeline(
        &self,
        normalized: &NormalizedInputs,
        params: &DcfParameters,
    ) -> Result<PipelineOutput, ValuationError> {
        let years = params.projection_years;
        let periods = u32::try_from(years).map_err(|_| {
            ValuationError::invalid(format!("projection years {} is out of range", years))
        })?;
        let projection = match &params.operating_model {
            Some(model) => project_operating(
                normalized.start_value,
                &params.growth,
                model,
                years,
                params.discount_rate,
            )?,
            None => project(
                normalized.start_value,
                &params.growth,
                years,
                params.discount_rate,
            )?,
        };

        let final_year_fcf = projection
            .final_free_cash_flow()
            .unwrap_or(normalized.start_value);
        let terminal = terminal_value(
            final_year_fcf,
            params.terminal_growth_rate,
            params.discount_rate,
            periods,
        )?;

        let synthesis = synthesize(
            &projection,
            &terminal,
            normalized,
            params.margin_of_safety,
            self.policy.equity_floor,
        )?;

        Ok(PipelineOutput {
            projection,
            terminal,
            synthesis,
        })
    }
}

impl Valuator for DcfEngine {
    fn value(
        &self,
        financials: &FinancialInputs,
        params: &DcfParameters,
    ) -> Result<ValuationResult, ValuationError> {
        self.compute_valuation(financials, params)
    }
}
