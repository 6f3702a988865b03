//! Calculations service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rebates::{
    calculator::{CalculationInput, calculate},
    currency::currency_from_code,
    periods::Period,
    projection::project,
    simulation::simulate,
    tiers::DiscountConfig,
};
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use tracing::{info, warn};

use crate::domain::{
    calculations::{
        data::{
            CalculationDraft, CalculationFilters, NewCalculation, ProjectionRequest,
            SimulationRequest,
        },
        errors::CalculationsServiceError,
        records::{CalculationRecord, CalculationUuid, ProjectedRebate, SimulationReport},
        repository::CalculationsRepository,
    },
    contracts::{ContractsService, records::ContractUuid},
    enterprises::records::EnterpriseUuid,
};

/// A contract's single schedule, validated and ready to calculate with.
struct Schedule {
    contract: ContractUuid,
    config: DiscountConfig,
    currency: &'static Currency,
}

#[derive(Clone)]
pub struct RebateCalculationsService {
    contracts: Arc<dyn ContractsService>,
    repository: Arc<dyn CalculationsRepository>,
}

impl RebateCalculationsService {
    #[must_use]
    pub fn new(
        contracts: Arc<dyn ContractsService>,
        repository: Arc<dyn CalculationsRepository>,
    ) -> Self {
        Self {
            contracts,
            repository,
        }
    }

    async fn resolve_schedule(
        &self,
        enterprise: EnterpriseUuid,
        contract: ContractUuid,
    ) -> Result<Schedule, CalculationsServiceError> {
        let record = self
            .contracts
            .get_contract(enterprise, contract)
            .await
            .map_err(CalculationsServiceError::from_contract_lookup)?;

        let mut configs = record.discount_configs.into_iter();

        let config = match (configs.next(), configs.len()) {
            (None, _) => return Err(CalculationsServiceError::NoDiscountConfig),
            (Some(config), 0) => config,
            (Some(_), rest) => {
                return Err(CalculationsServiceError::AmbiguousDiscountConfig(rest + 1));
            }
        };

        Ok(Schedule {
            contract: record.uuid,
            config: config.validated()?,
            currency: currency_from_code(&record.currency)?,
        })
    }

    /// Prior-period turnover for schedules that need it.
    async fn prior_turnover(
        &self,
        enterprise: EnterpriseUuid,
        schedule: &Schedule,
        period: Period,
    ) -> Result<Option<Decimal>, CalculationsServiceError> {
        if !schedule.config.requires_prior_period_turnover() {
            return Ok(None);
        }

        self.contracts
            .prior_period_turnover(enterprise, schedule.contract, period)
            .await
            .map(Some)
            .map_err(CalculationsServiceError::from_prior_turnover_lookup)
    }
}

#[async_trait]
impl CalculationsService for RebateCalculationsService {
    #[tracing::instrument(
        name = "calculations.service.create_calculation",
        skip(self, calculation),
        fields(
            enterprise_uuid = %enterprise,
            contract_uuid = %calculation.contract,
            calculation_uuid = %calculation.uuid,
            period = %calculation.period
        ),
        err
    )]
    async fn create_calculation(
        &self,
        enterprise: EnterpriseUuid,
        calculation: NewCalculation,
    ) -> Result<CalculationRecord, CalculationsServiceError> {
        let schedule = self
            .resolve_schedule(enterprise, calculation.contract)
            .await?;

        let prior = self
            .prior_turnover(enterprise, &schedule, calculation.period)
            .await?;

        let mut input = CalculationInput::new(calculation.achieved_turnover);

        if let Some(prior) = prior {
            input = input.with_prior_period_turnover(prior);
        }

        let result = calculate(&schedule.config, input, schedule.currency)?;

        let draft = CalculationDraft {
            uuid: calculation.uuid,
            contract: schedule.contract,
            period: calculation.period,
            currency: schedule.currency.iso_alpha_code.to_string(),
            calculation: result,
            discount_config: schedule.config,
        };

        let record = self.repository.insert(enterprise, draft).await?;

        info!(
            calculation_uuid = %record.uuid,
            total_rebate = %record.total_rebate,
            currency = %record.currency,
            "created draft calculation"
        );

        Ok(record)
    }

    #[tracing::instrument(
        name = "calculations.service.finalize_calculation",
        skip(self),
        fields(enterprise_uuid = %enterprise, calculation_uuid = %calculation),
        err
    )]
    async fn finalize_calculation(
        &self,
        enterprise: EnterpriseUuid,
        calculation: CalculationUuid,
    ) -> Result<CalculationRecord, CalculationsServiceError> {
        let record = self.repository.finalize(enterprise, calculation).await?;

        info!(calculation_uuid = %record.uuid, "finalized calculation");

        Ok(record)
    }

    #[tracing::instrument(
        name = "calculations.service.list_calculations",
        skip(self, filters),
        fields(enterprise_uuid = %enterprise),
        err
    )]
    async fn list_calculations(
        &self,
        enterprise: EnterpriseUuid,
        filters: CalculationFilters,
    ) -> Result<Vec<CalculationRecord>, CalculationsServiceError> {
        self.repository.list(enterprise, filters).await
    }

    #[tracing::instrument(
        name = "calculations.service.simulate",
        skip(self, request),
        fields(
            enterprise_uuid = %enterprise,
            contract_uuid = %request.contract,
            scenario_count = request.scenarios.len()
        ),
        err
    )]
    async fn simulate(
        &self,
        enterprise: EnterpriseUuid,
        request: SimulationRequest,
    ) -> Result<SimulationReport, CalculationsServiceError> {
        let schedule = self.resolve_schedule(enterprise, request.contract).await?;

        // Scenarios may carry their own prior turnover, so a missing record
        // is not fatal here.
        let prior = match request.period {
            Some(period) => match self.prior_turnover(enterprise, &schedule, period).await {
                Ok(prior) => prior,
                Err(CalculationsServiceError::PriorTurnoverNotFound) => None,
                Err(error) => return Err(error),
            },
            None => None,
        };

        let results = simulate(&schedule.config, schedule.currency, &request.scenarios, prior);

        for result in &results {
            if let Err(error) = &result.outcome {
                warn!(scenario = %result.scenario, %error, "scenario failed");
            }
        }

        Ok(SimulationReport {
            contract_uuid: schedule.contract,
            currency: schedule.currency.iso_alpha_code.to_string(),
            prior_period_turnover: prior,
            results,
        })
    }

    #[tracing::instrument(
        name = "calculations.service.project",
        skip(self, request),
        fields(
            enterprise_uuid = %enterprise,
            contract_uuid = %request.contract,
            period = %request.period,
            as_of = %request.as_of
        ),
        err
    )]
    async fn project(
        &self,
        enterprise: EnterpriseUuid,
        request: ProjectionRequest,
    ) -> Result<ProjectedRebate, CalculationsServiceError> {
        let schedule = self.resolve_schedule(enterprise, request.contract).await?;

        let projection = project(
            request.period,
            request.as_of,
            request.turnover_to_date,
            schedule.currency,
        )?;

        let prior = self
            .prior_turnover(enterprise, &schedule, request.period)
            .await?;

        let input = |turnover| {
            let input = CalculationInput::new(turnover);

            match prior {
                Some(prior) => input.with_prior_period_turnover(prior),
                None => input,
            }
        };

        let current = calculate(
            &schedule.config,
            input(projection.turnover_to_date),
            schedule.currency,
        )?;

        let projected = calculate(
            &schedule.config,
            input(projection.projected_turnover),
            schedule.currency,
        )?;

        Ok(ProjectedRebate {
            contract_uuid: schedule.contract,
            currency: schedule.currency.iso_alpha_code.to_string(),
            projection,
            current,
            projected,
        })
    }
}

#[automock]
#[async_trait]
/// Rebate calculation lifecycle, simulation and projection.
pub trait CalculationsService: Send + Sync {
    /// Calculates a rebate for a contract period and stores it as a draft.
    ///
    /// The contract's schedule is copied into the record.
    async fn create_calculation(
        &self,
        enterprise: EnterpriseUuid,
        calculation: NewCalculation,
    ) -> Result<CalculationRecord, CalculationsServiceError>;

    /// Freezes a draft calculation.
    async fn finalize_calculation(
        &self,
        enterprise: EnterpriseUuid,
        calculation: CalculationUuid,
    ) -> Result<CalculationRecord, CalculationsServiceError>;

    /// Lists calculations, newest period first.
    async fn list_calculations(
        &self,
        enterprise: EnterpriseUuid,
        filters: CalculationFilters,
    ) -> Result<Vec<CalculationRecord>, CalculationsServiceError>;

    /// Evaluates hypothetical turnovers. Nothing is stored.
    async fn simulate(
        &self,
        enterprise: EnterpriseUuid,
        request: SimulationRequest,
    ) -> Result<SimulationReport, CalculationsServiceError>;

    /// Estimates the rebate at the end of a period from turnover so far.
    /// Nothing is stored.
    async fn project(
        &self,
        enterprise: EnterpriseUuid,
        request: ProjectionRequest,
    ) -> Result<ProjectedRebate, CalculationsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rebates::{calculator::CalculationError, simulation::TurnoverScenario, tiers::Tier};
    use testresult::TestResult;

    use crate::{
        domain::{
            calculations::records::CalculationStatus,
            contracts::{ContractsServiceError, MockContractsService, records::ContractRecord},
        },
        test::{
            TestContext,
            helpers::{contract_record, reference_progressive},
            memory::InMemoryCalculationsRepository,
        },
    };

    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn year(year: i16) -> Result<Period, rebates::periods::PeriodError> {
        Period::new(date(year, 1, 1), date(year, 12, 31))
    }

    fn growth_schedule() -> DiscountConfig {
        DiscountConfig::growth_based(vec![
            Tier::bounded(dec(0), dec(10_000), Decimal::new(5, 2)),
            Tier::unbounded(dec(10_000), Decimal::new(8, 2)),
        ])
    }

    fn contracts_returning(contract: ContractRecord) -> MockContractsService {
        let mut contracts = MockContractsService::new();

        contracts
            .expect_get_contract()
            .returning(move |_, _| Ok(contract.clone()));

        contracts
    }

    fn service(contracts: MockContractsService) -> RebateCalculationsService {
        RebateCalculationsService::new(
            Arc::new(contracts),
            Arc::new(InMemoryCalculationsRepository::default()),
        )
    }

    fn new_calculation(contract: &ContractRecord, period: Period, turnover: i64) -> NewCalculation {
        NewCalculation {
            uuid: CalculationUuid::new(),
            contract: contract.uuid,
            period,
            achieved_turnover: dec(turnover),
        }
    }

    #[tokio::test]
    async fn create_calculation_stores_draft_with_frozen_schedule() -> TestResult {
        let enterprise = EnterpriseUuid::new();
        let contract = contract_record(enterprise, vec![reference_progressive()]);
        let service = service(contracts_returning(contract.clone()));

        let record = service
            .create_calculation(enterprise, new_calculation(&contract, year(2025)?, 62_000))
            .await?;

        assert_eq!(record.status, CalculationStatus::Draft);
        assert_eq!(record.currency, "EUR");
        assert_eq!(record.total_rebate, dec(5_140));
        assert_eq!(record.effective_rate, Decimal::new(82_903, 6));
        assert_eq!(record.discount_config, reference_progressive());
        assert_eq!(
            record
                .tier_breakdown
                .iter()
                .map(|tier| tier.rebate_amount)
                .sum::<Decimal>(),
            record.total_rebate
        );

        let listed = service
            .list_calculations(enterprise, CalculationFilters::default())
            .await?;

        assert_eq!(listed, vec![record]);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker for the PostgreSQL test container"]
    async fn schedule_changes_leave_existing_calculations_untouched() -> TestResult {
        let ctx = TestContext::new().await;
        let contract = ctx.create_contract(vec![reference_progressive()]).await?;

        let created = ctx
            .calculations
            .create_calculation(ctx.enterprise_uuid, new_calculation(&contract, year(2025)?, 62_000))
            .await?;

        let replacement = DiscountConfig::flat(Decimal::new(2, 2));

        ctx.contracts
            .update_discount_configs(ctx.enterprise_uuid, contract.uuid, vec![replacement])
            .await?;

        let listed = ctx
            .calculations
            .list_calculations(ctx.enterprise_uuid, CalculationFilters::default())
            .await?;

        let [stored] = listed.as_slice() else {
            panic!("expected one calculation, got {listed:?}");
        };

        assert_eq!(stored.discount_config, reference_progressive());
        assert_eq!(stored.tier_breakdown, created.tier_breakdown);
        assert_eq!(stored.total_rebate, dec(5_140));
        assert_eq!(stored.total_rebate, created.total_rebate);

        let recalculated = ctx
            .calculations
            .create_calculation(ctx.enterprise_uuid, new_calculation(&contract, year(2026)?, 62_000))
            .await?;

        assert_eq!(recalculated.total_rebate, dec(1_240));

        Ok(())
    }

    #[tokio::test]
    async fn create_calculation_rejects_contract_without_single_schedule() -> TestResult {
        let enterprise = EnterpriseUuid::new();

        let none = contract_record(enterprise, vec![]);
        let many = contract_record(
            enterprise,
            vec![reference_progressive(), DiscountConfig::flat(Decimal::new(2, 2))],
        );

        let no_config = service(contracts_returning(none.clone()))
            .create_calculation(enterprise, new_calculation(&none, year(2025)?, 1_000))
            .await;

        let ambiguous = service(contracts_returning(many.clone()))
            .create_calculation(enterprise, new_calculation(&many, year(2025)?, 1_000))
            .await;

        assert!(matches!(no_config, Err(CalculationsServiceError::NoDiscountConfig)));
        assert!(matches!(
            ambiguous,
            Err(CalculationsServiceError::AmbiguousDiscountConfig(2))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn create_calculation_for_unknown_contract_returns_contract_not_found() -> TestResult {
        let mut contracts = MockContractsService::new();

        contracts
            .expect_get_contract()
            .returning(|_, _| Err(ContractsServiceError::NotFound));

        let result = service(contracts)
            .create_calculation(
                EnterpriseUuid::new(),
                NewCalculation {
                    uuid: CalculationUuid::new(),
                    contract: ContractUuid::new(),
                    period: year(2025)?,
                    achieved_turnover: dec(1_000),
                },
            )
            .await;

        assert!(matches!(result, Err(CalculationsServiceError::ContractNotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn create_calculation_rejects_negative_turnover() -> TestResult {
        let enterprise = EnterpriseUuid::new();
        let contract = contract_record(enterprise, vec![reference_progressive()]);

        let result = service(contracts_returning(contract.clone()))
            .create_calculation(enterprise, new_calculation(&contract, year(2025)?, -1))
            .await;

        assert!(matches!(
            result,
            Err(CalculationsServiceError::Calculation(
                CalculationError::InvalidInput { .. }
            ))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn growth_based_calculation_uses_prior_year_turnover() -> TestResult {
        let enterprise = EnterpriseUuid::new();
        let contract = contract_record(enterprise, vec![growth_schedule()]);
        let mut contracts = contracts_returning(contract.clone());

        contracts
            .expect_prior_period_turnover()
            .withf(|_, _, period| period.start() == date(2025, 1, 1))
            .returning(|_, _, _| Ok(dec(50_000)));

        let record = service(contracts)
            .create_calculation(enterprise, new_calculation(&contract, year(2025)?, 65_000))
            .await?;

        assert_eq!(record.prior_period_turnover, Some(dec(50_000)));
        assert_eq!(record.rebate_base, dec(15_000));
        assert_eq!(record.total_rebate, dec(900));

        Ok(())
    }

    #[tokio::test]
    async fn growth_based_calculation_without_history_fails() -> TestResult {
        let enterprise = EnterpriseUuid::new();
        let contract = contract_record(enterprise, vec![growth_schedule()]);
        let mut contracts = contracts_returning(contract.clone());

        contracts
            .expect_prior_period_turnover()
            .returning(|_, _, _| Err(ContractsServiceError::NotFound));

        let result = service(contracts)
            .create_calculation(enterprise, new_calculation(&contract, year(2025)?, 65_000))
            .await;

        assert!(matches!(
            result,
            Err(CalculationsServiceError::PriorTurnoverNotFound)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn overlapping_periods_are_rejected_for_same_contract() -> TestResult {
        let enterprise = EnterpriseUuid::new();
        let contract = contract_record(enterprise, vec![reference_progressive()]);
        let service = service(contracts_returning(contract.clone()));

        service
            .create_calculation(enterprise, new_calculation(&contract, year(2025)?, 1_000))
            .await?;

        let overlapping = service
            .create_calculation(
                enterprise,
                new_calculation(
                    &contract,
                    Period::new(date(2025, 12, 31), date(2026, 3, 31))?,
                    1_000,
                ),
            )
            .await;

        assert!(matches!(
            overlapping,
            Err(CalculationsServiceError::PeriodOverlap)
        ));

        service
            .create_calculation(enterprise, new_calculation(&contract, year(2026)?, 1_000))
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_creates_for_same_period_admit_one() -> TestResult {
        let enterprise = EnterpriseUuid::new();
        let contract = contract_record(enterprise, vec![reference_progressive()]);
        let service = service(contracts_returning(contract.clone()));

        let (first, second) = tokio::join!(
            service.create_calculation(enterprise, new_calculation(&contract, year(2025)?, 1_000)),
            service.create_calculation(enterprise, new_calculation(&contract, year(2025)?, 2_000)),
        );

        let outcomes = [first, second];

        assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
        assert!(
            outcomes
                .iter()
                .any(|outcome| matches!(outcome, Err(CalculationsServiceError::PeriodOverlap)))
        );

        Ok(())
    }

    #[tokio::test]
    async fn finalize_is_compare_and_set() -> TestResult {
        let enterprise = EnterpriseUuid::new();
        let contract = contract_record(enterprise, vec![reference_progressive()]);
        let service = service(contracts_returning(contract.clone()));

        let draft = service
            .create_calculation(enterprise, new_calculation(&contract, year(2025)?, 62_000))
            .await?;

        let finalized = service.finalize_calculation(enterprise, draft.uuid).await?;
        let again = service.finalize_calculation(enterprise, draft.uuid).await;
        let missing = service
            .finalize_calculation(enterprise, CalculationUuid::new())
            .await;

        assert_eq!(finalized.status, CalculationStatus::Final);
        assert!(finalized.finalized_at.is_some());
        assert_eq!(finalized.total_rebate, draft.total_rebate);
        assert!(matches!(again, Err(CalculationsServiceError::AlreadyFinal)));
        assert!(matches!(missing, Err(CalculationsServiceError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn list_calculations_filters_and_orders_newest_period_first() -> TestResult {
        let enterprise = EnterpriseUuid::new();
        let contract = contract_record(enterprise, vec![reference_progressive()]);
        let service = service(contracts_returning(contract.clone()));

        let older = service
            .create_calculation(enterprise, new_calculation(&contract, year(2024)?, 1_000))
            .await?;
        let newer = service
            .create_calculation(enterprise, new_calculation(&contract, year(2025)?, 1_000))
            .await?;

        service.finalize_calculation(enterprise, older.uuid).await?;

        let all = service
            .list_calculations(enterprise, CalculationFilters::default())
            .await?;

        let drafts = service
            .list_calculations(
                enterprise,
                CalculationFilters {
                    status: Some(CalculationStatus::Draft),
                    ..CalculationFilters::default()
                },
            )
            .await?;

        let other_enterprise = service
            .list_calculations(EnterpriseUuid::new(), CalculationFilters::default())
            .await?;

        assert_eq!(
            all.iter().map(|record| record.uuid).collect::<Vec<_>>(),
            vec![newer.uuid, older.uuid]
        );
        assert_eq!(drafts, vec![newer]);
        assert!(other_enterprise.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn simulate_keeps_order_and_embeds_failures() -> TestResult {
        let enterprise = EnterpriseUuid::new();
        let contract = contract_record(enterprise, vec![reference_progressive()]);

        let report = service(contracts_returning(contract.clone()))
            .simulate(
                enterprise,
                SimulationRequest {
                    contract: contract.uuid,
                    scenarios: vec![
                        TurnoverScenario::named("low", dec(10_000)),
                        TurnoverScenario::named("broken", dec(-5)),
                        TurnoverScenario::named("high", dec(62_000)),
                    ],
                    period: None,
                },
            )
            .await?;

        let names: Vec<_> = report
            .results
            .iter()
            .map(|result| result.scenario.as_str())
            .collect();

        assert_eq!(names, vec!["low", "broken", "high"]);
        assert!(report.results.first().is_some_and(|result| result.is_ok()));
        assert!(report.results.get(1).is_some_and(|result| !result.is_ok()));
        assert_eq!(
            report
                .results
                .get(2)
                .and_then(|result| result.outcome.as_ref().ok())
                .map(|calculation| calculation.total_rebate),
            Some(dec(5_140))
        );

        Ok(())
    }

    #[tokio::test]
    async fn simulate_tolerates_missing_prior_turnover() -> TestResult {
        let enterprise = EnterpriseUuid::new();
        let contract = contract_record(enterprise, vec![growth_schedule()]);
        let mut contracts = contracts_returning(contract.clone());

        contracts
            .expect_prior_period_turnover()
            .returning(|_, _, _| Err(ContractsServiceError::NotFound));

        let report = service(contracts)
            .simulate(
                enterprise,
                SimulationRequest {
                    contract: contract.uuid,
                    scenarios: vec![
                        TurnoverScenario::named("no history", dec(20_000)),
                        TurnoverScenario::named("with history", dec(20_000))
                            .with_prior_period_turnover(dec(15_000)),
                    ],
                    period: Some(year(2025)?),
                },
            )
            .await?;

        assert_eq!(report.prior_period_turnover, None);
        assert!(report.results.first().is_some_and(|result| matches!(
            result.outcome,
            Err(CalculationError::MissingPriorTurnover)
        )));
        assert!(report.results.get(1).is_some_and(|result| result.is_ok()));

        Ok(())
    }

    #[tokio::test]
    async fn simulate_does_not_store_anything() -> TestResult {
        let enterprise = EnterpriseUuid::new();
        let contract = contract_record(enterprise, vec![reference_progressive()]);
        let service = service(contracts_returning(contract.clone()));

        service
            .simulate(
                enterprise,
                SimulationRequest {
                    contract: contract.uuid,
                    scenarios: vec![TurnoverScenario::new(dec(62_000))],
                    period: None,
                },
            )
            .await?;

        let listed = service
            .list_calculations(enterprise, CalculationFilters::default())
            .await?;

        assert!(listed.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn project_extrapolates_to_period_end() -> TestResult {
        let enterprise = EnterpriseUuid::new();
        let contract = contract_record(enterprise, vec![reference_progressive()]);

        let projected = service(contracts_returning(contract.clone()))
            .project(
                enterprise,
                ProjectionRequest {
                    contract: contract.uuid,
                    period: Period::new(date(2025, 1, 1), date(2025, 1, 10))?,
                    turnover_to_date: dec(31_000),
                    as_of: date(2025, 1, 5),
                },
            )
            .await?;

        assert_eq!(projected.projection.projected_turnover, dec(62_000));
        assert_eq!(projected.projected.total_rebate, dec(5_140));
        assert_eq!(projected.current.achieved_turnover, dec(31_000));
        assert!(projected.current.total_rebate < projected.projected.total_rebate);

        Ok(())
    }
}
