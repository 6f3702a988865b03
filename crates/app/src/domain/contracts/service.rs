//! Contracts service.

use async_trait::async_trait;
use mockall::automock;
use rebates::{currency::currency_from_code, periods::Period, tiers::DiscountConfig};
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        contracts::{
            data::{NewContract, NewTurnover},
            errors::ContractsServiceError,
            records::{ContractRecord, ContractUuid, TurnoverRecord},
            repository::PgContractsRepository,
        },
        enterprises::records::EnterpriseUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgContractsService {
    db: Db,
    repository: PgContractsRepository,
}

impl PgContractsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgContractsRepository::new(),
        }
    }
}

/// Reject schedules that could never be calculated.
fn check_discount_configs(configs: &[DiscountConfig]) -> Result<(), ContractsServiceError> {
    for (index, config) in configs.iter().enumerate() {
        rebates::tiers::validate(config)
            .map_err(|source| ContractsServiceError::InvalidDiscountConfig { index, source })?;
    }

    Ok(())
}

#[async_trait]
impl ContractsService for PgContractsService {
    #[tracing::instrument(
        name = "contracts.service.create_contract",
        skip(self, contract),
        fields(
            enterprise_uuid = %enterprise,
            contract_uuid = %contract.uuid,
            discount_config_count = contract.discount_configs.len()
        ),
        err
    )]
    async fn create_contract(
        &self,
        enterprise: EnterpriseUuid,
        contract: NewContract,
    ) -> Result<ContractRecord, ContractsServiceError> {
        let mut contract = contract;

        contract.currency = currency_from_code(&contract.currency)?
            .iso_alpha_code
            .to_string();

        if contract
            .end_date
            .is_some_and(|end_date| end_date < contract.start_date)
        {
            return Err(ContractsServiceError::InvalidDateRange);
        }

        check_discount_configs(&contract.discount_configs)?;

        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .repository
            .create_contract(&mut tx, enterprise, contract)
            .await?;

        tx.commit().await?;

        info!(contract_uuid = %record.uuid, "created contract");

        Ok(record)
    }

    #[tracing::instrument(
        name = "contracts.service.get_contract",
        skip(self),
        fields(enterprise_uuid = %enterprise, contract_uuid = %contract),
        err
    )]
    async fn get_contract(
        &self,
        enterprise: EnterpriseUuid,
        contract: ContractUuid,
    ) -> Result<ContractRecord, ContractsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .repository
            .get_contract(&mut tx, enterprise, contract)
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "contracts.service.update_discount_configs",
        skip(self, configs),
        fields(
            enterprise_uuid = %enterprise,
            contract_uuid = %contract,
            discount_config_count = configs.len()
        ),
        err
    )]
    async fn update_discount_configs(
        &self,
        enterprise: EnterpriseUuid,
        contract: ContractUuid,
        configs: Vec<DiscountConfig>,
    ) -> Result<ContractRecord, ContractsServiceError> {
        check_discount_configs(&configs)?;

        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .repository
            .update_discount_configs(&mut tx, enterprise, contract, configs)
            .await?;

        tx.commit().await?;

        info!(contract_uuid = %record.uuid, "updated discount configs");

        Ok(record)
    }

    #[tracing::instrument(
        name = "contracts.service.record_turnover",
        skip(self, turnover),
        fields(
            enterprise_uuid = %enterprise,
            contract_uuid = %contract,
            period = %turnover.period
        ),
        err
    )]
    async fn record_turnover(
        &self,
        enterprise: EnterpriseUuid,
        contract: ContractUuid,
        turnover: NewTurnover,
    ) -> Result<TurnoverRecord, ContractsServiceError> {
        if turnover.amount < Decimal::ZERO {
            return Err(ContractsServiceError::NegativeTurnover(turnover.amount));
        }

        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .repository
            .record_turnover(&mut tx, enterprise, contract, turnover)
            .await?;

        tx.commit().await?;

        info!(turnover_uuid = %record.uuid, amount = %record.amount, "recorded turnover");

        Ok(record)
    }

    #[tracing::instrument(
        name = "contracts.service.prior_period_turnover",
        skip(self),
        fields(enterprise_uuid = %enterprise, contract_uuid = %contract, period = %period),
        err
    )]
    async fn prior_period_turnover(
        &self,
        enterprise: EnterpriseUuid,
        contract: ContractUuid,
        period: Period,
    ) -> Result<Decimal, ContractsServiceError> {
        let prior = period
            .previous_year()
            .map_err(|_err| ContractsServiceError::InvalidDateRange)?;

        let mut tx = self.db.begin_transaction().await?;

        let (total, turnovers, covered_days) = self
            .repository
            .sum_turnover_within(&mut tx, enterprise, contract, prior)
            .await?;

        tx.commit().await?;

        if turnovers == 0 {
            return Err(ContractsServiceError::NotFound);
        }

        if covered_days < prior.days() {
            return Err(ContractsServiceError::IncompletePriorTurnover {
                covered_days,
                period_days: prior.days(),
            });
        }

        Ok(total)
    }
}

#[automock]
#[async_trait]
/// Contract and turnover operations.
pub trait ContractsService: Send + Sync {
    /// Creates a contract. Discount configs are validated before storing.
    async fn create_contract(
        &self,
        enterprise: EnterpriseUuid,
        contract: NewContract,
    ) -> Result<ContractRecord, ContractsServiceError>;

    /// Retrieves a contract, including its current discount configs.
    async fn get_contract(
        &self,
        enterprise: EnterpriseUuid,
        contract: ContractUuid,
    ) -> Result<ContractRecord, ContractsServiceError>;

    /// Replaces a contract's discount configs.
    ///
    /// Existing calculations keep the config they were calculated with.
    async fn update_discount_configs(
        &self,
        enterprise: EnterpriseUuid,
        contract: ContractUuid,
        configs: Vec<DiscountConfig>,
    ) -> Result<ContractRecord, ContractsServiceError>;

    /// Records turnover achieved under a contract.
    async fn record_turnover(
        &self,
        enterprise: EnterpriseUuid,
        contract: ContractUuid,
        turnover: NewTurnover,
    ) -> Result<TurnoverRecord, ContractsServiceError>;

    /// Total turnover recorded within the same dates one year before `period`.
    ///
    /// Fails with [`ContractsServiceError::NotFound`] when nothing was recorded,
    /// and with [`ContractsServiceError::IncompletePriorTurnover`] when the
    /// recorded periods leave days of the prior period uncovered.
    async fn prior_period_turnover(
        &self,
        enterprise: EnterpriseUuid,
        contract: ContractUuid,
        period: Period,
    ) -> Result<Decimal, ContractsServiceError>;
}
