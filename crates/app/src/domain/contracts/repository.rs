//! Contracts Repository

use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use rebates::{periods::Period, tiers::DiscountConfig};
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, types::Json};

use crate::{
    database::period_from_row,
    domain::{
        contracts::{
            data::{NewContract, NewTurnover},
            records::{ContractRecord, ContractUuid, TurnoverRecord, TurnoverUuid},
        },
        enterprises::records::EnterpriseUuid,
    },
};

const CREATE_CONTRACT_SQL: &str = include_str!("sql/create_contract.sql");
const GET_CONTRACT_SQL: &str = include_str!("sql/get_contract.sql");
const UPDATE_DISCOUNT_CONFIGS_SQL: &str = include_str!("sql/update_discount_configs.sql");
const RECORD_TURNOVER_SQL: &str = include_str!("sql/record_turnover.sql");
const SUM_TURNOVER_WITHIN_SQL: &str = include_str!("sql/sum_turnover_within.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgContractsRepository;

impl PgContractsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_contract(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        enterprise: EnterpriseUuid,
        contract: NewContract,
    ) -> Result<ContractRecord, sqlx::Error> {
        query_as::<Postgres, ContractRecord>(CREATE_CONTRACT_SQL)
            .bind(contract.uuid.into_uuid())
            .bind(enterprise.into_uuid())
            .bind(contract.name)
            .bind(contract.currency)
            .bind(Json(contract.discount_configs))
            .bind(SqlxDate::from(contract.start_date))
            .bind(contract.end_date.map(SqlxDate::from))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_contract(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        enterprise: EnterpriseUuid,
        contract: ContractUuid,
    ) -> Result<ContractRecord, sqlx::Error> {
        query_as::<Postgres, ContractRecord>(GET_CONTRACT_SQL)
            .bind(enterprise.into_uuid())
            .bind(contract.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_discount_configs(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        enterprise: EnterpriseUuid,
        contract: ContractUuid,
        configs: Vec<DiscountConfig>,
    ) -> Result<ContractRecord, sqlx::Error> {
        query_as::<Postgres, ContractRecord>(UPDATE_DISCOUNT_CONFIGS_SQL)
            .bind(enterprise.into_uuid())
            .bind(contract.into_uuid())
            .bind(Json(configs))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn record_turnover(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        enterprise: EnterpriseUuid,
        contract: ContractUuid,
        turnover: NewTurnover,
    ) -> Result<TurnoverRecord, sqlx::Error> {
        query_as::<Postgres, TurnoverRecord>(RECORD_TURNOVER_SQL)
            .bind(enterprise.into_uuid())
            .bind(contract.into_uuid())
            .bind(turnover.uuid.into_uuid())
            .bind(SqlxDate::from(turnover.period.start()))
            .bind(SqlxDate::from(turnover.period.end()))
            .bind(turnover.amount)
            .fetch_one(&mut **tx)
            .await
    }

    /// Sum the turnover recorded in periods lying entirely within `period`.
    ///
    /// Returns the total and the number of turnover rows that contributed.
    pub(crate) async fn sum_turnover_within(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        enterprise: EnterpriseUuid,
        contract: ContractUuid,
        period: Period,
    ) -> Result<(Decimal, i64, i64), sqlx::Error> {
        query_as(SUM_TURNOVER_WITHIN_SQL)
            .bind(enterprise.into_uuid())
            .bind(contract.into_uuid())
            .bind(SqlxDate::from(period.start()))
            .bind(SqlxDate::from(period.end()))
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ContractRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ContractUuid::from_uuid(row.try_get("uuid")?),
            enterprise_uuid: EnterpriseUuid::from_uuid(row.try_get("enterprise_uuid")?),
            name: row.try_get("name")?,
            currency: row.try_get("currency")?,
            discount_configs: row
                .try_get::<Json<Vec<DiscountConfig>>, _>("discount_configs")?
                .0,
            start_date: row.try_get::<SqlxDate, _>("start_date")?.to_jiff(),
            end_date: row
                .try_get::<Option<SqlxDate>, _>("end_date")?
                .map(SqlxDate::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for TurnoverRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: TurnoverUuid::from_uuid(row.try_get("uuid")?),
            contract_uuid: ContractUuid::from_uuid(row.try_get("contract_uuid")?),
            period: period_from_row(row, "period_start", "period_end")?,
            amount: row.try_get("amount")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
