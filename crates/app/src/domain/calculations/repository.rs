//! Calculations Repository

use async_trait::async_trait;
use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use mockall::automock;
use rebates::{calculator::TierBreakdown, tiers::DiscountConfig};
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};
use uuid::Uuid;

use crate::{
    database::{Db, period_from_row},
    domain::{
        calculations::{
            data::{CalculationDraft, CalculationFilters},
            errors::CalculationsServiceError,
            records::{CalculationRecord, CalculationStatus, CalculationUuid},
        },
        contracts::records::ContractUuid,
        enterprises::records::EnterpriseUuid,
    },
};

const INSERT_CALCULATION_SQL: &str = include_str!("sql/insert_calculation.sql");
const INSERT_CALCULATION_TIER_SQL: &str = include_str!("sql/insert_calculation_tier.sql");
const FINALIZE_CALCULATION_SQL: &str = include_str!("sql/finalize_calculation.sql");
const GET_CALCULATION_STATUS_SQL: &str = include_str!("sql/get_calculation_status.sql");
const LIST_CALCULATIONS_SQL: &str = include_str!("sql/list_calculations.sql");
const LIST_CALCULATION_TIERS_SQL: &str = include_str!("sql/list_calculation_tiers.sql");

#[automock]
#[async_trait]
/// Calculation persistence.
///
/// Implementations must reject a draft whose period overlaps another
/// calculation for the same contract with
/// [`CalculationsServiceError::PeriodOverlap`], and must finalise with a
/// compare-and-set so that only one caller can move a draft to final.
pub trait CalculationsRepository: Send + Sync {
    /// Atomically stores a draft and its tier breakdown.
    async fn insert(
        &self,
        enterprise: EnterpriseUuid,
        draft: CalculationDraft,
    ) -> Result<CalculationRecord, CalculationsServiceError>;

    /// Moves a draft to final.
    async fn finalize(
        &self,
        enterprise: EnterpriseUuid,
        calculation: CalculationUuid,
    ) -> Result<CalculationRecord, CalculationsServiceError>;

    /// Lists calculations, newest period first.
    async fn list(
        &self,
        enterprise: EnterpriseUuid,
        filters: CalculationFilters,
    ) -> Result<Vec<CalculationRecord>, CalculationsServiceError>;
}

#[derive(Debug, Clone)]
pub struct PgCalculationsRepository {
    db: Db,
}

impl PgCalculationsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn select(
        tx: &mut Transaction<'_, Postgres>,
        enterprise: EnterpriseUuid,
        calculation: Option<CalculationUuid>,
        filters: &CalculationFilters,
    ) -> Result<Vec<CalculationRecord>, sqlx::Error> {
        let mut records = query_as::<Postgres, CalculationRecord>(LIST_CALCULATIONS_SQL)
            .bind(enterprise.into_uuid())
            .bind(calculation.map(CalculationUuid::into_uuid))
            .bind(filters.contract.map(ContractUuid::into_uuid))
            .bind(filters.status.map(CalculationStatus::as_str))
            .bind(filters.from.map(SqlxDate::from))
            .bind(filters.to.map(SqlxDate::from))
            .fetch_all(&mut **tx)
            .await?;

        if records.is_empty() {
            return Ok(records);
        }

        let uuids: Vec<Uuid> = records
            .iter()
            .map(|record| record.uuid.into_uuid())
            .collect();

        let tier_rows = query(LIST_CALCULATION_TIERS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut tiers: FxHashMap<Uuid, Vec<TierBreakdown>> = FxHashMap::default();

        for row in &tier_rows {
            let calculation_uuid: Uuid = row.try_get("calculation_uuid")?;

            tiers
                .entry(calculation_uuid)
                .or_default()
                .push(tier_from_row(row)?);
        }

        for record in &mut records {
            record.tier_breakdown = tiers.remove(&record.uuid.into_uuid()).unwrap_or_default();
        }

        Ok(records)
    }
}

#[async_trait]
impl CalculationsRepository for PgCalculationsRepository {
    async fn insert(
        &self,
        enterprise: EnterpriseUuid,
        draft: CalculationDraft,
    ) -> Result<CalculationRecord, CalculationsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let calculation = &draft.calculation;

        let created_at: SqlxTimestamp = query(INSERT_CALCULATION_SQL)
            .bind(draft.uuid.into_uuid())
            .bind(enterprise.into_uuid())
            .bind(draft.contract.into_uuid())
            .bind(SqlxDate::from(draft.period.start()))
            .bind(SqlxDate::from(draft.period.end()))
            .bind(calculation.achieved_turnover)
            .bind(calculation.prior_period_turnover)
            .bind(calculation.rebate_base)
            .bind(&draft.currency)
            .bind(calculation.total_rebate)
            .bind(calculation.effective_rate)
            .bind(Json(&draft.discount_config))
            .fetch_one(&mut *tx)
            .await?
            .try_get("created_at")?;

        for tier in &calculation.tier_breakdown {
            let tier_index = i32::try_from(tier.tier_index)
                .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

            query(INSERT_CALCULATION_TIER_SQL)
                .bind(draft.uuid.into_uuid())
                .bind(tier_index)
                .bind(tier.lower_bound)
                .bind(tier.upper_bound)
                .bind(tier.rate)
                .bind(tier.turnover_in_tier)
                .bind(tier.rebate_amount)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(CalculationRecord {
            uuid: draft.uuid,
            enterprise_uuid: enterprise,
            contract_uuid: draft.contract,
            period: draft.period,
            achieved_turnover: draft.calculation.achieved_turnover,
            prior_period_turnover: draft.calculation.prior_period_turnover,
            rebate_base: draft.calculation.rebate_base,
            currency: draft.currency,
            status: CalculationStatus::Draft,
            total_rebate: draft.calculation.total_rebate,
            effective_rate: draft.calculation.effective_rate,
            tier_breakdown: draft.calculation.tier_breakdown,
            discount_config: draft.discount_config,
            created_at: created_at.to_jiff(),
            finalized_at: None,
        })
    }

    async fn finalize(
        &self,
        enterprise: EnterpriseUuid,
        calculation: CalculationUuid,
    ) -> Result<CalculationRecord, CalculationsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let finalized: Option<(Uuid,)> = query_as(FINALIZE_CALCULATION_SQL)
            .bind(enterprise.into_uuid())
            .bind(calculation.into_uuid())
            .fetch_optional(&mut *tx)
            .await?;

        if finalized.is_none() {
            let existing: Option<(String,)> = query_as(GET_CALCULATION_STATUS_SQL)
                .bind(enterprise.into_uuid())
                .bind(calculation.into_uuid())
                .fetch_optional(&mut *tx)
                .await?;

            return Err(match existing {
                Some(_) => CalculationsServiceError::AlreadyFinal,
                None => CalculationsServiceError::NotFound,
            });
        }

        let record = Self::select(
            &mut tx,
            enterprise,
            Some(calculation),
            &CalculationFilters::default(),
        )
        .await?
        .into_iter()
        .next()
        .ok_or(CalculationsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list(
        &self,
        enterprise: EnterpriseUuid,
        filters: CalculationFilters,
    ) -> Result<Vec<CalculationRecord>, CalculationsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let records = Self::select(&mut tx, enterprise, None, &filters).await?;

        tx.commit().await?;

        Ok(records)
    }
}

fn tier_from_row(row: &PgRow) -> sqlx::Result<TierBreakdown> {
    let tier_index: i32 = row.try_get("tier_index")?;

    Ok(TierBreakdown {
        tier_index: usize::try_from(tier_index).map_err(|e| sqlx::Error::ColumnDecode {
            index: "tier_index".to_string(),
            source: Box::new(e),
        })?,
        lower_bound: row.try_get("lower_bound")?,
        upper_bound: row.try_get("upper_bound")?,
        rate: row.try_get("rate")?,
        turnover_in_tier: row.try_get("turnover_in_tier")?,
        rebate_amount: row.try_get("rebate_amount")?,
    })
}

/// Tier rows live in their own table; `tier_breakdown` starts empty here.
impl<'r> FromRow<'r, PgRow> for CalculationRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: CalculationUuid::from_uuid(row.try_get("uuid")?),
            enterprise_uuid: EnterpriseUuid::from_uuid(row.try_get("enterprise_uuid")?),
            contract_uuid: ContractUuid::from_uuid(row.try_get("contract_uuid")?),
            period: period_from_row(row, "period_start", "period_end")?,
            achieved_turnover: row.try_get("achieved_turnover")?,
            prior_period_turnover: row.try_get("prior_period_turnover")?,
            rebate_base: row.try_get("rebate_base")?,
            currency: row.try_get("currency")?,
            status: status.parse().map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?,
            total_rebate: row.try_get("total_rebate")?,
            effective_rate: row.try_get("effective_rate")?,
            tier_breakdown: Vec::new(),
            discount_config: row
                .try_get::<Json<DiscountConfig>, _>("discount_config")?
                .0,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            finalized_at: row
                .try_get::<Option<SqlxTimestamp>, _>("finalized_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rebates::{
        calculator::{CalculationInput, calculate},
        periods::Period,
    };
    use rust_decimal::Decimal;
    use rusty_money::iso::EUR;
    use testresult::TestResult;

    use crate::{
        domain::contracts::records::ContractRecord,
        test::{TestContext, helpers::reference_progressive},
    };

    use super::*;

    fn draft(contract: &ContractRecord, period: Period) -> TestResult<CalculationDraft> {
        let config = reference_progressive().validated()?;
        let calculation = calculate(&config, CalculationInput::new(Decimal::from(62_000)), EUR)?;

        Ok(CalculationDraft {
            uuid: CalculationUuid::new(),
            contract: contract.uuid,
            period,
            currency: "EUR".to_string(),
            calculation,
            discount_config: config,
        })
    }

    #[tokio::test]
    #[ignore = "requires docker for the PostgreSQL test container"]
    async fn insert_round_trips_breakdown_and_frozen_config() -> TestResult {
        let ctx = TestContext::new().await;
        let contract = ctx.create_contract(vec![reference_progressive()]).await?;
        let repository = PgCalculationsRepository::new(ctx.app_db());

        let draft = draft(&contract, Period::new(date(2025, 1, 1), date(2025, 12, 31))?)?;

        let inserted = repository.insert(ctx.enterprise_uuid, draft).await?;
        let listed = repository
            .list(ctx.enterprise_uuid, CalculationFilters::default())
            .await?;

        assert_eq!(listed, vec![inserted.clone()]);
        assert_eq!(inserted.tier_breakdown.len(), 3);
        assert_eq!(inserted.total_rebate, Decimal::from(5_140));
        assert_eq!(inserted.discount_config, reference_progressive());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker for the PostgreSQL test container"]
    async fn overlapping_period_is_rejected_by_exclusion_constraint() -> TestResult {
        let ctx = TestContext::new().await;
        let contract = ctx.create_contract(vec![reference_progressive()]).await?;
        let repository = PgCalculationsRepository::new(ctx.app_db());

        repository
            .insert(
                ctx.enterprise_uuid,
                draft(&contract, Period::new(date(2025, 1, 1), date(2025, 6, 30))?)?,
            )
            .await?;

        let result = repository
            .insert(
                ctx.enterprise_uuid,
                draft(&contract, Period::new(date(2025, 6, 30), date(2025, 12, 31))?)?,
            )
            .await;

        assert!(
            matches!(result, Err(CalculationsServiceError::PeriodOverlap)),
            "expected PeriodOverlap, got {result:?}"
        );

        repository
            .insert(
                ctx.enterprise_uuid,
                draft(&contract, Period::new(date(2025, 7, 1), date(2025, 12, 31))?)?,
            )
            .await?;

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker for the PostgreSQL test container"]
    async fn finalize_succeeds_once() -> TestResult {
        let ctx = TestContext::new().await;
        let contract = ctx.create_contract(vec![reference_progressive()]).await?;
        let repository = PgCalculationsRepository::new(ctx.app_db());

        let inserted = repository
            .insert(
                ctx.enterprise_uuid,
                draft(&contract, Period::new(date(2025, 1, 1), date(2025, 12, 31))?)?,
            )
            .await?;

        let finalized = repository.finalize(ctx.enterprise_uuid, inserted.uuid).await?;
        let again = repository.finalize(ctx.enterprise_uuid, inserted.uuid).await;
        let missing = repository
            .finalize(ctx.enterprise_uuid, CalculationUuid::new())
            .await;

        assert_eq!(finalized.status, CalculationStatus::Final);
        assert!(finalized.finalized_at.is_some());
        assert_eq!(finalized.tier_breakdown, inserted.tier_breakdown);
        assert!(matches!(again, Err(CalculationsServiceError::AlreadyFinal)));
        assert!(matches!(missing, Err(CalculationsServiceError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker for the PostgreSQL test container"]
    async fn final_rows_reject_direct_updates() -> TestResult {
        let ctx = TestContext::new().await;
        let contract = ctx.create_contract(vec![reference_progressive()]).await?;
        let repository = PgCalculationsRepository::new(ctx.app_db());

        let inserted = repository
            .insert(
                ctx.enterprise_uuid,
                draft(&contract, Period::new(date(2025, 1, 1), date(2025, 12, 31))?)?,
            )
            .await?;

        repository.finalize(ctx.enterprise_uuid, inserted.uuid).await?;

        let update = sqlx::query("UPDATE rebate_calculations SET total_rebate = 0 WHERE uuid = $1")
            .bind(inserted.uuid.into_uuid())
            .execute(ctx.db.pool())
            .await;

        let delete = sqlx::query("DELETE FROM rebate_calculation_tiers WHERE calculation_uuid = $1")
            .bind(inserted.uuid.into_uuid())
            .execute(ctx.db.pool())
            .await;

        assert!(update.is_err(), "final calculation was updated");
        assert!(delete.is_err(), "final calculation tiers were deleted");

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker for the PostgreSQL test container"]
    async fn list_applies_filters_and_orders_by_period() -> TestResult {
        let ctx = TestContext::new().await;
        let first = ctx.create_contract(vec![reference_progressive()]).await?;
        let second = ctx.create_contract(vec![reference_progressive()]).await?;
        let repository = PgCalculationsRepository::new(ctx.app_db());

        let h1 = repository
            .insert(
                ctx.enterprise_uuid,
                draft(&first, Period::new(date(2025, 1, 1), date(2025, 6, 30))?)?,
            )
            .await?;
        let h2 = repository
            .insert(
                ctx.enterprise_uuid,
                draft(&first, Period::new(date(2025, 7, 1), date(2025, 12, 31))?)?,
            )
            .await?;
        let other = repository
            .insert(
                ctx.enterprise_uuid,
                draft(&second, Period::new(date(2025, 1, 1), date(2025, 12, 31))?)?,
            )
            .await?;

        repository.finalize(ctx.enterprise_uuid, h1.uuid).await?;

        let by_contract = repository
            .list(
                ctx.enterprise_uuid,
                CalculationFilters {
                    contract: Some(first.uuid),
                    ..CalculationFilters::default()
                },
            )
            .await?;

        let finals = repository
            .list(
                ctx.enterprise_uuid,
                CalculationFilters {
                    status: Some(CalculationStatus::Final),
                    ..CalculationFilters::default()
                },
            )
            .await?;

        let first_half = repository
            .list(
                ctx.enterprise_uuid,
                CalculationFilters {
                    to: Some(date(2025, 6, 30)),
                    ..CalculationFilters::default()
                },
            )
            .await?;

        let uuids = |records: &[CalculationRecord]| -> Vec<CalculationUuid> {
            records.iter().map(|record| record.uuid).collect()
        };

        assert_eq!(uuids(&by_contract), vec![h2.uuid, h1.uuid]);
        assert_eq!(uuids(&finals), vec![h1.uuid]);
        assert_eq!(uuids(&first_half), vec![h1.uuid]);
        assert_ne!(other.uuid, h1.uuid);

        Ok(())
    }
}
