//! Enterprises Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};

use crate::domain::enterprises::{
    data::NewEnterprise,
    records::{EnterpriseRecord, EnterpriseUuid},
};

const CREATE_ENTERPRISE_SQL: &str = include_str!("sql/create_enterprise.sql");
const GET_ENTERPRISE_SQL: &str = include_str!("sql/get_enterprise.sql");

#[derive(Debug, Clone)]
/// PostgreSQL-backed enterprises repository.
pub(crate) struct PgEnterprisesRepository {
    pool: PgPool,
}

impl PgEnterprisesRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn create_enterprise(
        &self,
        enterprise: NewEnterprise,
    ) -> Result<EnterpriseRecord, sqlx::Error> {
        query_as::<Postgres, EnterpriseRecord>(CREATE_ENTERPRISE_SQL)
            .bind(enterprise.uuid.into_uuid())
            .bind(enterprise.name)
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn get_enterprise(
        &self,
        enterprise: EnterpriseUuid,
    ) -> Result<EnterpriseRecord, sqlx::Error> {
        query_as::<Postgres, EnterpriseRecord>(GET_ENTERPRISE_SQL)
            .bind(enterprise.into_uuid())
            .fetch_one(&self.pool)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for EnterpriseRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: EnterpriseUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
