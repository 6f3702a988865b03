//! Database connection management

use jiff_sqlx::Date as SqlxDate;
use rebates::periods::Period;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

/// SQLSTATE raised when an exclusion constraint rejects a row.
pub const EXCLUSION_VIOLATION: &str = "23P01";

/// SQLSTATE for serialization failures under concurrent transactions.
pub const SERIALIZATION_FAILURE: &str = "40001";

/// SQLSTATE for a detected deadlock.
pub const DEADLOCK_DETECTED: &str = "40P01";

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction fails.
    pub async fn begin_transaction(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Decode an inclusive period stored as two `DATE` columns.
pub(crate) fn period_from_row(row: &PgRow, start: &str, end: &str) -> sqlx::Result<Period> {
    let start_date = row.try_get::<SqlxDate, _>(start)?.to_jiff();
    let end_date = row.try_get::<SqlxDate, _>(end)?.to_jiff();

    Period::new(start_date, end_date).map_err(|e| sqlx::Error::ColumnDecode {
        index: end.to_string(),
        source: Box::new(e),
    })
}

/// The SQLSTATE code carried by a database error, if any.
#[must_use]
pub fn sqlstate(error: &sqlx::Error) -> Option<String> {
    error
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code.into_owned())
}

/// Whether a storage failure is transient and worth retrying.
#[must_use]
pub fn is_transient(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => true,
        sqlx::Error::Database(_) => matches!(
            sqlstate(error).as_deref(),
            Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)
        ),
        _ => false,
    }
}
