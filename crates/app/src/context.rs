//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        calculations::{CalculationsService, PgCalculationsRepository, RebateCalculationsService},
        contracts::{ContractsService, PgContractsService},
        dashboard::{DashboardService, RebateDashboardService},
        enterprises::{EnterprisesService, PgEnterprisesService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] sqlx::migrate::MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub enterprises: Arc<dyn EnterprisesService>,
    pub contracts: Arc<dyn ContractsService>,
    pub calculations: Arc<dyn CalculationsService>,
    pub dashboard: Arc<dyn DashboardService>,
}

impl AppContext {
    /// Build application context from a database URL, applying pending
    /// migrations first.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting or migrating fails.
    pub async fn from_database_url(url: &str) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrations)?;

        let db = Db::new(pool.clone());

        let contracts = Arc::new(PgContractsService::new(db.clone()));
        let repository = Arc::new(PgCalculationsRepository::new(db));

        Ok(Self {
            enterprises: Arc::new(PgEnterprisesService::new(pool)),
            calculations: Arc::new(RebateCalculationsService::new(
                contracts.clone(),
                repository.clone(),
            )),
            dashboard: Arc::new(RebateDashboardService::new(repository)),
            contracts,
        })
    }
}
