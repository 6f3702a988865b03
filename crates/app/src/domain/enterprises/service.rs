//! Enterprises service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;
use tracing::info;

use crate::domain::enterprises::{
    data::NewEnterprise,
    errors::EnterprisesServiceError,
    records::{EnterpriseRecord, EnterpriseUuid},
    repository::PgEnterprisesRepository,
};

#[derive(Debug, Clone)]
pub struct PgEnterprisesService {
    repository: PgEnterprisesRepository,
}

impl PgEnterprisesService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgEnterprisesRepository::new(pool),
        }
    }
}

#[async_trait]
impl EnterprisesService for PgEnterprisesService {
    #[tracing::instrument(
        name = "enterprises.service.create_enterprise",
        skip(self, enterprise),
        fields(enterprise_uuid = %enterprise.uuid),
        err
    )]
    async fn create_enterprise(
        &self,
        enterprise: NewEnterprise,
    ) -> Result<EnterpriseRecord, EnterprisesServiceError> {
        let record = self.repository.create_enterprise(enterprise).await?;

        info!(enterprise_uuid = %record.uuid, "created enterprise");

        Ok(record)
    }

    #[tracing::instrument(
        name = "enterprises.service.get_enterprise",
        skip(self),
        fields(enterprise_uuid = %enterprise),
        err
    )]
    async fn get_enterprise(
        &self,
        enterprise: EnterpriseUuid,
    ) -> Result<EnterpriseRecord, EnterprisesServiceError> {
        self.repository
            .get_enterprise(enterprise)
            .await
            .map_err(Into::into)
    }
}

#[automock]
#[async_trait]
/// Enterprise persistence operations.
pub trait EnterprisesService: Send + Sync {
    /// Creates a new enterprise.
    async fn create_enterprise(
        &self,
        enterprise: NewEnterprise,
    ) -> Result<EnterpriseRecord, EnterprisesServiceError>;

    /// Retrieves an enterprise that has not been deleted.
    async fn get_enterprise(
        &self,
        enterprise: EnterpriseUuid,
    ) -> Result<EnterpriseRecord, EnterprisesServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    #[ignore = "requires docker for the PostgreSQL test container"]
    async fn create_enterprise_returns_correct_uuid_and_name() -> TestResult {
        let ctx = TestContext::new().await;
        let svc = PgEnterprisesService::new(ctx.db.pool().clone());

        let uuid = EnterpriseUuid::new();

        let before = Timestamp::now();

        let enterprise = svc
            .create_enterprise(NewEnterprise {
                uuid,
                name: "Acme Distribution".to_string(),
            })
            .await?;

        assert_eq!(enterprise.uuid, uuid);
        assert_eq!(enterprise.name, "Acme Distribution");
        assert!(enterprise.created_at >= before);
        assert!(enterprise.deleted_at.is_none());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker for the PostgreSQL test container"]
    async fn create_enterprise_duplicate_uuid_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let svc = PgEnterprisesService::new(ctx.db.pool().clone());

        let result = svc
            .create_enterprise(NewEnterprise {
                uuid: ctx.enterprise_uuid,
                name: "Second".to_string(),
            })
            .await;

        assert!(
            matches!(result, Err(EnterprisesServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker for the PostgreSQL test container"]
    async fn create_enterprise_blank_name_returns_invalid_data() -> TestResult {
        let ctx = TestContext::new().await;
        let svc = PgEnterprisesService::new(ctx.db.pool().clone());

        let result = svc
            .create_enterprise(NewEnterprise {
                uuid: EnterpriseUuid::new(),
                name: "   ".to_string(),
            })
            .await;

        assert!(
            matches!(result, Err(EnterprisesServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker for the PostgreSQL test container"]
    async fn get_enterprise_missing_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let svc = PgEnterprisesService::new(ctx.db.pool().clone());

        let found = svc.get_enterprise(ctx.enterprise_uuid).await?;
        let missing = svc.get_enterprise(EnterpriseUuid::new()).await;

        assert_eq!(found.uuid, ctx.enterprise_uuid);
        assert!(matches!(missing, Err(EnterprisesServiceError::NotFound)));

        Ok(())
    }
}
