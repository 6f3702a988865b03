//! Dashboard service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::civil::Date;
use mockall::automock;
use tracing::info;

use crate::domain::{
    calculations::{CalculationsRepository, data::CalculationFilters},
    dashboard::{
        errors::DashboardServiceError,
        summary::{DashboardSummary, summarize},
    },
    enterprises::records::EnterpriseUuid,
};

/// Narrows the dashboard to calculations whose period lies within the dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardQuery {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

#[derive(Clone)]
pub struct RebateDashboardService {
    repository: Arc<dyn CalculationsRepository>,
}

impl RebateDashboardService {
    #[must_use]
    pub fn new(repository: Arc<dyn CalculationsRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl DashboardService for RebateDashboardService {
    #[tracing::instrument(
        name = "dashboard.service.get_dashboard",
        skip(self),
        fields(enterprise_uuid = %enterprise),
        err
    )]
    async fn get_dashboard(
        &self,
        enterprise: EnterpriseUuid,
        query: DashboardQuery,
    ) -> Result<DashboardSummary, DashboardServiceError> {
        if let (Some(from), Some(to)) = (query.from, query.to)
            && from > to
        {
            return Err(DashboardServiceError::InvalidRange { from, to });
        }

        let records = self
            .repository
            .list(
                enterprise,
                CalculationFilters {
                    from: query.from,
                    to: query.to,
                    ..CalculationFilters::default()
                },
            )
            .await?;

        let summary = summarize(&records)?;

        info!(
            draft = summary.counts.draft,
            finalized = summary.counts.finalized,
            "built dashboard"
        );

        Ok(summary)
    }
}

#[automock]
#[async_trait]
/// Enterprise-wide rebate figures.
pub trait DashboardService: Send + Sync {
    /// Summarises the enterprise's calculations.
    async fn get_dashboard(
        &self,
        enterprise: EnterpriseUuid,
        query: DashboardQuery,
    ) -> Result<DashboardSummary, DashboardServiceError>;
}
