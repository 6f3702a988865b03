//! Contract Records

use jiff::{Timestamp, civil::Date};
use rebates::{periods::Period, tiers::DiscountConfig};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{domain::enterprises::records::EnterpriseUuid, uuids::TypedUuid};

/// Contract UUID
pub type ContractUuid = TypedUuid<ContractRecord>;

/// Turnover UUID
pub type TurnoverUuid = TypedUuid<TurnoverRecord>;

/// Contract Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractRecord {
    pub uuid: ContractUuid,
    pub enterprise_uuid: EnterpriseUuid,
    pub name: String,

    /// ISO 4217 code rebates are paid in.
    pub currency: String,

    /// Discount schedules, as stored. Always unvalidated on load.
    pub discount_configs: Vec<DiscountConfig>,

    pub start_date: Date,
    pub end_date: Option<Date>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Turnover achieved under a contract over a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnoverRecord {
    pub uuid: TurnoverUuid,
    pub contract_uuid: ContractUuid,
    pub period: Period,
    pub amount: Decimal,
    pub created_at: Timestamp,
}
