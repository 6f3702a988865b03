//! Contracts Data

use jiff::civil::Date;
use rebates::{periods::Period, tiers::DiscountConfig};
use rust_decimal::Decimal;

use crate::domain::contracts::records::{ContractUuid, TurnoverUuid};

/// New Contract Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewContract {
    pub uuid: ContractUuid,
    pub name: String,

    /// ISO 4217 currency code.
    pub currency: String,

    pub discount_configs: Vec<DiscountConfig>,
    pub start_date: Date,
    pub end_date: Option<Date>,
}

/// New Turnover Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewTurnover {
    pub uuid: TurnoverUuid,
    pub period: Period,
    pub amount: Decimal,
}
