//! Test Helpers

use jiff::{Timestamp, civil::date};
use rebates::{
    calculator::{CalculationInput, calculate},
    periods::Period,
    tiers::{DiscountConfig, Tier},
};
use rust_decimal::Decimal;
use rusty_money::iso::EUR;

use crate::domain::{
    calculations::records::{CalculationRecord, CalculationStatus, CalculationUuid},
    contracts::records::{ContractRecord, ContractUuid},
    enterprises::records::EnterpriseUuid,
};

/// 0-10 000 at 5 %, 10 000-50 000 at 8 %, 50 000 and above at 12 %.
///
/// 62 000 of turnover earns 5 140.
pub(crate) fn reference_progressive() -> DiscountConfig {
    DiscountConfig::progressive(vec![
        Tier::bounded(Decimal::ZERO, Decimal::from(10_000), Decimal::new(5, 2)),
        Tier::bounded(Decimal::from(10_000), Decimal::from(50_000), Decimal::new(8, 2)),
        Tier::unbounded(Decimal::from(50_000), Decimal::new(12, 2)),
    ])
}

/// An EUR contract record, as a contracts service would return it.
pub(crate) fn contract_record(
    enterprise: EnterpriseUuid,
    discount_configs: Vec<DiscountConfig>,
) -> ContractRecord {
    ContractRecord {
        uuid: ContractUuid::new(),
        enterprise_uuid: enterprise,
        name: "Annual supply".to_string(),
        currency: "EUR".to_string(),
        discount_configs,
        start_date: date(2024, 1, 1),
        end_date: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

/// A calculation record of zero turnover under the reference schedule.
pub(crate) fn calculation_record(
    enterprise: EnterpriseUuid,
    contract: ContractUuid,
    period: Period,
    status: CalculationStatus,
) -> CalculationRecord {
    let calculation = reference_progressive()
        .validated()
        .ok()
        .and_then(|config| calculate(&config, CalculationInput::new(Decimal::ZERO), EUR).ok())
        .unwrap_or_else(|| panic!("reference schedule must calculate"));

    CalculationRecord {
        uuid: CalculationUuid::new(),
        enterprise_uuid: enterprise,
        contract_uuid: contract,
        period,
        achieved_turnover: calculation.achieved_turnover,
        prior_period_turnover: None,
        rebate_base: calculation.rebate_base,
        currency: "EUR".to_string(),
        status,
        total_rebate: calculation.total_rebate,
        effective_rate: calculation.effective_rate,
        tier_breakdown: calculation.tier_breakdown,
        discount_config: reference_progressive(),
        created_at: Timestamp::now(),
        finalized_at: (status == CalculationStatus::Final).then(Timestamp::now),
    }
}
