//! Dashboard summary figures folded from calculation records.

use std::collections::BTreeMap;

use jiff::Timestamp;
use rebates::{
    calculator::{CalculationError, effective_rate},
    periods::Period,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{
    calculations::records::{CalculationRecord, CalculationStatus, CalculationUuid},
    contracts::records::ContractUuid,
};

/// Contracts listed in [`DashboardSummary::top_contracts`].
pub const TOP_CONTRACTS: usize = 5;

/// Calculations listed in [`DashboardSummary::recent`].
pub const RECENT_CALCULATIONS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub draft: usize,
    #[serde(rename = "final")]
    pub finalized: usize,
}

/// Totals for one currency.
///
/// Only final calculations count towards `total_rebate`, `total_turnover` and
/// `average_rate`. Drafts are reported as `provisional_rebate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyTotals {
    pub currency: String,
    pub total_rebate: Decimal,
    pub total_turnover: Decimal,

    /// Turnover-weighted: `total_rebate / total_turnover`, six decimal places.
    pub average_rate: Decimal,

    pub provisional_rebate: Decimal,
}

/// Final rebate and turnover for calculations whose period ends in a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTrend {
    pub year: i16,
    pub month: i8,
    pub currency: String,
    pub total_rebate: Decimal,
    pub total_turnover: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractRanking {
    pub contract_uuid: ContractUuid,
    pub currency: String,
    pub total_rebate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentCalculation {
    pub uuid: CalculationUuid,
    pub contract_uuid: ContractUuid,
    pub period: Period,
    pub status: CalculationStatus,
    pub currency: String,
    pub total_rebate: Decimal,
    pub created_at: Timestamp,
}

impl From<&CalculationRecord> for RecentCalculation {
    fn from(record: &CalculationRecord) -> Self {
        Self {
            uuid: record.uuid,
            contract_uuid: record.contract_uuid,
            period: record.period,
            status: record.status,
            currency: record.currency.clone(),
            total_rebate: record.total_rebate,
            created_at: record.created_at,
        }
    }
}

/// Enterprise-wide rebate figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub counts: StatusCounts,

    /// Ordered by currency code.
    pub currencies: Vec<CurrencyTotals>,

    /// Ascending by year, month, then currency.
    pub trend: Vec<MonthlyTrend>,

    /// Highest final rebate first.
    pub top_contracts: Vec<ContractRanking>,

    /// Most recently created first.
    pub recent: Vec<RecentCalculation>,
}

#[derive(Debug, Default)]
struct Totals {
    rebate: Decimal,
    turnover: Decimal,
    provisional: Decimal,
}

fn add(total: &mut Decimal, amount: Decimal) -> Result<(), CalculationError> {
    *total = total
        .checked_add(amount)
        .ok_or(CalculationError::Overflow)?;

    Ok(())
}

/// Fold calculation records into dashboard figures.
///
/// Amounts in different currencies are never added together.
///
/// # Errors
///
/// Returns [`CalculationError::Overflow`] if a total overflows.
pub fn summarize(records: &[CalculationRecord]) -> Result<DashboardSummary, CalculationError> {
    let mut counts = StatusCounts::default();
    let mut currencies: BTreeMap<&str, Totals> = BTreeMap::new();
    let mut trend: BTreeMap<(i16, i8, &str), (Decimal, Decimal)> = BTreeMap::new();
    let mut contracts: BTreeMap<ContractUuid, (&str, Decimal)> = BTreeMap::new();

    for record in records {
        let totals = currencies.entry(record.currency.as_str()).or_default();

        if record.status == CalculationStatus::Draft {
            counts.draft += 1;
            add(&mut totals.provisional, record.total_rebate)?;

            continue;
        }

        counts.finalized += 1;
        add(&mut totals.rebate, record.total_rebate)?;
        add(&mut totals.turnover, record.achieved_turnover)?;

        let end = record.period.end();
        let month = trend
            .entry((end.year(), end.month(), record.currency.as_str()))
            .or_default();

        add(&mut month.0, record.total_rebate)?;
        add(&mut month.1, record.achieved_turnover)?;

        let contract = contracts
            .entry(record.contract_uuid)
            .or_insert((record.currency.as_str(), Decimal::ZERO));

        add(&mut contract.1, record.total_rebate)?;
    }

    let currencies = currencies
        .into_iter()
        .map(|(currency, totals)| {
            Ok(CurrencyTotals {
                currency: currency.to_string(),
                total_rebate: totals.rebate,
                total_turnover: totals.turnover,
                average_rate: effective_rate(totals.rebate, totals.turnover)?,
                provisional_rebate: totals.provisional,
            })
        })
        .collect::<Result<Vec<_>, CalculationError>>()?;

    let trend = trend
        .into_iter()
        .map(|((year, month, currency), (rebate, turnover))| MonthlyTrend {
            year,
            month,
            currency: currency.to_string(),
            total_rebate: rebate,
            total_turnover: turnover,
        })
        .collect();

    // BTreeMap iteration is by UUID, so the stable sort breaks ties by UUID.
    let mut top_contracts: Vec<ContractRanking> = contracts
        .into_iter()
        .map(|(contract_uuid, (currency, total_rebate))| ContractRanking {
            contract_uuid,
            currency: currency.to_string(),
            total_rebate,
        })
        .collect();

    top_contracts.sort_by(|a, b| b.total_rebate.cmp(&a.total_rebate));
    top_contracts.truncate(TOP_CONTRACTS);

    let mut recent: Vec<&CalculationRecord> = records.iter().collect();

    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let recent = recent
        .into_iter()
        .take(RECENT_CALCULATIONS)
        .map(RecentCalculation::from)
        .collect();

    Ok(DashboardSummary {
        counts,
        currencies,
        trend,
        top_contracts,
        recent,
    })
}
