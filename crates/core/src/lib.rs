//! Rebates
//!
//! Rebates is a deterministic calculation engine for end-of-year customer rebates
//! ("RFA") earned under commercial contracts. A contract carries a discount
//! schedule; the engine validates that schedule, apportions achieved turnover
//! across its tiers, and produces an auditable per-tier breakdown. The same code
//! path serves persisted calculations, what-if simulations and turnover
//! projections.

pub mod calculator;
pub mod currency;
pub mod periods;
pub mod prelude;
pub mod projection;
pub mod report;
pub mod schedules;
pub mod simulation;
pub mod tiers;
