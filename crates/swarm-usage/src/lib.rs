//! Usage metering for Swarm.
//!
//! # Architecture
//!
//! - [`pricing`] — static per-model prices, grouped into model families
//! - [`caller`] — explicit caller-chain attribution tags
//! - [`ledger::UsageLedger`] — shared accumulator of records and running totals
//! - [`meter::CostMeter`] — turns a provider response into a priced [`ledger::UsageRecord`]

pub mod caller;
pub mod ledger;
pub mod meter;
pub mod pricing;

pub use caller::CallerChain;
pub use ledger::{UsageLedger, UsageRecord, UsageSummary, UsageTotals};
pub use meter::{CostMeter, Metered, MeteringDegraded, UsageSource};
pub use pricing::{ModelFamily, PriceLookup, PricingEntry, PricingTable, PRICING};
