//! `replenish-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! tenant and SKU identifiers, calendar-month arithmetic, and the domain
//! error model.

pub mod error;
pub mod id;
pub mod period;

pub use error::{DomainError, DomainResult};
pub use id::{Sku, TenantId};
pub use period::YearMonth;
