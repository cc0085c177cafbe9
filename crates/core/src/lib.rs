//! `forgewms-core` — domain foundation building blocks.
//!
//! Pure domain primitives shared by every warehouse module: identifiers,
//! the domain error model and the aggregate execution contract.

pub mod aggregate;
pub mod error;
pub mod id;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, TenantId};
