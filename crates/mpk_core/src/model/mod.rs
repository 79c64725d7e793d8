//! Domain model for the member roster and proposal ledger.
//!
//! # Responsibility
//! - Define the records shared by repositories, services and API mapping.
//! - Own identifier normalization for member ids sent by callers.
//!
//! # Invariants
//! - Member ids are assigned by storage, never by process memory.
//! - Membership sets only ever hold `CanonicalId` values.

pub mod member;
pub mod member_id;
pub mod proposal;
