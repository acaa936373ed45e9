//! # Covault Testkit
//!
//! Testing utilities for the Covault workspace:
//!
//! - [`fixtures`] - A pre-wired registry (MemoryStore + ManualClock) and
//!   literal-to-newtype helpers
//! - [`generators`] - Proptest strategies for domain types
//! - [`vectors`] - The golden audit trail of the canonical scenario
//!
//! Everything here panics on misuse rather than returning errors; it is
//! test support, not library surface.

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    account, document_id, entity_id, fields, name, sample_fields, RegistryFixture,
    FIXTURE_START_MS,
};
