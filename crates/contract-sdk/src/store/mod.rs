//! # Persistent Store
//!
//! Typed tables and singleton slots over the host's raw key/value storage.
//!
//! | Type | Cardinality | Key |
//! |------|-------------|-----|
//! | [`Table`] | any | codec encoding of the record's primary key |
//! | [`Singleton`] | at most one | codec encoding of `0u64` |
//!
//! Reads never write. Every write reaches the host immediately, so later
//! reads in the same invocation chain observe it.

mod engine;
pub mod singleton;
pub mod table;

pub use singleton::Singleton;
pub use table::Table;

// =============================================================================
// TESTS
// =============================================================================
