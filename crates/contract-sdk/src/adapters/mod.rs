//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the host-side ports.
//!
//! - [`InMemoryHost`] implements [`crate::ports::HostAbi`] and drives
//!   deployed [`crate::ports::ContractEntry`] values
//! - [`JournaledState`] holds balances and tables behind an undo log

pub mod journal;
pub mod memory_host;

pub use journal::{Checkpoint, Holder, JournaledState, StateChange};
pub use memory_host::{InMemoryHost, Invocation};
