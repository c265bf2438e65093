//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions at the guest/host edge.
//!
//! - **Driving Port (Inbound)**: `ContractEntry`
//! - **Driven Port (Outbound)**: `HostAbi`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
