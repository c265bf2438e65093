//! # Driving Ports (API - Inbound)
//!
//! What the host calls to run a deployed contract.

use crate::errors::ContractError;
use crate::ports::outbound::HostAbi;

/// Entry point of a deployed contract.
///
/// The host pushes an invocation frame, then calls [`ContractEntry::apply`]
/// with itself as the host interface. Everything the contract learns about
/// the invocation comes back through that interface.
pub trait ContractEntry: Send + Sync {
    /// Runs the method named by the current frame.
    fn apply(&self, host: &dyn HostAbi) -> Result<(), ContractError>;

    /// Declared export list, in declaration order.
    fn exports(&self) -> Vec<String>;
}
