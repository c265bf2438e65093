//! # Cross-Contract Bridge
//!
//! Synchronous nested invocation of another contract.
//!
//! The host reserves `value` from the calling contract, runs the callee one
//! level deeper with the caller pushed onto its chain, and pops the frame on
//! return. A failed callee leaves neither its own effects nor the transfer
//! behind, and its error is returned unchanged so it keeps unwinding.

use crate::domain::codec::Encode;
use crate::domain::value_objects::ContractName;
use crate::errors::ContractResult;
use crate::runtime::Runtime;
use tracing::debug;

/// A prepared nested call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRequest {
    /// Callee identity.
    pub target: ContractName,
    /// Exported method of the callee.
    pub method: String,
    /// Coins moved from the caller to the callee.
    pub value: u64,
    /// Codec-encoded parameter tuple.
    pub params: Vec<u8>,
}

impl CallRequest {
    /// Encodes `args` in declared order.
    pub fn new<A: Encode>(
        target: ContractName,
        method: impl Into<String>,
        value: u64,
        args: &A,
    ) -> Self {
        Self {
            target,
            method: method.into(),
            value,
            params: args.encode(),
        }
    }
}

impl Runtime<'_> {
    /// Invokes `method` of `target` with `args`, moving `value` coins to it.
    ///
    /// `args` is the callee's parameter tuple, e.g. `&(to, amount)`.
    pub fn call<A: Encode>(
        &self,
        target: &ContractName,
        method: &str,
        value: u64,
        args: &A,
    ) -> ContractResult<()> {
        self.execute(&CallRequest {
            target: target.clone(),
            method: method.to_string(),
            value,
            params: args.try_encode()?,
        })
    }

    /// Runs a prepared call.
    pub fn execute(&self, request: &CallRequest) -> ContractResult<()> {
        debug!(
            from = %self.contract_name(),
            to = %request.target,
            method = %request.method,
            value = request.value,
            depth = self.context().depth() + 1,
            "cross-contract call"
        );
        self.host().invoke(
            request.target.owner.as_str(),
            &request.target.name,
            &request.method,
            &request.params,
            request.value,
        )?;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
