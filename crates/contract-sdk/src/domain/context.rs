//! # Call Context
//!
//! Per-invocation identity snapshot: current contract, method, caller chain
//! and transferred value.
//!
//! The caller chain is ordered innermost first and always ends with the
//! signing user. A user-initiated invocation therefore carries exactly one
//! frame and runs at depth 0; each nested bridge call pushes the calling
//! contract and adds one to the depth.

use crate::domain::codec::Encode;
use crate::domain::value_objects::{AccountName, CallerFrame, ContractName};
use crate::errors::ContractError;
use serde::{Deserialize, Serialize};

/// Immutable identity of one invocation frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    contract: ContractName,
    method: String,
    chain: Vec<CallerFrame>,
    signer: AccountName,
    value: u64,
}

impl CallContext {
    /// Context of a top-level invocation signed by `caller`.
    pub fn top_level(
        caller: AccountName,
        contract: ContractName,
        method: impl Into<String>,
        value: u64,
    ) -> Self {
        Self {
            contract,
            method: method.into(),
            chain: vec![CallerFrame::User(caller.clone())],
            signer: caller,
            value,
        }
    }

    /// Rebuilds a context from host reads.
    ///
    /// The chain must end with exactly one user frame, at its outermost end.
    pub fn from_parts(
        contract: ContractName,
        method: impl Into<String>,
        chain: Vec<CallerFrame>,
        value: u64,
    ) -> Result<Self, ContractError> {
        let user_frames = chain.iter().filter(|f| f.as_user().is_some()).count();
        match chain.last() {
            Some(CallerFrame::User(signer)) if user_frames == 1 => Ok(Self {
                signer: signer.clone(),
                contract,
                method: method.into(),
                chain,
                value,
            }),
            _ => Err(ContractError::HostFault(format!(
                "malformed caller chain of {contract}: {chain:?}"
            ))),
        }
    }

    /// Context of a nested call made from this frame.
    #[must_use]
    pub fn nested(&self, target: ContractName, method: impl Into<String>, value: u64) -> Self {
        let mut chain = Vec::with_capacity(self.chain.len() + 1);
        chain.push(CallerFrame::Contract(self.contract.clone()));
        chain.extend(self.chain.iter().cloned());
        Self {
            contract: target,
            method: method.into(),
            chain,
            signer: self.signer.clone(),
            value,
        }
    }

    /// Contract currently executing.
    #[must_use]
    pub fn contract(&self) -> &ContractName {
        &self.contract
    }

    /// Method currently executing.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Caller chain, innermost first.
    #[must_use]
    pub fn chain(&self) -> &[CallerFrame] {
        &self.chain
    }

    /// Coins transferred into this invocation.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Nesting depth; 0 for a user-initiated invocation.
    #[must_use]
    pub fn depth(&self) -> u32 {
        u32::try_from(self.chain.len().saturating_sub(1)).unwrap_or(u32::MAX)
    }

    /// True iff no contract sits between the signing user and this frame.
    #[must_use]
    pub fn called_by_user(&self) -> bool {
        matches!(self.chain.first(), Some(CallerFrame::User(_)))
    }

    /// The user account behind this invocation: the signing user at the
    /// outermost end of the chain, which is also the innermost frame when
    /// no contract sits in between.
    #[must_use]
    pub fn caller(&self) -> &AccountName {
        &self.signer
    }

    /// The calling contract, or `None` when started directly by a user.
    #[must_use]
    pub fn caller_contract(&self) -> Option<&ContractName> {
        self.chain.first().and_then(CallerFrame::as_contract)
    }

    /// Codec encoding of the caller chain, as served by the host.
    #[must_use]
    pub fn encoded_chain(&self) -> Vec<u8> {
        self.chain.encode()
    }
}

// =============================================================================
// TESTS
// =============================================================================
