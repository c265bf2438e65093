//! # Runtime
//!
//! Typed guest-side view of the host, bound to one immutable [`CallContext`].
//!
//! Every handler receives a `&Runtime`. It is the only way contract code
//! touches the host, and it never hands out a mutable context.

use crate::domain::buffer;
use crate::domain::codec::Decode;
use crate::domain::context::CallContext;
use crate::domain::value_objects::{AccountName, CallerFrame, Checksum256, ContractName};
use crate::errors::{ContractError, ContractResult};
use crate::ports::outbound::HostAbi;
use tracing::trace;

/// Fails with an assertion failure carrying `msg` unless `cond` holds.
pub fn ensure(cond: bool, msg: impl Into<String>) -> ContractResult<()> {
    if cond {
        Ok(())
    } else {
        Err(ContractError::AssertionFailure(msg.into()))
    }
}

/// Host interface plus the current frame's identity.
pub struct Runtime<'h> {
    host: &'h dyn HostAbi,
    ctx: CallContext,
}

impl<'h> Runtime<'h> {
    /// Binds a runtime to an explicit context.
    pub fn new(host: &'h dyn HostAbi, ctx: CallContext) -> Self {
        Self { host, ctx }
    }

    /// Builds the context of the innermost host frame from host reads.
    ///
    /// The decoded caller chain is cross-checked against the host's
    /// called-by-user flag and calling-contract reads.
    pub fn attach(host: &'h dyn HostAbi) -> ContractResult<Self> {
        let owner = buffer::fetch_string(|dst| host.read_contract_owner(dst))?;
        let name = buffer::fetch_string(|dst| host.read_contract_name(dst))?;
        let method = buffer::fetch_string(|dst| host.read_contract_method(dst))?;
        let chain_bytes = buffer::fetch(|dst| host.read_caller_chain(dst))?;
        let chain = Vec::<CallerFrame>::decode(&chain_bytes)?;
        let value = host.read_contract_sender_value();

        let ctx = CallContext::from_parts(ContractName::new(owner, name), method, chain, value)?;

        if ctx.called_by_user() != host.contract_called_by_user() {
            return Err(ContractError::HostFault(format!(
                "called-by-user flag disagrees with caller chain of {}",
                ctx.contract()
            )));
        }
        let calling_owner = buffer::fetch_string(|dst| host.read_calling_contract_owner(dst))?;
        let calling_name = buffer::fetch_string(|dst| host.read_calling_contract_name(dst))?;
        let reported = match ctx.caller_contract() {
            Some(c) => c.owner.as_str() == calling_owner && c.name == calling_name,
            None => calling_owner.is_empty() && calling_name.is_empty(),
        };
        if !reported {
            return Err(ContractError::HostFault(format!(
                "calling contract {calling_name}@{calling_owner} disagrees with caller chain"
            )));
        }

        trace!(
            contract = %ctx.contract(),
            method = ctx.method(),
            depth = ctx.depth(),
            "runtime attached"
        );
        Ok(Self { host, ctx })
    }

    /// The current frame's identity.
    #[must_use]
    pub fn context(&self) -> &CallContext {
        &self.ctx
    }

    /// Raw host interface.
    #[must_use]
    pub fn host(&self) -> &'h dyn HostAbi {
        self.host
    }

    // -------------------------------------------------------------------------
    // Call context shortcuts
    // -------------------------------------------------------------------------

    /// Current contract identity.
    #[must_use]
    pub fn contract_name(&self) -> &ContractName {
        self.ctx.contract()
    }

    /// Current method name.
    #[must_use]
    pub fn contract_method(&self) -> &str {
        self.ctx.method()
    }

    /// Coins transferred into this invocation.
    #[must_use]
    pub fn sender_value(&self) -> u64 {
        self.ctx.value()
    }

    /// True iff the innermost caller is a signing user.
    #[must_use]
    pub fn contract_called_by_user(&self) -> bool {
        self.ctx.called_by_user()
    }

    /// Account behind this invocation.
    #[must_use]
    pub fn contract_caller(&self) -> &AccountName {
        self.ctx.caller()
    }

    /// Calling contract, `None` when started by a user.
    #[must_use]
    pub fn contract_caller_contract(&self) -> Option<&ContractName> {
        self.ctx.caller_contract()
    }

    // -------------------------------------------------------------------------
    // Chain / environment
    // -------------------------------------------------------------------------

    /// Current block number.
    #[must_use]
    pub fn current_block_number(&self) -> u64 {
        self.host.current_block_number()
    }

    /// Current block timestamp.
    #[must_use]
    pub fn current_timestamp(&self) -> u64 {
        self.host.current_timestamp()
    }

    /// Producer of the current block.
    pub fn current_witness(&self) -> ContractResult<AccountName> {
        buffer::fetch_string(|dst| self.host.current_witness(dst)).map(AccountName::from)
    }

    /// Active block producers.
    pub fn block_producers(&self) -> ContractResult<Vec<AccountName>> {
        let bytes = buffer::fetch(|dst| self.host.block_producers(dst))?;
        Ok(Vec::<AccountName>::decode(&bytes)?)
    }

    /// SHA-256 digest computed by the host.
    pub fn sha256(&self, data: &[u8]) -> ContractResult<Checksum256> {
        let bytes = buffer::fetch(|dst| self.host.sha256(data, dst))?;
        Checksum256::from_slice(&bytes).ok_or_else(|| {
            ContractError::HostFault(format!("digest of {} bytes, expected 32", bytes.len()))
        })
    }

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------

    /// Prints text through the host.
    pub fn print(&self, text: &str) {
        self.host.print_str(text);
    }

    /// Prints a signed integer.
    pub fn print_i64(&self, value: i64) {
        self.host.print_i64(value);
    }

    /// Prints an unsigned integer.
    pub fn print_u64(&self, value: u64) {
        self.host.print_u64(value);
    }

    /// Prints a boolean.
    pub fn print_bool(&self, value: bool) {
        self.host.print_bool(value);
    }

    // -------------------------------------------------------------------------
    // Authorization
    // -------------------------------------------------------------------------

    /// Aborts unless `account` authorized the transaction.
    pub fn require_auth(&self, account: &AccountName) -> ContractResult<()> {
        Ok(self.host.require_auth(account.as_str())?)
    }

    /// Aborts unless `contract` is the immediate caller.
    pub fn require_contract_auth(&self, contract: &ContractName) -> ContractResult<()> {
        Ok(self
            .host
            .require_contract_auth(contract.owner.as_str(), &contract.name)?)
    }

    // -------------------------------------------------------------------------
    // Balances and transfers
    // -------------------------------------------------------------------------

    /// Balance of a user account.
    #[must_use]
    pub fn user_balance(&self, account: &AccountName) -> u64 {
        self.host.user_balance(account.as_str())
    }

    /// Balance of a contract.
    #[must_use]
    pub fn contract_balance(&self, contract: &ContractName) -> u64 {
        self.host
            .contract_balance(contract.owner.as_str(), &contract.name)
    }

    /// Moves coins from this contract to a user.
    pub fn transfer_to_user(&self, to: &AccountName, amount: u64, memo: &str) -> ContractResult<()> {
        Ok(self.host.transfer_to_user(to.as_str(), amount, memo)?)
    }

    /// Moves coins from this contract to another contract.
    pub fn transfer_to_contract(
        &self,
        to: &ContractName,
        amount: u64,
        memo: &str,
    ) -> ContractResult<()> {
        Ok(self
            .host
            .transfer_to_contract(to.owner.as_str(), &to.name, amount, memo)?)
    }
}

// =============================================================================
// TESTS
// =============================================================================
