//! # In-Memory Host
//!
//! Reference [`HostAbi`] implementation for embedding and testing.
//!
//! ## Frames
//!
//! Every invocation, top-level or nested, pushes a frame holding its
//! [`CallContext`] and parameter blob. Context reads, storage and transfers
//! act on the innermost frame.
//!
//! ## Atomicity
//!
//! A journal checkpoint is taken at every boundary. A top-level invocation
//! commits only when it succeeds; a failure at any depth reverts to the
//! checkpoint of the boundary it crosses, and nested failures keep unwinding
//! so the top level reverts too.
//!
//! An abort is sticky. The first failing host call or nested call is
//! recorded; every later fallible host call in the same chain fails with it,
//! and the top-level boundary reverts and reports it even when a handler
//! swallowed the error and returned `Ok`.
//!
//! ## Locking
//!
//! Top-level invocations are serialized by a reentrant guard held for the
//! whole boundary, so concurrent callers never share the frame stack.
//! Otherwise no lock is held while contract code runs, and nested calls
//! re-enter the host freely.

use crate::adapters::journal::{Holder, JournaledState};
use crate::config::HostConfig;
use crate::domain::buffer;
use crate::domain::codec::Encode;
use crate::domain::context::CallContext;
use crate::domain::invariants::{
    check_call_depth_invariant, check_nested_frame_invariant, check_value_conservation_invariant,
};
use crate::domain::value_objects::{AccountName, ContractName};
use crate::errors::{ContractError, ContractResult, HostError};
use crate::ports::inbound::ContractEntry;
use crate::ports::outbound::HostAbi;
use crate::runtime::Runtime;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// =============================================================================
// INVOCATION
// =============================================================================

/// A signed top-level invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Signing user; the outermost caller.
    pub signer: AccountName,
    /// Target contract.
    pub contract: ContractName,
    /// Exported method.
    pub method: String,
    /// Codec-encoded parameter tuple.
    pub params: Vec<u8>,
    /// Coins moved from the signer to the contract.
    pub value: u64,
    /// Further accounts whose authority the transaction carries.
    pub cosigners: Vec<AccountName>,
}

impl Invocation {
    /// Invocation of `method` with `args` encoded in declared order.
    pub fn new<A: Encode>(
        signer: impl Into<AccountName>,
        contract: ContractName,
        method: impl Into<String>,
        args: &A,
    ) -> Self {
        Self {
            signer: signer.into(),
            contract,
            method: method.into(),
            params: args.encode(),
            value: 0,
            cosigners: Vec::new(),
        }
    }

    /// Attaches coins to the invocation.
    #[must_use]
    pub fn with_value(mut self, value: u64) -> Self {
        self.value = value;
        self
    }

    /// Adds a co-signing account.
    #[must_use]
    pub fn with_cosigner(mut self, account: impl Into<AccountName>) -> Self {
        self.cosigners.push(account.into());
        self
    }

    /// Replaces the parameter blob verbatim.
    #[must_use]
    pub fn with_raw_params(mut self, params: Vec<u8>) -> Self {
        self.params = params;
        self
    }

    fn authorities(&self) -> Vec<AccountName> {
        let mut all = Vec::with_capacity(self.cosigners.len() + 1);
        all.push(self.signer.clone());
        all.extend(self.cosigners.iter().cloned());
        all
    }
}

// =============================================================================
// HOST
// =============================================================================

#[derive(Clone, Debug)]
struct Frame {
    ctx: CallContext,
    params: Vec<u8>,
}

#[derive(Clone, Debug, Default)]
struct ChainProps {
    block_number: u64,
    timestamp: u64,
    witness: AccountName,
    producers: Vec<AccountName>,
}

/// In-memory host runtime.
pub struct InMemoryHost {
    config: HostConfig,
    serial: ReentrantMutex<()>,
    state: Mutex<JournaledState>,
    frames: Mutex<Vec<Frame>>,
    aborted: Mutex<Option<ContractError>>,
    authorities: RwLock<Vec<AccountName>>,
    contracts: RwLock<HashMap<ContractName, Arc<dyn ContractEntry>>>,
    chain: RwLock<ChainProps>,
    console: Mutex<Vec<String>>,
}

impl fmt::Debug for InMemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryHost")
            .field("config", &self.config)
            .field("contracts", &self.contracts.read().keys().collect::<Vec<_>>())
            .field("depth", &self.frames.lock().len())
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::with_config(HostConfig::default())
    }
}

impl InMemoryHost {
    /// Create a host with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host with explicit limits.
    #[must_use]
    pub fn with_config(config: HostConfig) -> Self {
        Self {
            config,
            serial: ReentrantMutex::new(()),
            state: Mutex::new(JournaledState::new()),
            frames: Mutex::new(Vec::new()),
            aborted: Mutex::new(None),
            authorities: RwLock::new(Vec::new()),
            contracts: RwLock::new(HashMap::new()),
            chain: RwLock::new(ChainProps::default()),
            console: Mutex::new(Vec::new()),
        }
    }

    /// Active limits.
    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Setup
    // -------------------------------------------------------------------------

    /// Deploys `entry` as `contract`, replacing any previous deployment.
    pub fn deploy<E: ContractEntry + 'static>(&self, contract: ContractName, entry: E) {
        info!(contract = %contract, exports = ?entry.exports(), "contract deployed");
        self.contracts.write().insert(contract, Arc::new(entry));
    }

    /// Sets a user balance outside of any invocation.
    pub fn set_user_balance(&self, account: &AccountName, amount: u64) {
        self.seed(Holder::User(account), amount);
    }

    /// Sets a contract balance outside of any invocation.
    pub fn set_contract_balance(&self, contract: &ContractName, amount: u64) {
        self.seed(Holder::Contract(contract), amount);
    }

    fn seed(&self, holder: Holder<'_>, amount: u64) {
        let _serial = self.serial.lock();
        let idle = self.frames.lock().is_empty();
        let mut state = self.state.lock();
        state.set_balance(holder, amount);
        if idle {
            state.commit();
        }
    }

    /// Sets the current block.
    pub fn set_block(&self, number: u64, timestamp: u64) {
        let mut chain = self.chain.write();
        chain.block_number = number;
        chain.timestamp = timestamp;
    }

    /// Sets the producer of the current block.
    pub fn set_witness(&self, account: impl Into<AccountName>) {
        self.chain.write().witness = account.into();
    }

    /// Replaces the active producer list.
    pub fn set_producers(&self, producers: Vec<AccountName>) {
        self.chain.write().producers = producers;
    }

    // -------------------------------------------------------------------------
    // Top-level boundary
    // -------------------------------------------------------------------------

    /// Executes a signed invocation against its deployed contract.
    ///
    /// The signer's value moves to the contract first. Any failure reverts
    /// every effect of the invocation, including that transfer.
    #[instrument(skip_all, fields(contract = %invocation.contract, method = %invocation.method, signer = %invocation.signer))]
    pub fn apply(&self, invocation: &Invocation) -> ContractResult<()> {
        self.boundary(invocation, |_| {
            let entry = self.lookup(&invocation.contract)?;
            entry.apply(self)
        })
    }

    /// Runs `body` as the method body of a top-level invocation, with the
    /// same boundary semantics as [`InMemoryHost::apply`].
    ///
    /// The target contract need not be deployed.
    pub fn run_as<T, F>(&self, invocation: &Invocation, body: F) -> ContractResult<T>
    where
        F: FnOnce(&Runtime<'_>) -> ContractResult<T>,
    {
        self.boundary(invocation, |ctx| body(&Runtime::new(self, ctx.clone())))
    }

    fn boundary<T, F>(&self, invocation: &Invocation, body: F) -> ContractResult<T>
    where
        F: FnOnce(&CallContext) -> ContractResult<T>,
    {
        let _serial = self.serial.lock();
        if !self.frames.lock().is_empty() {
            return Err(ContractError::HostFault(
                "top-level invocation started inside another invocation".into(),
            ));
        }
        *self.aborted.lock() = None;
        self.check_name("account", invocation.signer.as_str())?;
        self.check_contract(&invocation.contract)?;
        self.check_name("method", &invocation.method)?;
        self.check_params(&invocation.params)?;

        let (checkpoint, before) = {
            let state = self.state.lock();
            (state.checkpoint(), state.balances())
        };
        *self.authorities.write() = invocation.authorities();
        let result = self.enter(invocation, body);
        self.authorities.write().clear();
        let aborted = self.aborted.lock().take();
        let result = match (result, aborted) {
            (Ok(_), Some(err)) => {
                warn!(error = %err, "abort was swallowed inside the invocation");
                Err(err)
            }
            (Err(_), Some(err)) => Err(err),
            (result, None) => result,
        };

        let mut state = self.state.lock();
        match result {
            Ok(value) if check_value_conservation_invariant(&before, &state.balances()) => {
                let changes = state.pending_changes();
                state.commit();
                info!(changes, "invocation committed");
                Ok(value)
            }
            Ok(_) => {
                state.revert_to(checkpoint);
                warn!("invocation reverted: coins not conserved");
                Err(ContractError::HostFault("coins not conserved".into()))
            }
            Err(err) => {
                let undone = state.revert_to(checkpoint);
                warn!(kind = ?err.kind(), error = %err, undone, "invocation reverted");
                Err(err)
            }
        }
    }

    fn enter<T, F>(&self, invocation: &Invocation, body: F) -> ContractResult<T>
    where
        F: FnOnce(&CallContext) -> ContractResult<T>,
    {
        self.state.lock().move_value(
            Holder::User(&invocation.signer),
            Holder::Contract(&invocation.contract),
            invocation.value,
        )?;
        let ctx = CallContext::top_level(
            invocation.signer.clone(),
            invocation.contract.clone(),
            invocation.method.clone(),
            invocation.value,
        );
        self.frames.lock().push(Frame {
            ctx: ctx.clone(),
            params: invocation.params.clone(),
        });
        let result = body(&ctx);
        self.frames.lock().pop();
        result
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Committed rows of a contract table, ascending by encoded key.
    #[must_use]
    pub fn table_rows(&self, contract: &ContractName, table: &str) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.state.lock().rows(contract, table)
    }

    /// Balance of a user.
    #[must_use]
    pub fn user_balance_of(&self, account: &AccountName) -> u64 {
        self.state.lock().balance(Holder::User(account))
    }

    /// Balance of a contract.
    #[must_use]
    pub fn contract_balance_of(&self, contract: &ContractName) -> u64 {
        self.state.lock().balance(Holder::Contract(contract))
    }

    /// Everything printed so far, in order.
    #[must_use]
    pub fn console(&self) -> Vec<String> {
        self.console.lock().clone()
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn check_name(&self, what: &'static str, name: &str) -> Result<(), HostError> {
        if name.len() > self.config.max_name_bytes {
            return Err(HostError::LimitExceeded {
                what,
                size: name.len(),
                max: self.config.max_name_bytes,
            });
        }
        Ok(())
    }

    fn check_contract(&self, contract: &ContractName) -> Result<(), HostError> {
        self.check_name("account", contract.owner.as_str())?;
        self.check_name("contract name", &contract.name)
    }

    fn check_params(&self, params: &[u8]) -> Result<(), HostError> {
        if params.len() > self.config.max_param_bytes {
            return Err(HostError::LimitExceeded {
                what: "parameters",
                size: params.len(),
                max: self.config.max_param_bytes,
            });
        }
        Ok(())
    }

    fn lookup(&self, contract: &ContractName) -> Result<Arc<dyn ContractEntry>, HostError> {
        self.contracts
            .read()
            .get(contract)
            .cloned()
            .ok_or_else(|| HostError::UnknownContract(contract.to_string()))
    }

    fn with_frame<T>(&self, f: impl FnOnce(&Frame) -> T) -> Option<T> {
        self.frames.lock().last().map(f)
    }

    fn current(&self) -> Result<CallContext, HostError> {
        self.with_frame(|frame| frame.ctx.clone())
            .ok_or(HostError::NoActiveFrame)
    }

    fn current_contract(&self) -> Result<ContractName, HostError> {
        self.with_frame(|frame| frame.ctx.contract().clone())
            .ok_or(HostError::NoActiveFrame)
    }

    /// Serves bytes selected from the innermost frame; empty outside frames.
    fn serve_frame(&self, dst: &mut [u8], select: impl FnOnce(&Frame) -> Vec<u8>) -> usize {
        let bytes = self.with_frame(select).unwrap_or_default();
        buffer::serve(&bytes, dst)
    }

    /// Runs a fallible host call under the sticky-abort rule.
    fn guarded<T>(&self, op: impl FnOnce() -> Result<T, HostError>) -> Result<T, HostError> {
        let aborted = self.aborted.lock().clone();
        if let Some(err) = aborted {
            return Err(HostError::Aborted(Box::new(err)));
        }
        op().inspect_err(|err| self.record_abort(err))
    }

    fn record_abort(&self, err: &HostError) {
        if self.frames.lock().is_empty() {
            return;
        }
        let mut aborted = self.aborted.lock();
        if aborted.is_none() {
            debug!(error = %err, "invocation chain aborted");
            *aborted = Some(ContractError::from(err.clone()));
        }
    }

    fn print_line(&self, line: String) {
        let contract = self
            .with_frame(|frame| frame.ctx.contract().to_string())
            .unwrap_or_default();
        info!(target: "contract", contract = %contract, "{line}");
        self.console.lock().push(line);
    }
}

// =============================================================================
// HOST ABI
// =============================================================================

impl HostAbi for InMemoryHost {
    fn current_block_number(&self) -> u64 {
        self.chain.read().block_number
    }

    fn current_timestamp(&self) -> u64 {
        self.chain.read().timestamp
    }

    fn current_witness(&self, dst: &mut [u8]) -> usize {
        let witness = self.chain.read().witness.clone();
        buffer::serve(witness.as_str().as_bytes(), dst)
    }

    fn block_producers(&self, dst: &mut [u8]) -> usize {
        let encoded = self.chain.read().producers.encode();
        buffer::serve(&encoded, dst)
    }

    fn sha256(&self, input: &[u8], dst: &mut [u8]) -> usize {
        buffer::serve(&Sha256::digest(input), dst)
    }

    fn print_str(&self, text: &str) {
        self.print_line(text.to_string());
    }

    fn print_i64(&self, value: i64) {
        self.print_line(value.to_string());
    }

    fn print_u64(&self, value: u64) {
        self.print_line(value.to_string());
    }

    fn print_bool(&self, value: bool) {
        self.print_line(value.to_string());
    }

    fn require_auth(&self, account: &str) -> Result<(), HostError> {
        self.guarded(|| {
            if self
                .authorities
                .read()
                .iter()
                .any(|a| a.as_str() == account)
            {
                Ok(())
            } else {
                Err(HostError::Unauthorized {
                    principal: account.to_string(),
                })
            }
        })
    }

    fn require_contract_auth(&self, owner: &str, name: &str) -> Result<(), HostError> {
        self.guarded(|| {
            let ctx = self.current()?;
            match ctx.caller_contract() {
                Some(c) if c.owner.as_str() == owner && c.name == name => Ok(()),
                _ => Err(HostError::Unauthorized {
                    principal: format!("{name}@{owner}"),
                }),
            }
        })
    }

    fn user_balance(&self, account: &str) -> u64 {
        self.user_balance_of(&AccountName::from(account))
    }

    fn contract_balance(&self, owner: &str, name: &str) -> u64 {
        self.contract_balance_of(&ContractName::new(owner, name))
    }

    fn table_get_record(&self, table: &str, primary: &[u8], dst: &mut [u8]) -> Option<usize> {
        let contract = self.current_contract().ok()?;
        let state = self.state.lock();
        let bytes = state.record(&contract, table, primary)?;
        Some(buffer::serve(bytes, dst))
    }

    fn table_new_record(
        &self,
        table: &str,
        primary: &[u8],
        record: &[u8],
    ) -> Result<(), HostError> {
        self.guarded(|| {
            let contract = self.current_contract()?;
            self.check_name("table name", table)?;
            let mut state = self.state.lock();
            if state.record(&contract, table, primary).is_some() {
                return Err(HostError::DuplicateKey {
                    table: table.to_string(),
                    key: hex::encode(primary),
                });
            }
            state.put_record(&contract, table, primary, Some(record.to_vec()));
            Ok(())
        })
    }

    fn table_update_record(
        &self,
        table: &str,
        primary: &[u8],
        record: &[u8],
    ) -> Result<(), HostError> {
        self.guarded(|| {
            let contract = self.current_contract()?;
            let mut state = self.state.lock();
            if state.record(&contract, table, primary).is_none() {
                return Err(HostError::RecordNotFound {
                    table: table.to_string(),
                    key: hex::encode(primary),
                });
            }
            state.put_record(&contract, table, primary, Some(record.to_vec()));
            Ok(())
        })
    }

    fn table_delete_record(&self, table: &str, primary: &[u8]) -> Result<(), HostError> {
        self.guarded(|| {
            let contract = self.current_contract()?;
            let mut state = self.state.lock();
            if state.record(&contract, table, primary).is_some() {
                state.put_record(&contract, table, primary, None);
            }
            Ok(())
        })
    }

    fn table_next_primary(
        &self,
        table: &str,
        after: Option<&[u8]>,
        dst: &mut [u8],
    ) -> Option<usize> {
        let contract = self.current_contract().ok()?;
        let state = self.state.lock();
        let key = state.next_key(&contract, table, after)?;
        Some(buffer::serve(key, dst))
    }

    fn table_enum_records(&self, table: &str, dst: &mut [u8]) -> usize {
        let rows = self
            .current_contract()
            .map(|contract| self.state.lock().rows(&contract, table))
            .unwrap_or_default();
        buffer::serve(&rows.encode(), dst)
    }

    fn table_get_record_ex(
        &self,
        owner: &str,
        name: &str,
        table: &str,
        primary: &[u8],
        dst: &mut [u8],
    ) -> Option<usize> {
        let contract = ContractName::new(owner, name);
        let state = self.state.lock();
        let bytes = state.record(&contract, table, primary)?;
        Some(buffer::serve(bytes, dst))
    }

    fn read_contract_params_length(&self) -> usize {
        self.with_frame(|frame| frame.params.len()).unwrap_or(0)
    }

    fn read_contract_params(&self, dst: &mut [u8]) -> usize {
        self.serve_frame(dst, |frame| frame.params.clone())
    }

    fn read_contract_owner(&self, dst: &mut [u8]) -> usize {
        self.serve_frame(dst, |frame| {
            frame.ctx.contract().owner.as_str().as_bytes().to_vec()
        })
    }

    fn read_contract_name(&self, dst: &mut [u8]) -> usize {
        self.serve_frame(dst, |frame| frame.ctx.contract().name.as_bytes().to_vec())
    }

    fn read_contract_method(&self, dst: &mut [u8]) -> usize {
        self.serve_frame(dst, |frame| frame.ctx.method().as_bytes().to_vec())
    }

    fn read_contract_caller(&self, dst: &mut [u8]) -> usize {
        self.serve_frame(dst, |frame| frame.ctx.caller().as_str().as_bytes().to_vec())
    }

    fn read_calling_contract_owner(&self, dst: &mut [u8]) -> usize {
        self.serve_frame(dst, |frame| {
            frame
                .ctx
                .caller_contract()
                .map(|c| c.owner.as_str().as_bytes().to_vec())
                .unwrap_or_default()
        })
    }

    fn read_calling_contract_name(&self, dst: &mut [u8]) -> usize {
        self.serve_frame(dst, |frame| {
            frame
                .ctx
                .caller_contract()
                .map(|c| c.name.as_bytes().to_vec())
                .unwrap_or_default()
        })
    }

    fn read_caller_chain(&self, dst: &mut [u8]) -> usize {
        self.serve_frame(dst, |frame| frame.ctx.encoded_chain())
    }

    fn contract_called_by_user(&self) -> bool {
        self.with_frame(|frame| frame.ctx.called_by_user())
            .unwrap_or(false)
    }

    fn read_contract_sender_value(&self) -> u64 {
        self.with_frame(|frame| frame.ctx.value()).unwrap_or(0)
    }

    fn transfer_to_user(&self, to: &str, amount: u64, memo: &str) -> Result<(), HostError> {
        self.guarded(|| {
            let from = self.current_contract()?;
            self.check_name("account", to)?;
            let to = AccountName::from(to);
            self.state
                .lock()
                .move_value(Holder::Contract(&from), Holder::User(&to), amount)?;
            debug!(from = %from, to = %to, amount, memo, "transfer to user");
            Ok(())
        })
    }

    fn transfer_to_contract(
        &self,
        owner: &str,
        name: &str,
        amount: u64,
        memo: &str,
    ) -> Result<(), HostError> {
        self.guarded(|| {
            let from = self.current_contract()?;
            let to = ContractName::new(owner, name);
            self.lookup(&to)?;
            self.state
                .lock()
                .move_value(Holder::Contract(&from), Holder::Contract(&to), amount)?;
            debug!(from = %from, to = %to, amount, memo, "transfer to contract");
            Ok(())
        })
    }

    #[instrument(skip(self, params))]
    fn invoke(
        &self,
        owner: &str,
        name: &str,
        method: &str,
        params: &[u8],
        coins: u64,
    ) -> Result<(), HostError> {
        self.guarded(|| {
            let parent = self.current()?;
            let target = ContractName::new(owner, name);
            self.check_contract(&target)?;
            self.check_name("method", method)?;
            self.check_params(params)?;
            let entry = self.lookup(&target)?;

            let child = parent.nested(target.clone(), method, coins);
            debug_assert!(check_nested_frame_invariant(&parent, &child));
            if !check_call_depth_invariant(&child, self.config.max_call_depth) {
                return Err(HostError::CallDepthExceeded {
                    depth: child.depth(),
                    max: self.config.max_call_depth,
                });
            }

            let checkpoint = {
                let mut state = self.state.lock();
                let checkpoint = state.checkpoint();
                state.move_value(
                    Holder::Contract(parent.contract()),
                    Holder::Contract(&target),
                    coins,
                )?;
                checkpoint
            };
            debug!(depth = child.depth(), "entering nested call");
            self.frames.lock().push(Frame {
                ctx: child,
                params: params.to_vec(),
            });
            let result = entry.apply(self);
            self.frames.lock().pop();

            if let Err(err) = result {
                let undone = self.state.lock().revert_to(checkpoint);
                warn!(error = %err, undone, "nested call reverted");
                return Err(HostError::CallFailed(Box::new(err)));
            }
            Ok(())
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
