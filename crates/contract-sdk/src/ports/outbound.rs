//! # Driven Ports (SPI - Outbound)
//!
//! The host-call surface a guest contract builds on. The enclosing runtime
//! implements [`HostAbi`]; the guest core never reaches the host any other
//! way.
//!
//! ## Buffer Protocol
//!
//! Every method taking `dst: &mut [u8]` follows the query-then-fetch
//! convention of [`crate::domain::buffer`]: an empty `dst` returns the
//! required length, a non-empty `dst` receives `min(dst.len(), L)` bytes and
//! the count written is returned.
//!
//! ## Scoping
//!
//! Storage, balance-transfer and call-context methods act on the innermost
//! active invocation frame. Methods returning `Result` abort the invocation
//! on `Err`.

use crate::errors::HostError;

/// Interface to the enclosing host runtime.
pub trait HostAbi: Send + Sync {
    // -------------------------------------------------------------------------
    // Chain / environment
    // -------------------------------------------------------------------------

    /// Current block number.
    fn current_block_number(&self) -> u64;

    /// Current block timestamp (unix seconds).
    fn current_timestamp(&self) -> u64;

    /// Name of the producer of the current block. Buffer protocol.
    fn current_witness(&self, dst: &mut [u8]) -> usize;

    /// Codec-encoded `Vec<String>` of active producers. Buffer protocol.
    fn block_producers(&self, dst: &mut [u8]) -> usize;

    // -------------------------------------------------------------------------
    // Crypto
    // -------------------------------------------------------------------------

    /// SHA-256 of `input`. Buffer protocol over the 32-byte digest.
    fn sha256(&self, input: &[u8], dst: &mut [u8]) -> usize;

    // -------------------------------------------------------------------------
    // Diagnostics (fire-and-forget)
    // -------------------------------------------------------------------------

    /// Prints text.
    fn print_str(&self, text: &str);

    /// Prints a signed integer.
    fn print_i64(&self, value: i64);

    /// Prints an unsigned integer.
    fn print_u64(&self, value: u64);

    /// Prints a boolean.
    fn print_bool(&self, value: bool);

    // -------------------------------------------------------------------------
    // Authorization
    // -------------------------------------------------------------------------

    /// Aborts unless `account` signed the current transaction.
    fn require_auth(&self, account: &str) -> Result<(), HostError>;

    /// Aborts unless the contract `name@owner` is the immediate caller.
    fn require_contract_auth(&self, owner: &str, name: &str) -> Result<(), HostError>;

    // -------------------------------------------------------------------------
    // Balances
    // -------------------------------------------------------------------------

    /// Balance of a user account.
    fn user_balance(&self, account: &str) -> u64;

    /// Balance of a contract.
    fn contract_balance(&self, owner: &str, name: &str) -> u64;

    // -------------------------------------------------------------------------
    // Storage (current contract's tables unless noted, raw bytes)
    // -------------------------------------------------------------------------

    /// Reads a record by encoded primary key.
    ///
    /// `None` when absent; otherwise buffer protocol over the record bytes.
    fn table_get_record(&self, table: &str, primary: &[u8], dst: &mut [u8]) -> Option<usize>;

    /// Inserts a record; a present key is [`HostError::DuplicateKey`].
    fn table_new_record(&self, table: &str, primary: &[u8], record: &[u8])
        -> Result<(), HostError>;

    /// Overwrites a record; an absent key is [`HostError::RecordNotFound`].
    fn table_update_record(
        &self,
        table: &str,
        primary: &[u8],
        record: &[u8],
    ) -> Result<(), HostError>;

    /// Deletes a record. Absent keys are a no-op.
    fn table_delete_record(&self, table: &str, primary: &[u8]) -> Result<(), HostError>;

    /// Smallest encoded primary key strictly greater than `after`
    /// (or the smallest key when `after` is `None`).
    ///
    /// `None` when the scan is exhausted; otherwise buffer protocol.
    fn table_next_primary(
        &self,
        table: &str,
        after: Option<&[u8]>,
        dst: &mut [u8],
    ) -> Option<usize>;

    /// Codec-encoded `Vec<(Vec<u8>, Vec<u8>)>` of every `(key, record)`
    /// pair, ascending by encoded key. Buffer protocol.
    fn table_enum_records(&self, table: &str, dst: &mut [u8]) -> usize;

    /// Reads a record from a table of the contract `name@owner`.
    ///
    /// Read-only. `None` when the contract, table or key is absent;
    /// otherwise buffer protocol over the record bytes.
    fn table_get_record_ex(
        &self,
        owner: &str,
        name: &str,
        table: &str,
        primary: &[u8],
        dst: &mut [u8],
    ) -> Option<usize>;

    // -------------------------------------------------------------------------
    // Call context (all buffer protocol unless noted)
    // -------------------------------------------------------------------------

    /// Length of the parameter blob.
    fn read_contract_params_length(&self) -> usize;

    /// Parameter blob.
    fn read_contract_params(&self, dst: &mut [u8]) -> usize;

    /// Owner account of the current contract.
    fn read_contract_owner(&self, dst: &mut [u8]) -> usize;

    /// Name of the current contract.
    fn read_contract_name(&self, dst: &mut [u8]) -> usize;

    /// Method being invoked.
    fn read_contract_method(&self, dst: &mut [u8]) -> usize;

    /// Account behind the invocation (see `CallContext::caller`).
    fn read_contract_caller(&self, dst: &mut [u8]) -> usize;

    /// Owner of the calling contract; empty when called by a user.
    fn read_calling_contract_owner(&self, dst: &mut [u8]) -> usize;

    /// Name of the calling contract; empty when called by a user.
    fn read_calling_contract_name(&self, dst: &mut [u8]) -> usize;

    /// Codec-encoded `Vec<CallerFrame>`, innermost first.
    fn read_caller_chain(&self, dst: &mut [u8]) -> usize;

    /// Whether the current frame was entered directly by a user. Not buffered.
    fn contract_called_by_user(&self) -> bool;

    /// Coins transferred into the current frame. Not buffered.
    fn read_contract_sender_value(&self) -> u64;

    // -------------------------------------------------------------------------
    // Value transfer (from the current contract)
    // -------------------------------------------------------------------------

    /// Moves coins from the current contract to a user.
    fn transfer_to_user(&self, to: &str, amount: u64, memo: &str) -> Result<(), HostError>;

    /// Moves coins from the current contract to another contract.
    fn transfer_to_contract(
        &self,
        owner: &str,
        name: &str,
        amount: u64,
        memo: &str,
    ) -> Result<(), HostError>;

    // -------------------------------------------------------------------------
    // Cross-contract invocation
    // -------------------------------------------------------------------------

    /// Runs `method` of `name@owner` synchronously, moving `coins` from the
    /// current contract to it. Failure leaves no effect of the callee.
    fn invoke(
        &self,
        owner: &str,
        name: &str,
        method: &str,
        params: &[u8],
        coins: u64,
    ) -> Result<(), HostError>;
}
