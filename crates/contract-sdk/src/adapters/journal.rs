//! # Journaled World State
//!
//! Balances and contract tables of the in-memory host, with an undo log.
//!
//! Every mutation records the value it replaced. A [`Checkpoint`] marks a
//! position in the log; reverting to it replays the undo entries newest
//! first, restoring exactly the state at the checkpoint. Nested checkpoints
//! are just later positions, so a nested revert leaves the parent's earlier
//! changes in place.

use crate::domain::invariants::check_value_conservation_invariant;
use crate::domain::value_objects::{AccountName, ContractName};
use crate::errors::HostError;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

/// Undo entry: the value a mutation replaced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateChange {
    /// A user balance was overwritten.
    UserBalance {
        account: AccountName,
        previous: u64,
    },
    /// A contract balance was overwritten.
    ContractBalance {
        contract: ContractName,
        previous: u64,
    },
    /// A record was inserted, overwritten or deleted.
    Record {
        contract: ContractName,
        table: String,
        key: Vec<u8>,
        previous: Option<Vec<u8>>,
    },
}

/// Position in the undo log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint(usize);

/// A coin holder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Holder<'a> {
    /// User account.
    User(&'a AccountName),
    /// Deployed contract.
    Contract(&'a ContractName),
}

impl Holder<'_> {
    fn label(&self) -> String {
        match self {
            Self::User(account) => account.to_string(),
            Self::Contract(contract) => contract.to_string(),
        }
    }
}

type Rows = BTreeMap<Vec<u8>, Vec<u8>>;

/// Balances, tables and the undo log.
#[derive(Debug, Default)]
pub struct JournaledState {
    users: HashMap<AccountName, u64>,
    contracts: HashMap<ContractName, u64>,
    tables: HashMap<(ContractName, String), Rows>,
    journal: Vec<StateChange>,
}

impl JournaledState {
    /// Create an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Journal
    // -------------------------------------------------------------------------

    /// Marks the current position of the undo log.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.journal.len())
    }

    /// Undoes every change made after `checkpoint`.
    ///
    /// Returns the number of changes undone.
    pub fn revert_to(&mut self, checkpoint: Checkpoint) -> usize {
        let mut undone = 0;
        while self.journal.len() > checkpoint.0 {
            let Some(change) = self.journal.pop() else {
                break;
            };
            self.undo(change);
            undone += 1;
        }
        undone
    }

    /// Makes every change durable by discarding the undo log.
    pub fn commit(&mut self) {
        self.journal.clear();
    }

    /// Number of pending undo entries.
    #[must_use]
    pub fn pending_changes(&self) -> usize {
        self.journal.len()
    }

    fn undo(&mut self, change: StateChange) {
        match change {
            StateChange::UserBalance { account, previous } => {
                self.users.insert(account, previous);
            }
            StateChange::ContractBalance { contract, previous } => {
                self.contracts.insert(contract, previous);
            }
            StateChange::Record {
                contract,
                table,
                key,
                previous,
            } => {
                let rows = self.tables.entry((contract, table)).or_default();
                match previous {
                    Some(bytes) => {
                        rows.insert(key, bytes);
                    }
                    None => {
                        rows.remove(&key);
                    }
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Balances
    // -------------------------------------------------------------------------

    /// Balance of a holder; unknown holders have zero.
    #[must_use]
    pub fn balance(&self, holder: Holder<'_>) -> u64 {
        match holder {
            Holder::User(account) => self.users.get(account).copied().unwrap_or(0),
            Holder::Contract(contract) => self.contracts.get(contract).copied().unwrap_or(0),
        }
    }

    /// Overwrites a balance, journaling the previous one.
    pub fn set_balance(&mut self, holder: Holder<'_>, amount: u64) {
        let previous = self.balance(holder);
        match holder {
            Holder::User(account) => {
                self.journal.push(StateChange::UserBalance {
                    account: account.clone(),
                    previous,
                });
                self.users.insert(account.clone(), amount);
            }
            Holder::Contract(contract) => {
                self.journal.push(StateChange::ContractBalance {
                    contract: contract.clone(),
                    previous,
                });
                self.contracts.insert(contract.clone(), amount);
            }
        }
    }

    /// Moves `amount` coins between holders. Zero amounts are a no-op.
    pub fn move_value(
        &mut self,
        from: Holder<'_>,
        to: Holder<'_>,
        amount: u64,
    ) -> Result<(), HostError> {
        if amount == 0 || from == to {
            return Ok(());
        }
        let from_before = self.balance(from);
        let to_before = self.balance(to);
        let from_after = from_before
            .checked_sub(amount)
            .ok_or_else(|| HostError::InsufficientBalance {
                holder: from.label(),
                required: amount,
                available: from_before,
            })?;
        let to_after = to_before
            .checked_add(amount)
            .ok_or_else(|| HostError::BalanceOverflow { holder: to.label() })?;
        debug_assert!(check_value_conservation_invariant(
            &[from_before, to_before],
            &[from_after, to_after]
        ));
        self.set_balance(from, from_after);
        self.set_balance(to, to_after);
        Ok(())
    }

    /// Every balance held, users then contracts.
    #[must_use]
    pub fn balances(&self) -> Vec<u64> {
        self.users
            .values()
            .chain(self.contracts.values())
            .copied()
            .collect()
    }

    // -------------------------------------------------------------------------
    // Tables
    // -------------------------------------------------------------------------

    /// Record bytes under `key`.
    #[must_use]
    pub fn record(&self, contract: &ContractName, table: &str, key: &[u8]) -> Option<&[u8]> {
        self.tables
            .get(&(contract.clone(), table.to_string()))
            .and_then(|rows| rows.get(key))
            .map(Vec::as_slice)
    }

    /// Writes or deletes a record, journaling the previous bytes.
    pub fn put_record(
        &mut self,
        contract: &ContractName,
        table: &str,
        key: &[u8],
        value: Option<Vec<u8>>,
    ) {
        let rows = self
            .tables
            .entry((contract.clone(), table.to_string()))
            .or_default();
        let previous = match value {
            Some(bytes) => rows.insert(key.to_vec(), bytes),
            None => rows.remove(key),
        };
        self.journal.push(StateChange::Record {
            contract: contract.clone(),
            table: table.to_string(),
            key: key.to_vec(),
            previous,
        });
    }

    /// Smallest key strictly greater than `after`, or the smallest key.
    #[must_use]
    pub fn next_key(
        &self,
        contract: &ContractName,
        table: &str,
        after: Option<&[u8]>,
    ) -> Option<&[u8]> {
        let rows = self.tables.get(&(contract.clone(), table.to_string()))?;
        let lower = match after {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };
        rows.range::<[u8], _>((lower, Bound::Unbounded))
            .next()
            .map(|(k, _)| k.as_slice())
    }

    /// All rows of a table, ascending by key.
    #[must_use]
    pub fn rows(&self, contract: &ContractName, table: &str) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.tables
            .get(&(contract.clone(), table.to_string()))
            .map(|rows| rows.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }
}

// =============================================================================
// TESTS
// =============================================================================
