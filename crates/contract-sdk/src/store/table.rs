//! # Table Store
//!
//! Primary-key-indexed CRUD over a host key/value namespace.
//!
//! Keys are the codec encoding of [`Keyed::primary_key`]. The store enforces
//! key uniqueness on insert and key stability on update; neither is left to
//! caller discipline.

use crate::domain::codec::{Decode, Encode};
use crate::domain::schema::{Keyed, TableDescriptor};
use crate::domain::value_objects::ContractName;
use crate::errors::{ContractError, ContractResult};
use crate::runtime::Runtime;
use crate::store::engine::StoreEngine;
use std::marker::PhantomData;

/// A named table of `R` records owned by the current contract.
#[derive(Debug)]
pub struct Table<R> {
    engine: StoreEngine,
    _record: PhantomData<fn() -> R>,
}

impl<R: Keyed> Table<R> {
    /// Declares a table. Called once while constructing the contract.
    pub fn declare(name: impl Into<String>) -> Self {
        Self {
            engine: StoreEngine::new(name, R::DESCRIPTOR, false),
            _record: PhantomData,
        }
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.engine.name()
    }

    /// Declaration published in the contract ABI.
    #[must_use]
    pub fn descriptor(&self) -> TableDescriptor {
        self.engine.descriptor()
    }

    /// Whether a record with `key` is present.
    #[must_use]
    pub fn has(&self, rt: &Runtime<'_>, key: &R::Key) -> bool {
        self.engine.contains(rt, &key.encode())
    }

    /// The record under `key`; [`ContractError::NotFound`] if absent.
    pub fn get(&self, rt: &Runtime<'_>, key: &R::Key) -> ContractResult<R> {
        self.engine.fetch(rt, &key.encode())
    }

    /// The record under `key`, or the zero-valued record. Never writes.
    pub fn get_or_default(&self, rt: &Runtime<'_>, key: &R::Key) -> ContractResult<R> {
        Ok(self.engine.load(rt, &key.encode())?.unwrap_or_default())
    }

    /// Populates a zero-valued record with `builder` and stores it under the
    /// key it ends up with. An existing key is [`ContractError::DuplicateKey`].
    pub fn insert<F>(&self, rt: &Runtime<'_>, builder: F) -> ContractResult<R>
    where
        F: FnOnce(&mut R),
    {
        let mut record = R::default();
        builder(&mut record);
        self.engine
            .create(rt, &record.primary_key().encode(), &record)?;
        Ok(record)
    }

    /// Applies `mutator` to the record under `key` and writes it back.
    ///
    /// Absent keys are [`ContractError::NotFound`]. A mutator that changes
    /// the primary key is rejected with [`ContractError::PrimaryKeyChanged`]
    /// and nothing is written.
    pub fn update<F>(&self, rt: &Runtime<'_>, key: &R::Key, mutator: F) -> ContractResult<()>
    where
        F: FnOnce(&mut R),
    {
        let encoded = key.encode();
        let mut record: R = self.engine.fetch(rt, &encoded)?;
        mutator(&mut record);
        if record.primary_key() != *key {
            return Err(ContractError::PrimaryKeyChanged {
                table: self.name().to_string(),
                key: hex::encode(&encoded),
            });
        }
        self.engine.overwrite(rt, &encoded, &record)
    }

    /// Deletes the record under `key`. Absent keys are not an error.
    pub fn remove(&self, rt: &Runtime<'_>, key: &R::Key) -> ContractResult<()> {
        self.engine.erase(rt, &key.encode())
    }

    /// The record under `key`, inserting a zero-valued one keyed by `key`
    /// first if absent.
    pub fn get_or_create(&self, rt: &Runtime<'_>, key: &R::Key) -> ContractResult<R> {
        let encoded = key.encode();
        if let Some(record) = self.engine.load(rt, &encoded)? {
            return Ok(record);
        }
        let mut record = R::default();
        record.set_primary_key(key.clone());
        self.engine.create(rt, &encoded, &record)?;
        Ok(record)
    }

    /// The record under `key` in the same-named table of `contract`.
    ///
    /// Read-only access to another contract's state; [`ContractError::NotFound`]
    /// if absent.
    pub fn get_from(
        &self,
        rt: &Runtime<'_>,
        contract: &ContractName,
        key: &R::Key,
    ) -> ContractResult<R> {
        self.engine.fetch_from(rt, contract, &key.encode())
    }

    /// Number of records.
    pub fn len(&self, rt: &Runtime<'_>) -> ContractResult<usize> {
        Ok(self.engine.scan(rt)?.len())
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self, rt: &Runtime<'_>) -> ContractResult<bool> {
        Ok(self.engine.next_key(rt, None)?.is_none())
    }

    /// All keys, ascending by encoded bytes.
    pub fn keys(&self, rt: &Runtime<'_>) -> ContractResult<Vec<R::Key>>
    where
        R::Key: Decode,
    {
        self.engine
            .scan(rt)?
            .iter()
            .map(|(k, _)| StoreEngine::decode_key(k))
            .collect()
    }

    /// All records, ascending by encoded key bytes.
    pub fn records(&self, rt: &Runtime<'_>) -> ContractResult<Vec<R>> {
        self.engine
            .scan(rt)?
            .iter()
            .map(|(_, bytes)| R::decode(bytes).map_err(ContractError::from))
            .collect()
    }

    /// Records with `start <= key < limit`, ordered by the key's own
    /// ordering (descending when `reverse`), at most `max` of them.
    ///
    /// A missing bound is open; `max == 0` means no cap. Encoded keys are
    /// little-endian, so ordering is applied to decoded keys rather than to
    /// key bytes.
    pub fn range(
        &self,
        rt: &Runtime<'_>,
        start: Option<&R::Key>,
        limit: Option<&R::Key>,
        reverse: bool,
        max: usize,
    ) -> ContractResult<Vec<R>>
    where
        R::Key: Decode + Ord,
    {
        let mut hits = Vec::new();
        for (key, bytes) in self.engine.scan(rt)? {
            let key: R::Key = StoreEngine::decode_key(&key)?;
            let above = start.is_none_or(|s| key >= *s);
            let below = limit.is_none_or(|l| key < *l);
            if above && below {
                hits.push((key, bytes));
            }
        }
        hits.sort_by(|a, b| a.0.cmp(&b.0));
        if reverse {
            hits.reverse();
        }
        if max > 0 {
            hits.truncate(max);
        }
        hits.iter()
            .map(|(_, bytes)| R::decode(bytes).map_err(ContractError::from))
            .collect()
    }
}
