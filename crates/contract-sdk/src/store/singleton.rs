//! # Singleton Store
//!
//! A table holding at most one record, stored under a fixed key.

use crate::domain::codec::Encode;
use crate::domain::schema::{Record, TableDescriptor};
use crate::errors::{ContractError, ContractResult};
use crate::runtime::Runtime;
use crate::store::engine::StoreEngine;
use std::marker::PhantomData;

/// Fixed primary key of every singleton slot.
const SLOT_KEY: u64 = 0;

/// A named single-record slot of `R`.
#[derive(Debug)]
pub struct Singleton<R> {
    engine: StoreEngine,
    key: Vec<u8>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Singleton<R> {
    /// Declares a singleton slot.
    ///
    /// `R` must be tagged as a singleton record
    /// ([`crate::domain::RecordDescriptor::singleton`]); anything else is
    /// [`ContractError::InvalidDeclaration`].
    pub fn declare(name: impl Into<String>) -> ContractResult<Self> {
        let name = name.into();
        if !R::DESCRIPTOR.singleton {
            return Err(ContractError::InvalidDeclaration(format!(
                "record {} of singleton {name} is not tagged singleton",
                R::DESCRIPTOR.name
            )));
        }
        Ok(Self {
            engine: StoreEngine::new(name, R::DESCRIPTOR, true),
            key: SLOT_KEY.encode(),
            _record: PhantomData,
        })
    }

    /// Slot name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.engine.name()
    }

    /// Declaration published in the contract ABI.
    #[must_use]
    pub fn descriptor(&self) -> TableDescriptor {
        self.engine.descriptor()
    }

    /// Whether the slot holds a record.
    #[must_use]
    pub fn exists(&self, rt: &Runtime<'_>) -> bool {
        self.engine.contains(rt, &self.key)
    }

    /// The stored record; [`ContractError::NotFound`] if empty.
    pub fn get(&self, rt: &Runtime<'_>) -> ContractResult<R> {
        self.engine.fetch(rt, &self.key)
    }

    /// The stored record, or the zero-valued record. Never writes.
    pub fn get_or_default(&self, rt: &Runtime<'_>) -> ContractResult<R> {
        Ok(self.engine.load(rt, &self.key)?.unwrap_or_default())
    }

    /// The stored record, storing a zero-valued one first if empty.
    pub fn get_or_create(&self, rt: &Runtime<'_>) -> ContractResult<R> {
        if let Some(record) = self.engine.load(rt, &self.key)? {
            return Ok(record);
        }
        let record = R::default();
        self.engine.create(rt, &self.key, &record)?;
        Ok(record)
    }

    /// Fills the empty slot; an occupied slot is [`ContractError::DuplicateKey`].
    pub fn insert<F>(&self, rt: &Runtime<'_>, builder: F) -> ContractResult<R>
    where
        F: FnOnce(&mut R),
    {
        let mut record = R::default();
        builder(&mut record);
        self.engine.create(rt, &self.key, &record)?;
        Ok(record)
    }

    /// Applies `mutator` to the stored record; [`ContractError::NotFound`] if
    /// empty.
    pub fn update<F>(&self, rt: &Runtime<'_>, mutator: F) -> ContractResult<()>
    where
        F: FnOnce(&mut R),
    {
        let mut record: R = self.engine.fetch(rt, &self.key)?;
        mutator(&mut record);
        self.engine.overwrite(rt, &self.key, &record)
    }

    /// Clears the slot. An empty slot is not an error.
    pub fn remove(&self, rt: &Runtime<'_>) -> ContractResult<()> {
        self.engine.erase(rt, &self.key)
    }
}
