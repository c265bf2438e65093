//! Shared storage engine behind tables and singleton slots.
//!
//! Keys and records cross the host edge as codec bytes; the host never
//! interprets them. Reads follow the buffer protocol.

use crate::domain::buffer;
use crate::domain::codec::{Decode, Encode};
use crate::domain::schema::{Record, RecordDescriptor, TableDescriptor};
use crate::domain::value_objects::ContractName;
use crate::errors::{ContractError, ContractResult};
use crate::runtime::Runtime;
use tracing::trace;

/// Raw record access for one named table of the current contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreEngine {
    table: String,
    record: RecordDescriptor,
    singleton: bool,
}

impl StoreEngine {
    pub(crate) fn new(table: impl Into<String>, record: RecordDescriptor, singleton: bool) -> Self {
        Self {
            table: table.into(),
            record,
            singleton,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.table
    }

    pub(crate) fn descriptor(&self) -> TableDescriptor {
        TableDescriptor {
            name: self.table.clone(),
            record: self.record.name.to_string(),
            singleton: self.singleton,
        }
    }

    fn not_found(&self, key: &[u8]) -> ContractError {
        ContractError::NotFound {
            table: self.table.clone(),
            key: hex::encode(key),
        }
    }

    pub(crate) fn contains(&self, rt: &Runtime<'_>, key: &[u8]) -> bool {
        rt.host()
            .table_get_record(&self.table, key, &mut [])
            .is_some()
    }

    pub(crate) fn load_raw(&self, rt: &Runtime<'_>, key: &[u8]) -> ContractResult<Option<Vec<u8>>> {
        let host = rt.host();
        self.read_record(key, |dst| host.table_get_record(&self.table, key, dst))
    }

    /// Reads the same table of another contract, without write access.
    pub(crate) fn load_raw_from(
        &self,
        rt: &Runtime<'_>,
        contract: &ContractName,
        key: &[u8],
    ) -> ContractResult<Option<Vec<u8>>> {
        let host = rt.host();
        self.read_record(key, |dst| {
            host.table_get_record_ex(contract.owner.as_str(), &contract.name, &self.table, key, dst)
        })
    }

    fn read_record<F>(&self, key: &[u8], read: F) -> ContractResult<Option<Vec<u8>>>
    where
        F: Fn(&mut [u8]) -> Option<usize>,
    {
        let Some(required) = read(&mut []) else {
            return Ok(None);
        };
        if required == 0 {
            return Ok(Some(Vec::new()));
        }
        let mut buf = vec![0u8; required];
        match read(&mut buf) {
            Some(written) if written == required => Ok(Some(buf)),
            other => Err(ContractError::HostFault(format!(
                "record {} of {} changed size during read: {required} then {other:?}",
                hex::encode(key),
                self.table
            ))),
        }
    }

    pub(crate) fn load<R: Record>(&self, rt: &Runtime<'_>, key: &[u8]) -> ContractResult<Option<R>> {
        match self.load_raw(rt, key)? {
            Some(bytes) => Ok(Some(R::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn fetch<R: Record>(&self, rt: &Runtime<'_>, key: &[u8]) -> ContractResult<R> {
        self.load(rt, key)?.ok_or_else(|| self.not_found(key))
    }

    pub(crate) fn fetch_from<R: Record>(
        &self,
        rt: &Runtime<'_>,
        contract: &ContractName,
        key: &[u8],
    ) -> ContractResult<R> {
        match self.load_raw_from(rt, contract, key)? {
            Some(bytes) => Ok(R::decode(&bytes)?),
            None => Err(ContractError::NotFound {
                table: format!("{}@{contract}", self.table),
                key: hex::encode(key),
            }),
        }
    }

    pub(crate) fn create<R: Record>(&self, rt: &Runtime<'_>, key: &[u8], record: &R) -> ContractResult<()> {
        if self.contains(rt, key) {
            return Err(ContractError::DuplicateKey {
                table: self.table.clone(),
                key: hex::encode(key),
            });
        }
        trace!(table = %self.table, key = %hex::encode(key), "insert record");
        rt.host()
            .table_new_record(&self.table, key, &record.try_encode()?)?;
        Ok(())
    }

    pub(crate) fn overwrite<R: Record>(
        &self,
        rt: &Runtime<'_>,
        key: &[u8],
        record: &R,
    ) -> ContractResult<()> {
        trace!(table = %self.table, key = %hex::encode(key), "update record");
        rt.host()
            .table_update_record(&self.table, key, &record.try_encode()?)?;
        Ok(())
    }

    pub(crate) fn erase(&self, rt: &Runtime<'_>, key: &[u8]) -> ContractResult<()> {
        trace!(table = %self.table, key = %hex::encode(key), "remove record");
        rt.host().table_delete_record(&self.table, key)?;
        Ok(())
    }

    pub(crate) fn next_key(
        &self,
        rt: &Runtime<'_>,
        after: Option<&[u8]>,
    ) -> ContractResult<Option<Vec<u8>>> {
        let host = rt.host();
        let Some(required) = host.table_next_primary(&self.table, after, &mut []) else {
            return Ok(None);
        };
        let mut buf = vec![0u8; required];
        match host.table_next_primary(&self.table, after, &mut buf) {
            Some(written) if written == required => Ok(Some(buf)),
            other => Err(ContractError::HostFault(format!(
                "scan of {} returned {other:?} after announcing {required} bytes",
                self.table
            ))),
        }
    }

    /// Every `(key, record)` pair in ascending key-byte order, fetched with
    /// one buffered host read.
    pub(crate) fn scan(&self, rt: &Runtime<'_>) -> ContractResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let host = rt.host();
        let bytes = buffer::fetch(|dst| host.table_enum_records(&self.table, dst))?;
        let rows = Vec::<(Vec<u8>, Vec<u8>)>::decode(&bytes)?;
        trace!(table = %self.table, rows = rows.len(), "scan table");
        Ok(rows)
    }

    pub(crate) fn decode_key<K: Decode>(key: &[u8]) -> ContractResult<K> {
        Ok(K::decode(key)?)
    }
}
