//! # Record Schemas
//!
//! Static shape of persisted records and the tables holding them.
//!
//! A record type declares its field order once through its codec impls and
//! publishes a [`RecordDescriptor`]. The descriptor's `singleton` tag is the
//! capability that lets a type live in a singleton slot; tables and
//! singletons otherwise share one storage engine.

use crate::domain::codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Static description of a record type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RecordDescriptor {
    /// Record type name published in the ABI.
    pub name: &'static str,
    /// Whether the type may be stored in a singleton slot.
    pub singleton: bool,
}

impl RecordDescriptor {
    /// Descriptor of a record stored in keyed tables.
    #[must_use]
    pub const fn table(name: &'static str) -> Self {
        Self {
            name,
            singleton: false,
        }
    }

    /// Descriptor of a singleton-storable record.
    #[must_use]
    pub const fn singleton(name: &'static str) -> Self {
        Self {
            name,
            singleton: true,
        }
    }
}

/// A persisted record type.
///
/// `Default` must produce the zero value: every integer `0`, every string and
/// sequence empty.
pub trait Record: Encode + Decode + Default + Clone {
    /// Static shape of this record type.
    const DESCRIPTOR: RecordDescriptor;
}

/// A record indexed by a primary key projection.
pub trait Keyed: Record {
    /// Key projection type.
    type Key: Encode + Clone + PartialEq + Debug;

    /// Derives the primary key from the record fields.
    fn primary_key(&self) -> Self::Key;

    /// Writes `key` into the fields composing the primary key.
    fn set_primary_key(&mut self, key: Self::Key);
}

/// Declaration of a table within a contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name, unique within the contract.
    pub name: String,
    /// Record type name.
    pub record: String,
    /// Whether this is a singleton slot.
    pub singleton: bool,
}
