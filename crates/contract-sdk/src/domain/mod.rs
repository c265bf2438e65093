//! # Domain Layer (Inner Hexagon)
//!
//! Pure guest-side logic: codec, buffer convention, identities and the
//! call context. NO host calls happen in this layer.

pub mod buffer;
pub mod codec;
pub mod context;
pub mod invariants;
pub mod schema;
pub mod value_objects;

pub use codec::{Decode, Decoder, Encode, Encoder, Params};
pub use context::CallContext;
pub use invariants::*;
pub use schema::{Keyed, Record, RecordDescriptor, TableDescriptor};
pub use value_objects::*;
