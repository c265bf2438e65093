//! # Contract SDK - Guest-Side Smart Contract Core
//!
//! Everything a sandboxed contract needs to talk to its host: a
//! deterministic record codec, typed persistent tables, method dispatch and
//! synchronous cross-contract calls, all over a narrow host-call ABI.
//!
//! ## Purpose
//!
//! Contract logic is written against typed records and a read-only
//! [`CallContext`](domain::CallContext). The SDK turns that into raw host
//! calls: bytes in, bytes out, with variable-length results fetched through
//! the query-then-fetch buffer protocol.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Decode is exact (no short reads, no trailing bytes) | `domain/codec.rs` - `Decode::decode` |
//! | One record per primary key | `store/engine.rs` - `StoreEngine::create` |
//! | Updates never move a record to another key | `store/table.rs` - `Table::update` |
//! | Unknown methods never reach handler code | `dispatcher.rs` - `Dispatcher::dispatch` |
//! | Nested frames sit one level deeper | `domain/invariants.rs` - `check_nested_frame_invariant()` |
//! | Call depth within the host limit | `domain/invariants.rs` - `check_call_depth_invariant()` |
//! | Coins conserved by every invocation | `domain/invariants.rs` - `check_value_conservation_invariant()` |
//! | An abort anywhere reverts the whole chain | `adapters/memory_host.rs` - `InMemoryHost::guarded` |
//!
//! ## Layout
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Codec | `domain/codec.rs` | `Encode` / `Decode` / `Params` |
//! | Buffer protocol | `domain/buffer.rs` | Query-then-fetch reads |
//! | Call context | `domain/context.rs` | Caller chain, depth, value |
//! | Host ABI | `ports/outbound.rs` | `HostAbi` trait |
//! | Runtime | `runtime.rs` | Typed host wrappers |
//! | Store | `store/` | `Table`, `Singleton` |
//! | Dispatcher | `dispatcher.rs` | Export list, ABI descriptor |
//! | Bridge | `bridge.rs` | Cross-contract calls |
//! | Reference host | `adapters/` | `InMemoryHost`, journal |
//!
//! ## Usage Example
//!
//! ```ignore
//! use contract_sdk::prelude::*;
//!
//! let host = InMemoryHost::new();
//! host.deploy(ContractName::new("alice", "token"), token::contract()?);
//! host.apply(&Invocation::new("alice", token, "create", &(issuer, supply)))?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod bridge;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod runtime;
pub mod store;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Codec and schema
    pub use crate::domain::codec::{Decode, Decoder, Encode, Encoder, Params};
    pub use crate::domain::schema::{Keyed, Record, RecordDescriptor, TableDescriptor};

    // Value objects
    pub use crate::domain::context::CallContext;
    pub use crate::domain::value_objects::{AccountName, CallerFrame, Checksum256, ContractName};

    // Errors
    pub use crate::errors::{CodecError, ContractError, ContractResult, ErrorKind, HostError};

    // Ports
    pub use crate::ports::inbound::ContractEntry;
    pub use crate::ports::outbound::HostAbi;

    // Guest core
    pub use crate::bridge::CallRequest;
    pub use crate::dispatcher::{ContractAbi, Dispatcher, MethodAbi};
    pub use crate::runtime::{ensure, Runtime};
    pub use crate::store::{Singleton, Table};

    // Reference host
    pub use crate::adapters::{InMemoryHost, Invocation};
    pub use crate::config::HostConfig;
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
