//! # Error Types
//!
//! All error types raised across the guest/host edge.
//!
//! Every failure unwinds to the top-level invocation boundary; nothing here
//! is recovered locally. [`ContractError::kind`] classifies each variant
//! into one of the six failure kinds observed by users.

use thiserror::Error;

// =============================================================================
// CODEC ERRORS
// =============================================================================

/// Errors raised while decoding a buffer against a declared schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Buffer ended before the declared schema was satisfied.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// Bytes left over after the top-level value was decoded.
    #[error("{count} trailing bytes after decoded value")]
    TrailingBytes { count: usize },

    /// Boolean byte other than 0 or 1.
    #[error("invalid bool byte: 0x{0:02X}")]
    InvalidBool(u8),

    /// String bytes are not valid UTF-8.
    #[error("invalid utf-8 in string field")]
    InvalidUtf8,

    /// Unknown variant tag for a tagged host value.
    #[error("invalid variant tag {tag} for {type_name}")]
    InvalidTag { tag: u8, type_name: &'static str },

    /// Length does not fit the fixed-width prefix.
    #[error("length {0} exceeds the u32 prefix range")]
    LengthOverflow(usize),
}

// =============================================================================
// HOST ERRORS
// =============================================================================

/// Failures reported by the host side of a host call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Required authority was not present.
    #[error("missing authority of {principal}")]
    Unauthorized { principal: String },

    /// Balance too small for a transfer.
    #[error("insufficient balance of {holder}: required {required}, available {available}")]
    InsufficientBalance {
        holder: String,
        required: u64,
        available: u64,
    },

    /// Credit would overflow the recipient's balance.
    #[error("balance of {holder} would overflow")]
    BalanceOverflow { holder: String },

    /// Insert addressed a key that is already present.
    #[error("duplicate primary key {key} in table {table}")]
    DuplicateKey { table: String, key: String },

    /// Update addressed a key that is absent.
    #[error("record {key} not found in table {table}")]
    RecordNotFound { table: String, key: String },

    /// Target contract is not deployed.
    #[error("unknown contract: {0}")]
    UnknownContract(String),

    /// Nested invocation would exceed the depth limit.
    #[error("call depth exceeded: {depth} > {max}")]
    CallDepthExceeded { depth: u32, max: u32 },

    /// A value exceeded a configured size limit.
    #[error("{what} too large: {size} > {max} bytes")]
    LimitExceeded {
        what: &'static str,
        size: usize,
        max: usize,
    },

    /// Host call issued outside of any invocation frame.
    #[error("no active invocation frame")]
    NoActiveFrame,

    /// Nested invocation aborted with the carried error.
    #[error("nested call failed: {0}")]
    CallFailed(Box<ContractError>),

    /// The invocation chain already aborted with the carried error; no
    /// further effects are accepted.
    #[error("invocation already aborted: {0}")]
    Aborted(Box<ContractError>),
}

// =============================================================================
// CONTRACT ERRORS
// =============================================================================

/// The user-visible failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Business-rule check failed.
    AssertionFailure,
    /// Required-authority check failed.
    AuthorizationFailure,
    /// Keyed read or update addressed an absent record.
    NotFound,
    /// Dispatch targeted a method outside the export list.
    UnknownMethod,
    /// Buffer inconsistent with the declared schema.
    EncodingFault,
    /// Externally enforced limit exceeded.
    ResourceExceeded,
}

/// Errors raised by contract code and the guest-side core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// An explicit business-rule check failed.
    #[error("assertion failed: {0}")]
    AssertionFailure(String),

    /// A required-authority check failed.
    #[error("authorization failed: missing authority of {principal}")]
    AuthorizationFailure { principal: String },

    /// `get`/`update` addressed an absent key.
    #[error("record {key} not found in table {table}")]
    NotFound { table: String, key: String },

    /// Method is not in the contract's export list.
    #[error("unknown method {method} on contract {contract}")]
    UnknownMethod { contract: String, method: String },

    /// Invocation targeted a contract that is not deployed.
    #[error("unknown contract: {0}")]
    UnknownContract(String),

    /// Decode failure.
    #[error("encoding fault: {0}")]
    Encoding(#[from] CodecError),

    /// Host reported an external limit violation.
    #[error("resource exceeded: {0}")]
    ResourceExceeded(String),

    /// Insert would create a second record with the same key.
    #[error("duplicate primary key {key} in table {table}")]
    DuplicateKey { table: String, key: String },

    /// An update mutator changed the primary key fields.
    #[error("update changed primary key {key} in table {table}")]
    PrimaryKeyChanged { table: String, key: String },

    /// Static contract shape is invalid (duplicate names, wrong record tag).
    #[error("invalid declaration: {0}")]
    InvalidDeclaration(String),

    /// Host answered inconsistently with the call convention.
    #[error("host fault: {0}")]
    HostFault(String),
}

impl ContractError {
    /// Builds an [`ContractError::AssertionFailure`].
    pub fn assertion(msg: impl Into<String>) -> Self {
        Self::AssertionFailure(msg.into())
    }

    /// Failure class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AssertionFailure(_)
            | Self::DuplicateKey { .. }
            | Self::PrimaryKeyChanged { .. }
            | Self::InvalidDeclaration(_) => ErrorKind::AssertionFailure,
            Self::AuthorizationFailure { .. } => ErrorKind::AuthorizationFailure,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::UnknownMethod { .. } | Self::UnknownContract(_) => ErrorKind::UnknownMethod,
            Self::Encoding(_) | Self::HostFault(_) => ErrorKind::EncodingFault,
            Self::ResourceExceeded(_) => ErrorKind::ResourceExceeded,
        }
    }
}

impl From<HostError> for ContractError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Unauthorized { principal } => Self::AuthorizationFailure { principal },
            HostError::InsufficientBalance { .. } => Self::AssertionFailure(err.to_string()),
            HostError::DuplicateKey { table, key } => Self::DuplicateKey { table, key },
            HostError::RecordNotFound { table, key } => Self::NotFound { table, key },
            HostError::UnknownContract(name) => Self::UnknownContract(name),
            HostError::BalanceOverflow { .. }
            | HostError::CallDepthExceeded { .. }
            | HostError::LimitExceeded { .. } => {
                Self::ResourceExceeded(err.to_string())
            }
            HostError::NoActiveFrame => Self::HostFault(err.to_string()),
            HostError::CallFailed(inner) | HostError::Aborted(inner) => *inner,
        }
    }
}

/// Result alias used by contract code.
pub type ContractResult<T> = Result<T, ContractError>;

// =============================================================================
// TESTS
// =============================================================================
