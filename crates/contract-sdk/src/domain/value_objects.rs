//! # Value Objects
//!
//! Identity primitives shared by the guest core and the host.
//! These types are defined by their value and compared by exact equality.

use crate::domain::codec::{Decode, Decoder, Encode, Encoder};
use crate::errors::CodecError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

// =============================================================================
// ACCOUNT NAME
// =============================================================================

/// An opaque account name token.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct AccountName(String);

impl AccountName {
    /// Creates an account name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the empty name.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for AccountName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Encode for AccountName {
    fn encode_to(&self, enc: &mut Encoder) {
        self.0.encode_to(enc);
    }
}

impl Decode for AccountName {
    fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        Ok(Self(dec.take()?))
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("name")
    }
}

// =============================================================================
// CONTRACT NAME
// =============================================================================

/// Contract identity: the owning account plus the contract's own name.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ContractName {
    /// Account that deployed the contract.
    pub owner: AccountName,
    /// Contract name, unique per owner.
    pub name: String,
}

impl ContractName {
    /// Creates a contract identity.
    pub fn new(owner: impl Into<AccountName>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// The owner account.
    #[must_use]
    pub fn account(&self) -> &AccountName {
        &self.owner
    }
}

impl fmt::Debug for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.owner)
    }
}

impl fmt::Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.owner)
    }
}

impl Encode for ContractName {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put(&self.owner).put(&self.name);
    }
}

impl Decode for ContractName {
    fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            owner: dec.take()?,
            name: dec.take()?,
        })
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("contract_name")
    }
}

// =============================================================================
// CALLER FRAME
// =============================================================================

/// One entry of a caller chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallerFrame {
    /// A signing user account.
    User(AccountName),
    /// A calling contract.
    Contract(ContractName),
}

impl CallerFrame {
    const USER_TAG: u8 = 0;
    const CONTRACT_TAG: u8 = 1;

    /// Returns the user account, if this frame is a user.
    #[must_use]
    pub fn as_user(&self) -> Option<&AccountName> {
        match self {
            Self::User(account) => Some(account),
            Self::Contract(_) => None,
        }
    }

    /// Returns the contract identity, if this frame is a contract.
    #[must_use]
    pub fn as_contract(&self) -> Option<&ContractName> {
        match self {
            Self::User(_) => None,
            Self::Contract(contract) => Some(contract),
        }
    }
}

// Host wire format: one tag byte, then the payload.
impl Encode for CallerFrame {
    fn encode_to(&self, enc: &mut Encoder) {
        match self {
            Self::User(account) => {
                enc.put(&Self::USER_TAG).put(account);
            }
            Self::Contract(contract) => {
                enc.put(&Self::CONTRACT_TAG).put(contract);
            }
        }
    }
}

impl Decode for CallerFrame {
    fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        match dec.take::<u8>()? {
            Self::USER_TAG => Ok(Self::User(dec.take()?)),
            Self::CONTRACT_TAG => Ok(Self::Contract(dec.take()?)),
            tag => Err(CodecError::InvalidTag {
                tag,
                type_name: "CallerFrame",
            }),
        }
    }
}

// =============================================================================
// CHECKSUM (32 bytes)
// =============================================================================

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Checksum256(pub [u8; 32]);

impl Checksum256 {
    /// Digest width in bytes.
    pub const LEN: usize = 32;

    /// Creates a checksum from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(slice).ok().map(Self)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Checksum256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Checksum256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Encode for Checksum256 {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put(&self.0);
    }
}

impl Decode for Checksum256 {
    fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        Ok(Self(dec.take()?))
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("checksum256")
    }
}

// =============================================================================
// TESTS
// =============================================================================
