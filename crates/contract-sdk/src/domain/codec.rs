//! # Record Codec
//!
//! Deterministic binary encoding of structured records.
//!
//! A value encodes as the concatenation of its fields in declared order,
//! with no padding and no type tags:
//!
//! | Type | Encoding |
//! |------|----------|
//! | `u8`..`u64`, `i8`..`i64` | little-endian, natural width |
//! | `bool` | one byte, `0` or `1` |
//! | `String` | `u32` LE byte length, then UTF-8 bytes |
//! | `Vec<T>` | `u32` LE element count, then each element |
//! | `[u8; N]` | `N` raw bytes |
//! | tuples / records | members in declared order |
//!
//! Decoding is strict: a short buffer, a non-canonical bool or trailing bytes
//! after a top-level value are all faults, so a successful `decode(b)`
//! always re-encodes to exactly `b`.

use crate::errors::CodecError;
use std::borrow::Cow;

// =============================================================================
// ENCODER
// =============================================================================

/// Append-only output buffer.
#[derive(Debug, Default, Clone)]
pub struct Encoder {
    buf: Vec<u8>,
    overflow: Option<usize>,
}

impl Encoder {
    /// Creates an empty encoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one encodable value.
    pub fn put<T: Encode + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.encode_to(self);
        self
    }

    /// Appends raw bytes with no prefix.
    pub fn put_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Appends a `u32` length prefix.
    ///
    /// A length beyond `u32::MAX` has no valid prefix. The first such length
    /// is remembered and [`Encoder::finish`] reports it; [`Encoder::into_bytes`]
    /// does not check.
    pub fn put_len(&mut self, len: usize) {
        let prefix = match u32::try_from(len) {
            Ok(prefix) => prefix,
            Err(_) => {
                self.overflow.get_or_insert(len);
                u32::MAX
            }
        };
        self.put_raw(&prefix.to_le_bytes());
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the encoder and returns the bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Consumes the encoder; fails if any length prefix overflowed.
    pub fn finish(self) -> Result<Vec<u8>, CodecError> {
        match self.overflow {
            Some(len) => Err(CodecError::LengthOverflow(len)),
            None => Ok(self.buf),
        }
    }
}

// =============================================================================
// DECODER
// =============================================================================

/// Cursor over an input buffer.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder at the start of `input`.
    #[must_use]
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Decodes one value.
    pub fn take<T: Decode>(&mut self) -> Result<T, CodecError> {
        T::decode_from(self)
    }

    /// Takes exactly `n` raw bytes.
    pub fn take_raw(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(CodecError::UnexpectedEnd {
                needed: n,
                remaining,
            });
        }
        let bytes = &self.input[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Takes a fixed-size array of raw bytes.
    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take_raw(N)?);
        Ok(out)
    }

    /// Reads a `u32` length prefix.
    pub fn take_len(&mut self) -> Result<usize, CodecError> {
        let len = u32::from_le_bytes(self.take_array()?);
        usize::try_from(len).map_err(|_| CodecError::LengthOverflow(len as usize))
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    /// Fails unless every byte has been consumed.
    pub fn finish(&self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            count => Err(CodecError::TrailingBytes { count }),
        }
    }
}

// =============================================================================
// TRAITS
// =============================================================================

/// Types with a deterministic wire encoding.
pub trait Encode {
    /// Appends this value's encoding.
    fn encode_to(&self, enc: &mut Encoder);

    /// Encodes this value into a fresh buffer.
    ///
    /// Unchecked: see [`Encode::try_encode`] for values whose lengths are
    /// not known to fit the `u32` prefix.
    fn encode(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        self.encode_to(&mut enc);
        enc.into_bytes()
    }

    /// Encodes this value, failing with [`CodecError::LengthOverflow`]
    /// instead of producing an undecodable prefix.
    fn try_encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut enc = Encoder::new();
        self.encode_to(&mut enc);
        enc.finish()
    }
}

/// Types decodable from the wire encoding.
pub trait Decode: Sized {
    /// Decodes one value from the cursor.
    fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError>;

    /// Decodes a whole buffer; trailing bytes are an error.
    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut dec = Decoder::new(bytes);
        let value = Self::decode_from(&mut dec)?;
        dec.finish()?;
        Ok(value)
    }

    /// Type name published in contract ABI descriptors.
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed(std::any::type_name::<Self>())
    }
}

// =============================================================================
// PRIMITIVES
// =============================================================================

macro_rules! impl_int {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl Encode for $ty {
            fn encode_to(&self, enc: &mut Encoder) {
                enc.put_raw(&self.to_le_bytes());
            }
        }

        impl Decode for $ty {
            fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
                Ok(<$ty>::from_le_bytes(dec.take_array()?))
            }

            fn type_name() -> Cow<'static, str> {
                Cow::Borrowed($name)
            }
        }
    )*};
}

impl_int! {
    u8 => "uint8",
    u16 => "uint16",
    u32 => "uint32",
    u64 => "uint64",
    i8 => "int8",
    i16 => "int16",
    i32 => "int32",
    i64 => "int64",
}

impl Encode for bool {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put_raw(&[u8::from(*self)]);
    }
}

impl Decode for bool {
    fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        match dec.take_array::<1>()?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidBool(other)),
        }
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("bool")
    }
}

impl Encode for str {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put_len(self.len());
        enc.put_raw(self.as_bytes());
    }
}

impl Encode for String {
    fn encode_to(&self, enc: &mut Encoder) {
        self.as_str().encode_to(enc);
    }
}

impl Decode for String {
    fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        let len = dec.take_len()?;
        let bytes = dec.take_raw(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("string")
    }
}

impl<T: Encode> Encode for [T] {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put_len(self.len());
        for item in self {
            item.encode_to(enc);
        }
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode_to(&self, enc: &mut Encoder) {
        self.as_slice().encode_to(enc);
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        let count = dec.take_len()?;
        // A hostile count must not drive allocation beyond the input size.
        let mut items = Vec::with_capacity(count.min(dec.remaining()));
        for _ in 0..count {
            items.push(T::decode_from(dec)?);
        }
        Ok(items)
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("[]{}", T::type_name()))
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode_to(&self, enc: &mut Encoder) {
        enc.put_raw(self);
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        dec.take_array()
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("bytes{N}"))
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode_to(&self, enc: &mut Encoder) {
        (**self).encode_to(enc);
    }
}

// =============================================================================
// TUPLES (parameter lists, composite keys)
// =============================================================================

/// Ordered parameter list of an exported method.
pub trait Params: Decode {
    /// Type names of each parameter, in declared order.
    fn param_types() -> Vec<String>;
}

impl Encode for () {
    fn encode_to(&self, _enc: &mut Encoder) {}
}

impl Decode for () {
    fn decode_from(_dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        Ok(())
    }

    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("()")
    }
}

impl Params for () {
    fn param_types() -> Vec<String> {
        Vec::new()
    }
}

macro_rules! impl_tuple {
    ($($name:ident),+) => {
        impl<$($name: Encode),+> Encode for ($($name,)+) {
            #[allow(non_snake_case)]
            fn encode_to(&self, enc: &mut Encoder) {
                let ($($name,)+) = self;
                $($name.encode_to(enc);)+
            }
        }

        impl<$($name: Decode),+> Decode for ($($name,)+) {
            fn decode_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
                Ok(($($name::decode_from(dec)?,)+))
            }

            fn type_name() -> Cow<'static, str> {
                Cow::Owned(format!("({})", <Self as Params>::param_types().join(",")))
            }
        }

        impl<$($name: Decode),+> Params for ($($name,)+) {
            fn param_types() -> Vec<String> {
                vec![$($name::type_name().into_owned()),+]
            }
        }
    };
}

impl_tuple!(A);
impl_tuple!(A, B);
impl_tuple!(A, B, C);
impl_tuple!(A, B, C, D);
impl_tuple!(A, B, C, D, E);
impl_tuple!(A, B, C, D, E, F);
impl_tuple!(A, B, C, D, E, F, G);
impl_tuple!(A, B, C, D, E, F, G, H);

// =============================================================================
// TESTS
// =============================================================================
