//! Typed wire primitives
//!
//! | Primitive    | Layout                                  |
//! |--------------|-----------------------------------------|
//! | `Byte`       | 1 byte, signed                          |
//! | `ByteArray`  | i32 length prefix + raw bytes           |
//! | `Long`       | 8 bytes, two's complement               |
//! | `WireString` | i16 UTF-8 byte count + UTF-8 bytes      |
//!
//! Range checks happen at construction, so encoding itself cannot fail.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{WireError, WireResult};

/// Size of an encoded `Byte`
pub const BYTE_SIZE: usize = 1;

/// Size of the `ByteArray` length prefix
pub const BYTE_ARRAY_PREFIX: usize = 4;

/// Size of an encoded `Long`
pub const LONG_SIZE: usize = 8;

/// Size of the `WireString` length prefix
pub const STRING_PREFIX: usize = 2;

/// Largest UTF-8 payload a `WireString` can carry
pub const MAX_STRING_BYTES: usize = i16::MAX as usize;

/// Something with a deterministic binary encoding
pub trait WireEncode {
    /// Exact number of bytes `encode` appends
    fn encoded_len(&self) -> usize;

    /// Append the encoding to `buf`
    fn encode(&self, buf: &mut BytesMut);

    /// Encode into a fresh buffer
    fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf.freeze()
    }
}

/// Signed 8-bit value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Byte(i8);

impl Byte {
    /// Checked construction from a wider integer
    pub fn new(value: i64) -> WireResult<Self> {
        i8::try_from(value)
            .map(Byte)
            .map_err(|_| WireError::range("byte", value as i128, i8::MIN as i128, i8::MAX as i128))
    }

    #[inline]
    pub fn value(self) -> i8 {
        self.0
    }
}

impl From<i8> for Byte {
    fn from(v: i8) -> Self {
        Byte(v)
    }
}

impl WireEncode for Byte {
    fn encoded_len(&self) -> usize {
        BYTE_SIZE
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i8(self.0);
    }
}

/// Length-prefixed byte sequence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteArray(Bytes);

impl ByteArray {
    pub fn new(data: impl Into<Bytes>) -> WireResult<Self> {
        let data = data.into();
        if data.len() > i32::MAX as usize {
            return Err(WireError::range(
                "byte array length",
                data.len() as i128,
                0,
                i32::MAX as i128,
            ));
        }
        Ok(ByteArray(data))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl WireEncode for ByteArray {
    fn encoded_len(&self) -> usize {
        BYTE_ARRAY_PREFIX + self.0.len()
    }

    fn encode(&self, buf: &mut BytesMut) {
        // Length checked in `new`
        buf.put_i32(self.0.len() as i32);
        buf.put_slice(&self.0);
    }
}

/// Signed 64-bit value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Long(i64);

impl Long {
    #[inline]
    pub fn new(value: i64) -> Self {
        Long(value)
    }

    /// Checked construction from an unsigned value (versions, heights)
    pub fn from_u64(value: u64) -> WireResult<Self> {
        i64::try_from(value)
            .map(Long)
            .map_err(|_| WireError::range("long", value as i128, i64::MIN as i128, i64::MAX as i128))
    }

    /// Checked construction from any integer wider than 64 bits
    pub fn from_i128(value: i128) -> WireResult<Self> {
        i64::try_from(value)
            .map(Long)
            .map_err(|_| WireError::range("long", value, i64::MIN as i128, i64::MAX as i128))
    }

    #[inline]
    pub fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for Long {
    fn from(v: i64) -> Self {
        Long(v)
    }
}

impl WireEncode for Long {
    fn encoded_len(&self) -> usize {
        LONG_SIZE
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i64(self.0);
    }
}

/// Length-prefixed UTF-8 string. The prefix counts bytes, not characters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireString(String);

impl WireString {
    pub fn new(value: impl Into<String>) -> WireResult<Self> {
        let value = value.into();
        if value.len() > MAX_STRING_BYTES {
            return Err(WireError::range(
                "string length",
                value.len() as i128,
                0,
                MAX_STRING_BYTES as i128,
            ));
        }
        Ok(WireString(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl WireEncode for WireString {
    fn encoded_len(&self) -> usize {
        STRING_PREFIX + self.0.len()
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i16(self.0.len() as i16);
        buf.put_slice(self.0.as_bytes());
    }
}
