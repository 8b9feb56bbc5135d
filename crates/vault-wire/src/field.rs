//! Composite encodings: field lists and the tagged either

use bytes::{BufMut, Bytes, BytesMut};

use crate::{Byte, ByteArray, Long, WireEncode, WireResult, WireString};

/// One element of a composite encoding
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Byte(Byte),
    ByteArray(ByteArray),
    Long(Long),
    Str(WireString),
    /// Already-encoded bytes, passed through unmodified
    Raw(Bytes),
}

impl Field {
    /// Wrap a bare string as a `WireString` field
    pub fn text(s: &str) -> WireResult<Self> {
        WireString::new(s).map(Field::Str)
    }

    pub fn raw(bytes: impl Into<Bytes>) -> Self {
        Field::Raw(bytes.into())
    }
}

impl WireEncode for Field {
    fn encoded_len(&self) -> usize {
        match self {
            Field::Byte(v) => v.encoded_len(),
            Field::ByteArray(v) => v.encoded_len(),
            Field::Long(v) => v.encoded_len(),
            Field::Str(v) => v.encoded_len(),
            Field::Raw(v) => v.len(),
        }
    }

    fn encode(&self, buf: &mut BytesMut) {
        match self {
            Field::Byte(v) => v.encode(buf),
            Field::ByteArray(v) => v.encode(buf),
            Field::Long(v) => v.encode(buf),
            Field::Str(v) => v.encode(buf),
            Field::Raw(v) => buf.put_slice(v),
        }
    }
}

impl From<Byte> for Field {
    fn from(v: Byte) -> Self {
        Field::Byte(v)
    }
}

impl From<ByteArray> for Field {
    fn from(v: ByteArray) -> Self {
        Field::ByteArray(v)
    }
}

impl From<Long> for Field {
    fn from(v: Long) -> Self {
        Field::Long(v)
    }
}

impl From<WireString> for Field {
    fn from(v: WireString) -> Self {
        Field::Str(v)
    }
}

impl From<Bytes> for Field {
    fn from(v: Bytes) -> Self {
        Field::Raw(v)
    }
}

/// Concatenate the encodings of `fields` in list order
pub fn serialize(fields: &[Field]) -> Bytes {
    let total: usize = fields.iter().map(WireEncode::encoded_len).sum();
    let mut buf = BytesMut::with_capacity(total);
    for field in fields {
        field.encode(&mut buf);
    }
    buf.freeze()
}

/// Tag byte of the left (plaintext) branch
pub const EITHER_LEFT: i8 = 0;

/// Tag byte of the right (encrypted) branch
pub const EITHER_RIGHT: i8 = 1;

/// Disjoint union: a tag byte followed by the branch encoding
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}

impl<L, R> Either<L, R> {
    pub fn tag(&self) -> Byte {
        match self {
            Either::Left(_) => Byte::from(EITHER_LEFT),
            Either::Right(_) => Byte::from(EITHER_RIGHT),
        }
    }
}

impl<L: Into<Field>, R: Into<Field>> Either<L, R> {
    /// Tag field followed by the branch field
    pub fn into_fields(self) -> Vec<Field> {
        let tag = Field::Byte(self.tag());
        let branch = match self {
            Either::Left(l) => l.into(),
            Either::Right(r) => r.into(),
        };
        vec![tag, branch]
    }
}

impl<L: WireEncode, R: WireEncode> WireEncode for Either<L, R> {
    fn encoded_len(&self) -> usize {
        1 + match self {
            Either::Left(l) => l.encoded_len(),
            Either::Right(r) => r.encoded_len(),
        }
    }

    fn encode(&self, buf: &mut BytesMut) {
        self.tag().encode(buf);
        match self {
            Either::Left(l) => l.encode(buf),
            Either::Right(r) => r.encode(buf),
        }
    }
}
