//! Offset-addressed reading of packed binary records.
//!
//! Fixed-layout headers in this crate (the ARA header, the FFF metadata
//! table) are described as tables of `(offset, name, type)` entries and
//! read field by field from a byte buffer. Fields are independent: they
//! may overlap and may be declared out of order. Reads that run past the
//! buffer end fail with [`DecodeError::TruncatedRecord`]; the caller
//! decides whether that aborts the whole record.

use std::collections::BTreeMap;

use byteordered::{ByteOrdered, Endianness};

use crate::error::DecodeError;

/// Endian-aware reader over a byte buffer, addressed by absolute offset.
#[derive(Debug, Clone, Copy)]
pub struct StructReader<'a> {
    buf: &'a [u8],
    endianness: Endianness,
}

impl<'a> StructReader<'a> {
    pub fn new(buf: &'a [u8], endianness: Endianness) -> Self {
        StructReader { buf, endianness }
    }

    pub fn little(buf: &'a [u8]) -> Self {
        Self::new(buf, Endianness::Little)
    }

    pub fn big(buf: &'a [u8]) -> Self {
        Self::new(buf, Endianness::Big)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn span(&self, offset: usize, need: usize) -> Result<&'a [u8], DecodeError> {
        self.buf
            .get(offset..offset + need)
            .ok_or(DecodeError::TruncatedRecord {
                offset,
                need,
                have: self.buf.len().saturating_sub(offset),
            })
    }

    pub fn u8_at(&self, offset: usize) -> Result<u8, DecodeError> {
        Ok(self.span(offset, 1)?[0])
    }

    pub fn u16_at(&self, offset: usize) -> Result<u16, DecodeError> {
        Ok(ByteOrdered::runtime(self.span(offset, 2)?, self.endianness).read_u16()?)
    }

    pub fn i16_at(&self, offset: usize) -> Result<i16, DecodeError> {
        Ok(ByteOrdered::runtime(self.span(offset, 2)?, self.endianness).read_i16()?)
    }

    pub fn u32_at(&self, offset: usize) -> Result<u32, DecodeError> {
        Ok(ByteOrdered::runtime(self.span(offset, 4)?, self.endianness).read_u32()?)
    }

    pub fn i32_at(&self, offset: usize) -> Result<i32, DecodeError> {
        Ok(ByteOrdered::runtime(self.span(offset, 4)?, self.endianness).read_i32()?)
    }

    pub fn f32_at(&self, offset: usize) -> Result<f32, DecodeError> {
        Ok(ByteOrdered::runtime(self.span(offset, 4)?, self.endianness).read_f32()?)
    }

    pub fn bytes_at(&self, offset: usize, len: usize) -> Result<&'a [u8], DecodeError> {
        self.span(offset, len)
    }

    /// Fixed-length byte string: trailing NULs trimmed, decoded as UTF-8
    /// with a lossy fallback.
    pub fn str_at(&self, offset: usize, len: usize) -> Result<String, DecodeError> {
        let raw = self.span(offset, len)?;
        Ok(String::from_utf8_lossy(trim_nul(raw)).into_owned())
    }
}

fn trim_nul(raw: &[u8]) -> &[u8] {
    let end = raw
        .iter()
        .rposition(|&b| b != 0)
        .map(|p| p + 1)
        .unwrap_or(0);
    &raw[..end]
}

/// Wire type of one table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U16,
    I32,
    F32,
    /// Fixed-length byte string of the given size.
    Str(usize),
    /// Packed `(u32 seconds, u32 milliseconds, i16 tz minutes)` GPS
    /// timestamp triple, read with the reader's endianness.
    GpsStamp,
}

/// One entry of a declarative field layout.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub offset: usize,
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(offset: usize, name: &'static str, kind: FieldKind) -> Self {
        FieldSpec { offset, name, kind }
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    U16(u16),
    I32(i32),
    F32(f32),
    Text(String),
    /// Byte string that did not trim to valid text.
    Bytes(Vec<u8>),
    GpsStamp {
        secs: u32,
        millis: u32,
        tz_minutes: i16,
    },
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            FieldValue::U16(v) => Some(v as f64),
            FieldValue::I32(v) => Some(v as f64),
            FieldValue::F32(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Decodes every entry of `table` from `buf`. Any field running past the
/// buffer end fails the whole table.
pub fn read_fields(
    buf: &[u8],
    endianness: Endianness,
    table: &[FieldSpec],
) -> Result<BTreeMap<&'static str, FieldValue>, DecodeError> {
    let r = StructReader::new(buf, endianness);
    let mut out = BTreeMap::new();
    for spec in table {
        let value = match spec.kind {
            FieldKind::U16 => FieldValue::U16(r.u16_at(spec.offset)?),
            FieldKind::I32 => FieldValue::I32(r.i32_at(spec.offset)?),
            FieldKind::F32 => FieldValue::F32(r.f32_at(spec.offset)?),
            FieldKind::Str(n) => {
                let trimmed = trim_nul(r.bytes_at(spec.offset, n)?);
                match std::str::from_utf8(trimmed) {
                    Ok(s) => FieldValue::Text(s.to_owned()),
                    Err(_) => FieldValue::Bytes(trimmed.to_vec()),
                }
            }
            FieldKind::GpsStamp => FieldValue::GpsStamp {
                secs: r.u32_at(spec.offset)?,
                millis: r.u32_at(spec.offset + 4)?,
                tz_minutes: r.i16_at(spec.offset + 8)?,
            },
        };
        out.insert(spec.name, value);
    }
    Ok(out)
}
