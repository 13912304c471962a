//! Little-endian wire primitives.
//!
//! Layout rules shared by every payload:
//!
//! - scalars are fixed width (`u8`, `u32`, `u64`, `f32`, `f64`), little-endian
//! - port and parameter indices are `u32`
//! - an optional scalar is a presence byte (`0`/`1`) followed by a `u64`
//!   value, written even when absent, so there is no sentinel value
//! - arrays are a `u32` element count followed by fixed-width elements
//! - strings are a `u32` byte count followed by UTF-8

use crate::limits::CompileLimits;

use super::WireError;

/// Append-only buffer for encoding payloads.
#[derive(Clone, Debug, Default)]
pub struct WireEncoder {
    buf: Vec<u8>,
}

impl WireEncoder {
    /// Creates an empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an encoder with `capacity` bytes reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the encoder and returns the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Writes one byte.
    #[inline]
    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Writes a boolean as `0` or `1`.
    #[inline]
    pub fn put_bool(&mut self, value: bool) {
        self.put_u8(u8::from(value));
    }

    /// Writes a `u32`.
    #[inline]
    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a `u64`.
    #[inline]
    pub fn put_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes an `f32`.
    #[inline]
    pub fn put_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes an `f64`.
    #[inline]
    pub fn put_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes raw bytes without a length prefix.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a count, index or length as `u32`.
    pub fn put_len(&mut self, len: usize) -> Result<(), WireError> {
        let value = u32::try_from(len).map_err(|_| WireError::LengthOverflow(len))?;
        self.put_u32(value);
        Ok(())
    }

    /// Writes an optional scalar: presence byte, then the value (zero when absent).
    pub fn put_optional_u64(&mut self, value: Option<u64>) {
        self.put_bool(value.is_some());
        self.put_u64(value.unwrap_or(0));
    }

    /// Writes a counted `f32` array.
    pub fn put_f32_array(&mut self, values: &[f32]) -> Result<(), WireError> {
        self.put_len(values.len())?;
        for &value in values {
            self.put_f32(value);
        }
        Ok(())
    }

    /// Writes a counted `u32` array.
    pub fn put_u32_array(&mut self, values: &[u32]) -> Result<(), WireError> {
        self.put_len(values.len())?;
        for &value in values {
            self.put_u32(value);
        }
        Ok(())
    }

    /// Writes a length-prefixed UTF-8 string.
    pub fn put_str(&mut self, value: &str) -> Result<(), WireError> {
        self.put_len(value.len())?;
        self.put_bytes(value.as_bytes());
        Ok(())
    }

    /// Writes a counted array of strings.
    pub fn put_str_array(&mut self, values: &[String]) -> Result<(), WireError> {
        self.put_len(values.len())?;
        for value in values {
            self.put_str(value)?;
        }
        Ok(())
    }

    /// Reserves a `u32` slot to be filled by [`patch_len`](Self::patch_len).
    pub fn reserve_len(&mut self) -> usize {
        let at = self.buf.len();
        self.put_u32(0);
        at
    }

    /// Fills a slot from [`reserve_len`](Self::reserve_len) with the number of
    /// bytes written after it.
    pub fn patch_len(&mut self, at: usize) -> Result<(), WireError> {
        let written = self.buf.len().saturating_sub(at + 4);
        let value = u32::try_from(written).map_err(|_| WireError::LengthOverflow(written))?;
        if let Some(slot) = self.buf.get_mut(at..at + 4) {
            slot.copy_from_slice(&value.to_le_bytes());
        }
        Ok(())
    }
}

/// Cursor over an encoded payload.
///
/// Every read is bounds-checked; arrays longer than the configured limit are
/// rejected before anything is allocated.
#[derive(Clone, Debug)]
pub struct WireDecoder<'a> {
    bytes: &'a [u8],
    pos: usize,
    max_array_len: u32,
}

impl<'a> WireDecoder<'a> {
    /// Creates a decoder that enforces `limits.max_wire_array_len`.
    pub fn new(bytes: &'a [u8], limits: &CompileLimits) -> Self {
        Self::with_max_array_len(bytes, limits.max_wire_array_len)
    }

    /// Creates a decoder with an explicit array limit.
    pub fn with_max_array_len(bytes: &'a [u8], max_array_len: u32) -> Self {
        Self {
            bytes,
            pos: 0,
            max_array_len,
        }
    }

    /// Returns the array limit in effect.
    pub fn max_array_len(&self) -> u32 {
        self.max_array_len
    }

    /// Returns the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Returns the read position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns true if every byte has been read.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fails with [`WireError::TrailingBytes`] if unread bytes remain.
    pub fn finish(&self) -> Result<(), WireError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(WireError::TrailingBytes(n)),
        }
    }

    /// Reads `len` raw bytes.
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(WireError::Truncated {
                needed: len,
                remaining,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    /// Reads one byte.
    pub fn u8(&mut self) -> Result<u8, WireError> {
        Ok(self.array::<1>()?[0])
    }

    /// Reads a `u32`.
    pub fn u32(&mut self) -> Result<u32, WireError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    /// Reads a `u64`.
    pub fn u64(&mut self) -> Result<u64, WireError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    /// Reads an `f32`.
    pub fn f32(&mut self) -> Result<f32, WireError> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    /// Reads an `f64`.
    pub fn f64(&mut self) -> Result<f64, WireError> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    /// Reads a `u32` count, index or length.
    pub fn index(&mut self) -> Result<usize, WireError> {
        Ok(self.u32()? as usize)
    }

    /// Reads a strict boolean; anything but `0` or `1` is an error.
    pub fn bool(&mut self, field: &'static str) -> Result<bool, WireError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(WireError::InvalidEnum { field, value }),
        }
    }

    /// Reads a one-byte enum discriminant through `parse`.
    pub fn enum_u8<T>(
        &mut self,
        field: &'static str,
        parse: impl FnOnce(u8) -> Option<T>,
    ) -> Result<T, WireError> {
        let value = self.u8()?;
        parse(value).ok_or(WireError::InvalidEnum { field, value })
    }

    /// Reads an optional scalar written by [`WireEncoder::put_optional_u64`].
    pub fn optional_u64(&mut self, field: &'static str) -> Result<Option<u64>, WireError> {
        let present = self.bool(field)?;
        let value = self.u64()?;
        Ok(present.then_some(value))
    }

    /// Reads an array count and checks it against the limit and the bytes left.
    pub fn array_len(&mut self, element_size: usize) -> Result<usize, WireError> {
        let len = self.u32()?;
        if len > self.max_array_len {
            return Err(WireError::ArrayTooLong {
                len,
                max: self.max_array_len,
            });
        }
        let len = len as usize;
        let needed = len.saturating_mul(element_size);
        let remaining = self.remaining();
        if needed > remaining {
            return Err(WireError::Truncated { needed, remaining });
        }
        Ok(len)
    }

    /// Reads a counted `f32` array.
    pub fn f32_array(&mut self) -> Result<Vec<f32>, WireError> {
        let len = self.array_len(4)?;
        (0..len).map(|_| self.f32()).collect()
    }

    /// Reads a counted `u32` array.
    pub fn u32_array(&mut self) -> Result<Vec<u32>, WireError> {
        let len = self.array_len(4)?;
        (0..len).map(|_| self.u32()).collect()
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn string(&mut self) -> Result<String, WireError> {
        let len = self.array_len(1)?;
        let bytes = self.bytes(len)?;
        core::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| WireError::InvalidUtf8)
    }

    /// Reads a counted array of strings.
    pub fn string_array(&mut self) -> Result<Vec<String>, WireError> {
        // Each string carries at least its own 4-byte length.
        let len = self.array_len(4)?;
        (0..len).map(|_| self.string()).collect()
    }
}
