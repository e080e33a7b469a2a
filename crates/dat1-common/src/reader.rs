//! Binary reader for bounds-checked parsing of section buffers.
//!
//! Every field and record extraction in the DAT1 crates goes through
//! [`BinaryReader`], so a declared count or offset that points past the end of
//! a buffer surfaces as an [`Error`] instead of a panic.

use zerocopy::FromBytes;

use crate::{Error, Result};

/// A cursor over a byte slice that reads little-endian values without copying.
///
/// # Example
///
/// ```
/// use dat1_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_u32().unwrap(), 0x08070605);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Seek to an absolute position.
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Borrow an absolute sub-range of the underlying buffer.
    pub fn slice(&self, start: usize, end: usize) -> Result<&'a [u8]> {
        if start > end || end > self.data.len() {
            return Err(Error::OutOfBounds {
                start,
                end,
                len: self.data.len(),
            });
        }
        Ok(&self.data[start..end])
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }

    /// Read `count` consecutive structs.
    ///
    /// The whole run is bounds-checked up front, so a bogus count never
    /// triggers a large allocation.
    pub fn read_array<T: FromBytes>(&mut self, count: usize) -> Result<Vec<T>> {
        let size = std::mem::size_of::<T>();
        let needed = count.checked_mul(size).ok_or(Error::UnexpectedEof {
            needed: usize::MAX,
            available: self.remaining(),
        })?;
        self.peek_bytes(needed)?;

        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.read_struct::<T>()?);
        }
        Ok(items)
    }

    /// Read as many whole structs as fit in the remaining bytes.
    ///
    /// Returns the records and leaves the position at the first unread byte,
    /// so any partial trailing record stays available via
    /// [`remaining_bytes`](Self::remaining_bytes).
    pub fn read_remaining_array<T: FromBytes>(&mut self) -> Result<Vec<T>> {
        let size = std::mem::size_of::<T>();
        if size == 0 {
            return Ok(Vec::new());
        }
        self.read_array(self.remaining() / size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::{Immutable, KnownLayout};

    #[derive(Debug, Clone, Copy, PartialEq, FromBytes, Immutable, KnownLayout)]
    #[repr(C, packed)]
    struct Pair {
        a: u16,
        b: u16,
    }

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x04030201
            0xFF, 0xFF, 0xFF, 0xFF, // u32: 0xFFFFFFFF
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_u32().unwrap(), u32::MAX);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_peek_does_not_advance() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.peek_bytes(2).unwrap(), &[0x01, 0x02]);
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_eof_error() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert!(reader.read_u32().is_err());
        // A failed read leaves the position untouched.
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_read_array_checks_whole_run() {
        let data = [1, 0, 2, 0, 3, 0];
        let mut reader = BinaryReader::new(&data);

        assert!(reader.read_array::<Pair>(2).is_err());
        assert_eq!(reader.position(), 0);

        let pairs = reader.read_remaining_array::<Pair>().unwrap();
        assert_eq!(pairs, vec![Pair { a: 1, b: 2 }]);
        assert_eq!(reader.remaining_bytes(), &[3, 0]);
    }

    #[test]
    fn test_read_array_huge_count() {
        let data = [0u8; 4];
        let mut reader = BinaryReader::new(&data);
        assert!(reader.read_array::<Pair>(usize::MAX).is_err());
    }

    #[test]
    fn test_slice_bounds() {
        let data = [0u8; 8];
        let reader = BinaryReader::new(&data);

        assert_eq!(reader.slice(2, 8).unwrap().len(), 6);
        assert!(reader.slice(4, 9).is_err());
        assert!(reader.slice(5, 4).is_err());
    }
}
