//! Offset-addressed blobs of zero-terminated strings.

use std::fmt;

/// A blob of zero-terminated strings addressed by byte offset.
///
/// Lookups never fail hard: an offset at or past the end of the blob resolves
/// to `None`, since bogus offsets are common in data whose meaning is only
/// guessed.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct StringTable {
    data: Vec<u8>,
}

impl StringTable {
    /// Wrap raw blob bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// The raw blob bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Blob length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes from `offset` up to the next zero byte or the end of the blob.
    pub fn get_bytes(&self, offset: u64) -> Option<&[u8]> {
        let start = usize::try_from(offset).ok()?;
        let rest = self.data.get(start..).filter(|rest| !rest.is_empty())?;
        let end = memchr::memchr(0, rest).unwrap_or(rest.len());
        Some(&rest[..end])
    }

    /// The string at `offset`, or `None` when out of range or not UTF-8.
    pub fn get(&self, offset: u64) -> Option<&str> {
        self.get_bytes(offset)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// Append a string with its terminator, returning its offset.
    pub fn push(&mut self, s: &str) -> u32 {
        let offset = self.data.len() as u32;
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(0);
        offset
    }

    /// Consume the table, returning the blob.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl fmt::Debug for StringTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringTable")
            .field("len", &self.data.len())
            .finish()
    }
}

impl From<Vec<u8>> for StringTable {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let table = StringTable::new(b"root\0spine\0tail".to_vec());

        assert_eq!(table.get(0), Some("root"));
        assert_eq!(table.get(5), Some("spine"));
        assert_eq!(table.get(7), Some("ine"));
        // Unterminated final string runs to the end of the blob.
        assert_eq!(table.get(11), Some("tail"));
        // Offset of a terminator yields an empty string.
        assert_eq!(table.get(4), Some(""));
    }

    #[test]
    fn test_out_of_range_is_absent() {
        let table = StringTable::new(b"abc\0".to_vec());

        assert_eq!(table.get(table.len() as u64), None);
        assert_eq!(table.get(u64::MAX), None);
        assert_eq!(StringTable::default().get(0), None);
    }

    #[test]
    fn test_invalid_utf8_is_absent() {
        let table = StringTable::new(vec![0xFF, 0xFE, 0]);
        assert_eq!(table.get(0), None);
        assert_eq!(table.get_bytes(0), Some(&[0xFF, 0xFE][..]));
    }

    #[test]
    fn test_push() {
        let mut table = StringTable::default();
        let a = table.push("hips");
        let b = table.push("head");
        assert_eq!((a, b), (0, 5));
        assert_eq!(table.get(b as u64), Some("head"));
        assert_eq!(table.as_bytes(), b"hips\0head\0");
    }
}
