//! Name checksums recorded in DAT1 section data.
//!
//! Sections store names twice: as an offset into a string blob and as a
//! checksum of that string. The checksums are only used to audit the data, so
//! these functions must match the engine bit for bit.
//!
//! - 32-bit: CRC-32 (reflected polynomial `0xEDB88320`, init and xor-out all
//!   ones). Joint, locator and most other names hash the raw bytes; material
//!   names hash the ASCII lower-cased bytes.
//! - 64-bit: CRC-64 (reflected ECMA polynomial `0xC96C5795D7870F42`, init and
//!   xor-out all ones). Asset paths are normalized and folded into the
//!   asset-id form by [`asset_hash`].

use ::crc::{Crc, CRC_32_ISO_HDLC, CRC_64_XZ};

static CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);
static CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_XZ);

/// How a 32-bit name checksum treats letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameCase {
    /// Hash the bytes as stored (joints, locators, material-name tables).
    Raw,
    /// Lower-case ASCII letters before hashing (model material names).
    Normalized,
}

/// Compute the 32-bit name checksum in the given mode.
pub fn hash32(data: &[u8], mode: NameCase) -> u32 {
    match mode {
        NameCase::Raw => CRC32.checksum(data),
        NameCase::Normalized => CRC32.checksum(&data.to_ascii_lowercase()),
    }
}

/// Compute the case-preserving 32-bit checksum of a name.
#[inline]
pub fn hash32_raw(data: &[u8]) -> u32 {
    hash32(data, NameCase::Raw)
}

/// Compute the case-normalized 32-bit checksum of a name.
#[inline]
pub fn hash32_normalized(data: &[u8]) -> u32 {
    hash32(data, NameCase::Normalized)
}

/// Compute the plain CRC-64 of a byte slice.
pub fn checksum64(data: &[u8]) -> u64 {
    CRC64.checksum(data)
}

/// Compute the 64-bit asset hash of a path.
///
/// The path is lower-cased and `\` separators become `/`; the checksum is
/// then shifted down two bits with the top bit set, which is the form asset
/// ids take throughout the game data (`0x8...` prefixes).
pub fn asset_hash(path: &[u8]) -> u64 {
    let normalized: Vec<u8> = path
        .iter()
        .map(|&b| if b == b'\\' { b'/' } else { b.to_ascii_lowercase() })
        .collect();
    (checksum64(&normalized) >> 2) | (1 << 63)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_check_value() {
        assert_eq!(hash32_raw(b"123456789"), 0xCBF4_3926);
        assert_eq!(hash32_raw(b""), 0);
    }

    #[test]
    fn test_crc64_check_value() {
        assert_eq!(checksum64(b"123456789"), 0x995D_C9BB_DF19_39FA);
    }

    #[test]
    fn test_modes_differ_only_in_case() {
        assert_eq!(hash32_normalized(b"Spine_Upper"), hash32_raw(b"spine_upper"));
        assert_ne!(hash32_raw(b"Spine_Upper"), hash32_raw(b"spine_upper"));
        // Already lower-case input hashes identically in both modes.
        assert_eq!(hash32_normalized(b"root"), hash32_raw(b"root"));
    }

    #[test]
    fn test_deterministic() {
        let name = b"materials/characters/hero_suit.material";
        assert_eq!(asset_hash(name), asset_hash(name));
        assert_eq!(hash32(name, NameCase::Raw), hash32_raw(name));
    }

    #[test]
    fn test_asset_hash_normalizes_paths() {
        let a = asset_hash(b"Materials\\Hero\\Suit.material");
        let b = asset_hash(b"materials/hero/suit.material");
        assert_eq!(a, b);
        assert_eq!(a >> 63, 1);
    }
}
