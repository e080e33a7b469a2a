//! Tag to codec dispatch.
//!
//! Lookups are exact on the 32-bit tag. A tag without an entry is not an
//! error: its bytes become a [`RawSection`] and survive re-encoding untouched.
//! The same fallback applies when a registered codec rejects its data, so one
//! malformed section never stops the rest of a container from loading.

use std::fmt;

use crate::codec::{DecodeContext, Family};
use crate::sections::{RawSection, Section, REGISTERED};
use crate::Result;

/// Decode function stored in the registry.
pub type DecodeFn = fn(&[u8], &DecodeContext) -> Result<Section>;

/// One registered codec.
#[derive(Clone, Copy)]
pub struct RegistryEntry {
    pub tag: u32,
    pub name: &'static str,
    pub family: Family,
    pub decode: DecodeFn,
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("tag", &format_args!("{:#010X}", self.tag))
            .field("name", &self.name)
            .field("family", &self.family)
            .finish()
    }
}

/// All registered codecs.
pub fn entries() -> &'static [RegistryEntry] {
    REGISTERED
}

/// The codec registered for a tag.
pub fn lookup(tag: u32) -> Option<&'static RegistryEntry> {
    REGISTERED.iter().find(|entry| entry.tag == tag)
}

/// Registered codecs of one family.
pub fn by_family(family: Family) -> impl Iterator<Item = &'static RegistryEntry> {
    REGISTERED.iter().filter(move |entry| entry.family == family)
}

/// Decode with the registered codec, reporting failures.
///
/// Unknown tags still succeed as raw sections; only a registered codec
/// rejecting its data yields an error.
pub fn try_decode_section(tag: u32, data: &[u8], ctx: &DecodeContext) -> Result<Section> {
    match lookup(tag) {
        Some(entry) => (entry.decode)(data, ctx),
        None => Ok(RawSection::new(tag, data.to_vec()).into()),
    }
}

/// Decode a section, falling back to raw bytes on any failure.
pub fn decode_section(tag: u32, data: &[u8], ctx: &DecodeContext) -> Section {
    match try_decode_section(tag, data, ctx) {
        Ok(section) => section,
        Err(err) => {
            tracing::warn!("section {:#010X} kept as raw bytes: {}", tag, err);
            RawSection::new(tag, data.to_vec()).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::{JointsSection, LocatorInfoSection};
    use crate::{Error, SectionCodec};

    #[test]
    fn test_tags_are_unique() {
        let mut tags: Vec<u32> = entries().iter().map(|e| e.tag).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), entries().len());
    }

    #[test]
    fn test_lookup_exact() {
        let entry = lookup(JointsSection::TAG).unwrap();
        assert_eq!(entry.name, "Model Joint");
        assert_eq!(entry.family, Family::Model);
        assert!(lookup(0x1234_5678).is_none());
    }

    #[test]
    fn test_families() {
        let toc: Vec<_> = by_family(Family::Toc).map(|e| e.name).collect();
        assert_eq!(toc, vec!["Archives", "MOD0"]);
        assert_eq!(by_family(Family::Material).count(), 1);
    }

    #[test]
    fn test_unknown_tag_round_trips() {
        let data = vec![0xDE, 0xAD, 0xBE, 0xEF, 0x01];
        let section = decode_section(0xCAFE_F00D, &data, &DecodeContext::default());
        assert!(section.is_raw());
        assert_eq!(section.tag(), 0xCAFE_F00D);
        assert_eq!(section.encode(), data);
    }

    #[test]
    fn test_malformed_falls_back_to_raw() {
        let data = vec![1, 2, 3];
        let ctx = DecodeContext::default();

        let err = try_decode_section(LocatorInfoSection::TAG, &data, &ctx).unwrap_err();
        assert!(matches!(err, Error::MalformedSection { tag, .. } if tag == LocatorInfoSection::TAG));

        let section = decode_section(LocatorInfoSection::TAG, &data, &ctx);
        assert!(section.is_raw());
        assert_eq!(section.tag(), LocatorInfoSection::TAG);
        assert_eq!(section.encode(), data);
    }

    #[test]
    fn test_dispatch_picks_codec() {
        let data = vec![0u8; 32];
        let section = decode_section(JointsSection::TAG, &data, &DecodeContext::default());
        assert_eq!(section.name(), "Model Joint");
        match section {
            Section::Joints(joints) => assert_eq!(joints.joints.len(), 2),
            other => panic!("unexpected section {:?}", other),
        }
    }
}
