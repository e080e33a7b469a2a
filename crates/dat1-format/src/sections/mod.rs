//! Section codecs.
//!
//! Every known tag has one codec type implementing
//! [`SectionCodec`](crate::SectionCodec). [`Section`] is the tagged union the
//! container stores; tags without a codec (or whose data fails to decode)
//! become [`RawSection`]s, which re-encode unchanged.
//!
//! # Shapes
//!
//! - fixed-record arrays with an opaque tail: joints, locators, vertices,
//!   indices, meshes, looks, archives
//! - `u32 -> u32` maps: [`JointLookupSection`], [`LocatorLookupSection`]
//! - headers with derived length fields: [`LocatorInfoSection`],
//!   [`MaterialNamesSection`], [`QuintuplesSection`]
//! - offset-partitioned runs: [`FloatBlockSection`]

mod built;
mod geometry;
mod joints;
mod locators;
mod look;
mod map;
mod material;
mod mesh;
mod toc;
mod unknowns;

pub use built::{ByteValuesSection, ModelBuiltSection};
pub use geometry::{IndexSection, UvOverrideSection, UvPair, Vertex, VertexSection};
pub use joints::{Joint, JointsSection};
pub use locators::{Locator, LocatorInfoSection, LocatorsSection};
pub use look::{Look, LookLod, LookSection, LODS_PER_LOOK};
pub use map::{JointLookupSection, LocatorLookupSection, MapEntry, UintMap};
pub use material::{MaterialName, MaterialNamesSection, MaterialRef, ModelMaterialSection};
pub use mesh::{MeshDefinition, MeshRecords, MeshSection, MsmrMeshRecord, RcraMeshRecord};
pub use toc::{ArchiveEntry, ArchivesSection, Mod0Section, ARCHIVE_NAME_LEN};
pub use unknowns::{
    FloatBlockSection, Quintuple, QuintuplesSection, ShadowPrimsSection, SkinBatch,
    SkinBatchSection,
};

use crate::codec::{DecodeContext, Family, SectionCodec};
use crate::registry::RegistryEntry;
use crate::Result;

/// A section kept as uninterpreted bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    pub tag: u32,
    pub data: Vec<u8>,
}

impl RawSection {
    /// Wrap bytes under a tag.
    pub fn new(tag: u32, data: Vec<u8>) -> Self {
        Self { tag, data }
    }
}

/// Conversion between a codec type and the [`Section`] union.
pub trait TypedSection: SectionCodec {
    /// Wrap a decoded value.
    fn into_section(self) -> Section;
    /// Borrow the value if the section holds this type.
    fn from_section(section: &Section) -> Option<&Self>;
    /// Mutably borrow the value if the section holds this type.
    fn from_section_mut(section: &mut Section) -> Option<&mut Self>;
}

fn decode_as<T: TypedSection>(data: &[u8], ctx: &DecodeContext) -> Result<Section> {
    T::decode(data, ctx)
        .map(T::into_section)
        .map_err(|e| e.into_malformed(T::TAG))
}

macro_rules! sections {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// A decoded section.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Section {
            $($variant($ty),)*
            /// Unknown tag, or data its codec could not decode.
            Raw(RawSection),
        }

        impl Section {
            /// The section's tag.
            pub fn tag(&self) -> u32 {
                match self {
                    $(Section::$variant(_) => <$ty as SectionCodec>::TAG,)*
                    Section::Raw(raw) => raw.tag,
                }
            }

            /// Human-readable section name.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Section::$variant(_) => <$ty as SectionCodec>::NAME,)*
                    Section::Raw(_) => "Raw",
                }
            }

            /// The section's family.
            pub fn family(&self) -> Family {
                match self {
                    $(Section::$variant(_) => <$ty as SectionCodec>::FAMILY,)*
                    Section::Raw(_) => Family::Unknown,
                }
            }

            /// Encode the section payload.
            pub fn encode(&self) -> Vec<u8> {
                match self {
                    $(Section::$variant(s) => s.encode(),)*
                    Section::Raw(raw) => raw.data.clone(),
                }
            }
        }

        $(
            impl TypedSection for $ty {
                fn into_section(self) -> Section {
                    Section::$variant(self)
                }

                fn from_section(section: &Section) -> Option<&Self> {
                    match section {
                        Section::$variant(s) => Some(s),
                        _ => None,
                    }
                }

                fn from_section_mut(section: &mut Section) -> Option<&mut Self> {
                    match section {
                        Section::$variant(s) => Some(s),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Section {
                fn from(s: $ty) -> Self {
                    Section::$variant(s)
                }
            }
        )*

        pub(crate) static REGISTERED: &[RegistryEntry] = &[
            $(RegistryEntry {
                tag: <$ty as SectionCodec>::TAG,
                name: <$ty as SectionCodec>::NAME,
                family: <$ty as SectionCodec>::FAMILY,
                decode: decode_as::<$ty>,
            },)*
        ];
    };
}

sections! {
    Joints(JointsSection),
    JointLookup(JointLookupSection),
    Locators(LocatorsSection),
    LocatorLookup(LocatorLookupSection),
    LocatorInfo(LocatorInfoSection),
    ModelMaterial(ModelMaterialSection),
    ModelBuilt(ModelBuiltSection),
    ShadowPrims(ShadowPrimsSection),
    Quintuples(QuintuplesSection),
    SkinBatch(SkinBatchSection),
    FloatBlock(FloatBlockSection),
    ByteValues(ByteValuesSection),
    Vertices(VertexSection),
    Indices(IndexSection),
    Meshes(MeshSection),
    Looks(LookSection),
    UvOverride(UvOverrideSection),
    MaterialNames(MaterialNamesSection),
    Archives(ArchivesSection),
    Mod0(Mod0Section),
}

impl From<RawSection> for Section {
    fn from(raw: RawSection) -> Self {
        Section::Raw(raw)
    }
}

impl Section {
    /// Whether this section is the opaque fallback.
    pub fn is_raw(&self) -> bool {
        matches!(self, Section::Raw(_))
    }
}
