//! Wire constants of the modeltrack binary format.

use std::fmt;

/// Leading marker of every buffer.
pub const MAGIC: [u8; 4] = *b"MTRK";

/// Supported major format version. Any other major version is rejected.
pub const FORMAT_MAJOR: u16 = 1;

/// Newest minor format version this crate writes and fully understands.
///
/// - `0`: initial layout.
/// - `1`: model records gain trailing `scale` and `manufacturer` strings.
pub const FORMAT_MINOR: u16 = 1;

/// Header length: magic, major, minor.
pub const HEADER_LEN: usize = 8;

/// Smallest possible record: 1-byte id, tag, 1-byte payload length.
pub(crate) const MIN_RECORD_LEN: usize = 3;

// ── Record type tags ────────────────────────────────────────────────────────

/// Type tag of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Color = 1,
    PaintType = 2,
    ColorMix = 3,
    Paint = 4,
    Decal = 5,
    Part = 6,
    Step = 7,
    Assembly = 8,
    Model = 9,
}

impl Tag {
    pub fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            1 => Tag::Color,
            2 => Tag::PaintType,
            3 => Tag::ColorMix,
            4 => Tag::Paint,
            5 => Tag::Decal,
            6 => Tag::Part,
            7 => Tag::Step,
            8 => Tag::Assembly,
            9 => Tag::Model,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Tag::Color => "Color",
            Tag::PaintType => "PaintType",
            Tag::ColorMix => "ColorMix",
            Tag::Paint => "Paint",
            Tag::Decal => "Decal",
            Tag::Part => "Part",
            Tag::Step => "Step",
            Tag::Assembly => "Assembly",
            Tag::Model => "Model",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── In-payload discriminants ────────────────────────────────────────────────

pub(crate) const PIGMENT_RGB: u8 = 0;
pub(crate) const PIGMENT_CODE: u8 = 1;

pub(crate) const PAINT_KIND_INLINE: u8 = 0;
pub(crate) const PAINT_KIND_REF: u8 = 1;

pub(crate) const PAINT_HAS_COLOR: u8 = 0b01;
pub(crate) const PAINT_HAS_MIX: u8 = 0b10;

pub(crate) const PLACEMENT_LABEL: u8 = 0;
pub(crate) const PLACEMENT_AT: u8 = 1;
