//! Record payload parsing.
//!
//! Turns a framed payload into a [`RawNode`]: scalar fields decoded,
//! references still as identifiers. Linking happens in the resolver.

use modeltrack_buffers::Reader;

use super::constants::*;
use crate::detail::PaintType;
use super::error::{FormatIssue, LoadError};
use super::index::{read_count, Header, RecordEntry};
use super::options::DecoderOptions;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RawPigment<'a> {
    Rgb([u8; 3]),
    Code(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RawPaintKind {
    Inline(PaintType),
    Ref(u64),
}

/// What a reference field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefKind {
    Color,
    PaintType,
    ColorMix,
    Paint,
    Decal,
    Part,
    Step,
    /// Assembly child: a step or a nested assembly.
    Child,
    Assembly,
}

impl RefKind {
    pub fn accepts(self, tag: Tag) -> bool {
        match self {
            RefKind::Color => tag == Tag::Color,
            RefKind::PaintType => tag == Tag::PaintType,
            RefKind::ColorMix => tag == Tag::ColorMix,
            RefKind::Paint => tag == Tag::Paint,
            RefKind::Decal => tag == Tag::Decal,
            RefKind::Part => tag == Tag::Part,
            RefKind::Step => tag == Tag::Step,
            RefKind::Child => matches!(tag, Tag::Step | Tag::Assembly),
            RefKind::Assembly => tag == Tag::Assembly,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RefKind::Child => "Step or Assembly",
            RefKind::Color => "Color",
            RefKind::PaintType => "PaintType",
            RefKind::ColorMix => "ColorMix",
            RefKind::Paint => "Paint",
            RefKind::Decal => "Decal",
            RefKind::Part => "Part",
            RefKind::Step => "Step",
            RefKind::Assembly => "Assembly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RawPlacement<'a> {
    Label(&'a str),
    At(f32, f32),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawNode<'a> {
    Color {
        name: &'a str,
        brand: &'a str,
        pigment: RawPigment<'a>,
    },
    PaintType {
        kind: PaintType,
    },
    ColorMix {
        name: &'a str,
        components: Vec<(u64, i32)>,
    },
    Paint {
        kind: RawPaintKind,
        color: Option<u64>,
        mix: Option<u64>,
    },
    Decal {
        name: &'a str,
        placement: RawPlacement<'a>,
        sheet: &'a str,
    },
    Part {
        name: &'a str,
        paints: Vec<(u64, bool)>,
        decals: Vec<(u64, bool)>,
    },
    Step {
        name: &'a str,
        parts: Vec<u64>,
    },
    Assembly {
        name: &'a str,
        children: Vec<u64>,
    },
    Model {
        name: &'a str,
        assemblies: Vec<u64>,
        scale: &'a str,
        manufacturer: &'a str,
    },
}

impl RawNode<'_> {
    /// References this record makes, in encoded order.
    pub fn refs(&self) -> Vec<(u64, RefKind)> {
        fn all(ids: &[u64], kind: RefKind) -> Vec<(u64, RefKind)> {
            ids.iter().map(|id| (*id, kind)).collect()
        }
        match self {
            RawNode::Color { .. } | RawNode::PaintType { .. } | RawNode::Decal { .. } => vec![],
            RawNode::ColorMix { components, .. } => components
                .iter()
                .map(|c| (c.0, RefKind::Color))
                .collect(),
            RawNode::Paint { kind, color, mix } => {
                let kind = match kind {
                    RawPaintKind::Ref(id) => Some((*id, RefKind::PaintType)),
                    RawPaintKind::Inline(_) => None,
                };
                kind.into_iter()
                    .chain(color.map(|id| (id, RefKind::Color)))
                    .chain(mix.map(|id| (id, RefKind::ColorMix)))
                    .collect()
            }
            RawNode::Part { paints, decals, .. } => paints
                .iter()
                .map(|p| (p.0, RefKind::Paint))
                .chain(decals.iter().map(|d| (d.0, RefKind::Decal)))
                .collect(),
            RawNode::Step { parts, .. } => all(parts, RefKind::Part),
            RawNode::Assembly { children, .. } => all(children, RefKind::Child),
            RawNode::Model { assemblies, .. } => all(assemblies, RefKind::Assembly),
        }
    }
}

struct PayloadReader<'a, 'o> {
    reader: Reader<'a>,
    options: &'o DecoderOptions,
}

impl<'a> PayloadReader<'a, '_> {
    fn u8(&mut self) -> Result<u8, LoadError> {
        Ok(self.reader.u8()?)
    }

    fn id(&mut self) -> Result<u64, LoadError> {
        Ok(self.reader.vu57()?)
    }

    fn str(&mut self) -> Result<&'a str, LoadError> {
        Ok(self.reader.str()?)
    }

    fn discriminant(&mut self, field: &'static str, allowed: &[u8]) -> Result<u8, LoadError> {
        let offset = self.reader.position();
        let value = self.u8()?;
        if !allowed.contains(&value) {
            return Err(LoadError::format(
                offset,
                FormatIssue::BadDiscriminant { field, value },
            ));
        }
        Ok(value)
    }

    fn paint_type(&mut self) -> Result<PaintType, LoadError> {
        let offset = self.reader.position();
        let value = self.u8()?;
        PaintType::from_code(value).ok_or_else(|| {
            LoadError::format(
                offset,
                FormatIssue::BadDiscriminant {
                    field: "paint type",
                    value,
                },
            )
        })
    }

    fn flag(&mut self, field: &'static str) -> Result<bool, LoadError> {
        Ok(self.discriminant(field, &[0, 1])? == 1)
    }

    fn count(&mut self, min_item_len: usize, what: &'static str) -> Result<usize, LoadError> {
        read_count(
            &mut self.reader,
            min_item_len,
            self.options.max_list_len,
            what,
        )
    }

    fn ids(&mut self, what: &'static str) -> Result<Vec<u64>, LoadError> {
        let n = self.count(1, what)?;
        (0..n).map(|_| self.id()).collect()
    }

    fn applications(&mut self, what: &'static str) -> Result<Vec<(u64, bool)>, LoadError> {
        let n = self.count(2, what)?;
        (0..n)
            .map(|_| Ok((self.id()?, self.flag("applied flag")?)))
            .collect()
    }
}

fn parse_payload<'a>(
    r: &mut PayloadReader<'a, '_>,
    tag: Tag,
    header: &Header,
) -> Result<RawNode<'a>, LoadError> {
    Ok(match tag {
        Tag::Color => {
            let name = r.str()?;
            let brand = r.str()?;
            let pigment = match r.discriminant("pigment", &[PIGMENT_RGB, PIGMENT_CODE])? {
                PIGMENT_RGB => RawPigment::Rgb([r.u8()?, r.u8()?, r.u8()?]),
                _ => RawPigment::Code(r.str()?),
            };
            RawNode::Color {
                name,
                brand,
                pigment,
            }
        }
        Tag::PaintType => RawNode::PaintType {
            kind: r.paint_type()?,
        },
        Tag::ColorMix => {
            let name = r.str()?;
            let n = r.count(5, "color mix")?;
            let components = (0..n)
                .map(|_| Ok((r.id()?, r.reader.i32()?)))
                .collect::<Result<_, LoadError>>()?;
            RawNode::ColorMix { name, components }
        }
        Tag::Paint => {
            let kind = match r.discriminant("paint kind", &[PAINT_KIND_INLINE, PAINT_KIND_REF])? {
                PAINT_KIND_INLINE => RawPaintKind::Inline(r.paint_type()?),
                _ => RawPaintKind::Ref(r.id()?),
            };
            let flags_offset = r.reader.position();
            let flags = r.u8()?;
            if flags & !(PAINT_HAS_COLOR | PAINT_HAS_MIX) != 0 {
                return Err(LoadError::format(
                    flags_offset,
                    FormatIssue::BadDiscriminant {
                        field: "paint flags",
                        value: flags,
                    },
                ));
            }
            let color = if flags & PAINT_HAS_COLOR != 0 {
                Some(r.id()?)
            } else {
                None
            };
            let mix = if flags & PAINT_HAS_MIX != 0 {
                Some(r.id()?)
            } else {
                None
            };
            RawNode::Paint { kind, color, mix }
        }
        Tag::Decal => {
            let name = r.str()?;
            let placement = match r.discriminant("placement", &[PLACEMENT_LABEL, PLACEMENT_AT])? {
                PLACEMENT_LABEL => RawPlacement::Label(r.str()?),
                _ => RawPlacement::At(r.reader.f32()?, r.reader.f32()?),
            };
            let sheet = r.str()?;
            RawNode::Decal {
                name,
                placement,
                sheet,
            }
        }
        Tag::Part => RawNode::Part {
            name: r.str()?,
            paints: r.applications("part paints")?,
            decals: r.applications("part decals")?,
        },
        Tag::Step => RawNode::Step {
            name: r.str()?,
            parts: r.ids("step parts")?,
        },
        Tag::Assembly => RawNode::Assembly {
            name: r.str()?,
            children: r.ids("assembly children")?,
        },
        Tag::Model => {
            let name = r.str()?;
            let assemblies = r.ids("model assemblies")?;
            let (scale, manufacturer) = if header.minor >= 1 {
                (r.str()?, r.str()?)
            } else {
                ("", "")
            };
            RawNode::Model {
                name,
                assemblies,
                scale,
                manufacturer,
            }
        }
    })
}

/// Decodes the payload of `entry`. Payload bytes left over after the known
/// fields are an error, unless the buffer was written by a newer minor
/// version, in which case they are skipped.
pub(crate) fn parse_record<'a>(
    entry: &RecordEntry<'a>,
    header: &Header,
    options: &DecoderOptions,
) -> Result<RawNode<'a>, LoadError> {
    let mut r = PayloadReader {
        reader: entry.payload.clone(),
        options,
    };
    let raw = parse_payload(&mut r, entry.tag, header).map_err(|e| e.in_record(entry.id))?;
    if !r.reader.is_eof() {
        if header.is_newer() {
            r.reader.skip_rest();
        } else {
            return Err(LoadError::Format {
                offset: r.reader.position(),
                record: Some(entry.id),
                issue: FormatIssue::TrailingBytes {
                    count: r.reader.size(),
                },
            });
        }
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::error::ErrorKind;
    use modeltrack_buffers::Writer;

    fn entry(tag: Tag, payload: &[u8]) -> RecordEntry<'_> {
        RecordEntry {
            id: 42,
            tag,
            offset: 0,
            payload: Reader::new(payload),
        }
    }

    fn parse<'a>(e: &RecordEntry<'a>, minor: u16) -> Result<RawNode<'a>, LoadError> {
        parse_record(e, &Header { major: 1, minor }, &DecoderOptions::default())
    }

    #[test]
    fn color_with_rgb() {
        let mut w = Writer::new();
        w.str("Flat Black");
        w.str("");
        w.u8(PIGMENT_RGB);
        w.buf(&[10, 10, 10]);
        let data = w.flush();
        let e = entry(Tag::Color, &data);
        assert_eq!(
            parse(&e, 0).unwrap(),
            RawNode::Color {
                name: "Flat Black",
                brand: "",
                pigment: RawPigment::Rgb([10, 10, 10]),
            }
        );
    }

    #[test]
    fn paint_refs_in_order() {
        let mut w = Writer::new();
        w.u8(PAINT_KIND_REF);
        w.vu57(7);
        w.u8(PAINT_HAS_COLOR | PAINT_HAS_MIX);
        w.vu57(1);
        w.vu57(3);
        let data = w.flush();
        let e = entry(Tag::Paint, &data);
        assert_eq!(
            parse(&e, 0).unwrap().refs(),
            vec![
                (7, RefKind::PaintType),
                (1, RefKind::Color),
                (3, RefKind::ColorMix)
            ]
        );
    }

    #[test]
    fn paint_type_codes_are_checked() {
        let e = entry(Tag::PaintType, &[9]);
        assert!(matches!(
            parse(&e, 0),
            Err(LoadError::Format {
                issue: FormatIssue::BadDiscriminant { field: "paint type", value: 9 },
                ..
            })
        ));
        let e = entry(Tag::Paint, &[PAINT_KIND_INLINE, 0, PAINT_HAS_COLOR, 1]);
        let err = parse(&e, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(err.offset(), Some(1));
    }

    #[test]
    fn child_refs_accept_steps_and_assemblies() {
        assert!(RefKind::Child.accepts(Tag::Step));
        assert!(RefKind::Child.accepts(Tag::Assembly));
        assert!(!RefKind::Child.accepts(Tag::Part));
        assert!(!RefKind::Color.accepts(Tag::ColorMix));
    }

    #[test]
    fn unknown_paint_flag_bits_are_rejected() {
        let data = [PAINT_KIND_INLINE, 2, 0b100];
        let e = entry(Tag::Paint, &data);
        assert!(matches!(
            parse(&e, 0),
            Err(LoadError::Format {
                record: Some(42),
                issue: FormatIssue::BadDiscriminant { field: "paint flags", value: 4 },
                ..
            })
        ));
    }

    #[test]
    fn applied_flag_must_be_boolean() {
        let mut w = Writer::new();
        w.str("Hull");
        w.vu57(1);
        w.vu57(2);
        w.u8(2);
        w.vu57(0);
        let data = w.flush();
        let e = entry(Tag::Part, &data);
        assert!(matches!(
            parse(&e, 0),
            Err(LoadError::Format {
                issue: FormatIssue::BadDiscriminant { field: "applied flag", .. },
                ..
            })
        ));
    }

    #[test]
    fn trailing_bytes_depend_on_minor_version() {
        let data = [PAINT_KIND_INLINE, 2, PAINT_HAS_COLOR, 1, 0xAA, 0xBB];
        let e = entry(Tag::Paint, &data);
        assert!(matches!(
            parse(&e, 1),
            Err(LoadError::Format {
                issue: FormatIssue::TrailingBytes { count: 2 },
                ..
            })
        ));
        assert_eq!(
            parse(&e, 7).unwrap(),
            RawNode::Paint {
                kind: RawPaintKind::Inline(PaintType::Enamel),
                color: Some(1),
                mix: None,
            }
        );
    }

    #[test]
    fn model_metadata_defaults_before_minor_one() {
        let mut w = Writer::new();
        w.str("Destroyer Kit");
        w.vu57(0);
        let data = w.flush();
        let e = entry(Tag::Model, &data);
        assert!(matches!(
            parse(&e, 0).unwrap(),
            RawNode::Model { scale: "", manufacturer: "", .. }
        ));
        assert_eq!(parse(&e, 1).unwrap_err().record(), Some(42));
    }

    #[test]
    fn list_length_past_payload_is_truncation() {
        let mut w = Writer::new();
        w.str("Base");
        w.vu57(50);
        w.vu57(1);
        let data = w.flush();
        let e = entry(Tag::Assembly, &data);
        assert!(matches!(
            parse(&e, 0),
            Err(LoadError::Truncation { record: Some(42), .. })
        ));
    }
}
