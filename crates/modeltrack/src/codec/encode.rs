//! Model buffer writer.
//!
//! Records are emitted children-first with sequential identifiers starting
//! at 1, so a buffer written here never needs forward references. Values
//! shared through one [`Arc`] are written once and referenced by id.

use std::collections::HashMap;
use std::sync::Arc;

use modeltrack_buffers::Writer;

use super::constants::*;
use crate::container::{Assembly, AssemblyChild, Model, Part, Step};
use crate::detail::{Color, ColorMix, Decal, Paint, PaintDetail, Pigment, Placement};

/// Writes [`Model`]s in the current format version.
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder;

impl Encoder {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(&self, model: &Model) -> Vec<u8> {
        let mut body = Body::default();
        let root = body.model(model);

        let mut w = Writer::with_capacity(HEADER_LEN + body.out.len() + 16);
        w.buf(&MAGIC);
        w.u16(FORMAT_MAJOR);
        w.u16(FORMAT_MINOR);
        w.vu57(body.count);
        w.buf(&body.out.flush());
        w.vu57(root);
        w.flush()
    }
}

/// Per-call writer state. Identifiers are keyed by allocation address,
/// which is stable while the model is borrowed.
#[derive(Default)]
struct Body {
    out: Writer,
    ids: HashMap<*const (), u64>,
    count: u64,
    payload: Writer,
}

fn key<T>(value: &Arc<T>) -> *const () {
    Arc::as_ptr(value).cast()
}

fn opt(value: Option<&str>) -> &str {
    value.unwrap_or("")
}

impl Body {
    fn record(&mut self, tag: Tag) -> u64 {
        self.count += 1;
        let id = self.count;
        let payload = self.payload.flush();
        self.out.vu57(id);
        self.out.u8(tag as u8);
        self.out.vu57(payload.len() as u64);
        self.out.buf(&payload);
        id
    }

    fn shared<T>(&mut self, value: &Arc<T>, write: impl FnOnce(&mut Self) -> u64) -> u64 {
        if let Some(id) = self.ids.get(&key(value)) {
            return *id;
        }
        let id = write(self);
        self.ids.insert(key(value), id);
        id
    }

    fn refs(&mut self, ids: &[u64]) {
        self.payload.vu57(ids.len() as u64);
        for id in ids {
            self.payload.vu57(*id);
        }
    }

    fn color(&mut self, color: &Arc<Color>) -> u64 {
        self.shared(color, |b| {
            let p = &mut b.payload;
            p.str(color.name());
            p.str(opt(color.brand()));
            match color.pigment() {
                Pigment::Rgb(rgb) => {
                    p.u8(PIGMENT_RGB);
                    p.buf(&[rgb.r, rgb.g, rgb.b]);
                }
                Pigment::Code(code) => {
                    p.u8(PIGMENT_CODE);
                    p.str(code);
                }
            }
            b.record(Tag::Color)
        })
    }

    fn mix(&mut self, mix: &Arc<ColorMix>) -> u64 {
        self.shared(mix, |b| {
            let colors: Vec<u64> = mix.components().iter().map(|c| b.color(&c.color)).collect();
            b.payload.str(opt(mix.name()));
            b.payload.vu57(colors.len() as u64);
            for (id, component) in colors.iter().zip(mix.components()) {
                b.payload.vu57(*id);
                b.payload.i32(component.parts as i32);
            }
            b.record(Tag::ColorMix)
        })
    }

    fn paint(&mut self, paint: &Arc<Paint>) -> u64 {
        self.shared(paint, |b| {
            let (flag, detail) = match paint.detail() {
                PaintDetail::Color(color) => (PAINT_HAS_COLOR, b.color(color)),
                PaintDetail::Mix(mix) => (PAINT_HAS_MIX, b.mix(mix)),
            };
            b.payload.u8(PAINT_KIND_INLINE);
            b.payload.u8(paint.kind().code());
            b.payload.u8(flag);
            b.payload.vu57(detail);
            b.record(Tag::Paint)
        })
    }

    fn decal(&mut self, decal: &Arc<Decal>) -> u64 {
        self.shared(decal, |b| {
            let p = &mut b.payload;
            p.str(decal.name());
            match decal.placement() {
                Placement::Label(label) => {
                    p.u8(PLACEMENT_LABEL);
                    p.str(label);
                }
                Placement::At { x, y } => {
                    p.u8(PLACEMENT_AT);
                    p.f32(*x);
                    p.f32(*y);
                }
            }
            p.str(opt(decal.sheet()));
            b.record(Tag::Decal)
        })
    }

    fn part(&mut self, part: &Part) -> u64 {
        let paints: Vec<(u64, bool)> = part
            .paints()
            .iter()
            .map(|a| (self.paint(&a.paint), a.applied))
            .collect();
        let decals: Vec<(u64, bool)> = part
            .decals()
            .iter()
            .map(|a| (self.decal(&a.decal), a.applied))
            .collect();
        self.payload.str(part.name());
        for list in [paints, decals] {
            self.payload.vu57(list.len() as u64);
            for (id, applied) in list {
                self.payload.vu57(id);
                self.payload.u8(applied as u8);
            }
        }
        self.record(Tag::Part)
    }

    fn step(&mut self, step: &Step) -> u64 {
        let parts: Vec<u64> = step.parts().iter().map(|p| self.part(p)).collect();
        self.payload.str(opt(step.name()));
        self.refs(&parts);
        self.record(Tag::Step)
    }

    fn assembly(&mut self, assembly: &Assembly) -> u64 {
        let children: Vec<u64> = assembly
            .children()
            .iter()
            .map(|child| match child {
                AssemblyChild::Step(step) => self.step(step),
                AssemblyChild::Assembly(nested) => self.assembly(nested),
            })
            .collect();
        self.payload.str(assembly.name());
        self.refs(&children);
        self.record(Tag::Assembly)
    }

    fn model(&mut self, model: &Model) -> u64 {
        let assemblies: Vec<u64> = model
            .assemblies()
            .iter()
            .map(|a| self.assembly(a))
            .collect();
        self.payload.str(model.name());
        self.refs(&assemblies);
        self.payload.str(opt(model.scale()));
        self.payload.str(opt(model.manufacturer()));
        self.record(Tag::Model)
    }
}
