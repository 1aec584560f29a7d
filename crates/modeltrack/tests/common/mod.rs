//! Hand-written model buffers for the integration suites.

#![allow(dead_code)]

use modeltrack::codec::{Tag, MAGIC};
use modeltrack_buffers::Writer;

/// Assembles a buffer record by record, in the order records are added.
pub struct BufferBuilder {
    major: u16,
    minor: u16,
    records: Vec<(u64, u8, Vec<u8>)>,
}

impl BufferBuilder {
    pub fn new() -> Self {
        Self::version(1, 1)
    }

    pub fn version(major: u16, minor: u16) -> Self {
        Self {
            major,
            minor,
            records: Vec::new(),
        }
    }

    pub fn record(self, id: u64, tag: Tag, build: impl FnOnce(&mut Writer)) -> Self {
        self.raw(id, tag as u8, build)
    }

    /// A record with an arbitrary tag byte.
    pub fn raw(mut self, id: u64, tag: u8, build: impl FnOnce(&mut Writer)) -> Self {
        let mut w = Writer::new();
        build(&mut w);
        self.records.push((id, tag, w.flush()));
        self
    }

    pub fn finish(self, root: u64) -> Vec<u8> {
        let mut w = Writer::new();
        w.buf(&MAGIC);
        w.u16(self.major);
        w.u16(self.minor);
        w.vu57(self.records.len() as u64);
        for (id, tag, payload) in self.records {
            w.vu57(id);
            w.u8(tag);
            w.vu57(payload.len() as u64);
            w.buf(&payload);
        }
        w.vu57(root);
        w.flush()
    }
}

// ── Payload helpers ─────────────────────────────────────────────────────────

pub fn refs(w: &mut Writer, ids: &[u64]) {
    w.vu57(ids.len() as u64);
    for id in ids {
        w.vu57(*id);
    }
}

pub fn rgb_color(w: &mut Writer, name: &str, rgb: [u8; 3]) {
    w.str(name);
    w.str("");
    w.u8(0);
    w.buf(&rgb);
}

pub fn code_color(w: &mut Writer, name: &str, brand: &str, code: &str) {
    w.str(name);
    w.str(brand);
    w.u8(1);
    w.str(code);
}

/// Paint with an inline type code and the given detail references.
pub fn paint(w: &mut Writer, code: u8, color: Option<u64>, mix: Option<u64>) {
    w.u8(0);
    w.u8(code);
    w.u8(u8::from(color.is_some()) | u8::from(mix.is_some()) << 1);
    if let Some(id) = color {
        w.vu57(id);
    }
    if let Some(id) = mix {
        w.vu57(id);
    }
}

pub fn mix(w: &mut Writer, name: &str, components: &[(u64, i32)]) {
    w.str(name);
    w.vu57(components.len() as u64);
    for (color, parts) in components {
        w.vu57(*color);
        w.i32(*parts);
    }
}

pub fn part(w: &mut Writer, name: &str, paints: &[(u64, bool)], decals: &[(u64, bool)]) {
    w.str(name);
    for list in [paints, decals] {
        w.vu57(list.len() as u64);
        for (id, applied) in list {
            w.vu57(*id);
            w.u8(u8::from(*applied));
        }
    }
}

pub fn step(w: &mut Writer, name: &str, parts: &[u64]) {
    w.str(name);
    refs(w, parts);
}

pub fn assembly(w: &mut Writer, name: &str, children: &[u64]) {
    w.str(name);
    refs(w, children);
}

/// Model payload for format 1.1.
pub fn model(w: &mut Writer, name: &str, assemblies: &[u64], scale: &str, manufacturer: &str) {
    w.str(name);
    refs(w, assemblies);
    w.str(scale);
    w.str(manufacturer);
}

/// The destroyer kit: one color, one paint, one part, step, assembly and
/// model, declared leaves first.
pub fn destroyer_kit(minor: u16) -> Vec<u8> {
    BufferBuilder::version(1, minor)
        .record(1, Tag::Color, |w| rgb_color(w, "Flat Black", [10, 10, 10]))
        .record(2, Tag::Paint, |w| paint(w, 2, Some(1), None))
        .record(3, Tag::Part, |w| part(w, "Hull", &[(2, false)], &[]))
        .record(4, Tag::Step, |w| step(w, "", &[3]))
        .record(5, Tag::Assembly, |w| assembly(w, "Base", &[4]))
        .record(6, Tag::Model, |w| {
            w.str("Destroyer Kit");
            refs(w, &[5]);
            if minor >= 1 {
                w.str("");
                w.str("");
            }
        })
        .finish(6)
}
