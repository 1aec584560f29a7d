//! Second decode pass: linking records into a [`Model`].
//!
//! Records are resolved depth-first with an explicit work stack, so the
//! nesting of a hostile buffer never reaches the call stack. Each record
//! moves through three states:
//!
//! ```text
//! Pending ──▶ Expanding ──▶ Done(node)
//! ```
//!
//! A reference to a record that is still `Expanding` closes a cycle. A
//! `Done` record is handed out again as the same [`Arc`], which is how
//! shared values stay shared.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use super::constants::Tag;
use super::error::{FormatIssue, LoadError};
use super::index::{build_index, RecordEntry, RecordIndex};
use super::options::DecoderOptions;
use super::record::{
    parse_record, RawNode, RawPaintKind, RawPigment, RawPlacement, RefKind,
};
use crate::container::{
    Assembly, AssemblyChild, DecalApplication, Model, PaintApplication, Part, Step,
};
use crate::detail::{Color, ColorMix, Decal, Paint, PaintType, Pigment, Placement, Rgb};
use crate::error::ValidationError;

/// A decoded record.
#[derive(Debug, Clone)]
enum Node {
    Color(Arc<Color>),
    PaintType(PaintType),
    ColorMix(Arc<ColorMix>),
    Paint(Arc<Paint>),
    Decal(Arc<Decal>),
    Part(Arc<Part>),
    Step(Arc<Step>),
    Assembly(Arc<Assembly>),
    Model(Arc<Model>),
}

#[derive(Debug)]
enum Slot {
    Pending,
    Expanding,
    Done(Node),
}

/// A record being expanded: its parsed payload, its references and how
/// many of them have been visited.
struct Frame<'a> {
    index: usize,
    raw: RawNode<'a>,
    refs: Vec<(u64, RefKind)>,
    next: usize,
}

/// Per-call resolution state. Never shared between calls.
struct Resolver<'i, 'a> {
    index: &'i RecordIndex<'a>,
    options: &'i DecoderOptions,
    slots: Vec<Slot>,
    /// Records on the longest reference path down from each `Done` record,
    /// itself included.
    heights: Vec<usize>,
    /// Resolved child indices of each record, for the reachability walk.
    children: Vec<Vec<usize>>,
}

fn optional(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn is_container(tag: Tag) -> bool {
    matches!(tag, Tag::Part | Tag::Step | Tag::Assembly)
}

impl<'i, 'a> Resolver<'i, 'a> {
    fn new(index: &'i RecordIndex<'a>, options: &'i DecoderOptions) -> Self {
        let n = index.entries.len();
        Self {
            index,
            options,
            slots: (0..n).map(|_| Slot::Pending).collect(),
            heights: vec![0; n],
            children: vec![Vec::new(); n],
        }
    }

    fn entry(&self, index: usize) -> &'i RecordEntry<'a> {
        &self.index.entries[index]
    }

    fn open(&mut self, index: usize) -> Result<Frame<'a>, LoadError> {
        let raw = parse_record(self.entry(index), &self.index.header, self.options)?;
        self.slots[index] = Slot::Expanding;
        Ok(Frame {
            index,
            refs: raw.refs(),
            raw,
            next: 0,
        })
    }

    /// Resolves every record in declaration order.
    fn resolve_all(&mut self) -> Result<(), LoadError> {
        for index in 0..self.slots.len() {
            if matches!(self.slots[index], Slot::Pending) {
                self.resolve(index)?;
            }
        }
        Ok(())
    }

    fn resolve(&mut self, start: usize) -> Result<(), LoadError> {
        let mut stack = vec![self.open(start)?];
        while let Some(frame) = stack.last_mut() {
            if frame.next < frame.refs.len() {
                let (target, kind) = frame.refs[frame.next];
                frame.next += 1;
                let owner = frame.index;
                let child = self.check_ref(owner, target, kind)?;
                self.children[owner].push(child);
                match self.slots[child] {
                    Slot::Done(_) => {}
                    Slot::Expanding => {
                        let from = stack.iter().position(|f| f.index == child).unwrap_or(0);
                        let ids = stack[from..]
                            .iter()
                            .map(|f| self.entry(f.index).id)
                            .collect();
                        return Err(LoadError::Cycle { ids });
                    }
                    Slot::Pending => {
                        if stack.len() >= self.options.max_depth {
                            return Err(self.too_deep(owner));
                        }
                        let frame = self.open(child)?;
                        stack.push(frame);
                    }
                }
                continue;
            }
            if let Some(frame) = stack.pop() {
                // Children decoded earlier never sat on this stack, so the
                // stack length alone does not bound the tree.
                let height = 1 + self.children[frame.index]
                    .iter()
                    .map(|&c| self.heights[c])
                    .max()
                    .unwrap_or(0);
                if height > self.options.max_depth {
                    return Err(self.too_deep(frame.index));
                }
                self.heights[frame.index] = height;
                let id = self.entry(frame.index).id;
                let node = self
                    .build(id, frame.raw)
                    .map_err(|e| e.in_record(id))?;
                self.slots[frame.index] = Slot::Done(node);
            }
        }
        Ok(())
    }

    fn too_deep(&self, index: usize) -> LoadError {
        let entry = self.entry(index);
        LoadError::Format {
            offset: entry.offset,
            record: Some(entry.id),
            issue: FormatIssue::LimitExceeded {
                what: "reference depth",
                limit: self.options.max_depth,
            },
        }
    }

    /// Checks that `target` is declared and has a type `kind` accepts.
    /// Returns its entry index.
    fn check_ref(&self, owner: usize, target: u64, kind: RefKind) -> Result<usize, LoadError> {
        let entry = self.entry(owner);
        let fail = |issue| LoadError::Format {
            offset: entry.offset,
            record: Some(entry.id),
            issue,
        };
        let child = *self
            .index
            .by_id
            .get(&target)
            .ok_or_else(|| fail(FormatIssue::DanglingReference { target }))?;
        let found = self.entry(child).tag;
        if !kind.accepts(found) {
            return Err(fail(FormatIssue::WrongReference {
                target,
                expected: kind.name(),
                found,
            }));
        }
        Ok(child)
    }

    fn node(&self, target: u64) -> Result<&Node, LoadError> {
        match self.index.by_id.get(&target).map(|i| &self.slots[*i]) {
            Some(Slot::Done(node)) => Ok(node),
            _ => Err(LoadError::format(0, FormatIssue::DanglingReference { target })),
        }
    }

    fn color(&self, target: u64) -> Result<Arc<Color>, LoadError> {
        match self.node(target)? {
            Node::Color(c) => Ok(Arc::clone(c)),
            other => Err(wrong(target, RefKind::Color, other)),
        }
    }

    fn mix(&self, target: u64) -> Result<Arc<ColorMix>, LoadError> {
        match self.node(target)? {
            Node::ColorMix(m) => Ok(Arc::clone(m)),
            other => Err(wrong(target, RefKind::ColorMix, other)),
        }
    }

    fn paint_type(&self, target: u64) -> Result<PaintType, LoadError> {
        match self.node(target)? {
            Node::PaintType(t) => Ok(*t),
            other => Err(wrong(target, RefKind::PaintType, other)),
        }
    }

    fn paint(&self, target: u64) -> Result<Arc<Paint>, LoadError> {
        match self.node(target)? {
            Node::Paint(p) => Ok(Arc::clone(p)),
            other => Err(wrong(target, RefKind::Paint, other)),
        }
    }

    fn decal(&self, target: u64) -> Result<Arc<Decal>, LoadError> {
        match self.node(target)? {
            Node::Decal(d) => Ok(Arc::clone(d)),
            other => Err(wrong(target, RefKind::Decal, other)),
        }
    }

    fn part(&self, target: u64) -> Result<Arc<Part>, LoadError> {
        match self.node(target)? {
            Node::Part(p) => Ok(Arc::clone(p)),
            other => Err(wrong(target, RefKind::Part, other)),
        }
    }

    fn child(&self, target: u64) -> Result<AssemblyChild, LoadError> {
        match self.node(target)? {
            Node::Step(s) => Ok(AssemblyChild::Step(Arc::clone(s))),
            Node::Assembly(a) => Ok(AssemblyChild::Assembly(Arc::clone(a))),
            other => Err(wrong(target, RefKind::Child, other)),
        }
    }

    fn assembly(&self, target: u64) -> Result<Arc<Assembly>, LoadError> {
        match self.node(target)? {
            Node::Assembly(a) => Ok(Arc::clone(a)),
            other => Err(wrong(target, RefKind::Assembly, other)),
        }
    }

    /// Builds the node for record `id` once all its references are done.
    fn build(&self, id: u64, raw: RawNode<'a>) -> Result<Node, LoadError> {
        let valid = |source: ValidationError| LoadError::Validation { id, source };
        Ok(match raw {
            RawNode::Color {
                name,
                brand,
                pigment,
            } => {
                let pigment = match pigment {
                    RawPigment::Rgb([r, g, b]) => Pigment::Rgb(Rgb::new(r, g, b)),
                    RawPigment::Code(code) => Pigment::Code(code.to_string()),
                };
                Node::Color(Arc::new(
                    Color::new(name, optional(brand), pigment).map_err(valid)?,
                ))
            }
            RawNode::PaintType { kind } => Node::PaintType(kind),
            RawNode::ColorMix { name, components } => {
                let components = components
                    .into_iter()
                    .map(|(color, parts)| Ok((self.color(color)?, i64::from(parts))))
                    .collect::<Result<Vec<_>, LoadError>>()?;
                Node::ColorMix(Arc::new(
                    ColorMix::new(optional(name), components).map_err(valid)?,
                ))
            }
            RawNode::Paint { kind, color, mix } => {
                let kind = match kind {
                    RawPaintKind::Inline(kind) => kind,
                    RawPaintKind::Ref(target) => self.paint_type(target)?,
                };
                let color = color.map(|c| self.color(c)).transpose()?;
                let mix = mix.map(|m| self.mix(m)).transpose()?;
                Node::Paint(Arc::new(
                    Paint::from_parts(kind, color, mix).map_err(valid)?,
                ))
            }
            RawNode::Decal {
                name,
                placement,
                sheet,
            } => {
                let placement = match placement {
                    RawPlacement::Label(label) => Placement::Label(label.to_string()),
                    RawPlacement::At(x, y) => Placement::At { x, y },
                };
                Node::Decal(Arc::new(
                    Decal::new(name, placement, optional(sheet)).map_err(valid)?,
                ))
            }
            RawNode::Part {
                name,
                paints,
                decals,
            } => {
                let paints = paints
                    .into_iter()
                    .map(|(target, applied)| {
                        Ok(PaintApplication {
                            paint: self.paint(target)?,
                            applied,
                        })
                    })
                    .collect::<Result<Vec<_>, LoadError>>()?;
                let decals = decals
                    .into_iter()
                    .map(|(target, applied)| {
                        Ok(DecalApplication {
                            decal: self.decal(target)?,
                            applied,
                        })
                    })
                    .collect::<Result<Vec<_>, LoadError>>()?;
                Node::Part(Arc::new(Part::new(name, paints, decals).map_err(valid)?))
            }
            RawNode::Step { name, parts } => {
                let parts = parts
                    .into_iter()
                    .map(|target| self.part(target))
                    .collect::<Result<Vec<_>, LoadError>>()?;
                Node::Step(Arc::new(Step::new(optional(name), parts).map_err(valid)?))
            }
            RawNode::Assembly { name, children } => {
                let children = children
                    .into_iter()
                    .map(|target| self.child(target))
                    .collect::<Result<Vec<_>, LoadError>>()?;
                Node::Assembly(Arc::new(Assembly::new(name, children).map_err(valid)?))
            }
            RawNode::Model {
                name,
                assemblies,
                scale,
                manufacturer,
            } => {
                let assemblies = assemblies
                    .into_iter()
                    .map(|target| self.assembly(target))
                    .collect::<Result<Vec<_>, LoadError>>()?;
                let model = Model::new(name, assemblies)
                    .and_then(|m| m.with_scale(optional(scale)))
                    .and_then(|m| m.with_manufacturer(optional(manufacturer)))
                    .map_err(valid)?;
                Node::Model(Arc::new(model))
            }
        })
    }

    /// Walks the tree under `root`, checking that every reachable container
    /// has one parent. Returns the identifiers of records not reachable from
    /// `root`, in declaration order.
    fn walk(&self, root: usize) -> Result<Vec<u64>, LoadError> {
        let mut seen = vec![false; self.slots.len()];
        let mut parents: Vec<Option<u64>> = vec![None; self.slots.len()];
        let mut queue = VecDeque::from([root]);
        seen[root] = true;
        while let Some(index) = queue.pop_front() {
            let owner = self.entry(index);
            for &child in &self.children[index] {
                let target = self.entry(child);
                if is_container(target.tag) {
                    if let Some(first_parent) = parents[child] {
                        return Err(LoadError::Format {
                            offset: owner.offset,
                            record: Some(owner.id),
                            issue: FormatIssue::SharedContainer {
                                target: target.id,
                                first_parent,
                            },
                        });
                    }
                    parents[child] = Some(owner.id);
                }
                if !seen[child] {
                    seen[child] = true;
                    queue.push_back(child);
                }
            }
        }
        Ok(seen
            .iter()
            .enumerate()
            .filter(|(_, reached)| !**reached)
            .map(|(index, _)| self.entry(index).id)
            .collect())
    }

    /// Takes the root model out of the resolved records.
    fn take_root(&mut self) -> Result<(usize, Model), LoadError> {
        let root = self.index.root;
        let Some(&index) = self.index.by_id.get(&root) else {
            return Err(LoadError::RootType {
                id: root,
                found: None,
            });
        };
        match std::mem::replace(&mut self.slots[index], Slot::Pending) {
            Slot::Done(Node::Model(model)) => Ok((index, Arc::unwrap_or_clone(model))),
            _ => Err(LoadError::RootType {
                id: root,
                found: Some(self.entry(index).tag),
            }),
        }
    }
}

fn wrong(target: u64, expected: RefKind, found: &Node) -> LoadError {
    let found = match found {
        Node::Color(_) => Tag::Color,
        Node::PaintType(_) => Tag::PaintType,
        Node::ColorMix(_) => Tag::ColorMix,
        Node::Paint(_) => Tag::Paint,
        Node::Decal(_) => Tag::Decal,
        Node::Part(_) => Tag::Part,
        Node::Step(_) => Tag::Step,
        Node::Assembly(_) => Tag::Assembly,
        Node::Model(_) => Tag::Model,
    };
    LoadError::format(
        0,
        FormatIssue::WrongReference {
            target,
            expected: expected.name(),
            found,
        },
    )
}

/// A successful load together with what the caller may want to warn about.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub model: Model,
    /// Records that were declared and decoded but are not reachable from
    /// the root, in declaration order.
    pub unreachable: Vec<u64>,
}

/// Decodes model buffers.
///
/// A `Decoder` holds only its [`DecoderOptions`]; all resolution state
/// lives in the call, so one decoder can serve many threads at once.
///
/// Every declared record is decoded and validated, but only containers
/// reachable from the root are held to a single parent.
///
/// # Example
///
/// ```
/// use modeltrack::codec::{Decoder, Encoder};
/// use modeltrack::container::Model;
///
/// let bytes = Encoder::new().encode(&Model::new("Empty Kit", vec![]).unwrap());
/// let model = Decoder::new().decode(&bytes).unwrap();
/// assert_eq!(model.name(), "Empty Kit");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    options: DecoderOptions,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    pub fn decode(&self, data: &[u8]) -> Result<Model, LoadError> {
        self.decode_report(data).map(|report| report.model)
    }

    /// Like [`decode`](Self::decode), also reporting unreachable records.
    pub fn decode_report(&self, data: &[u8]) -> Result<LoadReport, LoadError> {
        let index = build_index(data, &self.options)?;
        let mut resolver = Resolver::new(&index, &self.options);
        resolver.resolve_all()?;
        let (root, model) = resolver.take_root()?;
        let unreachable = resolver.walk(root)?;
        if !unreachable.is_empty() {
            debug!(count = unreachable.len(), ids = ?unreachable, "unreachable records");
        }
        debug!(
            records = index.entries.len(),
            model = model.name(),
            assemblies = model.assemblies().len(),
            "decoded model"
        );
        Ok(LoadReport { model, unreachable })
    }
}
