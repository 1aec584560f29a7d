use std::sync::Arc;

use crate::container::{BuildProgress, Part, Step};
use crate::detail::Paint;
use crate::error::ValidationError;

/// A child of an [`Assembly`]: a build step or a nested sub-assembly.
#[derive(Debug, Clone, PartialEq)]
pub enum AssemblyChild {
    Step(Arc<Step>),
    Assembly(Arc<Assembly>),
}

impl AssemblyChild {
    pub fn as_step(&self) -> Option<&Arc<Step>> {
        match self {
            AssemblyChild::Step(step) => Some(step),
            AssemblyChild::Assembly(_) => None,
        }
    }

    pub fn as_assembly(&self) -> Option<&Arc<Assembly>> {
        match self {
            AssemblyChild::Assembly(assembly) => Some(assembly),
            AssemblyChild::Step(_) => None,
        }
    }
}

impl BuildProgress for AssemblyChild {
    fn is_painted(&self) -> bool {
        match self {
            AssemblyChild::Step(step) => step.is_painted(),
            AssemblyChild::Assembly(assembly) => assembly.is_painted(),
        }
    }

    fn is_decaled(&self) -> bool {
        match self {
            AssemblyChild::Step(step) => step.is_decaled(),
            AssemblyChild::Assembly(assembly) => assembly.is_decaled(),
        }
    }
}

/// A named group of steps and sub-assemblies, kept in build order.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    name: String,
    children: Vec<AssemblyChild>,
}

impl Assembly {
    pub fn new(
        name: impl Into<String>,
        children: Vec<AssemblyChild>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName { kind: "assembly" });
        }
        Ok(Self { name, children })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[AssemblyChild] {
        &self.children
    }

    /// Steps directly inside this assembly.
    pub fn steps(&self) -> impl Iterator<Item = &Arc<Step>> {
        self.children.iter().filter_map(AssemblyChild::as_step)
    }

    /// Sub-assemblies directly inside this assembly.
    pub fn assemblies(&self) -> impl Iterator<Item = &Arc<Assembly>> {
        self.children.iter().filter_map(AssemblyChild::as_assembly)
    }

    /// Every step of this assembly and its sub-assemblies, in build order.
    pub fn all_steps(&self) -> Vec<&Arc<Step>> {
        let mut out = Vec::new();
        self.collect_steps(&mut out);
        out
    }

    pub(crate) fn collect_steps<'a>(&'a self, out: &mut Vec<&'a Arc<Step>>) {
        for child in &self.children {
            match child {
                AssemblyChild::Step(step) => out.push(step),
                AssemblyChild::Assembly(assembly) => assembly.collect_steps(out),
            }
        }
    }

    /// Every part in this assembly and its sub-assemblies, in build order.
    pub fn parts(&self) -> Vec<&Arc<Part>> {
        self.all_steps()
            .into_iter()
            .flat_map(|step| step.parts())
            .collect()
    }

    /// Parts called `name` in this assembly's own steps, and with
    /// `recursive` also in nested sub-assemblies.
    pub fn find(&self, name: &str, recursive: bool) -> Vec<&Arc<Part>> {
        let mut out = Vec::new();
        for child in &self.children {
            match child {
                AssemblyChild::Step(step) => out.extend(step.find(name)),
                AssemblyChild::Assembly(assembly) if recursive => {
                    out.extend(assembly.find(name, true))
                }
                AssemblyChild::Assembly(_) => {}
            }
        }
        out
    }

    /// Parts that list `paint` but have not had it applied yet.
    pub fn unpainted(&self, paint: &Paint) -> Vec<&Arc<Part>> {
        self.parts()
            .into_iter()
            .filter(|p| p.paint_status(paint) == Some(false))
            .collect()
    }

    /// Parts with at least one decal still to apply.
    pub fn undecaled(&self) -> Vec<&Arc<Part>> {
        self.parts()
            .into_iter()
            .filter(|p| !p.is_decaled())
            .collect()
    }
}

impl BuildProgress for Assembly {
    fn is_painted(&self) -> bool {
        self.children.iter().all(BuildProgress::is_painted)
    }

    fn is_decaled(&self) -> bool {
        self.children.iter().all(BuildProgress::is_decaled)
    }
}
