use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::container::{Assembly, BuildProgress, Part, Step};
use crate::detail::{Decal, Paint};
use crate::error::ValidationError;

/// The root of a kit: metadata plus top-level assemblies in build order.
///
/// A `Model` is a read-only snapshot of one build state. It is `Send + Sync`
/// and can be shared across threads without locking.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    name: String,
    scale: Option<String>,
    manufacturer: Option<String>,
    assemblies: Vec<Arc<Assembly>>,
}

fn check_optional(value: &Option<String>, kind: &'static str) -> Result<(), ValidationError> {
    if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
        return Err(ValidationError::EmptyName { kind });
    }
    Ok(())
}

impl Model {
    pub fn new(
        name: impl Into<String>,
        assemblies: Vec<Arc<Assembly>>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName { kind: "model" });
        }
        Ok(Self {
            name,
            scale: None,
            manufacturer: None,
            assemblies,
        })
    }

    /// Sets the kit scale, e.g. `1/700`.
    pub fn with_scale(mut self, scale: Option<String>) -> Result<Self, ValidationError> {
        check_optional(&scale, "model scale")?;
        self.scale = scale;
        Ok(self)
    }

    pub fn with_manufacturer(
        mut self,
        manufacturer: Option<String>,
    ) -> Result<Self, ValidationError> {
        check_optional(&manufacturer, "model manufacturer")?;
        self.manufacturer = manufacturer;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scale(&self) -> Option<&str> {
        self.scale.as_deref()
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
    }

    pub fn assemblies(&self) -> &[Arc<Assembly>] {
        &self.assemblies
    }

    /// Every step of the kit in build order.
    pub fn steps(&self) -> Vec<&Arc<Step>> {
        let mut out = Vec::new();
        for assembly in &self.assemblies {
            assembly.collect_steps(&mut out);
        }
        out
    }

    /// Step by its 1-based instruction number.
    pub fn step(&self, number: usize) -> Option<&Arc<Step>> {
        number
            .checked_sub(1)
            .and_then(|index| self.steps().get(index).copied())
    }

    /// First step called `name`.
    pub fn step_named(&self, name: &str) -> Option<&Arc<Step>> {
        self.steps().into_iter().find(|s| s.name() == Some(name))
    }

    /// Every part of the kit in build order.
    pub fn parts(&self) -> Vec<&Arc<Part>> {
        self.steps()
            .into_iter()
            .flat_map(|step| step.parts())
            .collect()
    }

    /// Parts called `name`, anywhere in the kit.
    pub fn find_parts(&self, name: &str) -> Vec<&Arc<Part>> {
        self.parts()
            .into_iter()
            .filter(|p| p.name() == name)
            .collect()
    }

    /// Distinct paints used by the kit, in order of first use.
    pub fn paints(&self) -> Vec<&Arc<Paint>> {
        let mut seen: IndexSet<&Arc<Paint>> = IndexSet::new();
        for part in self.parts() {
            seen.extend(part.paints().iter().map(|a| &a.paint));
        }
        seen.into_iter().collect()
    }

    /// Distinct decals used by the kit, in order of first use.
    pub fn decals(&self) -> Vec<&Arc<Decal>> {
        let mut out: Vec<&Arc<Decal>> = Vec::new();
        for part in self.parts() {
            for a in part.decals() {
                if !out.iter().any(|d| **d == a.decal) {
                    out.push(&a.decal);
                }
            }
        }
        out
    }
}

impl BuildProgress for Model {
    fn is_painted(&self) -> bool {
        self.assemblies.iter().all(|a| a.is_painted())
    }

    fn is_decaled(&self) -> bool {
        self.assemblies.iter().all(|a| a.is_decaled())
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match (&self.manufacturer, &self.scale) {
            (Some(m), Some(s)) => write!(f, " ({m}, {s})"),
            (Some(v), None) | (None, Some(v)) => write!(f, " ({v})"),
            (None, None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::AssemblyChild;
    use crate::detail::{Color, PaintType, Placement};

    fn kit() -> (Model, Arc<Paint>) {
        let grey = Arc::new(Color::rgb("Haze Grey", 120, 130, 140).unwrap());
        let paint = Arc::new(grey.paint(PaintType::Lacquer));
        let flag = Arc::new(Decal::new("Ensign", Placement::Label("mast".into()), None).unwrap());
        let hull = Arc::new(Part::unfinished("Hull", vec![paint.clone()], vec![]).unwrap());
        let deck = Arc::new(Part::unfinished("Deck", vec![paint.clone()], vec![flag]).unwrap());
        let s1 = Arc::new(Step::new(Some("Hull".into()), vec![hull]).unwrap());
        let s2 = Arc::new(Step::new(Some("Deck".into()), vec![deck]).unwrap());
        let base = Arc::new(
            Assembly::new(
                "Base",
                vec![AssemblyChild::Step(s1), AssemblyChild::Step(s2)],
            )
            .unwrap(),
        );
        let model = Model::new("Destroyer Kit", vec![base])
            .unwrap()
            .with_scale(Some("1/700".into()))
            .unwrap();
        (model, paint)
    }

    #[test]
    fn step_lookup_is_one_based() {
        let (model, _) = kit();
        assert_eq!(model.step(1).and_then(|s| s.name()), Some("Hull"));
        assert_eq!(model.step(2).and_then(|s| s.name()), Some("Deck"));
        assert!(model.step(0).is_none());
        assert!(model.step(3).is_none());
        assert_eq!(model.step_named("Deck").map(|s| s.parts().len()), Some(1));
    }

    #[test]
    fn paints_and_decals_are_distinct() {
        let (model, paint) = kit();
        let paints = model.paints();
        assert_eq!(paints.len(), 1);
        assert!(Arc::ptr_eq(paints[0], &paint));
        assert_eq!(model.decals().len(), 1);
        assert!(!model.is_complete());
    }

    #[test]
    fn metadata_validation_and_display() {
        let (model, _) = kit();
        assert_eq!(model.to_string(), "Destroyer Kit (1/700)");
        assert!(Model::new(" ", vec![]).is_err());
        assert!(Model::new("Kit", vec![])
            .unwrap()
            .with_manufacturer(Some(String::new()))
            .is_err());
    }
}
