use std::fmt;
use std::sync::Arc;

use crate::container::BuildProgress;
use crate::detail::{Decal, Paint};
use crate::error::ValidationError;

/// A paint listed for a part, and whether it has been applied yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaintApplication {
    pub paint: Arc<Paint>,
    pub applied: bool,
}

/// A decal listed for a part, and whether it has been applied yet.
#[derive(Debug, Clone, PartialEq)]
pub struct DecalApplication {
    pub decal: Arc<Decal>,
    pub applied: bool,
}

/// A leaf buildable unit, e.g. a sprue part number.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    name: String,
    paints: Vec<PaintApplication>,
    decals: Vec<DecalApplication>,
}

impl Part {
    /// Builds a part. Each paint and each decal may be listed once.
    pub fn new(
        name: impl Into<String>,
        paints: Vec<PaintApplication>,
        decals: Vec<DecalApplication>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName { kind: "part" });
        }
        for (i, a) in paints.iter().enumerate() {
            if paints[..i].iter().any(|b| b.paint == a.paint) {
                return Err(ValidationError::DuplicateDetail { part: name, what: "paint" });
            }
        }
        for (i, a) in decals.iter().enumerate() {
            if decals[..i].iter().any(|b| b.decal == a.decal) {
                return Err(ValidationError::DuplicateDetail { part: name, what: "decal" });
            }
        }
        Ok(Self {
            name,
            paints,
            decals,
        })
    }

    /// A part with nothing applied yet.
    pub fn unfinished(
        name: impl Into<String>,
        paints: Vec<Arc<Paint>>,
        decals: Vec<Arc<Decal>>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            name,
            paints
                .into_iter()
                .map(|paint| PaintApplication { paint, applied: false })
                .collect(),
            decals
                .into_iter()
                .map(|decal| DecalApplication { decal, applied: false })
                .collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn paints(&self) -> &[PaintApplication] {
        &self.paints
    }

    pub fn decals(&self) -> &[DecalApplication] {
        &self.decals
    }

    /// Whether `paint` has been applied, or `None` if the part does not use it.
    pub fn paint_status(&self, paint: &Paint) -> Option<bool> {
        self.paints
            .iter()
            .find(|a| *a.paint == *paint)
            .map(|a| a.applied)
    }

    /// Whether `decal` has been applied, or `None` if the part does not use it.
    pub fn decal_status(&self, decal: &Decal) -> Option<bool> {
        self.decals
            .iter()
            .find(|a| *a.decal == *decal)
            .map(|a| a.applied)
    }
}

impl BuildProgress for Part {
    fn is_painted(&self) -> bool {
        self.paints.iter().all(|a| a.applied)
    }

    fn is_decaled(&self) -> bool {
        self.decals.iter().all(|a| a.applied)
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.name)?;
        for a in &self.paints {
            write!(f, ", {}: {}", a.paint, a.applied)?;
        }
        for a in &self.decals {
            write!(f, ", {}: {}", a.decal, a.applied)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::{Color, PaintType, Placement};

    fn black() -> Arc<Paint> {
        let color = Arc::new(Color::rgb("Flat Black", 10, 10, 10).unwrap());
        Arc::new(color.paint(PaintType::Enamel))
    }

    #[test]
    fn progress_follows_applied_flags() {
        let paint = black();
        let decal = Arc::new(Decal::new("4", Placement::Label("hull".into()), None).unwrap());
        let part = Part::new(
            "Hull",
            vec![PaintApplication { paint: paint.clone(), applied: true }],
            vec![DecalApplication { decal: decal.clone(), applied: false }],
        )
        .unwrap();
        assert!(part.is_painted());
        assert!(!part.is_decaled());
        assert!(!part.is_complete());
        assert_eq!(part.paint_status(&paint), Some(true));
        assert_eq!(part.decal_status(&decal), Some(false));
    }

    #[test]
    fn part_without_details_is_complete() {
        let part = Part::unfinished("A1", vec![], vec![]).unwrap();
        assert!(part.is_complete());
    }

    #[test]
    fn duplicate_paint_is_rejected() {
        // Content-equal paints count as the same paint.
        let err = Part::unfinished("Hull", vec![black(), black()], vec![]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateDetail {
                part: "Hull".into(),
                what: "paint"
            }
        );
    }

    #[test]
    fn unknown_paint_has_no_status() {
        let part = Part::unfinished("Hull", vec![], vec![]).unwrap();
        assert_eq!(part.paint_status(&black()), None);
    }
}
