//! Decals.

use std::fmt;

use crate::error::ValidationError;

/// Where a decal goes on its part.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// Free-form position reference, usually the instruction callout.
    Label(String),
    /// Position on the part's instruction diagram.
    At { x: f32, y: f32 },
}

/// An applied graphic.
#[derive(Debug, Clone, PartialEq)]
pub struct Decal {
    name: String,
    placement: Placement,
    sheet: Option<String>,
}

impl Decal {
    pub fn new(
        name: impl Into<String>,
        placement: Placement,
        sheet: Option<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName { kind: "decal" });
        }
        match &placement {
            Placement::Label(label) if label.trim().is_empty() => {
                return Err(ValidationError::EmptyName {
                    kind: "decal placement",
                })
            }
            Placement::At { x, y } if !x.is_finite() || !y.is_finite() => {
                return Err(ValidationError::NonFiniteCoordinate)
            }
            _ => {}
        }
        if sheet.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(ValidationError::EmptyName {
                kind: "decal sheet",
            });
        }
        Ok(Self {
            name,
            placement,
            sheet,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Identifier of the decal sheet this decal comes from.
    pub fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }
}

impl fmt::Display for Decal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decal {}", self.name)?;
        if let Some(sheet) = &self.sheet {
            write!(f, " ({sheet})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decal_validation() {
        assert!(Decal::new("12", Placement::Label("stern".into()), None).is_ok());
        assert_eq!(
            Decal::new("", Placement::Label("stern".into()), None),
            Err(ValidationError::EmptyName { kind: "decal" })
        );
        assert_eq!(
            Decal::new("12", Placement::At { x: f32::NAN, y: 0.0 }, None),
            Err(ValidationError::NonFiniteCoordinate)
        );
        assert_eq!(
            Decal::new("12", Placement::Label("bow".into()), Some(" ".into())),
            Err(ValidationError::EmptyName {
                kind: "decal sheet"
            })
        );
    }

    #[test]
    fn display_includes_sheet() {
        let decal = Decal::new("7", Placement::At { x: 0.5, y: 0.25 }, Some("A".into())).unwrap();
        assert_eq!(decal.to_string(), "decal 7 (A)");
    }
}
