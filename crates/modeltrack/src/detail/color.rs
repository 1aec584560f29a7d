//! Colors and color mixes.

use std::fmt;
use std::sync::Arc;

use crate::detail::{Paint, PaintType};
use crate::error::ValidationError;

/// Brand reported by a [`ColorMix`] whose components come from different
/// brands (or carry no brand at all).
pub const MIXTURE_BRAND: &str = "Mixture";

/// An sRGB triple. Every `u8` channel value is in range by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The concrete pigment behind a [`Color`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pigment {
    Rgb(Rgb),
    /// Manufacturer catalogue code, e.g. `XF-1` or `H12`.
    Code(String),
}

/// A named paint color.
///
/// Two colors are equal when name, brand and pigment all match. Colors are
/// shared between paints and mixes through [`Arc`], so a single `Color`
/// typically backs many parts of a kit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    name: String,
    brand: Option<String>,
    pigment: Pigment,
}

fn check_code(code: &str) -> Result<(), ValidationError> {
    let trimmed = code.trim();
    if trimmed.is_empty() || trimmed.len() != code.len() || code.chars().any(char::is_control) {
        return Err(ValidationError::InvalidColorCode {
            code: code.to_string(),
        });
    }
    Ok(())
}

impl Color {
    pub fn new(
        name: impl Into<String>,
        brand: Option<String>,
        pigment: Pigment,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName { kind: "color" });
        }
        if brand.as_deref().is_some_and(|b| b.trim().is_empty()) {
            return Err(ValidationError::EmptyName {
                kind: "color brand",
            });
        }
        if let Pigment::Code(code) = &pigment {
            check_code(code)?;
        }
        Ok(Self {
            name,
            brand,
            pigment,
        })
    }

    /// Shorthand for an unbranded RGB color.
    pub fn rgb(name: impl Into<String>, r: u8, g: u8, b: u8) -> Result<Self, ValidationError> {
        Self::new(name, None, Pigment::Rgb(Rgb::new(r, g, b)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    pub fn pigment(&self) -> &Pigment {
        &self.pigment
    }

    /// The manufacturer code, if the pigment is given as one.
    pub fn code(&self) -> Option<&str> {
        match &self.pigment {
            Pigment::Code(code) => Some(code),
            Pigment::Rgb(_) => None,
        }
    }

    /// Short label used in instructions: the code when there is one,
    /// otherwise the name.
    pub fn handle(&self) -> &str {
        self.code().unwrap_or(&self.name)
    }

    /// A paint of the given type applying this color.
    pub fn paint(self: &Arc<Self>, kind: PaintType) -> Paint {
        Paint::solid(kind, Arc::clone(self))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(brand) = &self.brand {
            write!(f, "{brand} ")?;
        }
        match &self.pigment {
            Pigment::Code(code) => write!(f, "{code} {}", self.name),
            Pigment::Rgb(rgb) => write!(f, "{} ({rgb})", self.name),
        }
    }
}

/// One weighted component of a [`ColorMix`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MixComponent {
    pub color: Arc<Color>,
    /// Positive number of parts of `color` in the mix.
    pub parts: u32,
}

/// A custom-mixed color: an ordered, non-empty list of colors with positive
/// integer proportions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorMix {
    name: Option<String>,
    components: Vec<MixComponent>,
    total: u64,
}

impl ColorMix {
    /// Builds a mix from `(color, parts)` pairs, in the order given.
    ///
    /// Proportions are taken as signed so that zero and negative values read
    /// from a buffer can be rejected here rather than wrapping.
    pub fn new(
        name: Option<String>,
        components: Vec<(Arc<Color>, i64)>,
    ) -> Result<Self, ValidationError> {
        if name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ValidationError::EmptyName { kind: "color mix" });
        }
        if components.is_empty() {
            return Err(ValidationError::EmptyMix);
        }
        let mut total: u64 = 0;
        let mut out = Vec::with_capacity(components.len());
        for (index, (color, value)) in components.into_iter().enumerate() {
            let parts = match i32::try_from(value) {
                Ok(parts) if parts > 0 => parts.unsigned_abs(),
                Ok(_) => return Err(ValidationError::NonPositiveProportion { index, value }),
                Err(_) if value <= 0 => {
                    return Err(ValidationError::NonPositiveProportion { index, value })
                }
                Err(_) => return Err(ValidationError::ProportionOverflow),
            };
            total += parts as u64;
            out.push(MixComponent { color, parts });
        }
        Ok(Self {
            name,
            components: out,
            total,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn components(&self) -> &[MixComponent] {
        &self.components
    }

    /// Sum of all component proportions.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Normalized proportion of component `index`; all fractions sum to 1.0.
    pub fn fraction(&self, index: usize) -> Option<f64> {
        self.components
            .get(index)
            .map(|c| c.parts as f64 / self.total as f64)
    }

    /// The shared brand of every component, or [`MIXTURE_BRAND`].
    pub fn brand(&self) -> &str {
        let mut brands = self.components.iter().map(|c| c.color.brand());
        match brands.next().flatten() {
            Some(first) if brands.all(|b| b == Some(first)) => first,
            _ => MIXTURE_BRAND,
        }
    }

    /// Mixing recipe in the form `XF-1:2 + XF-2:1`.
    pub fn code(&self) -> String {
        self.components
            .iter()
            .map(|c| format!("{}:{}", c.color.handle(), c.parts))
            .collect::<Vec<_>>()
            .join(" + ")
    }

    /// Short label: the mix name when given, otherwise its recipe.
    pub fn handle(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.code(),
        }
    }

    /// A paint of the given type applying this mix.
    pub fn paint(self: &Arc<Self>, kind: PaintType) -> Paint {
        Paint::mixed(kind, Arc::clone(self))
    }
}

impl fmt::Display for ColorMix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} [{}]", self.code()),
            None => write!(f, "[{}]", self.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tamiya(code: &str, name: &str) -> Arc<Color> {
        Arc::new(
            Color::new(
                name,
                Some("Tamiya".to_string()),
                Pigment::Code(code.to_string()),
            )
            .unwrap(),
        )
    }

    #[test]
    fn color_requires_name() {
        assert_eq!(
            Color::rgb("  ", 0, 0, 0),
            Err(ValidationError::EmptyName { kind: "color" })
        );
    }

    #[test]
    fn color_code_must_be_printable() {
        let err = Color::new("Red", None, Pigment::Code("X-7\n".into())).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidColorCode { .. }));
        assert!(Color::new("Red", None, Pigment::Code(String::new())).is_err());
    }

    #[test]
    fn brand_is_part_of_equality() {
        let plain = Color::new("Red", None, Pigment::Code("X-7".into())).unwrap();
        assert_ne!(*tamiya("X-7", "Red"), plain);
        assert_eq!(*tamiya("X-7", "Red"), *tamiya("X-7", "Red"));
    }

    #[test]
    fn handle_prefers_code() {
        let red = tamiya("X-7", "Red");
        assert_eq!(red.handle(), "X-7");
        let black = Color::rgb("Flat Black", 10, 10, 10).unwrap();
        assert_eq!(black.handle(), "Flat Black");
        assert_eq!(black.to_string(), "Flat Black (#0a0a0a)");
    }

    #[test]
    fn mix_code_and_shared_brand() {
        let mix = ColorMix::new(
            None,
            vec![(tamiya("XF-1", "Flat Black"), 2), (tamiya("XF-2", "Flat White"), 1)],
        )
        .unwrap();
        assert_eq!(mix.code(), "XF-1:2 + XF-2:1");
        assert_eq!(mix.brand(), "Tamiya");
        assert_eq!(mix.total(), 3);
        let sum: f64 = (0..2).filter_map(|i| mix.fraction(i)).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mix_of_different_brands_is_a_mixture() {
        let grey = Arc::new(Color::rgb("Grey", 128, 128, 128).unwrap());
        let mix = ColorMix::new(
            Some("Deck Tan".into()),
            vec![(tamiya("XF-57", "Buff"), 3), (grey, 1)],
        )
        .unwrap();
        assert_eq!(mix.brand(), MIXTURE_BRAND);
        assert_eq!(mix.handle(), "Deck Tan");
    }

    #[test]
    fn mix_rejects_empty_and_non_positive() {
        assert_eq!(ColorMix::new(None, vec![]), Err(ValidationError::EmptyMix));
        let red = tamiya("X-7", "Red");
        assert_eq!(
            ColorMix::new(None, vec![(red.clone(), 1), (red.clone(), 0)]),
            Err(ValidationError::NonPositiveProportion { index: 1, value: 0 })
        );
        assert_eq!(
            ColorMix::new(None, vec![(red, -3)]),
            Err(ValidationError::NonPositiveProportion {
                index: 0,
                value: -3
            })
        );
    }

    #[test]
    fn mix_proportion_must_fit_the_wire() {
        let red = tamiya("X-7", "Red");
        assert!(ColorMix::new(None, vec![(red.clone(), i32::MAX as i64)]).is_ok());
        assert_eq!(
            ColorMix::new(None, vec![(red, i32::MAX as i64 + 1)]),
            Err(ValidationError::ProportionOverflow)
        );
    }
}
