//! Paint types and paints.

use std::fmt;
use std::sync::Arc;

use crate::detail::{Color, ColorMix};
use crate::error::ValidationError;

/// Finish, medium or application classifier of a [`Paint`].
///
/// The discriminants are the wire codes used by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PaintType {
    Acrylic = 1,
    Enamel = 2,
    Lacquer = 3,
    /// Applied from a rattle can or airbrush, medium unspecified.
    Spray = 4,
    /// Applied by brush, medium unspecified.
    Brush = 5,
}

impl PaintType {
    pub const ALL: [PaintType; 5] = [
        PaintType::Acrylic,
        PaintType::Enamel,
        PaintType::Lacquer,
        PaintType::Spray,
        PaintType::Brush,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaintType::Acrylic => "acrylic",
            PaintType::Enamel => "enamel",
            PaintType::Lacquer => "lacquer",
            PaintType::Spray => "spray",
            PaintType::Brush => "brush",
        }
    }
}

impl fmt::Display for PaintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a [`Paint`] puts on the part: a single color or a mix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PaintDetail {
    Color(Arc<Color>),
    Mix(Arc<ColorMix>),
}

impl PaintDetail {
    pub fn handle(&self) -> String {
        match self {
            PaintDetail::Color(color) => color.handle().to_string(),
            PaintDetail::Mix(mix) => mix.handle(),
        }
    }

    pub fn brand(&self) -> Option<&str> {
        match self {
            PaintDetail::Color(color) => color.brand(),
            PaintDetail::Mix(mix) => Some(mix.brand()),
        }
    }

    pub fn as_color(&self) -> Option<&Arc<Color>> {
        match self {
            PaintDetail::Color(color) => Some(color),
            PaintDetail::Mix(_) => None,
        }
    }

    pub fn as_mix(&self) -> Option<&Arc<ColorMix>> {
        match self {
            PaintDetail::Mix(mix) => Some(mix),
            PaintDetail::Color(_) => None,
        }
    }
}

/// A [`PaintType`] applied with either one color or one mix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Paint {
    kind: PaintType,
    detail: PaintDetail,
}

impl Paint {
    pub fn new(kind: PaintType, detail: PaintDetail) -> Self {
        Self { kind, detail }
    }

    pub fn solid(kind: PaintType, color: Arc<Color>) -> Self {
        Self::new(kind, PaintDetail::Color(color))
    }

    pub fn mixed(kind: PaintType, mix: Arc<ColorMix>) -> Self {
        Self::new(kind, PaintDetail::Mix(mix))
    }

    /// Builds a paint from optional parts, as found in serialized form.
    /// Exactly one of `color` and `mix` must be set.
    pub fn from_parts(
        kind: PaintType,
        color: Option<Arc<Color>>,
        mix: Option<Arc<ColorMix>>,
    ) -> Result<Self, ValidationError> {
        match (color, mix) {
            (Some(color), None) => Ok(Self::solid(kind, color)),
            (None, Some(mix)) => Ok(Self::mixed(kind, mix)),
            (Some(_), Some(_)) => Err(ValidationError::PaintBothDetails),
            (None, None) => Err(ValidationError::PaintMissingDetail),
        }
    }

    pub fn kind(&self) -> PaintType {
        self.kind
    }

    pub fn detail(&self) -> &PaintDetail {
        &self.detail
    }

    pub fn color(&self) -> Option<&Arc<Color>> {
        self.detail.as_color()
    }

    pub fn mix(&self) -> Option<&Arc<ColorMix>> {
        self.detail.as_mix()
    }
}

impl fmt::Display for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            PaintDetail::Color(color) => write!(f, "{} {}", self.kind, color),
            PaintDetail::Mix(mix) => write!(f, "{} {}", self.kind, mix),
        }
    }
}
