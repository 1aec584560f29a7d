//! Detail value types: what gets applied to a part.
//!
//! Details have no identity beyond structural equality. They are shared
//! between parts through [`Arc`](std::sync::Arc) and never mutated after
//! construction.

mod color;
mod decal;
mod paint;

pub use color::{Color, ColorMix, MixComponent, Pigment, Rgb, MIXTURE_BRAND};
pub use decal::{Decal, Placement};
pub use paint::{Paint, PaintDetail, PaintType};
