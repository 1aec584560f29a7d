//! Build-state tracking for scale-model kits.
//!
//! A kit is a [`Model`] holding a strict containment tree of assemblies,
//! steps and parts. Parts carry [`Paint`]s and [`Decal`]s, which may be
//! shared between parts. Every type is immutable after construction and
//! `Send + Sync`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use modeltrack::{load_model, save_model, BuildProgress, Color, PaintType};
//! use modeltrack::{Assembly, AssemblyChild, Model, Part, Step};
//!
//! let black = Arc::new(Color::rgb("Flat Black", 10, 10, 10)?);
//! let hull = Part::unfinished("Hull", vec![Arc::new(black.paint(PaintType::Enamel))], vec![])?;
//! let step = Step::new(None, vec![Arc::new(hull)])?;
//! let base = Assembly::new("Base", vec![AssemblyChild::Step(Arc::new(step))])?;
//! let model = Model::new("Destroyer Kit", vec![Arc::new(base)])?;
//!
//! let loaded = load_model(&save_model(&model))?;
//! assert_eq!(loaded, model);
//! assert!(!loaded.is_painted());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
pub mod container;
pub mod detail;
pub mod error;

pub use codec::{load_model, save_model, Decoder, DecoderOptions, Encoder, ErrorKind, LoadError};
pub use container::{Assembly, AssemblyChild, BuildProgress, Model, Part, Step};
pub use detail::{Color, ColorMix, Decal, Paint, PaintType, Placement};
pub use error::ValidationError;
