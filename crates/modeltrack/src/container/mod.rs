//! Container types: the kit hierarchy.
//!
//! ```text
//! Model → Assembly* → (Step | Assembly)* → Part* → (Paint | Decal)*
//! ```
//!
//! Containment is a strict tree. Detail values below [`Part`] may be shared.

mod assembly;
mod model;
mod part;
mod step;

pub use assembly::{Assembly, AssemblyChild};
pub use model::Model;
pub use part::{DecalApplication, PaintApplication, Part};
pub use step::Step;

/// Progress of a container through painting and decaling.
///
/// A container with nothing to paint counts as painted.
pub trait BuildProgress {
    fn is_painted(&self) -> bool;

    fn is_decaled(&self) -> bool;

    fn is_complete(&self) -> bool {
        self.is_painted() && self.is_decaled()
    }
}
