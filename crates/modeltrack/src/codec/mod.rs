//! Binary model codec.
//!
//! Decoding runs in two passes over an untrusted buffer:
//!
//! 1. The header is checked and every record is framed and indexed by
//!    identifier, without decoding payloads.
//! 2. Payloads are parsed and linked bottom-up with an explicit work stack,
//!    memoizing each record so shared references resolve to one
//!    [`Arc`](std::sync::Arc).
//!
//! [`Encoder`] writes the same format.

mod constants;
mod decode;
mod encode;
mod error;
mod index;
mod options;
mod record;

pub use constants::{Tag, FORMAT_MAJOR, FORMAT_MINOR, HEADER_LEN, MAGIC};
pub use decode::{Decoder, LoadReport};
pub use encode::Encoder;
pub use error::{ErrorKind, FormatIssue, LoadError};
pub use options::DecoderOptions;

use crate::container::Model;

/// Decodes a model buffer with default [`DecoderOptions`].
pub fn load_model(data: &[u8]) -> Result<Model, LoadError> {
    Decoder::new().decode(data)
}

/// Encodes `model` in the current format version.
pub fn save_model(model: &Model) -> Vec<u8> {
    Encoder::new().encode(model)
}
