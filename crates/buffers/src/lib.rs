//! Binary buffer utilities for modeltrack.
//!
//! This crate provides the byte-level primitives the modeltrack codec is
//! built on. Reads are bounds-checked: the buffers handed to a [`Reader`]
//! come from outside the process and may be short, so every read returns a
//! [`Result`] instead of panicking.
//!
//! # Overview
//!
//! - [`Reader`] - Reads binary data from a byte slice with cursor tracking
//! - [`Writer`] - Writes binary data to an auto-growing buffer
//! - [`read_vu57`] / [`write_vu57`] - Variable-length unsigned integers
//!
//! # Example
//!
//! ```
//! use modeltrack_buffers::{Reader, Writer};
//!
//! // Write some data
//! let mut writer = Writer::new();
//! writer.u8(0x01);
//! writer.u16(0x0203);
//! writer.vu57(300);
//! writer.str("hello");
//! let data = writer.flush();
//!
//! // Read it back
//! let mut reader = Reader::new(&data);
//! assert_eq!(reader.u8(), Ok(0x01));
//! assert_eq!(reader.u16(), Ok(0x0203));
//! assert_eq!(reader.vu57(), Ok(300));
//! assert_eq!(reader.str(), Ok("hello"));
//! assert!(reader.is_eof());
//! ```

mod reader;
mod varint;
mod writer;

pub use reader::Reader;
pub use varint::{read_vu57, write_vu57, VU57_MAX};
pub use writer::Writer;

/// Error type for buffer operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Attempted to read past the end of the buffer.
    ///
    /// `offset` is the absolute position of the failed read and `wanted`
    /// the number of bytes it needed.
    EndOfBuffer { offset: usize, wanted: usize },
    /// Invalid UTF-8 sequence starting at `offset`.
    InvalidUtf8 { offset: usize },
}

impl BufferError {
    /// Absolute buffer offset the error refers to.
    pub fn offset(&self) -> usize {
        match self {
            BufferError::EndOfBuffer { offset, .. }
            | BufferError::InvalidUtf8 { offset } => *offset,
        }
    }
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::EndOfBuffer { offset, wanted } => {
                write!(f, "end of buffer at offset {offset} (wanted {wanted} bytes)")
            }
            BufferError::InvalidUtf8 { offset } => {
                write!(f, "invalid UTF-8 sequence at offset {offset}")
            }
        }
    }
}

impl std::error::Error for BufferError {}
