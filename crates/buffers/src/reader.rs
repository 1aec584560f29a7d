//! Bounds-checked binary buffer reader with cursor tracking.

use std::str;

use crate::varint::read_vu57;
use crate::BufferError;

/// A binary buffer reader that reads data from a byte slice.
///
/// The reader maintains a cursor position `x` and an exclusive `end` bound.
/// Offsets reported in errors are absolute positions within the underlying
/// slice, so a reader produced by [`Reader::cut`] reports positions that are
/// meaningful for the whole buffer.
///
/// # Example
///
/// ```
/// use modeltrack_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8(), Ok(0x01));
/// assert_eq!(reader.u16(), Ok(0x0203));
/// assert!(reader.u8().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    x: usize,
    end: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            x: 0,
            end: data.len(),
        }
    }

    /// Current cursor position (absolute).
    pub fn position(&self) -> usize {
        self.x
    }

    /// Returns the number of remaining bytes.
    pub fn size(&self) -> usize {
        self.end - self.x
    }

    pub fn is_eof(&self) -> bool {
        self.x == self.end
    }

    fn ensure(&self, wanted: usize) -> Result<(), BufferError> {
        if wanted > self.size() {
            return Err(BufferError::EndOfBuffer {
                offset: self.x,
                wanted,
            });
        }
        Ok(())
    }

    /// Advances the cursor by the given number of bytes.
    pub fn skip(&mut self, length: usize) -> Result<(), BufferError> {
        self.ensure(length)?;
        self.x += length;
        Ok(())
    }

    /// Skips everything up to the end bound.
    pub fn skip_rest(&mut self) {
        self.x = self.end;
    }

    /// Returns a subarray of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.ensure(size)?;
        let start = self.x;
        self.x += size;
        Ok(&self.data[start..self.x])
    }

    /// Creates a new Reader over the next `size` bytes and advances the
    /// cursor past them.
    pub fn cut(&mut self, size: usize) -> Result<Reader<'a>, BufferError> {
        self.ensure(size)?;
        let slice = Reader {
            data: self.data,
            x: self.x,
            end: self.x + size,
        };
        self.x += size;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.buf(N)?);
        Ok(out)
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.ensure(1)?;
        let val = self.data[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Reads an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        self.array().map(u16::from_be_bytes)
    }

    /// Reads an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        self.array().map(u32::from_be_bytes)
    }

    /// Reads a signed 32-bit integer (big-endian).
    #[inline]
    pub fn i32(&mut self) -> Result<i32, BufferError> {
        self.array().map(i32::from_be_bytes)
    }

    /// Reads a 32-bit floating point number (big-endian).
    #[inline]
    pub fn f32(&mut self) -> Result<f32, BufferError> {
        self.array().map(f32::from_be_bytes)
    }

    /// Reads a `vu57` variable-length unsigned integer.
    pub fn vu57(&mut self) -> Result<u64, BufferError> {
        let mut pos = self.x;
        let value = read_vu57(&self.data[..self.end], &mut pos)?;
        self.x = pos;
        Ok(value)
    }

    /// Reads a UTF-8 string of the given size.
    pub fn utf8(&mut self, size: usize) -> Result<&'a str, BufferError> {
        let offset = self.x;
        let bytes = self.buf(size)?;
        str::from_utf8(bytes).map_err(|_| BufferError::InvalidUtf8 { offset })
    }

    /// Reads a `vu57` length prefix followed by that many UTF-8 bytes.
    pub fn str(&mut self) -> Result<&'a str, BufferError> {
        let offset = self.x;
        let len = self.vu57()?;
        let len = usize::try_from(len).map_err(|_| BufferError::EndOfBuffer {
            offset,
            wanted: usize::MAX,
        })?;
        self.utf8(len)
    }
}
