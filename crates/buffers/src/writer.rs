//! Binary buffer writer.

use crate::varint::write_vu57;

/// Writes binary data to an auto-growing buffer.
///
/// Multi-byte integers are written big-endian, matching [`Reader`](crate::Reader).
#[derive(Debug, Default, Clone)]
pub struct Writer {
    uint8: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            uint8: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.uint8.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uint8.is_empty()
    }

    pub fn u8(&mut self, value: u8) {
        self.uint8.push(value);
    }

    pub fn u16(&mut self, value: u16) {
        self.uint8.extend_from_slice(&value.to_be_bytes());
    }

    pub fn u32(&mut self, value: u32) {
        self.uint8.extend_from_slice(&value.to_be_bytes());
    }

    pub fn i32(&mut self, value: i32) {
        self.uint8.extend_from_slice(&value.to_be_bytes());
    }

    pub fn f32(&mut self, value: f32) {
        self.uint8.extend_from_slice(&value.to_be_bytes());
    }

    pub fn vu57(&mut self, value: u64) {
        write_vu57(&mut self.uint8, value);
    }

    /// Writes raw bytes.
    pub fn buf(&mut self, bytes: &[u8]) {
        self.uint8.extend_from_slice(bytes);
    }

    /// Writes a `vu57` length prefix followed by the UTF-8 bytes of `s`.
    pub fn str(&mut self, s: &str) {
        self.vu57(s.len() as u64);
        self.buf(s.as_bytes());
    }

    /// Returns the written bytes and resets the writer.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.uint8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_layout() {
        let mut w = Writer::new();
        w.u16(0x0102);
        w.u32(0x03040506);
        assert_eq!(w.flush(), vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    }

    #[test]
    fn test_flush_resets() {
        let mut w = Writer::new();
        w.u8(7);
        assert_eq!(w.len(), 1);
        let _ = w.flush();
        assert!(w.is_empty());
    }

    #[test]
    fn test_str_is_length_prefixed() {
        let mut w = Writer::new();
        w.str("hi");
        assert_eq!(w.flush(), vec![0x02, b'h', b'i']);
    }
}
