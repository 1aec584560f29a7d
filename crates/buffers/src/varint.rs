//! `vu57` variable-length unsigned integers.
//!
//! Seven payload bits per byte with a continuation flag in the high bit; the
//! eighth byte, when reached, contributes all 8 of its bits. Values up to
//! 2^57 - 1 fit.

use crate::BufferError;

/// Largest value representable as `vu57`.
pub const VU57_MAX: u64 = (1 << 57) - 1;

/// Appends `value` to `out`. Bits above [`VU57_MAX`] are discarded.
pub fn write_vu57(out: &mut Vec<u8>, mut value: u64) {
    value &= VU57_MAX;
    for _ in 0..7 {
        let mut b = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(b);
            return;
        }
        b |= 0x80;
        out.push(b);
    }
    out.push((value & 0xff) as u8);
}

fn next_byte(data: &[u8], pos: &mut usize) -> Result<u8, BufferError> {
    let b = data.get(*pos).copied().ok_or(BufferError::EndOfBuffer {
        offset: *pos,
        wanted: 1,
    })?;
    *pos += 1;
    Ok(b)
}

/// Reads a `vu57` from `data` at `*pos`, advancing `*pos` past it.
pub fn read_vu57(data: &[u8], pos: &mut usize) -> Result<u64, BufferError> {
    let mut result: u64 = 0;
    for i in 0..7 {
        let b = next_byte(data, pos)?;
        result |= ((b & 0x7f) as u64) << (7 * i);
        if (b & 0x80) == 0 {
            return Ok(result);
        }
    }
    let b = next_byte(data, pos)?;
    Ok(result | ((b as u64) << 49))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        write_vu57(&mut out, value);
        out
    }

    #[test]
    fn test_single_byte_values() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(0x7f), vec![0x7f]);
    }

    #[test]
    fn test_two_byte_boundary() {
        assert_eq!(encoded(0x80), vec![0x80, 0x01]);
        let mut pos = 0;
        assert_eq!(read_vu57(&[0x80, 0x01], &mut pos), Ok(0x80));
        assert_eq!(pos, 2);
    }

    #[test]
    fn test_max_value_uses_eight_bytes() {
        let bytes = encoded(VU57_MAX);
        assert_eq!(bytes.len(), 8);
        let mut pos = 0;
        assert_eq!(read_vu57(&bytes, &mut pos), Ok(VU57_MAX));
    }

    #[test]
    fn test_truncated_continuation() {
        let mut pos = 0;
        assert_eq!(
            read_vu57(&[0x80, 0x80], &mut pos),
            Err(BufferError::EndOfBuffer {
                offset: 2,
                wanted: 1
            })
        );
    }
}
