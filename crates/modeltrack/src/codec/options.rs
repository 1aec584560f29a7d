//! Decoder limits.

/// Bounds on the work a single decode call may do.
///
/// Input buffers are untrusted; these limits turn hostile size fields into
/// a [`FormatIssue::LimitExceeded`](super::FormatIssue::LimitExceeded)
/// error instead of large allocations or deep recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Maximum number of records in one buffer.
    pub max_records: usize,
    /// Maximum payload length of a single record, in bytes.
    pub max_payload_len: usize,
    /// Maximum number of entries in any reference list.
    pub max_list_len: usize,
    /// Maximum reference chain length from any record down to a leaf.
    pub max_depth: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_records: 1_000_000,
            max_payload_len: 16 * 1024 * 1024,
            max_list_len: 65_536,
            max_depth: 256,
        }
    }
}
