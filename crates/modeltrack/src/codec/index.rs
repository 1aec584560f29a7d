//! First decode pass: header, record framing and the identifier index.
//!
//! Payloads are only framed here, not decoded, so that records may
//! reference identifiers declared later in the buffer.

use std::collections::HashMap;

use modeltrack_buffers::Reader;
use tracing::{debug, trace, warn};

use super::constants::{Tag, FORMAT_MAJOR, FORMAT_MINOR, MAGIC, MIN_RECORD_LEN};
use super::error::{FormatIssue, LoadError};
use super::options::DecoderOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
    pub major: u16,
    pub minor: u16,
}

impl Header {
    /// Whether the buffer comes from a newer writer whose extra fields must
    /// be skipped.
    pub fn is_newer(&self) -> bool {
        self.minor > FORMAT_MINOR
    }
}

/// A framed record whose payload has not been decoded yet.
#[derive(Debug, Clone)]
pub(crate) struct RecordEntry<'a> {
    pub id: u64,
    pub tag: Tag,
    /// Offset of the record's first byte.
    pub offset: usize,
    pub payload: Reader<'a>,
}

#[derive(Debug)]
pub(crate) struct RecordIndex<'a> {
    pub header: Header,
    pub entries: Vec<RecordEntry<'a>>,
    pub by_id: HashMap<u64, usize>,
    pub root: u64,
}

fn read_header(reader: &mut Reader<'_>) -> Result<Header, LoadError> {
    let data = reader.buf(reader.size().min(MAGIC.len()))?;
    if data != MAGIC {
        if !data.is_empty() && data.len() < MAGIC.len() && MAGIC.starts_with(data) {
            return Err(LoadError::Truncation {
                offset: data.len(),
                wanted: MAGIC.len() - data.len(),
                record: None,
            });
        }
        return Err(LoadError::format(0, FormatIssue::BadMagic));
    }
    let major = reader.u16()?;
    let minor = reader.u16()?;
    if major != FORMAT_MAJOR {
        return Err(LoadError::format(
            MAGIC.len(),
            FormatIssue::UnsupportedVersion { major, minor },
        ));
    }
    let header = Header { major, minor };
    if header.is_newer() {
        warn!(
            major,
            minor,
            supported = FORMAT_MINOR,
            "reading newer minor format version best-effort"
        );
    }
    Ok(header)
}

/// Reads a count field and rejects it early when it exceeds `limit` or
/// cannot fit into the bytes left, given `min_item_len` bytes per item.
pub(crate) fn read_count(
    reader: &mut Reader<'_>,
    min_item_len: usize,
    limit: usize,
    what: &'static str,
) -> Result<usize, LoadError> {
    let offset = reader.position();
    let count = reader.vu57()?;
    let count = usize::try_from(count)
        .ok()
        .filter(|c| *c <= limit)
        .ok_or_else(|| LoadError::format(offset, FormatIssue::LimitExceeded { what, limit }))?;
    let wanted = count.saturating_mul(min_item_len);
    if wanted > reader.size() {
        return Err(LoadError::Truncation {
            offset: reader.position(),
            wanted,
            record: None,
        });
    }
    Ok(count)
}

pub(crate) fn build_index<'a>(
    data: &'a [u8],
    options: &DecoderOptions,
) -> Result<RecordIndex<'a>, LoadError> {
    let mut reader = Reader::new(data);
    let header = read_header(&mut reader)?;
    let count = read_count(&mut reader, MIN_RECORD_LEN, options.max_records, "record count")?;
    debug!(
        major = header.major,
        minor = header.minor,
        records = count,
        "indexing model buffer"
    );

    let mut entries = Vec::with_capacity(count);
    let mut by_id = HashMap::with_capacity(count);
    for _ in 0..count {
        let offset = reader.position();
        let id = reader.vu57()?;
        let tag_byte = reader.u8().map_err(|e| LoadError::from(e).in_record(id))?;
        let tag = Tag::from_u8(tag_byte).ok_or(LoadError::UnknownType {
            id,
            tag: tag_byte,
            offset,
        })?;
        let len_offset = reader.position();
        let len = reader.vu57().map_err(|e| LoadError::from(e).in_record(id))?;
        let len = usize::try_from(len)
            .ok()
            .filter(|l| *l <= options.max_payload_len)
            .ok_or_else(|| LoadError::Format {
                offset: len_offset,
                record: Some(id),
                issue: FormatIssue::LimitExceeded {
                    what: "record payload",
                    limit: options.max_payload_len,
                },
            })?;
        let payload = reader
            .cut(len)
            .map_err(|e| LoadError::from(e).in_record(id))?;
        if by_id.insert(id, entries.len()).is_some() {
            return Err(LoadError::Format {
                offset,
                record: Some(id),
                issue: FormatIssue::DuplicateId { id },
            });
        }
        trace!(id, tag = tag.name(), offset, len, "indexed record");
        entries.push(RecordEntry {
            id,
            tag,
            offset,
            payload,
        });
    }

    let root = reader.vu57()?;
    if !reader.is_eof() {
        return Err(LoadError::format(
            reader.position(),
            FormatIssue::TrailingBytes {
                count: reader.size(),
            },
        ));
    }
    Ok(RecordIndex {
        header,
        entries,
        by_id,
        root,
    })
}
