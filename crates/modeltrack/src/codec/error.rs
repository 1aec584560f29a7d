//! Loader error taxonomy.

use modeltrack_buffers::BufferError;
use thiserror::Error;

use super::constants::Tag;
use crate::error::ValidationError;

/// Coarse classification of a [`LoadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Format,
    UnknownType,
    Truncation,
    Cycle,
    RootType,
    Validation,
}

/// Structural problems reported as [`LoadError::Format`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatIssue {
    #[error("missing magic marker")]
    BadMagic,
    #[error("unsupported format version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },
    #[error("record id {id} declared more than once")]
    DuplicateId { id: u64 },
    #[error("reference to undeclared record {target}")]
    DanglingReference { target: u64 },
    #[error("record {target} is a {found}, expected {expected}")]
    WrongReference {
        target: u64,
        expected: &'static str,
        found: Tag,
    },
    #[error("record {target} is already contained by record {first_parent}")]
    SharedContainer { target: u64, first_parent: u64 },
    #[error("invalid UTF-8 in string")]
    InvalidUtf8,
    #[error("invalid {field} value {value}")]
    BadDiscriminant { field: &'static str, value: u8 },
    #[error("{count} unexpected trailing bytes")]
    TrailingBytes { count: usize },
    #[error("{what} exceeds limit of {limit}")]
    LimitExceeded { what: &'static str, limit: usize },
}

/// Failure of a single load call. No partial model is ever produced.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadError {
    #[error("format error at offset {offset}: {issue}")]
    Format {
        offset: usize,
        record: Option<u64>,
        issue: FormatIssue,
    },
    #[error("unknown type tag {tag} on record {id} at offset {offset}")]
    UnknownType { id: u64, tag: u8, offset: usize },
    #[error("input truncated at offset {offset} (wanted {wanted} bytes)")]
    Truncation {
        offset: usize,
        wanted: usize,
        record: Option<u64>,
    },
    #[error("containment cycle through records {ids:?}")]
    Cycle { ids: Vec<u64> },
    #[error("root record {id} is {}, expected a Model", describe_root(.found))]
    RootType { id: u64, found: Option<Tag> },
    #[error("record {id} is invalid: {source}")]
    Validation {
        id: u64,
        #[source]
        source: ValidationError,
    },
}

fn describe_root(found: &Option<Tag>) -> String {
    match found {
        Some(tag) => format!("a {tag}"),
        None => "not declared".to_string(),
    }
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::Format { .. } => ErrorKind::Format,
            LoadError::UnknownType { .. } => ErrorKind::UnknownType,
            LoadError::Truncation { .. } => ErrorKind::Truncation,
            LoadError::Cycle { .. } => ErrorKind::Cycle,
            LoadError::RootType { .. } => ErrorKind::RootType,
            LoadError::Validation { .. } => ErrorKind::Validation,
        }
    }

    /// Identifier of the record the error was detected in, when known.
    pub fn record(&self) -> Option<u64> {
        match self {
            LoadError::Format { record, .. } | LoadError::Truncation { record, .. } => *record,
            LoadError::UnknownType { id, .. }
            | LoadError::RootType { id, .. }
            | LoadError::Validation { id, .. } => Some(*id),
            LoadError::Cycle { ids } => ids.first().copied(),
        }
    }

    /// Absolute byte offset the error was detected at, when known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            LoadError::Format { offset, .. }
            | LoadError::UnknownType { offset, .. }
            | LoadError::Truncation { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    pub(crate) fn format(offset: usize, issue: FormatIssue) -> Self {
        LoadError::Format {
            offset,
            record: None,
            issue,
        }
    }

    /// Attributes the error to record `id` unless it already names one.
    pub(crate) fn in_record(mut self, id: u64) -> Self {
        match &mut self {
            LoadError::Format { record, .. } | LoadError::Truncation { record, .. } => {
                record.get_or_insert(id);
            }
            _ => {}
        }
        self
    }
}

impl From<BufferError> for LoadError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer { offset, wanted } => LoadError::Truncation {
                offset,
                wanted,
                record: None,
            },
            BufferError::InvalidUtf8 { offset } => {
                LoadError::format(offset, FormatIssue::InvalidUtf8)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_errors_map_to_kinds() {
        let e = LoadError::from(BufferError::EndOfBuffer {
            offset: 12,
            wanted: 4,
        });
        assert_eq!(e.kind(), ErrorKind::Truncation);
        assert_eq!(e.offset(), Some(12));
        let e = LoadError::from(BufferError::InvalidUtf8 { offset: 3 }).in_record(7);
        assert_eq!(e.kind(), ErrorKind::Format);
        assert_eq!(e.record(), Some(7));
    }

    #[test]
    fn in_record_keeps_the_first_record() {
        let e = LoadError::format(0, FormatIssue::BadMagic)
            .in_record(1)
            .in_record(2);
        assert_eq!(e.record(), Some(1));
    }

    #[test]
    fn root_type_message() {
        let e = LoadError::RootType {
            id: 4,
            found: Some(Tag::Step),
        };
        assert_eq!(e.to_string(), "root record 4 is a Step, expected a Model");
        let e = LoadError::RootType { id: 9, found: None };
        assert_eq!(e.to_string(), "root record 9 is not declared, expected a Model");
    }
}
