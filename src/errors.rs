//! The errors this crate can return: scanning FASTA/FASTQ files and
//! building or reading their position index.

use crate::parser::Format;
use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Represents where we were in a file when an error occurred.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorPosition {
    /// Line number where the error occurred (starting with 1)
    pub line: u64,
    /// Byte offset of the start of that line
    pub byte: u64,
    /// ID of record if available
    pub id: Option<String>,
}

impl ErrorPosition {
    pub(crate) fn new(line: u64, byte: u64, id: Option<&[u8]>) -> Self {
        Self {
            line,
            byte,
            id: id.map(|id| String::from_utf8_lossy(id).into_owned()),
        }
    }
}

impl fmt::Display for ErrorPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(id) = self.id.as_ref() {
            write!(f, "record '{id}' at ")?;
        }
        write!(f, "line {} (byte {})", self.line, self.byte)
    }
}

/// The type of error that occured while scanning
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanErrorKind {
    /// An error happened during file/stream input/output
    Io,
    /// The file didn't start with `@` or `>`
    UnknownFormat,
    /// A header was expected after a complete record but something else was found
    InvalidStart,
    /// The quality block is longer than the sequence (in a FASTQ file only)
    UnequalLengths,
    /// The input ended in the middle of a record
    Truncated,
    /// The line found after a seek is not a header line
    SeekMisalignment,
}

/// The error returned by a [`ScanSession`](crate::parser::ScanSession)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanError {
    /// A description of what went wrong
    pub msg: String,
    /// The type of error that occurred
    pub kind: ScanErrorKind,
    /// Position within file
    pub position: ErrorPosition,
    /// The format of the file we were parsing
    pub format: Option<Format>,
}

impl ScanError {
    pub fn new_unknown_format(byte_found: u8) -> Self {
        let msg = format!(
            "Expected '@' or '>' at the start of the file but found '{}'.",
            (byte_found as char).escape_default()
        );
        Self {
            kind: ScanErrorKind::UnknownFormat,
            msg,
            position: ErrorPosition::new(1, 0, None),
            format: None,
        }
    }

    pub fn new_invalid_start(byte_found: Option<u8>, position: ErrorPosition, format: Format) -> Self {
        let found = match byte_found {
            Some(b) => (b as char).escape_default().to_string(),
            None => String::from("an empty line"),
        };
        let msg = format!("Expected '{}' but found '{}'", format.start_char(), found);
        Self {
            kind: ScanErrorKind::InvalidStart,
            msg,
            position,
            format: Some(format),
        }
    }

    pub fn new_unequal_length(seq_len: usize, qual_len: usize, position: ErrorPosition) -> Self {
        let msg = format!(
            "Sequence length is {} but quality length is {}",
            seq_len, qual_len
        );
        Self {
            kind: ScanErrorKind::UnequalLengths,
            msg,
            position,
            format: Some(Format::Fastq),
        }
    }

    pub fn new_truncated(position: ErrorPosition, format: Format) -> Self {
        Self {
            msg: String::new(),
            kind: ScanErrorKind::Truncated,
            position,
            format: Some(format),
        }
    }

    pub fn new_seek_misalignment(
        offset: u64,
        found: &[u8],
        format: Option<Format>,
    ) -> Self {
        let preview: String = String::from_utf8_lossy(&found[..found.len().min(32)]).into();
        let msg = format!(
            "No record header at byte {} (found '{}'); the index may be stale",
            offset, preview
        );
        Self {
            kind: ScanErrorKind::SeekMisalignment,
            msg,
            position: ErrorPosition::new(1, offset, None),
            format,
        }
    }

    pub fn new_name_mismatch(
        offset: u64,
        expected: &[u8],
        found: &[u8],
        format: Option<Format>,
    ) -> Self {
        let msg = format!(
            "Expected record '{}' at byte {} but found '{}'; the index may be stale",
            String::from_utf8_lossy(expected),
            offset,
            String::from_utf8_lossy(found)
        );
        Self {
            kind: ScanErrorKind::SeekMisalignment,
            msg,
            position: ErrorPosition::new(1, offset, Some(found)),
            format,
        }
    }

    /// Whether scanning this file can go on after this error.
    /// An unknown format and I/O failures end the session, everything else
    /// only concerns the record being read.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, ScanErrorKind::Io | ScanErrorKind::UnknownFormat)
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ScanErrorKind::Io => write!(f, "I/O error: {}", self.msg),
            ScanErrorKind::UnequalLengths
            | ScanErrorKind::InvalidStart
            | ScanErrorKind::UnknownFormat
            | ScanErrorKind::SeekMisalignment => write!(f, "{} ({})", self.msg, self.position),
            ScanErrorKind::Truncated => {
                write!(f, "Unexpected end of input ({}).", self.position)
            }
        }
    }
}

impl From<io::Error> for ScanError {
    fn from(err: io::Error) -> Self {
        Self {
            msg: err.to_string(),
            kind: ScanErrorKind::Io,
            position: ErrorPosition::default(),
            format: None,
        }
    }
}

impl StdError for ScanError {}

/// The type of error that occured while building or reading an index
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexErrorKind {
    /// An error happened during file/stream input/output
    Io,
    /// The source file could not be scanned
    Scan(ScanErrorKind),
    /// Two records share the same name
    DuplicateName,
    /// An index artifact is already present for this file
    AlreadyExists,
    /// The index artifact could not be parsed
    InvalidArtifact,
}

/// The error returned when building or loading an [`Index`](crate::index::Index)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexError {
    /// A description of what went wrong
    pub msg: String,
    /// The type of error that occurred
    pub kind: IndexErrorKind,
}

impl IndexError {
    pub fn new_duplicate_name(name: &[u8], first_ordinal: u64, ordinal: u64) -> Self {
        Self {
            msg: format!(
                "Record name '{}' appears at ordinals {} and {}",
                String::from_utf8_lossy(name),
                first_ordinal,
                ordinal
            ),
            kind: IndexErrorKind::DuplicateName,
        }
    }

    pub fn new_already_exists(artifact: &str) -> Self {
        Self {
            msg: format!("'{}' already exists", artifact),
            kind: IndexErrorKind::AlreadyExists,
        }
    }

    pub fn new_invalid_artifact(line_number: usize, line: &str) -> Self {
        Self {
            msg: format!("Invalid index line {}: '{}'", line_number, line),
            kind: IndexErrorKind::InvalidArtifact,
        }
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            IndexErrorKind::Io => write!(f, "I/O error: {}", self.msg),
            IndexErrorKind::Scan(_) => write!(f, "Cannot index file: {}", self.msg),
            IndexErrorKind::DuplicateName
            | IndexErrorKind::AlreadyExists
            | IndexErrorKind::InvalidArtifact => write!(f, "{}", self.msg),
        }
    }
}

impl From<io::Error> for IndexError {
    fn from(err: io::Error) -> Self {
        Self {
            msg: err.to_string(),
            kind: IndexErrorKind::Io,
        }
    }
}

impl From<ScanError> for IndexError {
    fn from(err: ScanError) -> Self {
        Self {
            msg: err.to_string(),
            kind: IndexErrorKind::Scan(err.kind),
        }
    }
}

impl StdError for IndexError {}
