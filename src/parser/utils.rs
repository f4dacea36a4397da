use memchr::memchr;

pub(crate) const BUFSIZE: usize = 64 * 1024;

/// Remove a final '\r' from a byte slice
#[inline]
pub(crate) fn trim_cr(line: &[u8]) -> &[u8] {
    if let Some((&b'\r', remaining)) = line.split_last() {
        remaining
    } else {
        line
    }
}

/// Standard buffer policy: buffer size
/// doubles until it reaches 8 MiB. Above, it will
/// increase in steps of 8 MiB. Buffer size is not limited,
/// it could theoretically grow indefinitely.
pub(crate) fn grow_to(current_size: usize) -> usize {
    if current_size < 1 << 23 {
        current_size * 2
    } else {
        current_size + (1 << 23)
    }
}

/// Splits a header line (without its sigil) into the name token and the
/// optional description following the first space.
#[inline]
pub(crate) fn split_header(header: &[u8]) -> (&[u8], Option<&[u8]>) {
    match memchr(b' ', header) {
        Some(idx) => (&header[..idx], Some(&header[idx + 1..])),
        None => (header, None),
    }
}

/// Holds line number and byte offset of our current state in a parser
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub(crate) line: u64,
    pub(crate) byte: u64,
}

impl Position {
    pub fn new(line: u64, byte: u64) -> Self {
        Self { line, byte }
    }

    /// Line number (starting with 1)
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Byte offset within the file
    pub fn byte(&self) -> u64 {
        self.byte
    }
}

/// FASTA or FASTQ?
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Format {
    Fasta,
    Fastq,
}

impl Format {
    pub fn start_char(&self) -> char {
        match self {
            Self::Fasta => '>',
            Self::Fastq => '@',
        }
    }

    pub(crate) fn start_byte(&self) -> u8 {
        match self {
            Self::Fasta => b'>',
            Self::Fastq => b'@',
        }
    }

    pub(crate) fn from_start_byte(byte: u8) -> Option<Self> {
        match byte {
            b'>' => Some(Self::Fasta),
            b'@' => Some(Self::Fastq),
            _ => None,
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Fasta => "fasta",
            Self::Fastq => "fastq",
        }
    }

    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "fasta" => Some(Self::Fasta),
            "fastq" => Some(Self::Fastq),
            _ => None,
        }
    }
}

/// Which sub-parser a session is running. Decided once from the first line
/// of a file and never re-derived afterwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScanState {
    Undetermined,
    FastaLike,
    FastqLike,
}

impl ScanState {
    pub fn format(&self) -> Option<Format> {
        match self {
            Self::Undetermined => None,
            Self::FastaLike => Some(Format::Fasta),
            Self::FastqLike => Some(Format::Fastq),
        }
    }
}

impl From<Format> for ScanState {
    fn from(format: Format) -> Self {
        match format {
            Format::Fasta => Self::FastaLike,
            Format::Fastq => Self::FastqLike,
        }
    }
}

/// Whether it uses \r\n or only \n
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum LineEnding {
    Windows,
    Unix,
}

impl LineEnding {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Windows => vec![b'\r', b'\n'],
            Self::Unix => vec![b'\n'],
        }
    }
}
