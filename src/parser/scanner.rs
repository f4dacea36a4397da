use std::fs::File;
use std::io::{self, Seek};
use std::path::Path;

use log::warn;

use crate::errors::{ErrorPosition, ScanError};
use crate::parser::lines::LineSource;
use crate::parser::options::{ScanOptions, StrictnessPolicy};
use crate::parser::record::Record;
use crate::parser::utils::{split_header, Format, LineEnding, Position, ScanState};

/// A header line read ahead of the record it opens
#[derive(Debug, Clone)]
pub(crate) struct HeldLine {
    pub(crate) bytes: Vec<u8>,
    pub(crate) offset: u64,
    pub(crate) line: u64,
}

impl HeldLine {
    /// The header without its sigil
    #[inline]
    fn body(&self) -> &[u8] {
        self.bytes.get(1..).unwrap_or(&[])
    }

    #[inline]
    pub(crate) fn name(&self) -> &[u8] {
        split_header(self.body()).0
    }

    pub(crate) fn error_position(&self) -> ErrorPosition {
        ErrorPosition::new(self.line, self.offset, Some(self.name()))
    }

    pub(crate) fn into_record(self, sequence: Vec<u8>, quality: Option<Vec<u8>>) -> Record {
        let (name, description) = split_header(self.body());
        Record {
            name: name.to_vec(),
            description: description.map(|d| d.to_vec()),
            sequence,
            quality,
            header_offset: self.offset,
            line: self.line,
        }
    }
}

/// Turns a stream of lines into a stream of [`Record`]s.
///
/// The format is detected from the first line (`>` for FASTA, `@` for FASTQ)
/// and stays fixed for the whole session, including after seeks.
///
/// # Example:
///
/// ```
/// use fastx_index::parser::ScanSession;
///
/// let mut session = ScanSession::new(&b"@r1\nACGT\n+\nIIII\n"[..]);
/// let record = session.next_record().unwrap().unwrap();
/// assert_eq!(record.name(), b"r1");
/// assert_eq!(record.qual(), Some(&b"IIII"[..]));
/// assert!(session.next_record().unwrap().is_none());
/// ```
pub struct ScanSession<R: io::Read> {
    pub(crate) lines: LineSource<R>,
    pub(crate) state: ScanState,
    pub(crate) policy: StrictnessPolicy,
    pub(crate) held: Option<HeldLine>,
    // name of the FASTQ record being read, matched against its separator line
    pub(crate) name_token: Vec<u8>,
    pub(crate) finished: bool,
    pub(crate) seeked: bool,
}

/// Opens a file for scanning with the default options.
pub fn open<P: AsRef<Path>>(path: P) -> io::Result<ScanSession<File>> {
    ScanSession::from_path(path)
}

impl<R> ScanSession<R>
where
    R: io::Read,
{
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, &ScanOptions::default())
    }

    pub fn with_options(reader: R, options: &ScanOptions) -> Self {
        Self::from_lines(
            LineSource::with_capacity(reader, options.initial_capacity()),
            options.policy(),
        )
    }

    fn from_lines(lines: LineSource<R>, policy: StrictnessPolicy) -> Self {
        Self {
            lines,
            state: ScanState::Undetermined,
            policy,
            held: None,
            name_token: Vec::new(),
            finished: false,
            seeked: false,
        }
    }

    /// Skips format detection: the stream is known to hold `format`.
    /// Used when resuming from an index, which recorded the format.
    pub fn with_format(mut self, format: Format) -> Self {
        self.state = format.into();
        self
    }

    /// Continues with another stream, keeping the line buffer. The format
    /// of the new stream is detected again.
    pub fn with_reader<S: io::Read>(self, reader: S) -> ScanSession<S> {
        ScanSession::from_lines(self.lines.with_reader(reader), self.policy)
    }

    /// Gets the next record in the stream, `None` once the stream is exhausted.
    ///
    /// After a non-fatal error (see [`ScanError::is_fatal`]) the scan can be
    /// resumed by calling this again, except for truncated records and seek
    /// misalignments which end the session until the next seek.
    pub fn next_record(&mut self) -> Result<Option<Record>, ScanError> {
        if self.finished {
            return Ok(None);
        }

        let header = match self.read_header() {
            Ok(Some(h)) => h,
            Ok(None) => {
                self.finished = true;
                return Ok(None);
            }
            Err(e) => {
                self.finish_on(&e);
                return Err(e);
            }
        };

        // read_header always leaves the format determined
        let result = match self.state {
            ScanState::FastqLike => self.read_fastq(header),
            _ => self.read_fasta(header),
        };

        match result {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                self.finish_on(&e);
                Err(e)
            }
        }
    }

    fn finish_on(&mut self, err: &ScanError) {
        use crate::errors::ScanErrorKind::*;
        if err.is_fatal() || matches!(err.kind, Truncated | SeekMisalignment) {
            self.finished = true;
        }
    }

    /// Returns the header line opening the next record, classifying the file
    /// first if needed.
    fn read_header(&mut self) -> Result<Option<HeldLine>, ScanError> {
        let seeked = std::mem::replace(&mut self.seeked, false);
        let held = match self.held.take() {
            Some(held) => held,
            None => match self.next_header_line(seeked)? {
                Some(held) => held,
                None => return Ok(None),
            },
        };
        self.check_header(held, seeked).map(Some)
    }

    /// Reads the line expected to open the next record. Once the format is
    /// known, blank lines are skipped; they are only reported when more
    /// input follows them.
    fn next_header_line(&mut self, seeked: bool) -> Result<Option<HeldLine>, ScanError> {
        let format = if seeked { None } else { self.state.format() };
        let mut first_blank = None;
        let bytes = loop {
            let line = match self.lines.next_line()? {
                Some(line) => line,
                None if seeked => {
                    return Err(ScanError::new_seek_misalignment(
                        self.lines.line_offset(),
                        b"",
                        self.format(),
                    ))
                }
                None => return Ok(None),
            };
            if format.is_some() && line.is_empty() {
                if first_blank.is_none() {
                    first_blank = Some(ErrorPosition::new(
                        self.lines.line_number(),
                        self.lines.line_offset(),
                        None,
                    ));
                }
                continue;
            }
            break line.to_vec();
        };
        let held = HeldLine {
            bytes,
            offset: self.lines.line_offset(),
            line: self.lines.line_number(),
        };

        if let (Some(position), Some(format)) = (first_blank, format) {
            match self.policy {
                StrictnessPolicy::Strict => {
                    // the line after the blanks is checked on the next call
                    self.held = Some(held);
                    return Err(ScanError::new_invalid_start(None, position, format));
                }
                StrictnessPolicy::Lenient => warn!(
                    "Bad file format at {}: blank line where a new record (starting with '{}') was expected; skipping it",
                    position,
                    format.start_char()
                ),
            }
        }
        Ok(Some(held))
    }

    /// Checks the sigil of a header line, deciding the format on the first one.
    fn check_header(&mut self, held: HeldLine, seeked: bool) -> Result<HeldLine, ScanError> {
        let first = held.bytes.first().copied();

        match self.state {
            ScanState::Undetermined => match first.and_then(Format::from_start_byte) {
                Some(format) => self.state = format.into(),
                None if seeked => {
                    return Err(ScanError::new_seek_misalignment(
                        held.offset,
                        &held.bytes,
                        None,
                    ))
                }
                None => return Err(ScanError::new_unknown_format(first.unwrap_or(b'\n'))),
            },
            state => {
                let format = state.format().unwrap_or(Format::Fasta);
                if first != Some(format.start_byte()) {
                    if seeked {
                        return Err(ScanError::new_seek_misalignment(
                            held.offset,
                            &held.bytes,
                            Some(format),
                        ));
                    }
                    let position = ErrorPosition::new(held.line, held.offset, None);
                    match self.policy {
                        StrictnessPolicy::Strict => {
                            return Err(ScanError::new_invalid_start(first, position, format))
                        }
                        StrictnessPolicy::Lenient => warn!(
                            "Bad file format at {}: expected a new record (starting with '{}') or EOF; reading it as a header",
                            position,
                            format.start_char()
                        ),
                    }
                }
            }
        }

        Ok(held)
    }

    /// `Undetermined` until the first line has been read
    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn format(&self) -> Option<Format> {
        self.state.format()
    }

    pub fn policy(&self) -> StrictnessPolicy {
        self.policy
    }

    /// Returns the current line/byte in the stream we are reading from
    pub fn position(&self) -> &Position {
        self.lines.position()
    }

    /// Returns whether the current stream uses Windows or Unix style line endings.
    /// `None` until a complete line has been read.
    pub fn line_ending(&self) -> Option<LineEnding> {
        self.lines.line_ending()
    }
}

impl ScanSession<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        File::open(path).map(Self::new)
    }

    pub fn from_path_with_options<P: AsRef<Path>>(
        path: P,
        options: &ScanOptions,
    ) -> io::Result<Self> {
        File::open(path).map(|f| Self::with_options(f, options))
    }

    /// Moves on to the next file, reusing the line buffer.
    pub fn reopen<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(self.with_reader(file))
    }
}

impl<R> ScanSession<R>
where
    R: io::Read + Seek,
{
    /// Resumes scanning at `offset`, which must be the start of a header line.
    /// Nothing from the record being read before the seek is kept; the
    /// detected format is.
    pub fn seek_to_offset(&mut self, offset: u64) -> io::Result<()> {
        self.lines.seek(offset)?;
        self.held = None;
        self.name_token.clear();
        self.finished = false;
        self.seeked = true;
        Ok(())
    }
}

impl<R: io::Read> Iterator for ScanSession<R> {
    type Item = Result<Record, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
