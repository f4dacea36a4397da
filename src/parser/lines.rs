//! Line-at-a-time access to a stream, on top of a `buffer_redux` buffer that
//! grows whenever a line does not fit.

use std::fs::File;
use std::io::{self, BufRead, Seek, SeekFrom};
use std::path::Path;

use memchr::memchr;

use crate::parser::utils::{grow_to, trim_cr, LineEnding, Position, BUFSIZE};

/// Delivers one line per call regardless of its length.
///
/// The internal buffer starts at the given capacity and doubles every time a
/// line does not fit in it. It never shrinks: the largest buffer ever needed is
/// kept for the following lines and, through [`LineSource::with_reader`], for
/// the following files.
pub struct LineSource<R: io::Read> {
    buf_reader: buffer_redux::BufReader<R>,
    // bytes of the last line handed out, terminator included, still in the buffer
    pending: usize,
    eof: bool,
    // `line` is the number of the last line returned, `byte` the offset of the next one
    position: Position,
    line_start: u64,
    line_ending: Option<LineEnding>,
}

impl<R> LineSource<R>
where
    R: io::Read,
{
    /// Creates a new line source with the default buffer size of 64 KiB
    ///
    /// # Example:
    ///
    /// ```
    /// use fastx_index::parser::LineSource;
    ///
    /// let mut lines = LineSource::new(&b">id\nACGT\n"[..]);
    /// assert_eq!(lines.next_line().unwrap(), Some(&b">id"[..]));
    /// assert_eq!(lines.byte_offset(), 4);
    /// ```
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, BUFSIZE)
    }

    /// Creates a new line source with a given buffer capacity. The minimum allowed
    /// capacity is 3.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        assert!(capacity >= 3);
        Self::from_buf_reader(buffer_redux::BufReader::with_capacity(capacity, reader))
    }

    fn from_buf_reader(buf_reader: buffer_redux::BufReader<R>) -> Self {
        Self {
            buf_reader,
            pending: 0,
            eof: false,
            position: Position::new(0, 0),
            line_start: 0,
            line_ending: None,
        }
    }

    /// Swaps the underlying stream, keeping the (possibly grown) buffer.
    /// Offsets and line numbers start again from zero.
    pub fn with_reader<S: io::Read>(self, reader: S) -> LineSource<S> {
        let (_, mut buffer) = self.buf_reader.into_inner_with_buffer();
        buffer.clear();
        LineSource::from_buf_reader(buffer_redux::BufReader::with_buffer(buffer, reader))
    }

    /// Reads the next line, without its terminator (`\n` or `\r\n`).
    /// Returns `None` once the stream is exhausted; a last line lacking a
    /// terminator is still returned.
    pub fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        if self.pending > 0 {
            self.buf_reader.consume(self.pending);
            self.pending = 0;
        }

        let mut searched = 0;
        let line_end = loop {
            let buf = self.buf_reader.buffer();
            if let Some(idx) = memchr(b'\n', &buf[searched..]) {
                let end = searched + idx;
                self.pending = end + 1;
                break end;
            }
            searched = buf.len();

            if self.eof {
                if buf.is_empty() {
                    return Ok(None);
                }
                self.pending = buf.len();
                break buf.len();
            }

            self.fill()?;
        };

        if self.line_ending.is_none() && self.pending > line_end {
            self.line_ending = Some(if line_end > 0 && self.buf_reader.buffer()[line_end - 1] == b'\r' {
                LineEnding::Windows
            } else {
                LineEnding::Unix
            });
        }

        self.line_start = self.position.byte;
        self.position.byte += self.pending as u64;
        self.position.line += 1;

        Ok(Some(trim_cr(&self.buf_reader.buffer()[..line_end])))
    }

    /// Reads more data after the bytes already buffered, moving them to the
    /// front of the buffer and doubling it first if it is full.
    fn fill(&mut self) -> io::Result<()> {
        self.buf_reader.make_room();
        if self.buf_reader.buffer().len() == self.buf_reader.capacity() {
            self.grow();
        }
        loop {
            match self.buf_reader.read_into_buf() {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(_) => return Ok(()),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    fn grow(&mut self) {
        let cap = self.buf_reader.capacity();
        let new_size = grow_to(cap);
        let additional = new_size - cap;
        self.buf_reader.reserve(additional);
    }

    /// Offset of the next line to be read
    #[inline]
    pub fn byte_offset(&self) -> u64 {
        self.position.byte
    }

    /// Offset of the first byte of the line returned by the last `next_line` call
    #[inline]
    pub fn line_offset(&self) -> u64 {
        self.line_start
    }

    /// Number of the last line returned (starting with 1). Counting restarts
    /// after a seek.
    #[inline]
    pub fn line_number(&self) -> u64 {
        self.position.line
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Current buffer capacity
    pub fn capacity(&self) -> usize {
        self.buf_reader.capacity()
    }

    /// `None` until a line with a terminator has been read
    pub fn line_ending(&self) -> Option<LineEnding> {
        self.line_ending
    }
}

impl LineSource<File> {
    /// Creates a line source reading from a file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        File::open(path).map(Self::new)
    }

    /// Opens another file, reusing the current buffer.
    pub fn reopen<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(self.with_reader(file))
    }
}

impl<R> LineSource<R>
where
    R: io::Read + Seek,
{
    /// Repositions the stream so the next `next_line` call reads from `offset`.
    pub fn seek(&mut self, offset: u64) -> io::Result<()> {
        // seeking a buffer_redux reader discards whatever it had buffered
        self.buf_reader.seek(SeekFrom::Start(offset))?;
        self.pending = 0;
        self.eof = false;
        self.position = Position::new(0, offset);
        self.line_start = offset;
        Ok(())
    }
}
