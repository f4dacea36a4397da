use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use log::warn;

use crate::errors::{IndexError, ScanError};
use crate::index::{index_path_for, Index, IndexEntry};
use crate::parser::{Record, ScanSession};

/// Random access to the records of an indexed file, by name or by ordinal.
///
/// # Example
///
/// ```no_run
/// use fastx_index::index::{Index, IndexedReader};
///
/// if !Index::exists_for("reads.fq") {
///     Index::build("reads.fq").unwrap();
/// }
/// let mut reader = IndexedReader::from_path("reads.fq").unwrap();
/// if let Some(record) = reader.fetch("read42").unwrap() {
///     println!("{}", String::from_utf8_lossy(record.seq()));
/// }
/// // records 10 to 19
/// let records = reader.fetch_range(10, 20).unwrap();
/// ```
pub struct IndexedReader<R: Read + Seek> {
    session: ScanSession<R>,
    index: Index,
}

impl IndexedReader<File> {
    /// Opens `source` along with its index, which must already exist.
    /// Warns if the index is older than the file.
    pub fn from_path<P: AsRef<Path>>(source: P) -> Result<Self, IndexError> {
        let source = source.as_ref();
        let index = Index::open_for(source)?;
        if Index::is_stale(source) {
            warn!(
                "'{}' is older than '{}'; the index may be stale",
                index_path_for(source).display(),
                source.display()
            );
        }
        let session = ScanSession::from_path(source)?;
        Ok(Self::new(session, index))
    }
}

impl<R> IndexedReader<R>
where
    R: Read + Seek,
{
    pub fn new(session: ScanSession<R>, index: Index) -> Self {
        let session = match index.format() {
            Some(format) => session.with_format(format),
            None => session,
        };
        Self { session, index }
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Reads the record called `name`; `None` if the index does not know it.
    pub fn fetch<N: AsRef<[u8]>>(&mut self, name: N) -> Result<Option<Record>, ScanError> {
        let name = name.as_ref();
        let entry = match self.index.get(name) {
            Some(e) => e.clone(),
            None => {
                warn!(
                    "'{}' was not found in the index",
                    String::from_utf8_lossy(name)
                );
                return Ok(None);
            }
        };
        self.read_entry(&entry).map(Some)
    }

    /// Reads the `n`-th record of the file (0-origin)
    pub fn fetch_ordinal(&mut self, n: u64) -> Result<Option<Record>, ScanError> {
        match self.index.entry(n).cloned() {
            Some(entry) => self.read_entry(&entry).map(Some),
            None => Ok(None),
        }
    }

    /// Reads the records with ordinals in `[start, end)`, with a single seek.
    /// `end` is clamped to the number of records.
    pub fn fetch_range(&mut self, start: u64, end: u64) -> Result<Vec<Record>, ScanError> {
        let end = end.min(self.index.len() as u64);
        if start >= end {
            if start >= self.index.len() as u64 {
                warn!(
                    "The start index ({}) is larger than the number of records ({})",
                    start,
                    self.index.len()
                );
            }
            return Ok(Vec::new());
        }

        let first = match self.index.entry(start).cloned() {
            Some(e) => e,
            None => return Ok(Vec::new()),
        };
        let mut records = Vec::with_capacity((end - start) as usize);
        records.push(self.read_entry(&first)?);
        for _ in start + 1..end {
            match self.session.next_record()? {
                Some(record) => records.push(record),
                None => {
                    warn!("Reached the end of file before the end of the range");
                    break;
                }
            }
        }
        Ok(records)
    }

    fn read_entry(&mut self, entry: &IndexEntry) -> Result<Record, ScanError> {
        self.session.seek_to_offset(entry.offset)?;
        let record = match self.session.next_record()? {
            Some(r) => r,
            None => {
                return Err(ScanError::new_seek_misalignment(
                    entry.offset,
                    b"",
                    self.session.format(),
                ))
            }
        };
        if record.name() != entry.name.as_slice() {
            return Err(ScanError::new_name_mismatch(
                entry.offset,
                &entry.name,
                record.name(),
                self.session.format(),
            ));
        }
        Ok(record)
    }
}
