//! Persisted record positions for random access into FASTA/FASTQ files.
//!
//! An index is built by one full scan of the file and stored next to it, in
//! `<file>.index`. It maps every record name to the byte offset of its header
//! line, and every ordinal (0-origin position of the record in the file) to
//! the same offsets. Seeking a [`ScanSession`] to such an offset and reading a
//! record returns that record.
//!
//! The artifact is a small tab-delimited text file:
//!
//! ```text
//! #fastx-index	1	fastq
//! read1	0	0
//! read2	41	1
//! ```
//!
//! The first line holds a version and the format of the source, each other
//! line the name, header offset and ordinal of one record, in file order.
//! Names are stored as the raw bytes found in the source: they are not
//! required to be UTF-8.
//! It is written to a temporary file that is renamed into place once
//! complete, so a partial index is never visible.
//!
//! An index is never rebuilt implicitly: if the source file changes, the
//! index goes stale, which [`Index::is_stale`] can detect.
//!
//! # Example
//!
//! ```no_run
//! use fastx_index::index::Index;
//!
//! Index::build("reads.fq").expect("Failed to build index");
//!
//! let index = Index::open_for("reads.fq").expect("Failed to read index");
//! if let Some(offset) = index.lookup_by_name("read42") {
//!     println!("read42 starts at byte {}", offset);
//! }
//! ```

use std::collections::HashMap;
use std::convert::TryFrom;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::errors::IndexError;
use crate::parser::{Format, ScanOptions, ScanSession, StrictnessPolicy};

mod reader;

pub use reader::IndexedReader;

/// Appended to the source path to name its index
pub const INDEX_SUFFIX: &str = ".index";

const ARTIFACT_MAGIC: &str = "#fastx-index";
const ARTIFACT_VERSION: &str = "1";

/// Where the index of `source` lives
pub fn index_path_for<P: AsRef<Path>>(source: P) -> PathBuf {
    let mut path = OsString::from(source.as_ref().as_os_str());
    path.push(INDEX_SUFFIX);
    PathBuf::from(path)
}

/// One record of the indexed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Record name, the header up to the first space
    pub name: Vec<u8>,
    /// Byte offset of the header line
    pub offset: u64,
    /// 0-origin position of the record in the file
    pub ordinal: u64,
}

/// Name and ordinal lookups of record offsets in one file.
#[derive(Debug, Clone, Default)]
pub struct Index {
    format: Option<Format>,
    /// Entries in file order, so the ordinal is the position in this Vec
    entries: Vec<IndexEntry>,
    name_to_ordinal: HashMap<Vec<u8>, usize>,
}

impl Index {
    /// Scans `source` and persists its index next to it.
    ///
    /// Any problem in the source aborts the build, as does a name appearing
    /// twice: nothing is left on disk in that case. Fails with
    /// `AlreadyExists` if the source already has an index.
    pub fn build<P: AsRef<Path>>(source: P) -> Result<Index, IndexError> {
        let options = ScanOptions::default().with_policy(StrictnessPolicy::Strict);
        Self::build_with_options(source, &options)
    }

    pub fn build_with_options<P: AsRef<Path>>(
        source: P,
        options: &ScanOptions,
    ) -> Result<Index, IndexError> {
        let source = source.as_ref();
        let artifact = index_path_for(source);
        if artifact.exists() {
            return Err(IndexError::new_already_exists(&artifact.display().to_string()));
        }

        debug!("Creating index for '{}'", source.display());
        let session = ScanSession::from_path_with_options(source, options)?;
        let index = Self::from_session(session)?;

        let dir = match artifact.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        // removed on drop unless persisted
        let mut tmp = tempfile::Builder::new()
            .prefix(".fastx-index")
            .tempfile_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            index.write_to(&mut writer)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist_noclobber(&artifact)
            .map_err(|e| IndexError::from(e.error))?;

        debug!(
            "Indexed {} records into '{}'",
            index.len(),
            artifact.display()
        );
        Ok(index)
    }

    /// Builds an index in memory from a full scan of `session`.
    pub fn from_session<R: Read>(mut session: ScanSession<R>) -> Result<Index, IndexError> {
        let mut index = Index::default();
        while let Some(record) = session.next_record()? {
            let offset = record.header_offset();
            let (name, _, _) = record.into_parts();
            index.push(name, offset)?;
        }
        index.format = session.format();
        Ok(index)
    }

    fn push(&mut self, name: Vec<u8>, offset: u64) -> Result<(), IndexError> {
        let ordinal = self.entries.len();
        if let Some(&first) = self.name_to_ordinal.get(&name) {
            return Err(IndexError::new_duplicate_name(
                &name,
                first as u64,
                ordinal as u64,
            ));
        }
        self.name_to_ordinal.insert(name.clone(), ordinal);
        self.entries.push(IndexEntry {
            name,
            offset,
            ordinal: ordinal as u64,
        });
        Ok(())
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let format = self.format.map_or("-", |f| f.as_str());
        writeln!(writer, "{}\t{}\t{}", ARTIFACT_MAGIC, ARTIFACT_VERSION, format)?;
        for entry in &self.entries {
            writer.write_all(&entry.name)?;
            writeln!(writer, "\t{}\t{}", entry.offset, entry.ordinal)?;
        }
        Ok(())
    }

    /// Parse an index from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, IndexError> {
        let mut lines = BufReader::new(reader).split(b'\n');
        let header = match lines.next() {
            Some(line) => String::from_utf8_lossy(&line?).into_owned(),
            None => return Err(IndexError::new_invalid_artifact(1, "")),
        };
        let fields: Vec<&str> = header.split('\t').collect();
        let format = match fields.as_slice() {
            [ARTIFACT_MAGIC, ARTIFACT_VERSION, "-"] => None,
            [ARTIFACT_MAGIC, ARTIFACT_VERSION, name] => match Format::from_name(name) {
                Some(format) => Some(format),
                None => return Err(IndexError::new_invalid_artifact(1, &header)),
            },
            _ => return Err(IndexError::new_invalid_artifact(1, &header)),
        };

        let mut index = Index {
            format,
            ..Index::default()
        };
        for (i, line) in lines.enumerate() {
            let line = line?;
            let line_number = i + 2;
            let invalid =
                || IndexError::new_invalid_artifact(line_number, &String::from_utf8_lossy(&line));
            // names may contain tabs, the numbers never do
            let mut fields = line.rsplitn(3, |&b| b == b'\t');
            let ordinal = fields.next().and_then(parse_number).ok_or_else(invalid)?;
            let offset = fields.next().and_then(parse_number).ok_or_else(invalid)?;
            let name = fields.next().ok_or_else(invalid)?;
            if ordinal != index.entries.len() as u64 {
                return Err(invalid());
            }
            index.push(name.to_vec(), offset).map_err(|_| invalid())?;
        }

        Ok(index)
    }

    /// Reads an index artifact from its own path.
    pub fn load<P: AsRef<Path>>(artifact: P) -> Result<Self, IndexError> {
        let file = File::open(artifact.as_ref())?;
        let index = Self::from_reader(file)?;
        debug!(
            "Loaded {} records from '{}'",
            index.len(),
            artifact.as_ref().display()
        );
        Ok(index)
    }

    /// Reads the index of `source`.
    pub fn open_for<P: AsRef<Path>>(source: P) -> Result<Self, IndexError> {
        Self::load(index_path_for(source))
    }

    /// Whether `source` has an index
    pub fn exists_for<P: AsRef<Path>>(source: P) -> bool {
        index_path_for(source).exists()
    }

    /// Whether the index of `source` is older than `source` itself.
    /// `false` when either file is missing.
    pub fn is_stale<P: AsRef<Path>>(source: P) -> bool {
        let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified());
        match (
            modified(source.as_ref()),
            modified(&index_path_for(source.as_ref())),
        ) {
            (Ok(src), Ok(idx)) => idx < src,
            _ => false,
        }
    }

    /// Deletes the index of `source`
    pub fn remove_for<P: AsRef<Path>>(source: P) -> io::Result<()> {
        fs::remove_file(index_path_for(source))
    }

    /// Header offset of the record named `name`
    pub fn lookup_by_name<N: AsRef<[u8]>>(&self, name: N) -> Option<u64> {
        self.get(name).map(|e| e.offset)
    }

    /// Header offset of the `n`-th record (0-origin)
    pub fn lookup_by_ordinal(&self, n: u64) -> Option<u64> {
        self.entry(n).map(|e| e.offset)
    }

    pub fn get<N: AsRef<[u8]>>(&self, name: N) -> Option<&IndexEntry> {
        self.name_to_ordinal
            .get(name.as_ref())
            .and_then(|&i| self.entries.get(i))
    }

    pub fn entry(&self, n: u64) -> Option<&IndexEntry> {
        usize::try_from(n).ok().and_then(|i| self.entries.get(i))
    }

    /// Format of the indexed file, `None` if it had no records
    pub fn format(&self) -> Option<Format> {
        self.format
    }

    /// Get the number of records in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an iterator over all entries, in file order.
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.iter().map(|e| e.name.as_slice())
    }
}

fn parse_number(field: &[u8]) -> Option<u64> {
    std::str::from_utf8(field).ok()?.parse().ok()
}
