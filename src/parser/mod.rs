//! Handles all the FASTA/FASTQ scanning
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

#[cfg(feature = "compression")]
use bzip2::read::BzDecoder;
#[cfg(feature = "compression")]
use flate2::read::MultiGzDecoder;
#[cfg(feature = "compression")]
use xz2::read::XzDecoder;

mod fasta;
mod fastq;
mod lines;
mod options;
mod record;
mod scanner;
mod utils;

pub use lines::LineSource;
pub use options::{ScanOptions, StrictnessPolicy};
pub use record::{write_fasta, write_fastq, Record};
pub use scanner::{open, ScanSession};
pub use utils::{Format, LineEnding, Position, ScanState};

/// A forward-only session over a possibly compressed stream
pub type AnySession = ScanSession<Box<dyn Read + Send>>;

// Magic bytes for each compression format
#[cfg(feature = "compression")]
const GZ_MAGIC: [u8; 2] = [0x1F, 0x8B];
#[cfg(feature = "compression")]
const BZ_MAGIC: [u8; 2] = [0x42, 0x5A];
#[cfg(feature = "compression")]
const XZ_MAGIC: [u8; 2] = [0xFD, 0x37];

/// Opens a file for a forward scan.
/// This automatically detects whether the file is compressed with gzip, bz or xz
/// and uses the appropriate decoder; that part is only available if the
/// `compression` feature is enabled. FASTA or FASTQ is detected on the first
/// record as usual.
///
/// Decoded streams cannot seek, use [`open`] for random access.
pub fn parse_fastx_file<P: AsRef<Path>>(path: P) -> io::Result<AnySession> {
    parse_fastx_file_with_options(path, &ScanOptions::default())
}

pub fn parse_fastx_file_with_options<P: AsRef<Path>>(
    path: P,
    options: &ScanOptions,
) -> io::Result<AnySession> {
    let mut f = File::open(&path)?;
    let mut first = [0; 2];
    let n = read_up_to(&mut f, &mut first)?;
    // Back to the beginning of the file
    f.seek(SeekFrom::Start(0))?;

    let reader = decoder_for(f, &first[..n]);
    Ok(ScanSession::with_options(reader, options))
}

fn read_up_to(f: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut n = 0;
    while n < buf.len() {
        match f.read(&mut buf[n..]) {
            Ok(0) => break,
            Ok(k) => n += k,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(n)
}

#[cfg(feature = "compression")]
fn decoder_for(f: File, magic: &[u8]) -> Box<dyn Read + Send> {
    match magic {
        m if m == GZ_MAGIC => Box::new(MultiGzDecoder::new(f)),
        m if m == BZ_MAGIC => Box::new(BzDecoder::new(f)),
        m if m == XZ_MAGIC => Box::new(XzDecoder::new(f)),
        _ => Box::new(f),
    }
}

#[cfg(not(feature = "compression"))]
fn decoder_for(f: File, _magic: &[u8]) -> Box<dyn Read + Send> {
    Box::new(f)
}
