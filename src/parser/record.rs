use std::borrow::Cow;
use std::io::{self, Write};

use crate::parser::utils::{Format, LineEnding};

/// A FASTA or FASTQ record, owned by the caller.
///
/// For FASTQ records the quality is always exactly as long as the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub(crate) name: Vec<u8>,
    pub(crate) description: Option<Vec<u8>>,
    pub(crate) sequence: Vec<u8>,
    pub(crate) quality: Option<Vec<u8>>,
    pub(crate) header_offset: u64,
    pub(crate) line: u64,
}

impl Record {
    /// Returns the format of the record
    #[inline]
    pub fn format(&self) -> Format {
        if self.quality.is_some() {
            Format::Fastq
        } else {
            Format::Fasta
        }
    }

    /// The header up to the first space
    #[inline]
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn name_lossy(&self) -> Cow<str> {
        String::from_utf8_lossy(&self.name)
    }

    /// Whatever follows the first space of the header, if there was one
    #[inline]
    pub fn description(&self) -> Option<&[u8]> {
        self.description.as_deref()
    }

    /// The full header line without its `>`/`@`
    pub fn header(&self) -> Cow<[u8]> {
        match &self.description {
            None => Cow::Borrowed(&self.name[..]),
            Some(desc) => {
                let mut header = Vec::with_capacity(self.name.len() + 1 + desc.len());
                header.extend_from_slice(&self.name);
                header.push(b' ');
                header.extend_from_slice(desc);
                Cow::Owned(header)
            }
        }
    }

    /// All sequence lines of the record, concatenated
    #[inline]
    pub fn seq(&self) -> &[u8] {
        &self.sequence
    }

    /// Returns the quality if there is one.
    /// Always `None` for FASTA and `Some` for FASTQ, even if the quality is empty.
    #[inline]
    pub fn qual(&self) -> Option<&[u8]> {
        self.quality.as_deref()
    }

    #[inline]
    pub fn num_bases(&self) -> usize {
        self.sequence.len()
    }

    /// Byte offset of the first character of the header line
    #[inline]
    pub fn header_offset(&self) -> u64 {
        self.header_offset
    }

    /// Return the line number of the header. After a seek, lines are counted
    /// from the seek point.
    pub fn start_line_number(&self) -> u64 {
        self.line
    }

    pub fn into_parts(self) -> (Vec<u8>, Vec<u8>, Option<Vec<u8>>) {
        (self.name, self.sequence, self.quality)
    }

    /// Write record back to a `Write` instance, sequence and quality on a
    /// single line each.
    pub fn write(&self, writer: &mut dyn Write, line_ending: LineEnding) -> io::Result<()> {
        let header = self.header();
        match self.qual() {
            None => write_fasta(&header, &self.sequence, writer, line_ending),
            qual => write_fastq(&header, &self.sequence, qual, writer, line_ending),
        }
    }
}

/// Write a FASTA record
pub fn write_fasta(
    id: &[u8],
    seq: &[u8],
    writer: &mut dyn Write,
    line_ending: LineEnding,
) -> io::Result<()> {
    let ending = line_ending.to_bytes();
    writer.write_all(b">")?;
    writer.write_all(id)?;
    writer.write_all(&ending)?;
    writer.write_all(seq)?;
    writer.write_all(&ending)?;
    Ok(())
}

pub fn write_fastq(
    id: &[u8],
    seq: &[u8],
    qual: Option<&[u8]>,
    writer: &mut dyn Write,
    line_ending: LineEnding,
) -> io::Result<()> {
    let ending = line_ending.to_bytes();
    writer.write_all(b"@")?;
    writer.write_all(id)?;
    writer.write_all(&ending)?;
    writer.write_all(seq)?;
    writer.write_all(&ending)?;
    writer.write_all(b"+")?;
    writer.write_all(&ending)?;
    // sequences without qualities are written out as all "good"
    if let Some(qual) = qual {
        writer.write_all(qual)?;
    } else {
        writer.write_all(&vec![b'I'; seq.len()])?;
    }
    writer.write_all(&ending)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(description: Option<&[u8]>, quality: Option<&[u8]>) -> Record {
        Record {
            name: b"r1".to_vec(),
            description: description.map(|d| d.to_vec()),
            sequence: b"ACGT".to_vec(),
            quality: quality.map(|q| q.to_vec()),
            header_offset: 0,
            line: 1,
        }
    }

    #[test]
    fn test_header() {
        assert_eq!(&record(None, None).header()[..], b"r1");
        assert_eq!(&record(Some(b"len=4"), None).header()[..], b"r1 len=4");
    }

    #[test]
    fn test_write_fasta() {
        let mut out = Vec::new();
        record(Some(b"x"), None)
            .write(&mut out, LineEnding::Unix)
            .unwrap();
        assert_eq!(out, b">r1 x\nACGT\n");
    }

    #[test]
    fn test_write_fastq_windows() {
        let mut out = Vec::new();
        let rec = record(None, Some(b"IIII"));
        assert_eq!(rec.format(), Format::Fastq);
        rec.write(&mut out, LineEnding::Windows).unwrap();
        assert_eq!(out, b"@r1\r\nACGT\r\n+\r\nIIII\r\n");
    }

    #[test]
    fn test_write_fastq_without_qual() {
        let mut out = Vec::new();
        write_fastq(b"r", b"AC", None, &mut out, LineEnding::Unix).unwrap();
        assert_eq!(out, b"@r\nAC\n+\nII\n");
    }
}
