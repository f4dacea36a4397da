//! Record delimiting for FASTA: a record runs from its `>` header to the next
//! header or the end of the input.

use std::io;

use crate::errors::ScanError;
use crate::parser::record::Record;
use crate::parser::scanner::{HeldLine, ScanSession};

impl<R> ScanSession<R>
where
    R: io::Read,
{
    /// Reads sequence lines until the next header, which is kept for the
    /// following call.
    pub(crate) fn read_fasta(&mut self, header: HeldLine) -> Result<Record, ScanError> {
        let mut sequence = Vec::new();
        loop {
            let next_header = match self.lines.next_line()? {
                None => break,
                Some(line) if line.first() == Some(&b'>') => line.to_vec(),
                Some(line) => {
                    sequence.extend_from_slice(line);
                    continue;
                }
            };
            self.held = Some(HeldLine {
                bytes: next_header,
                offset: self.lines.line_offset(),
                line: self.lines.line_number(),
            });
            break;
        }

        Ok(header.into_record(sequence, None))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::parser::record::Record;
    use crate::parser::{LineEnding, ScanOptions, ScanSession};

    fn seq(s: &[u8]) -> Cursor<&[u8]> {
        Cursor::new(s)
    }

    fn scan_all(input: &[u8]) -> Vec<Record> {
        ScanSession::new(seq(input))
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn test_basic() {
        let mut session = ScanSession::new(seq(b">r1\nACGT\n>r2\nAC\n"));
        assert!(session.line_ending().is_none());
        let r = session.next_record().unwrap().unwrap();
        assert_eq!(r.name(), b"r1");
        assert_eq!(r.seq(), b"ACGT");
        assert_eq!(r.qual(), None);
        assert_eq!(r.header_offset(), 0);
        assert_eq!(session.line_ending().unwrap(), LineEnding::Unix);
        let r = session.next_record().unwrap().unwrap();
        assert_eq!(r.name(), b"r2");
        assert_eq!(r.seq(), b"AC");
        assert_eq!(r.header_offset(), 9);
        assert!(session.next_record().unwrap().is_none());
    }

    #[test]
    fn test_wrapped_fasta() {
        let records = scan_all(b">test desc here\nACGT\nACGT\n>test2\nTGCA\nTG");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name(), b"test");
        assert_eq!(records[0].description(), Some(&b"desc here"[..]));
        assert_eq!(records[0].seq(), b"ACGTACGT");
        assert_eq!(records[0].num_bases(), 8);
        assert_eq!(records[1].name(), b"test2");
        assert_eq!(records[1].description(), None);
        assert_eq!(records[1].seq(), b"TGCATG");
    }

    #[test]
    fn test_wrapped_fasta_windows_newlines() {
        let mut session = ScanSession::new(seq(b">test\r\nACGT\r\nACGT\r\n>test2\r\nTGCA\r\nTG"));
        let r = session.next_record().unwrap().unwrap();
        assert_eq!(r.name(), b"test");
        assert_eq!(r.seq(), b"ACGTACGT");
        assert_eq!(r.start_line_number(), 1);
        assert_eq!(session.line_ending().unwrap(), LineEnding::Windows);
        let r = session.next_record().unwrap().unwrap();
        assert_eq!(r.name(), b"test2");
        assert_eq!(r.seq(), b"TGCATG");
        assert_eq!(r.start_line_number(), 4);
        assert_eq!(r.header_offset(), 19);
        assert!(session.next_record().unwrap().is_none());
    }

    #[test]
    fn test_header_at_end_closes_empty_record() {
        let records = scan_all(b">test\nAGCT\n>test2");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name(), b"test2");
        assert_eq!(records[1].seq(), b"");
    }

    #[test]
    fn test_empty_records() {
        let records = scan_all(b">\n\n>shine\nAGGAGGU");
        assert_eq!(records[0].name(), b"");
        assert_eq!(records[0].seq(), b"");
        assert_eq!(records[1].name(), b"shine");
        assert_eq!(records[1].seq(), b"AGGAGGU");
    }

    #[test]
    fn test_plus_and_at_lines_are_sequence() {
        let records = scan_all(b">r\n@AC\n+GT\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].seq(), b"@AC+GT");
    }

    #[test]
    fn test_splits_at_each_header() {
        let names = ["a", "bb", "ccc", "dddd"];
        let mut input = Vec::new();
        let mut expected = Vec::new();
        for (i, name) in names.iter().enumerate() {
            input.extend_from_slice(format!(">{}\n", name).as_bytes());
            let mut sequence = Vec::new();
            for j in 0..=i {
                let line = vec![b"ACGT"[j % 4]; 3 + j];
                input.extend_from_slice(&line);
                input.push(b'\n');
                sequence.extend_from_slice(&line);
            }
            expected.push((name.as_bytes().to_vec(), sequence));
        }

        // tiny buffer to force several expansions
        let session = ScanSession::with_options(seq(&input), &ScanOptions::default().with_capacity(3));
        let got: Vec<(Vec<u8>, Vec<u8>)> = session
            .map(|r| r.unwrap().into_parts())
            .map(|(name, seq, _)| (name, seq))
            .collect();
        assert_eq!(got, expected);
    }
}
