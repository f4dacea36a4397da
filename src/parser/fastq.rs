//! Record delimiting for FASTQ, with sequence and quality possibly wrapped
//! over several lines.
//!
//! The line ending the sequence part starts with `+`, but so may sequence and
//! quality lines. A `+` line only counts as the separator when the rest of it
//! is empty or repeats the record name. The quality block then ends once it is
//! as long as the sequence.

use std::io;

use log::warn;

use crate::errors::{ErrorPosition, ScanError};
use crate::parser::options::StrictnessPolicy;
use crate::parser::record::Record;
use crate::parser::scanner::{HeldLine, ScanSession};
use crate::parser::utils::Format;

/// `+`, optionally followed by the record name and then nothing or a space
#[inline]
pub(crate) fn is_separator(line: &[u8], name: &[u8]) -> bool {
    match line.split_first() {
        Some((b'+', rest)) => {
            rest.is_empty()
                || (rest.starts_with(name) && matches!(rest.get(name.len()), None | Some(b' ')))
        }
        _ => false,
    }
}

impl<R> ScanSession<R>
where
    R: io::Read,
{
    pub(crate) fn read_fastq(&mut self, header: HeldLine) -> Result<Record, ScanError> {
        self.name_token.clear();
        self.name_token.extend_from_slice(header.name());

        let mut sequence = Vec::new();
        loop {
            match self.lines.next_line()? {
                Some(line) if is_separator(line, &self.name_token) => break,
                Some(line) => sequence.extend_from_slice(line),
                None => {
                    return Err(ScanError::new_truncated(
                        header.error_position(),
                        Format::Fastq,
                    ))
                }
            }
        }

        let mut quality = Vec::with_capacity(sequence.len());
        if sequence.is_empty() {
            // an empty quality line may or may not be present
            let next_header = match self.lines.next_line()? {
                Some(line) if line.first() == Some(&b'@') => Some(line.to_vec()),
                Some(line) => {
                    quality.extend_from_slice(line);
                    None
                }
                None => None,
            };
            if let Some(bytes) = next_header {
                self.held = Some(HeldLine {
                    bytes,
                    offset: self.lines.line_offset(),
                    line: self.lines.line_number(),
                });
            }
        } else {
            while quality.len() < sequence.len() {
                match self.lines.next_line()? {
                    Some(line) => quality.extend_from_slice(line),
                    None => {
                        return Err(ScanError::new_truncated(
                            header.error_position(),
                            Format::Fastq,
                        ))
                    }
                }
            }
        }

        if quality.len() > sequence.len() {
            let position = ErrorPosition::new(
                self.lines.line_number(),
                self.lines.line_offset(),
                Some(header.name()),
            );
            match self.policy {
                StrictnessPolicy::Strict => {
                    return Err(ScanError::new_unequal_length(
                        sequence.len(),
                        quality.len(),
                        position,
                    ))
                }
                StrictnessPolicy::Lenient => {
                    warn!(
                        "Quality is {} bytes longer than the sequence ({}); dropping the extra bytes",
                        quality.len() - sequence.len(),
                        position
                    );
                    quality.truncate(sequence.len());
                }
            }
        }

        Ok(header.into_record(sequence, Some(quality)))
    }
}
