#![crate_name = "fastx_index"]
//! Streaming FASTA/FASTQ scanning with random access through a persisted
//! index of record positions.
//!
//! ```
//! use fastx_index::ScanSession;
//!
//! let mut session = ScanSession::new(&b">r1\nACGT\n>r2\nAC\n"[..]);
//! while let Some(record) = session.next_record().unwrap() {
//!     println!("{} at byte {}", record.name_lossy(), record.header_offset());
//! }
//! ```
pub mod errors;
pub mod index;
pub mod parser;

pub use errors::{IndexError, ScanError};
pub use index::{Index, IndexedReader};
pub use parser::{open, parse_fastx_file, Record, ScanSession};
