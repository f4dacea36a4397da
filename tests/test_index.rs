use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use fastx_index::errors::{IndexErrorKind, ScanErrorKind};
use fastx_index::index::{index_path_for, Index, IndexedReader};
use fastx_index::parser::Format;

fn write_source(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(bytes).unwrap();
    path
}

fn generated_fastq(n: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..n {
        let len = 1 + i % 37;
        let seq: Vec<u8> = (0..len).map(|j| b"ACGT"[(i + j) % 4]).collect();
        // wrap some records over several lines
        let seq_lines: Vec<&[u8]> = seq.chunks(10).collect();
        write!(out, "@read{} sample={}\n", i, i % 3).unwrap();
        for l in &seq_lines {
            out.extend_from_slice(l);
            out.push(b'\n');
        }
        if i % 2 == 0 {
            write!(out, "+read{}\n", i).unwrap();
        } else {
            out.extend_from_slice(b"+\n");
        }
        // quality starting with '@' on purpose
        let qual: Vec<u8> = (0..len).map(|j| if j == 0 { b'@' } else { b'I' }).collect();
        for l in qual.chunks(10) {
            out.extend_from_slice(l);
            out.push(b'\n');
        }
    }
    out
}

#[test]
fn build_and_load_fasta_index() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "small.fa", b">r1\nACGT\n>r2\nAC\n");

    let built = Index::build(&source).unwrap();
    assert!(Index::exists_for(&source));
    assert_eq!(index_path_for(&source), dir.path().join("small.fa.index"));

    let index = Index::open_for(&source).unwrap();
    assert_eq!(index.format(), Some(Format::Fasta));
    assert_eq!(index.len(), 2);
    assert_eq!(index.lookup_by_name("r1"), Some(0));
    assert_eq!(index.lookup_by_name("r2"), Some(9));
    assert_eq!(index.lookup_by_ordinal(1), Some(9));
    assert_eq!(index.lookup_by_name("missing"), None);
    assert_eq!(
        built.entries().collect::<Vec<_>>(),
        index.entries().collect::<Vec<_>>()
    );
}

#[test]
fn build_refuses_existing_index() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "small.fa", b">r1\nACGT\n");
    Index::build(&source).unwrap();
    let before = fs::read(index_path_for(&source)).unwrap();

    let e = Index::build(&source).unwrap_err();
    assert_eq!(e.kind, IndexErrorKind::AlreadyExists);
    assert_eq!(fs::read(index_path_for(&source)).unwrap(), before);
}

#[test]
fn rebuild_after_remove_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "reads.fq", &generated_fastq(50));
    Index::build(&source).unwrap();
    let first = fs::read(index_path_for(&source)).unwrap();

    Index::remove_for(&source).unwrap();
    assert!(!Index::exists_for(&source));
    Index::build(&source).unwrap();
    assert_eq!(fs::read(index_path_for(&source)).unwrap(), first);
}

#[test]
fn failed_build_leaves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(
        dir.path(),
        "dup.fq",
        b"@a\nA\n+\nI\n@b\nC\n+\nI\n@a again\nG\n+\nI\n",
    );
    let e = Index::build(&source).unwrap_err();
    assert_eq!(e.kind, IndexErrorKind::DuplicateName);
    assert!(!Index::exists_for(&source));

    let source = write_source(dir.path(), "truncated.fq", b"@a\nACGT\n+\nII\n");
    let e = Index::build(&source).unwrap_err();
    assert_eq!(e.kind, IndexErrorKind::Scan(ScanErrorKind::Truncated));
    assert!(!Index::exists_for(&source));

    // index builds are strict about extra quality bytes
    let source = write_source(dir.path(), "long.fq", b"@a\nAC\n+\nIII\n");
    let e = Index::build(&source).unwrap_err();
    assert_eq!(e.kind, IndexErrorKind::Scan(ScanErrorKind::UnequalLengths));
    assert!(!Index::exists_for(&source));

    // only the sources remain in the directory
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
}

#[test]
fn missing_source_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let e = Index::build(dir.path().join("nope.fa")).unwrap_err();
    assert_eq!(e.kind, IndexErrorKind::Io);
    let e = Index::open_for(dir.path().join("nope.fa")).unwrap_err();
    assert_eq!(e.kind, IndexErrorKind::Io);
}

#[test]
fn every_record_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "reads.fq", &generated_fastq(500));
    Index::build(&source).unwrap();

    let mut reader = IndexedReader::from_path(&source).unwrap();
    let names: Vec<Vec<u8>> = reader.index().names().map(|n| n.to_vec()).collect();
    assert_eq!(names.len(), 500);
    // visit out of file order
    for name in names.iter().rev() {
        let record = reader.fetch(name).unwrap().unwrap();
        assert_eq!(record.name(), &name[..]);
        assert_eq!(record.seq().len(), record.qual().unwrap().len());
        assert_eq!(record.qual().unwrap()[0], b'@');
    }

    let record = reader.fetch_ordinal(123).unwrap().unwrap();
    assert_eq!(record.name(), b"read123");
    assert_eq!(record.description(), Some(&b"sample=0"[..]));

    let range = reader.fetch_range(498, 600).unwrap();
    let names: Vec<_> = range.iter().map(|r| r.name_lossy().into_owned()).collect();
    assert_eq!(names, vec!["read498", "read499"]);
}

#[test]
fn stale_index_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "small.fa", b">r1\nACGT\n>r2\nAC\n");
    Index::build(&source).unwrap();
    assert!(!Index::is_stale(&source));

    // the source gets rewritten after the index
    let mut file = OpenOptions::new().write(true).open(&source).unwrap();
    file.write_all(b">r1\nACGTACGT\n>r2\nAC\n").unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(3600))
        .unwrap();
    drop(file);
    assert!(Index::is_stale(&source));

    let mut reader = IndexedReader::from_path(&source).unwrap();
    let e = reader.fetch("r2").unwrap_err();
    assert_eq!(e.kind, ScanErrorKind::SeekMisalignment);
}

#[test]
fn corrupt_artifact_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "small.fa", b">r1\nACGT\n");
    write_source(dir.path(), "small.fa.index", b"r1\t0\t0\n");
    let e = Index::open_for(&source).unwrap_err();
    assert_eq!(e.kind, IndexErrorKind::InvalidArtifact);
    assert!(IndexedReader::from_path(&source).is_err());
}

#[test]
fn names_are_indexed_as_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "latin1.fa", b">\xff\nAC\n>\xfe\nGT\n");
    Index::build(&source).unwrap();

    let index = Index::open_for(&source).unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.lookup_by_ordinal(1), index.lookup_by_name(b"\xfe"));

    let mut reader = IndexedReader::from_path(&source).unwrap();
    assert_eq!(reader.fetch(b"\xff").unwrap().unwrap().seq(), b"AC");
    assert_eq!(reader.fetch(b"\xfe").unwrap().unwrap().seq(), b"GT");
}

#[test]
fn empty_source_gets_an_empty_index() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(dir.path(), "empty.fa", b"");
    let index = Index::build(&source).unwrap();
    assert!(index.is_empty());
    assert_eq!(index.format(), None);
    assert!(Index::open_for(&source).unwrap().is_empty());
}
