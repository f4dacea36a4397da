#![no_main]
#[macro_use]
extern crate libfuzzer_sys;

use std::io::Cursor;

use fastx_index::index::{Index, IndexedReader};
use fastx_index::parser::{ScanOptions, ScanSession, StrictnessPolicy};

fuzz_target!(|data: &[u8]| {
    let options = ScanOptions::default().with_capacity(3);
    let mut session = ScanSession::with_options(Cursor::new(data), &options);
    loop {
        match session.next_record() {
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(e) if e.is_fatal() => break,
            Err(_) => {}
        }
    }

    // every indexed record must be readable again from its offset
    let strict = ScanOptions::default().with_policy(StrictnessPolicy::Strict);
    if let Ok(index) = Index::from_session(ScanSession::with_options(Cursor::new(data), &strict)) {
        let names: Vec<Vec<u8>> = index.names().map(|n| n.to_vec()).collect();
        let mut reader = IndexedReader::new(ScanSession::new(Cursor::new(data)), index);
        for name in names {
            let record = reader.fetch(&name).unwrap().unwrap();
            assert_eq!(record.name(), &name[..]);
        }
    }
});
