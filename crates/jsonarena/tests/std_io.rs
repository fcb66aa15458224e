#![allow(missing_docs)]

use std::io::{BufReader, Cursor};

use jsonarena::{Document, IoReader, IoWriter, Kind, json, msgpack};

#[test]
fn parse_from_io_read_copies_strings() {
    let reader = BufReader::new(Cursor::new(br#"{"k":"v","n":[1,2]}"#.to_vec()));
    let mut doc: Document<'static> = Document::with_capacity(1024);
    json::from_reader(&mut doc, IoReader::new(reader), Default::default()).unwrap();
    assert_eq!(doc.root().get("k").kind(), Kind::OwnedString);
    assert_eq!(doc.root().get("n").len(), 2);
}

#[test]
fn write_to_io_write() {
    let mut doc = Document::with_capacity(1024);
    json::from_str(&mut doc, "[true,null]").unwrap();

    let mut sink = IoWriter(Vec::new());
    assert_eq!(json::to_writer(doc.root(), &mut sink, Default::default()), Ok(11));
    assert_eq!(sink.0, b"[true,null]");

    let mut sink = IoWriter(Vec::new());
    assert_eq!(msgpack::to_writer(doc.root(), &mut sink, Default::default()), Ok(3));
    assert_eq!(sink.0, [0x92, 0xc3, 0xc0]);
}

#[test]
fn truncated_stream_is_incomplete() {
    let reader = Cursor::new(vec![0x92, 0xc3]);
    let mut doc: Document<'static> = Document::with_capacity(1024);
    let err = msgpack::from_reader(&mut doc, IoReader::new(reader), Default::default()).unwrap_err();
    assert_eq!(err.kind(), jsonarena::DeserializeErrorKind::IncompleteInput);
}
