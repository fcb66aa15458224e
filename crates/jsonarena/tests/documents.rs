#![allow(missing_docs)]

use jsonarena::{
    ArenaConfig, DeserializeErrorKind, Document, Growth, Kind, SLOT_SIZE, SliceWriter, json, msgpack,
};

#[test]
fn parse_query_and_reserialize() {
    let input = r#"{"sensor":"gps","time":1351824120,"data":[48.75608,2.302038]}"#;
    let mut doc = Document::with_capacity(1024);
    json::from_str(&mut doc, input).unwrap();

    let root = doc.root();
    assert_eq!(root.get("sensor").as_str(), Some("gps"));
    assert_eq!(root.get("time").coerce::<i64>(), 1_351_824_120);
    assert!((root.get("data").get(0).coerce::<f64>() - 48.756_08).abs() < f64::EPSILON);
    assert!(root.get("nope").is_unbound());

    let mut buf = [0u8; 128];
    let mut sink = SliceWriter::new(&mut buf);
    let written = json::to_writer(root, &mut sink, Default::default()).unwrap();
    assert_eq!(written, input.len());
    assert_eq!(sink.written(), input.as_bytes());
}

#[test]
fn text_to_binary_and_back() {
    let input = r#"{"a":[1,-1,1.5,"s",null,false],"b":{"c":"d"}}"#;
    let mut doc = Document::with_capacity(1024);
    json::from_str(&mut doc, input).unwrap();
    let bytes = msgpack::to_vec(doc.root(), Default::default()).unwrap();

    let mut decoded = Document::with_capacity(1024);
    msgpack::from_slice(&mut decoded, &bytes).unwrap();
    assert_eq!(decoded.root(), doc.root());
    assert_eq!(json::to_string(decoded.root(), Default::default()).unwrap(), input);
}

#[test]
fn incomplete_object_reports_incomplete_input() {
    let mut doc = Document::with_capacity(256);
    let err = json::from_str(&mut doc, r#"{"a":"#).unwrap_err();
    assert_eq!(err.kind(), DeserializeErrorKind::IncompleteInput);
}

#[test]
fn exhausted_arena_reports_no_memory_and_stays_consistent() {
    let mut doc = Document::with_capacity(3 * SLOT_SIZE);
    let err = json::from_str(&mut doc, "[1,2,3,4,5]").unwrap_err();
    assert_eq!(err.kind(), DeserializeErrorKind::NoMemory);
    assert_eq!(doc.root().len(), 3);
    assert_eq!(json::to_string(doc.root(), Default::default()).unwrap(), "[1,2,3]");
}

#[test]
fn growable_document_and_compact() {
    let mut doc = Document::new(ArenaConfig {
        capacity: 64,
        growth: Growth::Double { max_capacity: 1 << 20 },
    });
    let mut root = doc.root_mut();
    for i in 0..100u64 {
        assert!(root.reborrow().add().set_uint(i));
    }
    assert!(doc.capacity() >= 100 * SLOT_SIZE);

    assert!(doc.root_mut().get_mut(0).set_str("replaced"));
    assert!(doc.root_mut().get_mut(0).set_str("again"));
    let used = doc.compact();
    assert_eq!(used, 100 * SLOT_SIZE + "again".len());
    assert_eq!(doc.capacity(), used);
    assert_eq!(doc.root().get(0).kind(), Kind::OwnedString);
    assert_eq!(doc.root().get(99).coerce::<u64>(), 99);
}
