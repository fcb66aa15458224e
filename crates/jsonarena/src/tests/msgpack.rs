use alloc::{vec, vec::Vec};

use rstest::rstest;

use crate::{
    CopyingReader, DeserializeErrorKind, DeserializeOptions, Document, IterReader, Kind, SLOT_SIZE, json,
    msgpack::{self, FloatWidth, MsgPackWriterOptions},
};

fn encode(json_text: &str) -> Vec<u8> {
    let mut doc = Document::with_capacity(1 << 16);
    json::from_str(&mut doc, json_text).unwrap();
    msgpack::to_vec(doc.root(), MsgPackWriterOptions::default()).unwrap()
}

#[rstest]
#[case("0", &[0x00])]
#[case("127", &[0x7f])]
#[case("128", &[0xcc, 0x80])]
#[case("255", &[0xcc, 0xff])]
#[case("300", &[0xcd, 0x01, 0x2c])]
#[case("65536", &[0xce, 0x00, 0x01, 0x00, 0x00])]
#[case("4294967296", &[0xcf, 0, 0, 0, 1, 0, 0, 0, 0])]
#[case("-1", &[0xff])]
#[case("-32", &[0xe0])]
#[case("-33", &[0xd0, 0xdf])]
#[case("-129", &[0xd1, 0xff, 0x7f])]
#[case("-32769", &[0xd2, 0xff, 0xff, 0x7f, 0xff])]
#[case("-2147483649", &[0xd3, 0xff, 0xff, 0xff, 0xff, 0x7f, 0xff, 0xff, 0xff])]
#[case("null", &[0xc0])]
#[case("[true,false]", &[0x92, 0xc3, 0xc2])]
#[case("1.5", &[0xcb, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0])]
#[case(r#""hi""#, &[0xa2, b'h', b'i'])]
#[case(r#"{"a":{}}"#, &[0x81, 0xa1, b'a', 0x80])]
fn minimal_width_encodings(#[case] input: &str, #[case] expected: &[u8]) {
    assert_eq!(encode(input), expected);
}

#[rstest]
#[case(31, &[0xbf])]
#[case(32, &[0xd9, 32])]
#[case(256, &[0xda, 0x01, 0x00])]
#[case(65536, &[0xdb, 0x00, 0x01, 0x00, 0x00])]
fn string_length_prefixes(#[case] len: usize, #[case] header: &[u8]) {
    let text = "x".repeat(len);
    let mut doc = Document::with_capacity(1 << 18);
    assert!(doc.root_mut().set_str(&text));
    let bytes = msgpack::to_vec(doc.root(), MsgPackWriterOptions::default()).unwrap();
    assert_eq!(&bytes[..header.len()], header);
    assert_eq!(bytes.len(), header.len() + len);
}

#[rstest]
#[case(15, &[0x9f])]
#[case(16, &[0xdc, 0x00, 0x10])]
#[case(65536, &[0xdd, 0x00, 0x01, 0x00, 0x00])]
fn array_length_prefixes(#[case] len: usize, #[case] header: &[u8]) {
    let mut doc = Document::new(crate::ArenaConfig {
        capacity: 1024,
        growth: crate::Growth::Double { max_capacity: 1 << 24 },
    });
    assert!(doc.root_mut().get_or_create(len - 1).set_null());
    let bytes = msgpack::to_vec(doc.root(), MsgPackWriterOptions::default()).unwrap();
    assert_eq!(&bytes[..header.len()], header);
    assert_eq!(bytes.len(), header.len() + len);
}

#[test]
fn float_narrowing() {
    let mut doc = Document::with_capacity(256);
    json::from_str(&mut doc, "[0.5, 0.1]").unwrap();
    let options = MsgPackWriterOptions {
        float_width: FloatWidth::Narrowest,
    };
    let bytes = msgpack::to_vec(doc.root(), options).unwrap();
    assert_eq!(&bytes[..6], &[0x92, 0xca, 0x3f, 0x00, 0x00, 0x00]);
    assert_eq!(bytes[6], 0xcb);
    assert_eq!(bytes.len(), 1 + 5 + 9);
}

#[rstest]
#[case(&[0xca, 0x3f, 0xc0, 0x00, 0x00], 1.5)]
#[case(&[0xcb, 0xc0, 0x04, 0, 0, 0, 0, 0, 0], -2.5)]
#[allow(clippy::float_cmp)]
fn decodes_floats(#[case] input: &[u8], #[case] expected: f64) {
    let mut doc = Document::with_capacity(64);
    msgpack::from_slice(&mut doc, input).unwrap();
    assert_eq!(doc.root().kind(), Kind::Float);
    assert_eq!(doc.root().coerce::<f64>(), expected);
}

#[test]
fn decodes_signed_markers_by_value() {
    let mut doc = Document::with_capacity(256);
    msgpack::from_slice(&mut doc, &[0x93, 0xd0, 0x05, 0xd1, 0xff, 0xfe, 0xe0]).unwrap();
    let root = doc.root();
    assert_eq!(root.get(0).kind(), Kind::UnsignedInteger);
    assert_eq!(root.get(0).coerce::<i8>(), 5);
    assert_eq!(root.get(1).coerce::<i16>(), -2);
    assert_eq!(root.get(2).coerce::<i64>(), -32);
}

#[rstest]
#[case(&[0xc4, 0x02, 0xaa, 0xbb])]
#[case(&[0xc5, 0x00, 0x01, 0xcc])]
#[case(&[0xc7, 0x01, 0x05, 0xdd])]
#[case(&[0xd4, 0x05, 0xee])]
#[case(&[0xd5, 0x7f, 0x01, 0x02])]
#[case(&[0xd8, 0x01, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15])]
fn bin_and_ext_are_preserved_verbatim(#[case] input: &[u8]) {
    let mut framed = vec![0x91];
    framed.extend_from_slice(input);

    let mut linked = Document::with_capacity(256);
    msgpack::from_slice(&mut linked, &framed).unwrap();
    assert_eq!(linked.root().get(0).kind(), Kind::RawFragment);
    assert_eq!(linked.root().get(0).as_raw(), Some(input));
    assert_eq!(msgpack::to_vec(linked.root(), Default::default()).unwrap(), framed);

    let mut copied: Document<'static> = Document::with_capacity(256);
    msgpack::from_reader(&mut copied, IterReader::new(framed.clone().into_iter()), Default::default()).unwrap();
    assert_eq!(copied.root().get(0).as_raw(), Some(input));
    assert_eq!(msgpack::to_vec(copied.root(), Default::default()).unwrap(), framed);
}

#[rstest]
#[case(&[], DeserializeErrorKind::EmptyInput)]
#[case(&[0xc1], DeserializeErrorKind::InvalidInput)]
#[case(&[0xcd, 0x01], DeserializeErrorKind::IncompleteInput)]
#[case(&[0xa3, b'a', b'b'], DeserializeErrorKind::IncompleteInput)]
#[case(&[0x92, 0x01], DeserializeErrorKind::IncompleteInput)]
#[case(&[0x81, 0xa1, b'k'], DeserializeErrorKind::IncompleteInput)]
#[case(&[0xc4, 0x05, 0x00], DeserializeErrorKind::IncompleteInput)]
#[case(&[0x81, 0x01, 0x02], DeserializeErrorKind::InvalidInput)]
#[case(&[0xa1, 0xff], DeserializeErrorKind::InvalidInput)]
#[case(&[0x01, 0x02], DeserializeErrorKind::InvalidInput)]
fn rejects(#[case] input: &[u8], #[case] expected: DeserializeErrorKind) {
    let mut doc = Document::with_capacity(256);
    let err = msgpack::from_slice(&mut doc, input).unwrap_err();
    assert_eq!(err.kind(), expected);
}

#[test]
fn exhausted_arena_keeps_decoded_prefix() {
    let mut doc = Document::with_capacity(3 * SLOT_SIZE);
    let err = msgpack::from_slice(&mut doc, &[0x95, 0x01, 0x02, 0x03, 0x04, 0x05]).unwrap_err();
    assert_eq!(err.kind(), DeserializeErrorKind::NoMemory);
    assert_eq!(doc.root().len(), 3);
    assert_eq!(doc.memory_usage(), 3 * SLOT_SIZE);
    assert_eq!(
        msgpack::to_vec(doc.root(), Default::default()).unwrap(),
        vec![0x93, 0x01, 0x02, 0x03]
    );
}

#[test]
fn owned_string_that_does_not_fit_is_left_null() {
    let input = [0x91, 0xa3, b'x', b'y', b'z'];
    let mut doc = Document::with_capacity(SLOT_SIZE + 2);
    let err = msgpack::from_reader(&mut doc, IterReader::new(input.into_iter()), Default::default())
        .unwrap_err();
    assert_eq!(err.kind(), DeserializeErrorKind::NoMemory);
    assert_eq!(doc.root().len(), 1);
    assert!(doc.root().get(0).is_null());
    assert_eq!(doc.memory_usage(), SLOT_SIZE);
    assert_eq!(
        msgpack::to_vec(doc.root(), Default::default()).unwrap(),
        vec![0x91, 0xc0]
    );
}

#[test]
fn nesting_limit_applies() {
    let mut doc = Document::with_capacity(256);
    let options = DeserializeOptions {
        nesting_limit: 2,
        ..Default::default()
    };
    assert!(msgpack::from_reader(&mut doc, CopyingReader::new(&[0x91, 0x91, 0x01]), options).is_ok());
    let err = msgpack::from_reader(&mut doc, CopyingReader::new(&[0x91, 0x91, 0x91, 0x01]), options).unwrap_err();
    assert_eq!(err.kind(), DeserializeErrorKind::TooDeep);
}

#[test]
fn duplicate_keys_last_write_wins() {
    let mut doc = Document::with_capacity(256);
    msgpack::from_slice(&mut doc, &[0x82, 0xa1, b'a', 0x01, 0xa1, b'a', 0x02]).unwrap();
    assert_eq!(doc.root().len(), 1);
    assert_eq!(doc.root().get("a").coerce::<u8>(), 2);
}

#[test]
fn measure_matches_output() {
    let text = r#"{"sensor":"gps","time":1351824120,"data":[48.75608,2.302038]}"#;
    let mut doc = Document::with_capacity(1024);
    json::from_str(&mut doc, text).unwrap();
    let bytes = msgpack::to_vec(doc.root(), Default::default()).unwrap();
    assert_eq!(msgpack::measure(doc.root(), Default::default()), Ok(bytes.len()));
}
