#![allow(missing_docs)]
#![allow(clippy::needless_raw_string_hashes)]

use jsonarena::{
    Document,
    json::{self, JsonWriterOptions},
};

const INPUT: &str = r#"{
    "sensor": "gps",
    "time": 1351824120,
    "data": [48.756080, 2.302038],
    "meta": {"ok": true, "note": null, "tags": [], "extra": {}},
    "text": "line\nbreak \"quoted\" é"
}"#;

fn render(indent: Option<u8>) -> String {
    let mut doc = Document::with_capacity(2048);
    json::from_str(&mut doc, INPUT).unwrap();
    let options = JsonWriterOptions {
        indent,
        ..Default::default()
    };
    json::to_string(doc.root(), options).unwrap()
}

#[test]
fn snapshot_compact() {
    insta::assert_snapshot!(render(None), @r#"{"sensor":"gps","time":1351824120,"data":[48.75608,2.302038],"meta":{"ok":true,"note":null,"tags":[],"extra":{}},"text":"line\nbreak \"quoted\" é"}"#);
}

#[test]
fn snapshot_pretty() {
    insta::assert_snapshot!(render(Some(2)), @r#"
    {
      "sensor": "gps",
      "time": 1351824120,
      "data": [
        48.75608,
        2.302038
      ],
      "meta": {
        "ok": true,
        "note": null,
        "tags": [],
        "extra": {}
      },
      "text": "line\nbreak \"quoted\" é"
    }
    "#);
}

#[test]
fn snapshot_built_document() {
    let mut doc = Document::with_capacity(1024);
    let mut root = doc.root_mut();
    assert!(root.reborrow().get_or_create("id").set_int(-7));
    assert!(root.reborrow().get_or_create("ratio").set_float(0.25));
    assert!(root.reborrow().get_or_create("big").set_float(1e21));
    assert!(root.reborrow().get_or_create("whole").set_float(3.0));
    assert!(root.reborrow().get_or_create("raw").set_linked_raw(b"[1,2]"));
    assert!(root.reborrow().get_or_create("ctl").set_str("\u{1}\u{2028}"));

    let out = json::to_string(doc.root(), JsonWriterOptions::default()).unwrap();
    insta::assert_snapshot!(out, @r#"{"id":-7,"ratio":0.25,"big":1e21,"whole":3.0,"raw":[1,2],"ctl":"\u0001\u2028"}"#);
}
