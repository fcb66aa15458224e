use alloc::string::String;

use quickcheck::{QuickCheck, TestResult};

use super::arbitrary::{TestValue, document, growable};
use crate::{
    json::{self, JsonWriterOptions},
    msgpack::{self, MsgPackWriterOptions},
};

fn tests() -> u64 {
    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;
    tests
}

/// Property: writing a document as JSON and parsing it back yields a
/// structurally equal document, compact or pretty.
#[test]
fn json_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(value: TestValue, pretty: bool) -> TestResult {
        let original = document(&value);
        let options = JsonWriterOptions {
            indent: pretty.then_some(2),
            ..Default::default()
        };
        let text: String = json::to_string(original.root(), options).unwrap();
        if json::measure(original.root(), options) != Ok(text.len()) {
            return TestResult::failed();
        }

        let mut parsed = growable();
        if let Err(err) = json::from_str(&mut parsed, &text) {
            return TestResult::error(alloc::format!("{err} in {text}"));
        }
        TestResult::from_bool(parsed.root() == original.root())
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(TestValue, bool) -> TestResult);
}

/// Property: the binary encoding round-trips exactly, including float bits
/// and integer signedness of negative values.
#[test]
fn msgpack_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(value: TestValue) -> TestResult {
        let original = document(&value);
        let bytes = msgpack::to_vec(original.root(), MsgPackWriterOptions::default()).unwrap();
        if msgpack::measure(original.root(), MsgPackWriterOptions::default()) != Ok(bytes.len()) {
            return TestResult::failed();
        }

        let mut decoded = growable();
        if let Err(err) = msgpack::from_slice(&mut decoded, &bytes) {
            return TestResult::error(alloc::format!("{err}"));
        }
        TestResult::from_bool(decoded.root() == original.root())
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(TestValue) -> TestResult);
}

/// Property: every 64-bit integer survives the text codec with its exact
/// value, never passing through a float.
#[test]
fn integer_exactness_quickcheck() {
    fn prop(signed: i64, unsigned: u64) -> bool {
        let mut doc = growable();
        let mut root = doc.root_mut();
        assert!(root.reborrow().add().set_int(signed));
        assert!(root.add().set_uint(unsigned));
        let text = json::to_string(doc.root(), JsonWriterOptions::default()).unwrap();

        let mut parsed = growable();
        json::from_str(&mut parsed, &text).unwrap();
        let root = parsed.root();
        root.get(0).kind().is_integer()
            && root.get(0).coerce::<i64>() == signed
            && root.get(1).kind().is_integer()
            && root.get(1).coerce::<u64>() == unsigned
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(i64, u64) -> bool);
}
