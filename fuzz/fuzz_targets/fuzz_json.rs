#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use jsonarena::{ArenaConfig, DeserializeOptions, Document, Growth, SliceReader, json};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::{Map, Value};

const HEADER: usize = 2; // 1 flag byte + 1 nesting limit byte

thread_local! {
    static RNG: RefCell<SmallRng> =
        RefCell::new(SmallRng::from_os_rng());
}

static WS_TABLE: &[&[u8]] = &[b" ", b"\t", b"\n", b"\r"];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8 & 0x03);
        data[1] = with_rng(|rng| rng.random_range(0..16));

        let limit = max_size - HEADER;
        let mut written = HEADER;
        written += append_whitespace(&mut data[written..], limit);
        written += append_value(&mut data[written..], size, max_size - written);
        written += append_whitespace(&mut data[written..], max_size - written);
        written
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

/// Appends up to 4 whitespace bytes, never exceeding `limit`.
fn append_whitespace(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        let n = rng.random_range(0..=limit.min(4));
        for b in &mut buf[..n] {
            *b = WS_TABLE[rng.random_range(0..WS_TABLE.len())][0];
        }
        n
    })
}

fn append_value(data: &mut [u8], size: usize, limit: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..=size * 2).min(limit));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value;
        }
    };

    let serialized = serde_json::to_vec(&value.0).expect("Failed to serialize arbitrary value");

    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(21)? {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3 => Value::from(u.arbitrary::<i64>()?),
            4 => Value::from(u.arbitrary::<u64>()?),
            5..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            _ => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
        };
        Ok(ArbitraryValue(value))
    }
}

fn document<'src>(flags: u8) -> Document<'src> {
    let growth = if flags & 2 != 0 {
        Growth::Double { max_capacity: 1 << 20 }
    } else {
        Growth::Fixed
    };
    Document::new(ArenaConfig { capacity: 1024, growth })
}

/// Accepted input must write out to text that parses back to the same
/// document, and `measure` must agree with the bytes written.
fn parse(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }
    let options = DeserializeOptions {
        nesting_limit: data[1],
        allow_trailing_data: data[0] & 1 != 0,
    };
    let input = &data[HEADER..];

    let mut doc = document(data[0]);
    if json::from_reader(&mut doc, SliceReader::new(input), options).is_err() {
        return;
    }

    let written = json::to_vec(doc.root(), Default::default()).expect("document must serialize");
    assert_eq!(
        json::measure(doc.root(), Default::default()),
        Ok(written.len())
    );

    let mut again = Document::new(ArenaConfig {
        capacity: 1024,
        growth: Growth::Double { max_capacity: 1 << 24 },
    });
    let strict = DeserializeOptions {
        nesting_limit: options.nesting_limit,
        allow_trailing_data: false,
    };
    json::from_reader(&mut again, SliceReader::new(&written), strict).expect("output must reparse");
    assert_eq!(again.root(), doc.root());
}

fuzz_target!(|data: &[u8]| parse(data));
