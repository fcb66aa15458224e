#![no_main]

use jsonarena::{
    ArenaConfig, DeserializeOptions, Document, Growth, IterReader, SliceReader,
    msgpack::{self, FloatWidth, MsgPackWriterOptions},
};
use libfuzzer_sys::fuzz_target;

fn document<'src>() -> Document<'src> {
    Document::new(ArenaConfig {
        capacity: 256,
        growth: Growth::Double { max_capacity: 1 << 20 },
    })
}

/// Decoding from a slice and from an unstable reader must agree, and
/// re-encoding a decoded document must be stable.
fn decode(data: &[u8]) {
    let Some((&flags, input)) = data.split_first() else {
        return;
    };
    let options = DeserializeOptions {
        nesting_limit: flags & 0x0f,
        allow_trailing_data: flags & 0x10 != 0,
    };
    let writer = MsgPackWriterOptions {
        float_width: if flags & 0x20 != 0 {
            FloatWidth::Narrowest
        } else {
            FloatWidth::Double
        },
    };

    let mut linked = document();
    let linked_result = msgpack::from_reader(&mut linked, SliceReader::new(input), options);
    let mut copied: Document<'static> = document();
    let copied_result = msgpack::from_reader(&mut copied, IterReader::new(input.to_vec().into_iter()), options);
    assert_eq!(
        linked_result.as_ref().map_err(|e| e.kind()),
        copied_result.as_ref().map_err(|e| e.kind())
    );
    if linked_result.is_err() {
        return;
    }

    let first = msgpack::to_vec(linked.root(), writer).expect("document must encode");
    assert_eq!(msgpack::measure(linked.root(), writer), Ok(first.len()));
    assert_eq!(msgpack::to_vec(copied.root(), writer).as_deref(), Ok(&first[..]));

    let mut again = document();
    let strict = DeserializeOptions {
        allow_trailing_data: false,
        ..options
    };
    msgpack::from_reader(&mut again, SliceReader::new(&first), strict).expect("output must decode");
    let second = msgpack::to_vec(again.root(), writer).expect("document must encode");
    assert_eq!(first, second);
}

fuzz_target!(|data: &[u8]| decode(data));
