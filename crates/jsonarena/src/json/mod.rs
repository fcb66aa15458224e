//! JSON text codec.
//!
//! ```rust
//! use jsonarena::{Document, json::{self, JsonWriterOptions}};
//!
//! let mut doc = Document::with_capacity(512);
//! json::from_str(&mut doc, r#"{"a": [1, 2.5, "x"]}"#).unwrap();
//!
//! let pretty = JsonWriterOptions { indent: Some(2), ..Default::default() };
//! assert_eq!(
//!     json::to_string(doc.root(), pretty).unwrap(),
//!     "{\n  \"a\": [\n    1,\n    2.5,\n    \"x\"\n  ]\n}"
//! );
//! assert_eq!(json::measure(doc.root(), JsonWriterOptions::default()).unwrap(), 17);
//! ```

mod escape_buffer;
mod literal_buffer;
mod parser;
mod writer;

use alloc::{string::String, vec::Vec};

use parser::Parser;
use writer::JsonWriter;

use crate::{
    document::Document,
    error::{DeserializeError, SerializeError},
    io::{Counter, Reader, Sink, SliceReader},
    options::DeserializeOptions,
    variant::VariantRef,
};

/// Output formatting for the JSON writer.
///
/// # Default
///
/// Compact output with shortest round-trippable floats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonWriterOptions {
    /// `Some(n)` pretty-prints with `n` spaces per nesting level.
    pub indent: Option<u8>,
    /// `Some(p)` writes every float with exactly `p` fractional digits.
    /// `Some(0)` rounds to a whole number but still writes `.0`, so the
    /// value reads back as a float.
    pub float_precision: Option<u8>,
}

/// Parses `input` into `doc`, replacing its contents. Strings without
/// escapes are linked to `input` rather than copied.
///
/// # Errors
///
/// See [`DeserializeErrorKind`](crate::DeserializeErrorKind).
pub fn from_slice<'src>(doc: &mut Document<'src>, input: &'src [u8]) -> Result<(), DeserializeError> {
    from_reader(doc, SliceReader::new(input), DeserializeOptions::default())
}

/// Parses `input` into `doc`, replacing its contents.
///
/// # Errors
///
/// See [`DeserializeErrorKind`](crate::DeserializeErrorKind).
pub fn from_str<'src>(doc: &mut Document<'src>, input: &'src str) -> Result<(), DeserializeError> {
    from_slice(doc, input.as_bytes())
}

/// Parses one value from `reader` into `doc`, replacing its contents.
///
/// # Errors
///
/// See [`DeserializeErrorKind`](crate::DeserializeErrorKind).
pub fn from_reader<'src, R: Reader<'src>>(
    doc: &mut Document<'src>,
    reader: R,
    options: DeserializeOptions,
) -> Result<(), DeserializeError> {
    tracing::debug!(nesting_limit = options.nesting_limit, "json parse started");
    let result = Parser::new(doc, reader).parse(options);
    match &result {
        Ok(()) => tracing::debug!(memory_usage = doc.memory_usage(), "json parse finished"),
        Err(e) => tracing::debug!(
            error = %e,
            memory_usage = doc.memory_usage(),
            "json parse failed"
        ),
    }
    result
}

/// Writes `value` into `sink` and returns the number of bytes written.
///
/// # Errors
///
/// [`SerializeError::SinkWriteFailure`] if the sink refuses bytes, and
/// [`SerializeError::NonFiniteFloat`] for NaN or infinite floats.
pub fn to_writer<S: Sink + ?Sized>(
    value: VariantRef<'_, '_>,
    sink: &mut S,
    options: JsonWriterOptions,
) -> Result<usize, SerializeError> {
    JsonWriter::new(sink, options).write(value)
}

/// Writes `value` into a new buffer.
///
/// # Errors
///
/// As [`to_writer`].
pub fn to_vec(value: VariantRef<'_, '_>, options: JsonWriterOptions) -> Result<Vec<u8>, SerializeError> {
    let mut out = Vec::new();
    to_writer(value, &mut out, options)?;
    Ok(out)
}

/// Writes `value` into a new string. Raw fragments that are not UTF-8 are
/// replaced lossily.
///
/// # Errors
///
/// As [`to_writer`].
pub fn to_string(value: VariantRef<'_, '_>, options: JsonWriterOptions) -> Result<String, SerializeError> {
    let out = to_vec(value, options)?;
    Ok(String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

/// The exact number of bytes [`to_writer`] would emit.
///
/// # Errors
///
/// [`SerializeError::NonFiniteFloat`] for NaN or infinite floats.
pub fn measure(value: VariantRef<'_, '_>, options: JsonWriterOptions) -> Result<usize, SerializeError> {
    to_writer(value, &mut Counter::default(), options)
}
