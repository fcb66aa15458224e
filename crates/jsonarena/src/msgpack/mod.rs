//! MessagePack binary codec.
//!
//! Integers are written in the narrowest encoding that holds them; strings,
//! arrays and maps use the narrowest length prefix. `bin` and `ext` values
//! are not interpreted: they decode to raw fragments holding the complete
//! encoding and are re-emitted byte for byte.
//!
//! ```rust
//! use jsonarena::{Document, msgpack::{self, MsgPackWriterOptions}};
//!
//! let mut doc = Document::with_capacity(256);
//! assert!(doc.root_mut().get_or_create("n").set_uint(300));
//!
//! let bytes = msgpack::to_vec(doc.root(), MsgPackWriterOptions::default()).unwrap();
//! assert_eq!(bytes, [0x81, 0xa1, b'n', 0xcd, 0x01, 0x2c]);
//! ```

mod decoder;
mod encoder;
mod marker;

use alloc::vec::Vec;

use decoder::Decoder;
use encoder::MsgPackWriter;

use crate::{
    document::Document,
    error::{DeserializeError, SerializeError},
    io::{Counter, Reader, Sink, SliceReader},
    options::DeserializeOptions,
    variant::VariantRef,
};

/// Width used for float values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FloatWidth {
    /// Always `float64`.
    #[default]
    Double,
    /// `float32` when the value converts without loss, else `float64`.
    Narrowest,
}

/// Output options for the MessagePack writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MsgPackWriterOptions {
    /// # Default
    ///
    /// [`FloatWidth::Double`]
    pub float_width: FloatWidth,
}

/// Decodes `input` into `doc`, replacing its contents. Strings and blobs are
/// linked to `input` rather than copied.
///
/// # Errors
///
/// See [`DeserializeErrorKind`](crate::DeserializeErrorKind).
pub fn from_slice<'src>(doc: &mut Document<'src>, input: &'src [u8]) -> Result<(), DeserializeError> {
    from_reader(doc, SliceReader::new(input), DeserializeOptions::default())
}

/// Decodes one value from `reader` into `doc`, replacing its contents.
///
/// # Errors
///
/// See [`DeserializeErrorKind`](crate::DeserializeErrorKind).
pub fn from_reader<'src, R: Reader<'src>>(
    doc: &mut Document<'src>,
    reader: R,
    options: DeserializeOptions,
) -> Result<(), DeserializeError> {
    tracing::debug!(nesting_limit = options.nesting_limit, "msgpack decode started");
    let result = Decoder::new(doc, reader).decode(options);
    match &result {
        Ok(()) => tracing::debug!(memory_usage = doc.memory_usage(), "msgpack decode finished"),
        Err(e) => tracing::debug!(
            error = %e,
            memory_usage = doc.memory_usage(),
            "msgpack decode failed"
        ),
    }
    result
}

/// Writes `value` into `sink` and returns the number of bytes written.
///
/// # Errors
///
/// [`SerializeError::SinkWriteFailure`] if the sink refuses bytes.
pub fn to_writer<S: Sink + ?Sized>(
    value: VariantRef<'_, '_>,
    sink: &mut S,
    options: MsgPackWriterOptions,
) -> Result<usize, SerializeError> {
    MsgPackWriter::new(sink, options).write(value)
}

/// Writes `value` into a new buffer.
///
/// # Errors
///
/// As [`to_writer`].
pub fn to_vec(value: VariantRef<'_, '_>, options: MsgPackWriterOptions) -> Result<Vec<u8>, SerializeError> {
    let mut out = Vec::new();
    to_writer(value, &mut out, options)?;
    Ok(out)
}

/// The exact number of bytes [`to_writer`] would emit.
///
/// # Errors
///
/// Only for values too large for the format.
pub fn measure(value: VariantRef<'_, '_>, options: MsgPackWriterOptions) -> Result<usize, SerializeError> {
    to_writer(value, &mut Counter::default(), options)
}
