use super::JsonWriterOptions;
use crate::{
    error::SerializeError,
    io::{Output, Sink},
    number,
    variant::{VariantRef, data::Data},
};

const SPACES: &[u8; 32] = b"                                ";

pub(crate) struct JsonWriter<'s, S: Sink + ?Sized> {
    out: Output<'s, S>,
    options: JsonWriterOptions,
}

impl<'s, S: Sink + ?Sized> JsonWriter<'s, S> {
    pub(crate) fn new(sink: &'s mut S, options: JsonWriterOptions) -> Self {
        Self {
            out: Output::new(sink),
            options,
        }
    }

    /// Writes `value` and returns the number of bytes emitted.
    pub(crate) fn write(mut self, value: VariantRef<'_, '_>) -> Result<usize, SerializeError> {
        self.value(value, 0)?;
        Ok(self.out.written())
    }

    fn value(&mut self, value: VariantRef<'_, '_>, depth: usize) -> Result<(), SerializeError> {
        let Some(data) = value.data() else {
            return self.out.bytes(b"null");
        };
        match *data {
            Data::Null => self.out.bytes(b"null"),
            Data::Bool(true) => self.out.bytes(b"true"),
            Data::Bool(false) => self.out.bytes(b"false"),
            Data::UInt(n) => self.out.fmt(format_args!("{n}")),
            Data::Int(n) => self.out.fmt(format_args!("{n}")),
            Data::Float(f) => self.float(f),
            Data::Str(_) => self.string(value.as_str().unwrap_or_default()),
            Data::Raw(_) => self.out.bytes(value.as_raw().unwrap_or_default()),
            Data::Array(_) => self.array(value, depth),
            Data::Object(_) => self.object(value, depth),
        }
    }

    fn float(&mut self, f: f64) -> Result<(), SerializeError> {
        if !f.is_finite() {
            return Err(SerializeError::NonFiniteFloat);
        }
        number::write_float(&mut self.out, f, self.options.float_precision).map_err(|_| {
            SerializeError::SinkWriteFailure {
                written: self.out.written(),
            }
        })
    }

    /// Line break plus indentation for `depth`, in pretty mode only.
    fn newline(&mut self, depth: usize) -> Result<(), SerializeError> {
        let Some(indent) = self.options.indent else {
            return Ok(());
        };
        self.out.byte(b'\n')?;
        let mut remaining = depth * usize::from(indent);
        while remaining > 0 {
            let n = remaining.min(SPACES.len());
            self.out.bytes(&SPACES[..n])?;
            remaining -= n;
        }
        Ok(())
    }

    fn array(&mut self, value: VariantRef<'_, '_>, depth: usize) -> Result<(), SerializeError> {
        self.out.byte(b'[')?;
        for (i, (_, item)) in value.iter().enumerate() {
            if i > 0 {
                self.out.byte(b',')?;
            }
            self.newline(depth + 1)?;
            self.value(item, depth + 1)?;
        }
        if !value.is_empty() {
            self.newline(depth)?;
        }
        self.out.byte(b']')
    }

    fn object(&mut self, value: VariantRef<'_, '_>, depth: usize) -> Result<(), SerializeError> {
        self.out.byte(b'{')?;
        for (i, (key, item)) in value.iter().enumerate() {
            if i > 0 {
                self.out.byte(b',')?;
            }
            self.newline(depth + 1)?;
            self.string(key.unwrap_or_default())?;
            self.out.byte(b':')?;
            if self.options.indent.is_some() {
                self.out.byte(b' ')?;
            }
            self.value(item, depth + 1)?;
        }
        if !value.is_empty() {
            self.newline(depth)?;
        }
        self.out.byte(b'}')
    }

    /// Writes `s` quoted. Control characters and the two JavaScript line
    /// terminators U+2028/U+2029 are escaped; unescaped runs are written in
    /// one piece.
    fn string(&mut self, s: &str) -> Result<(), SerializeError> {
        self.out.byte(b'"')?;
        let mut run = 0;
        for (i, c) in s.char_indices() {
            let short: &[u8] = match c {
                '"' => b"\\\"",
                '\\' => b"\\\\",
                '\n' => b"\\n",
                '\r' => b"\\r",
                '\t' => b"\\t",
                '\u{8}' => b"\\b",
                '\u{c}' => b"\\f",
                c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => b"",
                _ => continue,
            };
            self.out.bytes(&s.as_bytes()[run..i])?;
            if short.is_empty() {
                self.out.fmt(format_args!("\\u{:04X}", u32::from(c)))?;
            } else {
                self.out.bytes(short)?;
            }
            run = i + c.len_utf8();
        }
        self.out.bytes(&s.as_bytes()[run..])?;
        self.out.byte(b'"')
    }
}
