use super::{FloatWidth, MsgPackWriterOptions, marker};
use crate::{
    error::SerializeError,
    io::{Output, Sink},
    variant::{VariantRef, data::Data},
};

pub(crate) struct MsgPackWriter<'s, S: Sink + ?Sized> {
    out: Output<'s, S>,
    options: MsgPackWriterOptions,
}

impl<'s, S: Sink + ?Sized> MsgPackWriter<'s, S> {
    pub(crate) fn new(sink: &'s mut S, options: MsgPackWriterOptions) -> Self {
        Self {
            out: Output::new(sink),
            options,
        }
    }

    /// Writes `value` and returns the number of bytes emitted.
    pub(crate) fn write(mut self, value: VariantRef<'_, '_>) -> Result<usize, SerializeError> {
        self.value(value)?;
        Ok(self.out.written())
    }

    fn value(&mut self, value: VariantRef<'_, '_>) -> Result<(), SerializeError> {
        let Some(data) = value.data() else {
            return self.out.byte(marker::NIL);
        };
        match *data {
            Data::Null => self.out.byte(marker::NIL),
            Data::Bool(false) => self.out.byte(marker::FALSE),
            Data::Bool(true) => self.out.byte(marker::TRUE),
            Data::UInt(n) => self.unsigned(n),
            Data::Int(n) => match u64::try_from(n) {
                Ok(n) => self.unsigned(n),
                Err(_) => self.negative(n),
            },
            Data::Float(f) => self.float(f),
            Data::Str(_) => self.string(value.as_str().unwrap_or_default()),
            Data::Raw(_) => self.out.bytes(value.as_raw().unwrap_or_default()),
            Data::Array(_) => {
                self.header(value.len(), marker::FIXARRAY, 16, marker::ARRAY16, marker::ARRAY32)?;
                for (_, item) in value.iter() {
                    self.value(item)?;
                }
                Ok(())
            }
            Data::Object(_) => {
                self.header(value.len(), marker::FIXMAP, 16, marker::MAP16, marker::MAP32)?;
                for (key, item) in value.iter() {
                    self.string(key.unwrap_or_default())?;
                    self.value(item)?;
                }
                Ok(())
            }
        }
    }

    /// The narrowest encoding of a non-negative integer.
    fn unsigned(&mut self, n: u64) -> Result<(), SerializeError> {
        if let Ok(small) = u8::try_from(n) {
            if small < 0x80 {
                self.out.byte(small)
            } else {
                self.out.bytes(&[marker::UINT8, small])
            }
        } else if let Ok(n) = u16::try_from(n) {
            self.out.byte(marker::UINT16)?;
            self.out.bytes(&n.to_be_bytes())
        } else if let Ok(n) = u32::try_from(n) {
            self.out.byte(marker::UINT32)?;
            self.out.bytes(&n.to_be_bytes())
        } else {
            self.out.byte(marker::UINT64)?;
            self.out.bytes(&n.to_be_bytes())
        }
    }

    /// The narrowest encoding of a negative integer.
    fn negative(&mut self, n: i64) -> Result<(), SerializeError> {
        if let Ok(small) = i8::try_from(n) {
            if small >= -32 {
                self.out.bytes(&small.to_be_bytes())
            } else {
                self.out.byte(marker::INT8)?;
                self.out.bytes(&small.to_be_bytes())
            }
        } else if let Ok(n) = i16::try_from(n) {
            self.out.byte(marker::INT16)?;
            self.out.bytes(&n.to_be_bytes())
        } else if let Ok(n) = i32::try_from(n) {
            self.out.byte(marker::INT32)?;
            self.out.bytes(&n.to_be_bytes())
        } else {
            self.out.byte(marker::INT64)?;
            self.out.bytes(&n.to_be_bytes())
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    fn float(&mut self, f: f64) -> Result<(), SerializeError> {
        let narrow = f as f32;
        if self.options.float_width == FloatWidth::Narrowest && (f64::from(narrow) == f || f.is_nan()) {
            self.out.byte(marker::FLOAT32)?;
            self.out.bytes(&narrow.to_be_bytes())
        } else {
            self.out.byte(marker::FLOAT64)?;
            self.out.bytes(&f.to_be_bytes())
        }
    }

    fn string(&mut self, s: &str) -> Result<(), SerializeError> {
        let len = s.len();
        if let Ok(short) = u8::try_from(len) {
            if short < 32 {
                self.out.byte(marker::FIXSTR | short)?;
            } else {
                self.out.bytes(&[marker::STR8, short])?;
            }
        } else {
            self.header(len, 0, 0, marker::STR16, marker::STR32)?;
        }
        self.out.bytes(s.as_bytes())
    }

    /// Writes a length header: `fix | len` below `fix_limit`, else the 16- or
    /// 32-bit form.
    fn header(&mut self, len: usize, fix: u8, fix_limit: usize, m16: u8, m32: u8) -> Result<(), SerializeError> {
        if len < fix_limit {
            let low = u8::try_from(len).unwrap_or_default();
            self.out.byte(fix | low)
        } else if let Ok(len) = u16::try_from(len) {
            self.out.byte(m16)?;
            self.out.bytes(&len.to_be_bytes())
        } else if let Ok(len) = u32::try_from(len) {
            self.out.byte(m32)?;
            self.out.bytes(&len.to_be_bytes())
        } else {
            Err(SerializeError::SinkWriteFailure {
                written: self.out.written(),
            })
        }
    }
}
