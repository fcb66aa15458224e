//! MessagePack decoder writing straight into a [`Document`].
//!
//! Nesting is bounded the same way as in the JSON parser: the marker of a
//! container child is peeked before its slot is allocated.

use alloc::vec::Vec;

use super::marker;
use crate::{
    document::{Document, Node},
    error::{DeserializeError, DeserializeErrorKind as Kind},
    io::Reader,
    options::DeserializeOptions,
    variant::data::{Collection, Data, Raw, Str},
};

pub(crate) struct Decoder<'d, 'src, R> {
    doc: &'d mut Document<'src>,
    reader: R,
    /// Payload of a string or blob read from an unstable reader.
    scratch: Vec<u8>,
    /// Whether bytes read through [`Self::byte`] are appended to `scratch`,
    /// so blobs from unstable readers keep their header.
    recording: bool,
}

impl<'d, 'src, R: Reader<'src>> Decoder<'d, 'src, R> {
    pub(crate) fn new(doc: &'d mut Document<'src>, reader: R) -> Self {
        Self {
            doc,
            reader,
            scratch: Vec::new(),
            recording: false,
        }
    }

    /// Clears the document and decodes one value into its root.
    pub(crate) fn decode(mut self, options: DeserializeOptions) -> Result<(), DeserializeError> {
        self.doc.clear();
        self.decode_root(options)
            .map_err(|kind| DeserializeError::new(kind, self.reader.offset()))
    }

    fn decode_root(&mut self, options: DeserializeOptions) -> Result<(), Kind> {
        if self.reader.peek().is_none() {
            return Err(Kind::EmptyInput);
        }
        self.value(Node::Root, options.nesting_limit)?;
        if !options.allow_trailing_data && self.reader.peek().is_some() {
            return Err(Kind::InvalidInput);
        }
        Ok(())
    }

    fn set(&mut self, node: Node, data: Data<'src>) {
        *self.doc.data_mut(node) = data;
    }

    /// Makes sure another value follows that fits in the remaining nesting
    /// budget.
    fn expect_value(&mut self, nesting: u8) -> Result<(), Kind> {
        match self.reader.peek() {
            None => Err(Kind::IncompleteInput),
            Some(m) if nesting == 0 && marker::is_container(m) => {
                tracing::debug!(offset = self.reader.offset(), "nesting limit exceeded");
                Err(Kind::TooDeep)
            }
            Some(_) => Ok(()),
        }
    }

    fn byte(&mut self) -> Result<u8, Kind> {
        let b = self.reader.next().ok_or(Kind::IncompleteInput)?;
        if self.recording {
            self.scratch.push(b);
        }
        Ok(b)
    }

    fn fixed<const N: usize>(&mut self) -> Result<[u8; N], Kind> {
        let mut buf = [0u8; N];
        for b in &mut buf {
            *b = self.byte()?;
        }
        Ok(buf)
    }

    /// A big-endian length prefix of `width` bytes.
    fn length(&mut self, width: u8) -> Result<usize, Kind> {
        let len = match width {
            1 => u32::from(self.byte()?),
            2 => u32::from(u16::from_be_bytes(self.fixed()?)),
            _ => u32::from_be_bytes(self.fixed()?),
        };
        usize::try_from(len).map_err(|_| Kind::InvalidInput)
    }

    fn value(&mut self, node: Node, nesting: u8) -> Result<(), Kind> {
        self.expect_value(nesting)?;
        let start = self.reader.offset();
        self.recording = false;
        let m = self.byte()?;
        let data = match m {
            0x00..=0x7f => Data::UInt(u64::from(m)),
            0x80..=0x8f => return self.map(node, usize::from(m & 0x0f), nesting - 1),
            0x90..=0x9f => return self.array(node, usize::from(m & 0x0f), nesting - 1),
            0xa0..=0xbf => Data::Str(self.string(usize::from(m & 0x1f))?),
            marker::NIL => Data::Null,
            marker::NEVER_USED => return Err(Kind::InvalidInput),
            marker::FALSE => Data::Bool(false),
            marker::TRUE => Data::Bool(true),
            marker::BIN8..=marker::BIN32 => {
                self.start_recording(m);
                let len = self.length(1u8 << (m - marker::BIN8))?;
                Data::Raw(self.blob(start, len)?)
            }
            marker::EXT8..=marker::EXT32 => {
                self.start_recording(m);
                let len = self.length(1u8 << (m - marker::EXT8))?;
                self.byte()?;
                Data::Raw(self.blob(start, len)?)
            }
            marker::FLOAT32 => Data::Float(f64::from(f32::from_be_bytes(self.fixed()?))),
            marker::FLOAT64 => Data::Float(f64::from_be_bytes(self.fixed()?)),
            marker::UINT8 => Data::UInt(u64::from(self.byte()?)),
            marker::UINT16 => Data::UInt(u64::from(u16::from_be_bytes(self.fixed()?))),
            marker::UINT32 => Data::UInt(u64::from(u32::from_be_bytes(self.fixed()?))),
            marker::UINT64 => Data::UInt(u64::from_be_bytes(self.fixed()?)),
            marker::INT8 => signed(i64::from(i8::from_be_bytes(self.fixed()?))),
            marker::INT16 => signed(i64::from(i16::from_be_bytes(self.fixed()?))),
            marker::INT32 => signed(i64::from(i32::from_be_bytes(self.fixed()?))),
            marker::INT64 => signed(i64::from_be_bytes(self.fixed()?)),
            marker::FIXEXT1..=marker::FIXEXT16 => {
                self.start_recording(m);
                self.byte()?;
                Data::Raw(self.blob(start, 1usize << (m - marker::FIXEXT1))?)
            }
            marker::STR8..=marker::STR32 => {
                let len = self.length(1u8 << (m - marker::STR8))?;
                Data::Str(self.string(len)?)
            }
            marker::ARRAY16 => {
                let len = self.length(2)?;
                return self.array(node, len, nesting - 1);
            }
            marker::ARRAY32 => {
                let len = self.length(4)?;
                return self.array(node, len, nesting - 1);
            }
            marker::MAP16 => {
                let len = self.length(2)?;
                return self.map(node, len, nesting - 1);
            }
            marker::MAP32 => {
                let len = self.length(4)?;
                return self.map(node, len, nesting - 1);
            }
            0xe0..=0xff => Data::Int(i64::from(i8::from_be_bytes([m]))),
        };
        self.set(node, data);
        Ok(())
    }

    /// Keeps the header of a blob when the reader cannot hand it back later.
    fn start_recording(&mut self, m: u8) {
        if !self.reader.is_stable() {
            self.scratch.clear();
            self.scratch.push(m);
            self.recording = true;
        }
    }

    /// Reads `len` payload bytes of a blob whose marker sits at `start`. The
    /// stored fragment is the complete encoding, header included.
    fn blob(&mut self, start: usize, len: usize) -> Result<Raw<'src>, Kind> {
        if self.reader.is_stable() {
            if self.reader.skip(len) < len {
                return Err(Kind::IncompleteInput);
            }
            let bytes = self.reader.since(start).ok_or(Kind::InvalidInput)?;
            return Ok(Raw::Linked(bytes));
        }
        for _ in 0..len {
            self.byte()?;
        }
        self.recording = false;
        Ok(Raw::Owned(self.doc.arena.allocate_bytes(&self.scratch)?))
    }

    /// Reads a UTF-8 payload of `len` bytes.
    fn string(&mut self, len: usize) -> Result<Str<'src>, Kind> {
        if self.reader.is_stable() {
            let start = self.reader.offset();
            if self.reader.skip(len) < len {
                return Err(Kind::IncompleteInput);
            }
            let bytes = self.reader.since(start).ok_or(Kind::InvalidInput)?;
            let text = core::str::from_utf8(bytes).map_err(|_| Kind::InvalidInput)?;
            return Ok(Str::Linked(text));
        }
        self.scratch.clear();
        for _ in 0..len {
            let b = self.reader.next().ok_or(Kind::IncompleteInput)?;
            self.scratch.push(b);
        }
        let text = core::str::from_utf8(&self.scratch).map_err(|_| Kind::InvalidInput)?;
        Ok(Str::Owned(self.doc.arena.allocate_str(text)?))
    }

    fn array(&mut self, node: Node, len: usize, nesting: u8) -> Result<(), Kind> {
        self.set(node, Data::Array(Collection::default()));
        for _ in 0..len {
            self.expect_value(nesting)?;
            let slot = self.doc.append(node, None).ok_or(Kind::NoMemory)?;
            self.value(Node::Slot(slot), nesting)?;
        }
        Ok(())
    }

    fn map(&mut self, node: Node, len: usize, nesting: u8) -> Result<(), Kind> {
        self.set(node, Data::Object(Collection::default()));
        for _ in 0..len {
            let key_len = match self.byte()? {
                m @ 0xa0..=0xbf => usize::from(m & 0x1f),
                marker::STR8 => self.length(1)?,
                marker::STR16 => self.length(2)?,
                marker::STR32 => self.length(4)?,
                _ => return Err(Kind::InvalidInput),
            };
            let key = self.string(key_len)?;
            self.expect_value(nesting)?;

            let existing = {
                let text = self.doc.arena.resolve(&key);
                self.doc.find_member(node, text)
            };
            let slot = match existing {
                Some(slot) => {
                    self.set(Node::Slot(slot), Data::Null);
                    slot
                }
                None => self.doc.append(node, Some(key)).ok_or(Kind::NoMemory)?,
            };
            self.value(Node::Slot(slot), nesting)?;
        }
        Ok(())
    }
}

/// Non-negative values are stored unsigned, like the JSON parser does.
fn signed(n: i64) -> Data<'static> {
    u64::try_from(n).map_or(Data::Int(n), Data::UInt)
}
