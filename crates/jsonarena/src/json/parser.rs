//! Recursive-descent JSON parser writing straight into a [`Document`].
//!
//! The remaining nesting budget is threaded through every recursive call.
//! Before the slot for a container child is allocated, the parser peeks at
//! the child's first byte, so a too-deep container is rejected before any
//! memory is spent on it.

use alloc::vec::Vec;

use super::{
    escape_buffer::{
        InvalidHexDigit, UnicodeEscapeBuffer, combine_surrogates, is_high_surrogate, is_low_surrogate,
    },
    literal_buffer::{ExpectedLiteralBuffer, Literal, Step},
};
use crate::{
    document::{Document, Node},
    error::{DeserializeError, DeserializeErrorKind as Kind},
    io::Reader,
    number::{self, Malformed},
    options::DeserializeOptions,
    variant::data::{Collection, Data, Str},
};

pub(crate) struct Parser<'d, 'src, R> {
    doc: &'d mut Document<'src>,
    reader: R,
    /// Unescaped bytes of the string being parsed, or the lexeme of the
    /// number being parsed.
    scratch: Vec<u8>,
}

impl<'d, 'src, R: Reader<'src>> Parser<'d, 'src, R> {
    pub(crate) fn new(doc: &'d mut Document<'src>, reader: R) -> Self {
        Self {
            doc,
            reader,
            scratch: Vec::new(),
        }
    }

    /// Clears the document and parses one value into its root.
    pub(crate) fn parse(mut self, options: DeserializeOptions) -> Result<(), DeserializeError> {
        self.doc.clear();
        self.parse_root(options)
            .map_err(|kind| DeserializeError::new(kind, self.reader.offset()))
    }

    fn parse_root(&mut self, options: DeserializeOptions) -> Result<(), Kind> {
        self.skip_whitespace();
        if self.reader.peek().is_none() {
            return Err(Kind::EmptyInput);
        }
        self.parse_value(Node::Root, options.nesting_limit)?;
        if !options.allow_trailing_data {
            self.skip_whitespace();
            if self.reader.peek().is_some() {
                return Err(Kind::InvalidInput);
            }
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.reader.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.reader.next();
        }
    }

    fn set(&mut self, node: Node, data: Data<'src>) {
        *self.doc.data_mut(node) = data;
    }

    fn too_deep(&self) -> Kind {
        tracing::debug!(offset = self.reader.offset(), "nesting limit exceeded");
        Kind::TooDeep
    }

    /// Skips whitespace and makes sure a value follows that fits in the
    /// remaining nesting budget.
    fn expect_value(&mut self, nesting: u8) -> Result<(), Kind> {
        self.skip_whitespace();
        match self.reader.peek() {
            None => Err(Kind::IncompleteInput),
            Some(b'[' | b'{') if nesting == 0 => Err(self.too_deep()),
            Some(_) => Ok(()),
        }
    }

    fn parse_value(&mut self, node: Node, nesting: u8) -> Result<(), Kind> {
        self.expect_value(nesting)?;
        match self.reader.peek() {
            Some(b'{') => {
                self.reader.next();
                self.parse_object(node, nesting - 1)
            }
            Some(b'[') => {
                self.reader.next();
                self.parse_array(node, nesting - 1)
            }
            Some(b'"') => {
                self.reader.next();
                let s = self.parse_string()?;
                self.set(node, Data::Str(s));
                Ok(())
            }
            Some(b'-' | b'0'..=b'9') => self.parse_number(node),
            Some(b't' | b'f' | b'n') => self.parse_literal(node),
            _ => Err(Kind::InvalidInput),
        }
    }

    fn parse_array(&mut self, node: Node, nesting: u8) -> Result<(), Kind> {
        self.set(node, Data::Array(Collection::default()));
        self.skip_whitespace();
        if self.reader.peek() == Some(b']') {
            self.reader.next();
            return Ok(());
        }
        loop {
            self.expect_value(nesting)?;
            let slot = self.doc.append(node, None).ok_or(Kind::NoMemory)?;
            self.parse_value(Node::Slot(slot), nesting)?;
            self.skip_whitespace();
            match self.reader.next() {
                Some(b',') => {}
                Some(b']') => return Ok(()),
                Some(_) => return Err(Kind::InvalidInput),
                None => return Err(Kind::IncompleteInput),
            }
        }
    }

    fn parse_object(&mut self, node: Node, nesting: u8) -> Result<(), Kind> {
        self.set(node, Data::Object(Collection::default()));
        self.skip_whitespace();
        if self.reader.peek() == Some(b'}') {
            self.reader.next();
            return Ok(());
        }
        loop {
            self.skip_whitespace();
            match self.reader.next() {
                Some(b'"') => {}
                Some(_) => return Err(Kind::InvalidInput),
                None => return Err(Kind::IncompleteInput),
            }
            let key = self.parse_string()?;
            self.skip_whitespace();
            match self.reader.next() {
                Some(b':') => {}
                Some(_) => return Err(Kind::InvalidInput),
                None => return Err(Kind::IncompleteInput),
            }
            self.expect_value(nesting)?;

            let existing = {
                let text = self.doc.arena.resolve(&key);
                self.doc.find_member(node, text)
            };
            let slot = match existing {
                Some(slot) => {
                    // Last write wins, in the position of the first occurrence.
                    self.set(Node::Slot(slot), Data::Null);
                    slot
                }
                None => self.doc.append(node, Some(key)).ok_or(Kind::NoMemory)?,
            };
            self.parse_value(Node::Slot(slot), nesting)?;

            self.skip_whitespace();
            match self.reader.next() {
                Some(b',') => {}
                Some(b'}') => return Ok(()),
                Some(_) => return Err(Kind::InvalidInput),
                None => return Err(Kind::IncompleteInput),
            }
        }
    }

    /// Parses the rest of a string whose opening quote was consumed.
    ///
    /// Escape-free strings read from a stable reader are linked; anything
    /// else is unescaped into `scratch` and copied into the arena.
    fn parse_string(&mut self) -> Result<Str<'src>, Kind> {
        let start = self.reader.offset();
        let mut owned = !self.reader.is_stable();
        self.scratch.clear();
        loop {
            match self.reader.peek() {
                None => return Err(Kind::IncompleteInput),
                Some(b'"') => {
                    let s = if owned {
                        let text = core::str::from_utf8(&self.scratch).map_err(|_| Kind::InvalidInput)?;
                        Str::Owned(self.doc.arena.allocate_str(text)?)
                    } else {
                        let bytes = self.reader.since(start).ok_or(Kind::InvalidInput)?;
                        Str::Linked(core::str::from_utf8(bytes).map_err(|_| Kind::InvalidInput)?)
                    };
                    self.reader.next();
                    return Ok(s);
                }
                Some(b'\\') => {
                    if !owned {
                        let bytes = self.reader.since(start).unwrap_or_default();
                        self.scratch.extend_from_slice(bytes);
                        owned = true;
                    }
                    self.reader.next();
                    self.parse_escape()?;
                }
                Some(0x00..=0x1f) => return Err(Kind::InvalidInput),
                Some(b) => {
                    self.reader.next();
                    if owned {
                        self.scratch.push(b);
                    }
                }
            }
        }
    }

    /// Decodes one escape sequence (after the backslash) into `scratch`.
    fn parse_escape(&mut self) -> Result<(), Kind> {
        let c = match self.reader.next().ok_or(Kind::IncompleteInput)? {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => self.parse_unicode_escape()?,
            _ => return Err(Kind::InvalidInput),
        };
        let mut utf8 = [0u8; 4];
        self.scratch.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
        Ok(())
    }

    fn parse_unicode_escape(&mut self) -> Result<char, Kind> {
        let unit = self.parse_code_unit()?;
        if is_low_surrogate(unit) {
            return Err(Kind::InvalidInput);
        }
        if !is_high_surrogate(unit) {
            return char::from_u32(u32::from(unit)).ok_or(Kind::InvalidInput);
        }
        for expected in [b'\\', b'u'] {
            match self.reader.next() {
                Some(b) if b == expected => {}
                Some(_) => return Err(Kind::InvalidInput),
                None => return Err(Kind::IncompleteInput),
            }
        }
        let low = self.parse_code_unit()?;
        combine_surrogates(unit, low).ok_or(Kind::InvalidInput)
    }

    fn parse_code_unit(&mut self) -> Result<u16, Kind> {
        let mut buf = UnicodeEscapeBuffer::new();
        loop {
            let b = self.reader.next().ok_or(Kind::IncompleteInput)?;
            let fed = buf.feed(b).map_err(|InvalidHexDigit(byte)| {
                tracing::trace!(byte, offset = self.reader.offset(), "invalid hex digit in unicode escape");
                Kind::InvalidInput
            })?;
            if let Some(unit) = fed {
                return Ok(unit);
            }
        }
    }

    fn parse_number(&mut self, node: Node) -> Result<(), Kind> {
        self.scratch.clear();
        while let Some(b) = self.reader.peek() {
            if !matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') {
                break;
            }
            self.scratch.push(b);
            self.reader.next();
        }
        let at_end = self.reader.peek().is_none();
        let number = match number::parse(&self.scratch) {
            Ok(number) => number,
            Err(Malformed::Truncated) if at_end => return Err(Kind::IncompleteInput),
            Err(_) => return Err(Kind::InvalidInput),
        };
        self.set(node, number.into());
        Ok(())
    }

    fn parse_literal(&mut self, node: Node) -> Result<(), Kind> {
        let first = self.reader.next().ok_or(Kind::IncompleteInput)?;
        let mut literal = ExpectedLiteralBuffer::new(first);
        loop {
            let b = self.reader.next().ok_or(Kind::IncompleteInput)?;
            match literal.step(b) {
                Step::NeedMore => {}
                Step::Done(Literal::Null) => break self.set(node, Data::Null),
                Step::Done(Literal::True) => break self.set(node, Data::Bool(true)),
                Step::Done(Literal::False) => break self.set(node, Data::Bool(false)),
                Step::Reject => return Err(Kind::InvalidInput),
            }
        }
        Ok(())
    }
}
