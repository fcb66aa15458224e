//! Input sources and output sinks consumed by the codecs.
//!
//! A [`Reader`] exposes one byte of lookahead. Readers over memory that
//! outlives the document ("stable" readers) can additionally hand back the
//! bytes consumed since an earlier offset, which lets the parsers link
//! escape-free strings instead of copying them into the arena.
//!
//! A [`Sink`] accepts byte runs and reports how many bytes it took; the
//! writers treat a short write as [`SerializeError::SinkWriteFailure`].

use alloc::vec::Vec;
use core::fmt;

use crate::error::SerializeError;

/// Sequential byte access with single-byte lookahead.
pub trait Reader<'src> {
    /// The next byte, without consuming it.
    fn peek(&mut self) -> Option<u8>;

    /// Consumes and returns the next byte.
    fn next(&mut self) -> Option<u8>;

    /// Number of bytes consumed so far.
    fn offset(&self) -> usize;

    /// Whether bytes, once consumed, stay addressable for `'src`.
    fn is_stable(&self) -> bool {
        false
    }

    /// The bytes consumed from `start` up to the current offset, if the
    /// reader is stable.
    fn since(&self, start: usize) -> Option<&'src [u8]> {
        let _ = start;
        None
    }

    /// Consumes up to `len` bytes, returning how many were consumed.
    fn skip(&mut self, len: usize) -> usize {
        let mut skipped = 0;
        while skipped < len && self.next().is_some() {
            skipped += 1;
        }
        skipped
    }
}

impl<'src, R: Reader<'src> + ?Sized> Reader<'src> for &mut R {
    fn peek(&mut self) -> Option<u8> {
        (**self).peek()
    }

    fn next(&mut self) -> Option<u8> {
        (**self).next()
    }

    fn offset(&self) -> usize {
        (**self).offset()
    }

    fn is_stable(&self) -> bool {
        (**self).is_stable()
    }

    fn since(&self, start: usize) -> Option<&'src [u8]> {
        (**self).since(start)
    }

    fn skip(&mut self, len: usize) -> usize {
        (**self).skip(len)
    }
}

/// A stable reader over a byte slice. Strings parsed through it may be
/// linked into the document without copying.
#[derive(Debug, Clone)]
pub struct SliceReader<'src> {
    input: &'src [u8],
    pos: usize,
}

impl<'src> SliceReader<'src> {
    /// Reads `input` from the start.
    #[must_use]
    pub fn new(input: &'src [u8]) -> Self {
        Self { input, pos: 0 }
    }
}

impl<'src> Reader<'src> for SliceReader<'src> {
    fn peek(&mut self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<u8> {
        let b = self.input.get(self.pos).copied()?;
        self.pos += 1;
        Some(b)
    }

    fn offset(&self) -> usize {
        self.pos
    }

    fn is_stable(&self) -> bool {
        true
    }

    fn since(&self, start: usize) -> Option<&'src [u8]> {
        self.input.get(start..self.pos)
    }

    fn skip(&mut self, len: usize) -> usize {
        let skipped = len.min(self.input.len() - self.pos);
        self.pos += skipped;
        skipped
    }
}

/// A reader over a byte slice that never links: every string is copied
/// into the arena, so the document does not borrow the input.
#[derive(Debug, Clone)]
pub struct CopyingReader<'b> {
    inner: SliceReader<'b>,
}

impl<'b> CopyingReader<'b> {
    /// Reads `input` from the start.
    #[must_use]
    pub fn new(input: &'b [u8]) -> Self {
        Self {
            inner: SliceReader::new(input),
        }
    }
}

impl<'src> Reader<'src> for CopyingReader<'_> {
    fn peek(&mut self) -> Option<u8> {
        self.inner.peek()
    }

    fn next(&mut self) -> Option<u8> {
        self.inner.next()
    }

    fn offset(&self) -> usize {
        self.inner.offset()
    }

    fn skip(&mut self, len: usize) -> usize {
        self.inner.skip(len)
    }
}

/// A reader over any byte iterator.
#[derive(Debug, Clone)]
pub struct IterReader<I: Iterator<Item = u8>> {
    iter: I,
    peeked: Option<u8>,
    pos: usize,
}

impl<I: Iterator<Item = u8>> IterReader<I> {
    /// Wraps `iter`.
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            peeked: None,
            pos: 0,
        }
    }
}

impl<I: Iterator<Item = u8>> Reader<'_> for IterReader<I> {
    fn peek(&mut self) -> Option<u8> {
        if self.peeked.is_none() {
            self.peeked = self.iter.next();
        }
        self.peeked
    }

    fn next(&mut self) -> Option<u8> {
        let b = self.peeked.take().or_else(|| self.iter.next())?;
        self.pos += 1;
        Some(b)
    }

    fn offset(&self) -> usize {
        self.pos
    }
}

/// A reader over [`std::io::Read`]. An I/O error ends the input, which the
/// parsers report as incomplete.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoReader<R> {
    inner: R,
    peeked: Option<u8>,
    pos: usize,
}

#[cfg(feature = "std")]
impl<R: std::io::Read> IoReader<R> {
    /// Wraps `inner`. Wrap it in a [`std::io::BufReader`] first when it is
    /// unbuffered: bytes are pulled one at a time.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            peeked: None,
            pos: 0,
        }
    }

    fn fill(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return None,
                Ok(_) => return Some(byte[0]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::debug!(error = %e, "reader failed");
                    return None;
                }
            }
        }
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read> Reader<'_> for IoReader<R> {
    fn peek(&mut self) -> Option<u8> {
        if self.peeked.is_none() {
            self.peeked = self.fill();
        }
        self.peeked
    }

    fn next(&mut self) -> Option<u8> {
        let b = match self.peeked.take() {
            Some(b) => b,
            None => self.fill()?,
        };
        self.pos += 1;
        Some(b)
    }

    fn offset(&self) -> usize {
        self.pos
    }
}

/// Destination of serialized bytes.
pub trait Sink {
    /// Writes as much of `bytes` as possible and returns how much was taken.
    fn write(&mut self, bytes: &[u8]) -> usize;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write(&mut self, bytes: &[u8]) -> usize {
        (**self).write(bytes)
    }
}

impl Sink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) -> usize {
        if self.try_reserve(bytes.len()).is_err() {
            return 0;
        }
        self.extend_from_slice(bytes);
        bytes.len()
    }
}

/// A sink over a caller-provided buffer. Writes past its end are truncated
/// and reported as short.
#[derive(Debug)]
pub struct SliceWriter<'b> {
    buf: &'b mut [u8],
    len: usize,
}

impl<'b> SliceWriter<'b> {
    /// Writes into `buf` from the start.
    pub fn new(buf: &'b mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    /// The bytes written so far.
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl Sink for SliceWriter<'_> {
    fn write(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.buf.len() - self.len);
        self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
        n
    }
}

/// A sink that only counts. Used to measure output ahead of writing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Counter(pub usize);

impl Sink for Counter {
    fn write(&mut self, bytes: &[u8]) -> usize {
        self.0 += bytes.len();
        bytes.len()
    }
}

/// A sink over [`std::io::Write`].
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoWriter<W>(pub W);

#[cfg(feature = "std")]
impl<W: std::io::Write> Sink for IoWriter<W> {
    fn write(&mut self, bytes: &[u8]) -> usize {
        match self.0.write_all(bytes) {
            Ok(()) => bytes.len(),
            Err(e) => {
                tracing::debug!(error = %e, "sink failed");
                0
            }
        }
    }
}

/// Writes into a sink, tracking the total and turning short writes into
/// errors.
pub(crate) struct Output<'s, S: Sink + ?Sized> {
    sink: &'s mut S,
    written: usize,
}

impl<'s, S: Sink + ?Sized> Output<'s, S> {
    pub(crate) fn new(sink: &'s mut S) -> Self {
        Self {
            sink,
            written: 0,
        }
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }

    pub(crate) fn bytes(&mut self, bytes: &[u8]) -> Result<(), SerializeError> {
        if bytes.is_empty() {
            return Ok(());
        }
        let n = self.sink.write(bytes);
        self.written += n;
        if n == bytes.len() {
            Ok(())
        } else {
            Err(SerializeError::SinkWriteFailure {
                written: self.written,
            })
        }
    }

    pub(crate) fn byte(&mut self, b: u8) -> Result<(), SerializeError> {
        self.bytes(&[b])
    }

    /// Runs a `core::fmt` formatter against the sink.
    pub(crate) fn fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), SerializeError> {
        match fmt::Write::write_fmt(self, args) {
            Ok(()) => Ok(()),
            Err(_) => Err(SerializeError::SinkWriteFailure {
                written: self.written,
            }),
        }
    }
}

impl<S: Sink + ?Sized> fmt::Write for Output<'_, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.bytes(s.as_bytes()).map_err(|_| fmt::Error)
    }
}
