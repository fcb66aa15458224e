use thiserror::Error;

/// The arena could not satisfy an allocation.
///
/// Returned by arena operations and surfaced by the codecs as
/// [`DeserializeErrorKind::NoMemory`]. The arena is left consistent: nothing
/// from the failed allocation is reachable from the document root.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("arena exhausted")]
pub struct NoMemory;

/// An error returned by the text and binary parsers.
///
/// The document passed to the parser keeps whatever was built before the
/// error; it is internally consistent but should not be trusted as a
/// complete value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at byte {offset}")]
pub struct DeserializeError {
    pub(crate) kind: DeserializeErrorKind,
    pub(crate) offset: usize,
}

impl DeserializeError {
    pub(crate) fn new(kind: DeserializeErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// What went wrong.
    #[must_use]
    pub fn kind(&self) -> DeserializeErrorKind {
        self.kind
    }

    /// Byte offset in the input at which parsing stopped.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Failure classes shared by both parsers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeserializeErrorKind {
    /// The input held no token at all.
    #[error("empty input")]
    EmptyInput,
    /// The input is a well-formed prefix that ended mid-token or mid-container.
    #[error("incomplete input")]
    IncompleteInput,
    /// A malformed token.
    #[error("invalid input")]
    InvalidInput,
    /// The arena is exhausted.
    #[error("not enough memory")]
    NoMemory,
    /// The input nests containers deeper than the configured limit.
    #[error("nesting limit exceeded")]
    TooDeep,
}

impl From<NoMemory> for DeserializeErrorKind {
    fn from(_: NoMemory) -> Self {
        DeserializeErrorKind::NoMemory
    }
}

/// An error returned by the text and binary writers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializeError {
    /// The sink accepted fewer bytes than it was offered.
    #[error("sink write failure after {written} bytes")]
    SinkWriteFailure {
        /// Bytes successfully emitted before the failure.
        written: usize,
    },
    /// NaN and infinities have no JSON representation.
    #[error("non-finite float cannot be written as JSON")]
    NonFiniteFloat,
}
