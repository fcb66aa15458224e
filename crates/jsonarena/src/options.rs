/// Configuration shared by the text and binary parsers.
///
/// # Examples
///
/// ```rust
/// use jsonarena::{DeserializeOptions, Document, SliceReader, json};
///
/// let options = DeserializeOptions {
///     allow_trailing_data: true,
///     ..Default::default()
/// };
/// let mut doc = Document::with_capacity(256);
/// json::from_reader(&mut doc, SliceReader::new(b"[1] [2]"), options).unwrap();
/// assert_eq!(doc.root().len(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeserializeOptions {
    /// Maximum container depth. The root container counts as one level; a
    /// limit of 0 accepts scalars only.
    ///
    /// # Default
    ///
    /// `10`
    pub nesting_limit: u8,

    /// Whether bytes after the first complete value are ignored.
    ///
    /// When `false`, anything but whitespace after the root value is
    /// reported as invalid input (the binary parser treats any extra byte
    /// as invalid).
    ///
    /// # Default
    ///
    /// `false`
    pub allow_trailing_data: bool,
}

impl Default for DeserializeOptions {
    fn default() -> Self {
        Self {
            nesting_limit: 10,
            allow_trailing_data: false,
        }
    }
}
