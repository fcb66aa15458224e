//! Decoding of `\uXXXX` escapes one hex digit at a time.
//!
//! [`UnicodeEscapeBuffer`] accumulates exactly four ASCII hexadecimal digits
//! (`0-9`, `A-F`, `a-f`) into a UTF-16 code unit and resets itself once the
//! fourth digit arrives. Surrogate halves are returned as-is; pairing them is
//! up to the caller, see [`combine_surrogates`].

/// A byte that is not a hex digit appeared inside `\u`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InvalidHexDigit(pub(crate) u8);

#[derive(Debug, Default)]
pub(crate) struct UnicodeEscapeBuffer {
    acc: u16,
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        self.acc = 0;
        self.len = 0;
    }

    #[inline]
    fn hex_val(b: u8) -> Option<u16> {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => return None,
        };
        Some(u16::from(digit))
    }

    /// Feeds one digit. Yields the code unit after the fourth.
    pub(crate) fn feed(&mut self, b: u8) -> Result<Option<u16>, InvalidHexDigit> {
        let d = Self::hex_val(b).ok_or(InvalidHexDigit(b))?;
        self.acc = (self.acc << 4) | d;
        self.len += 1;
        if self.len < 4 {
            return Ok(None);
        }
        let unit = self.acc;
        self.reset();
        Ok(Some(unit))
    }
}

pub(crate) fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

pub(crate) fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Joins a UTF-16 surrogate pair. `None` unless `high` and `low` are the
/// matching halves.
pub(crate) fn combine_surrogates(high: u16, low: u16) -> Option<char> {
    if !is_high_surrogate(high) || !is_low_surrogate(low) {
        return None;
    }
    let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(buf: &mut UnicodeEscapeBuffer, digits: &[u8]) -> Option<u16> {
        let mut last = None;
        for &b in digits {
            last = buf.feed(b).unwrap();
        }
        last
    }

    #[test]
    fn basic_decoding() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(buf.feed(b'0').unwrap(), None);
        assert_eq!(buf.feed(b'0').unwrap(), None);
        assert_eq!(buf.feed(b'4').unwrap(), None);
        assert_eq!(buf.feed(b'1').unwrap(), Some(0x41));
    }

    #[test]
    fn mixed_case_hex() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(feed_all(&mut buf, b"AbCd"), Some(0xABCD));
    }

    #[test]
    fn resets_after_fourth_digit() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(feed_all(&mut buf, b"FFFF"), Some(0xFFFF));
        assert_eq!(feed_all(&mut buf, b"0020"), Some(0x20));
    }

    #[test]
    fn invalid_hex_error() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(buf.feed(b'G'), Err(InvalidHexDigit(b'G')));
    }

    #[test]
    fn surrogate_pairs() {
        assert_eq!(combine_surrogates(0xD83D, 0xDE00), Some('😀'));
        assert_eq!(combine_surrogates(0xDE00, 0xD83D), None);
        assert_eq!(combine_surrogates(0xD83D, 0x0041), None);
    }
}
