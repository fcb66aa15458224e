//! Matching of the `null`, `true` and `false` keywords byte by byte.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Literal {
    Null,
    True,
    False,
}

/// What happened after feeding one more byte into the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Byte matched, but the literal is not finished yet.
    NeedMore,
    /// Byte matched and was the last one of the literal.
    Done(Literal),
    /// Byte did not match.
    Reject,
}

/// The bytes still expected for the literal in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExpectedLiteralBuffer(Option<(&'static [u8], Literal)>);

impl ExpectedLiteralBuffer {
    /// Starts matching after the first byte (`n`, `t` or `f`). Any other
    /// first byte yields a matcher that rejects everything.
    pub(crate) fn new(first: u8) -> Self {
        match first {
            b'n' => Self(Some((b"ull", Literal::Null))),
            b't' => Self(Some((b"rue", Literal::True))),
            b'f' => Self(Some((b"alse", Literal::False))),
            _ => Self(None),
        }
    }

    pub(crate) fn step(&mut self, b: u8) -> Step {
        let Some((bytes, literal)) = self.0.take() else {
            return Step::Reject;
        };
        match bytes.split_first() {
            Some((&expected, rest)) if expected == b => {
                if rest.is_empty() {
                    Step::Done(literal)
                } else {
                    self.0 = Some((rest, literal));
                    Step::NeedMore
                }
            }
            _ => {
                self.0 = Some((bytes, literal));
                Step::Reject
            }
        }
    }
}
