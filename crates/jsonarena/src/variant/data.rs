//! The flat tagged union stored in document roots and collection slots.

use crate::{
    arena::{SlotId, Span},
    number::Number,
};

/// A string that is either borrowed from caller memory or copied into the
/// arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Str<'src> {
    Linked(&'src str),
    Owned(Span),
}

/// A pre-encoded fragment emitted verbatim by the writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Raw<'src> {
    Linked(&'src [u8]),
    Owned(Span),
}

/// Head, tail and length of a singly-linked list of slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Collection {
    pub(crate) head: Option<SlotId>,
    pub(crate) tail: Option<SlotId>,
    pub(crate) len: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) enum Data<'src> {
    #[default]
    Null,
    Bool(bool),
    UInt(u64),
    Int(i64),
    Float(f64),
    Str(Str<'src>),
    Raw(Raw<'src>),
    Array(Collection),
    Object(Collection),
}

impl Data<'_> {
    pub(crate) fn collection(&self) -> Option<Collection> {
        match *self {
            Data::Array(c) | Data::Object(c) => Some(c),
            _ => None,
        }
    }

    /// Writes back a collection updated by an append, keeping the kind.
    pub(crate) fn set_collection(&mut self, collection: Collection) {
        if let Data::Array(c) | Data::Object(c) = self {
            *c = collection;
        }
    }
}

impl From<Number> for Data<'_> {
    fn from(number: Number) -> Self {
        match number {
            Number::UInt(n) => Data::UInt(n),
            Number::Int(n) => Data::Int(n),
            Number::Float(f) => Data::Float(f),
        }
    }
}
