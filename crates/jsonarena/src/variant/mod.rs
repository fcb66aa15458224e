//! Handles to values stored in a [`Document`].
//!
//! [`VariantRef`] is a shared, `Copy` view; [`VariantMut`] is the exclusive
//! handle through which documents are built. Both may be *unbound*: a
//! lookup that finds nothing, or an operation that could not allocate,
//! yields an unbound handle instead of an error. Reads through an unbound
//! handle behave like `null` and writes through it are no-ops that report
//! `false`.
//!
//! ```rust
//! use jsonarena::{Document, Kind};
//!
//! let mut doc = Document::with_capacity(1024);
//! let mut root = doc.root_mut();
//! assert!(root.reborrow().get_or_create("name").set_str("arena"));
//! assert!(root.reborrow().get_or_create("tags").add().set_bool(true));
//!
//! // Only a Null variant can be promoted.
//! assert!(root.add().is_unbound());
//!
//! assert_eq!(doc.root().kind(), Kind::Object);
//! assert_eq!(doc.root().get("name").as_str(), Some("arena"));
//! assert_eq!(doc.root().get("missing").get(3).coerce::<i32>(), 0);
//! ```

mod convert;
pub(crate) mod data;
mod index;

use core::fmt;

use bstr::BStr;
pub use convert::VariantType;
use data::{Collection, Data, Raw, Str};
pub use index::Index;

use crate::{
    arena::{Arena, SlotId, SlotIter},
    document::{Document, Node},
    io::Sink,
    json::{self, JsonWriterOptions},
};

/// The exact kind stored in a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `null`, or an unbound handle.
    Null,
    /// `true` or `false`.
    Bool,
    /// A non-negative integer.
    UnsignedInteger,
    /// An integer stored with a sign.
    SignedInteger,
    /// A 64-bit float.
    Float,
    /// A string borrowed from caller memory.
    LinkedString,
    /// A string copied into the arena.
    OwnedString,
    /// Pre-encoded bytes emitted verbatim.
    RawFragment,
    /// An ordered sequence of values.
    Array,
    /// An ordered sequence of keyed values.
    Object,
}

impl Kind {
    /// Linked or owned string.
    #[must_use]
    pub fn is_string(self) -> bool {
        matches!(self, Kind::LinkedString | Kind::OwnedString)
    }

    /// Signed or unsigned integer.
    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(self, Kind::UnsignedInteger | Kind::SignedInteger)
    }

    /// Array or object.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Kind::Array | Kind::Object)
    }
}

/// A shared view of one value in a document.
#[derive(Clone, Copy)]
pub struct VariantRef<'a, 'src> {
    arena: &'a Arena<'src>,
    data: Option<&'a Data<'src>>,
}

impl<'a, 'src> VariantRef<'a, 'src> {
    pub(crate) fn new(arena: &'a Arena<'src>, data: Option<&'a Data<'src>>) -> Self {
        Self { arena, data }
    }

    pub(crate) fn data(&self) -> Option<&'a Data<'src>> {
        self.data
    }

    fn unbound(self) -> Self {
        Self::new(self.arena, None)
    }

    fn slot(self, id: Option<SlotId>) -> Self {
        Self::new(self.arena, id.map(|id| &self.arena.slot(id).data))
    }

    /// `true` for the null-reference handle returned by failed lookups and
    /// allocations.
    #[must_use]
    pub fn is_unbound(&self) -> bool {
        self.data.is_none()
    }

    /// `true` for `null` and for unbound handles.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.data, None | Some(Data::Null))
    }

    /// The exact stored kind.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self.data {
            None | Some(Data::Null) => Kind::Null,
            Some(Data::Bool(_)) => Kind::Bool,
            Some(Data::UInt(_)) => Kind::UnsignedInteger,
            Some(Data::Int(_)) => Kind::SignedInteger,
            Some(Data::Float(_)) => Kind::Float,
            Some(Data::Str(Str::Linked(_))) => Kind::LinkedString,
            Some(Data::Str(Str::Owned(_))) => Kind::OwnedString,
            Some(Data::Raw(_)) => Kind::RawFragment,
            Some(Data::Array(_)) => Kind::Array,
            Some(Data::Object(_)) => Kind::Object,
        }
    }

    /// Exact type test, without coercion. See [`VariantType`].
    #[must_use]
    pub fn is<T: VariantType<'a>>(&self) -> bool {
        T::is(self)
    }

    /// Coercive read. See [`VariantType`] for the conversion table.
    #[must_use]
    pub fn coerce<T: VariantType<'a>>(&self) -> T {
        T::coerce(self)
    }

    /// The string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        match self.data {
            Some(Data::Str(s)) => Some(self.arena.resolve(s)),
            _ => None,
        }
    }

    /// The verbatim bytes, if this is a raw fragment.
    #[must_use]
    pub fn as_raw(&self) -> Option<&'a [u8]> {
        match *self.data? {
            Data::Raw(Raw::Linked(bytes)) => Some(bytes),
            Data::Raw(Raw::Owned(span)) => Some(self.arena.blob(span)),
            _ => None,
        }
    }

    /// Whether this is an array.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.data, Some(Data::Array(_)))
    }

    /// Whether this is an object.
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self.data, Some(Data::Object(_)))
    }

    fn collection(&self) -> Option<Collection> {
        self.data.and_then(Data::collection)
    }

    /// Number of elements or members; 0 for anything but a container.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collection().map_or(0, |c| c.len as usize)
    }

    /// `true` when [`len`](Self::len) is 0.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up an array element by position or an object member by key.
    ///
    /// Yields an unbound handle when absent or when the receiver is not the
    /// matching container kind.
    #[must_use]
    pub fn get<I: Index>(&self, index: I) -> VariantRef<'a, 'src> {
        index.index_into(*self)
    }

    pub(crate) fn element(self, index: usize) -> Self {
        match self.data {
            Some(Data::Array(c)) => self.slot(self.arena.nth(*c, index)),
            _ => self.unbound(),
        }
    }

    pub(crate) fn member(self, key: &str) -> Self {
        match self.data {
            Some(Data::Object(c)) => self.slot(self.arena.find(*c, key)),
            _ => self.unbound(),
        }
    }

    /// Elements or members in insertion order, each with its key (`None` for
    /// array elements). Empty for anything but a container.
    #[must_use]
    pub fn iter(&self) -> Iter<'a, 'src> {
        let collection = self.collection().unwrap_or_default();
        Iter {
            arena: self.arena,
            slots: self.arena.slots(collection),
            remaining: collection.len as usize,
        }
    }

    /// Depth of the deepest container below and including this one; 0 for
    /// scalars.
    #[must_use]
    pub fn nesting(&self) -> usize {
        if self.collection().is_none() {
            return 0;
        }
        1 + self.iter().map(|(_, v)| v.nesting()).max().unwrap_or(0)
    }
}

impl<'a, 'src> IntoIterator for VariantRef<'a, 'src> {
    type Item = (Option<&'a str>, VariantRef<'a, 'src>);
    type IntoIter = Iter<'a, 'src>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the contents of a container, see [`VariantRef::iter`].
pub struct Iter<'a, 'src> {
    arena: &'a Arena<'src>,
    slots: SlotIter<'a, 'src>,
    remaining: usize,
}

impl<'a, 'src> Iterator for Iter<'a, 'src> {
    type Item = (Option<&'a str>, VariantRef<'a, 'src>);

    fn next(&mut self) -> Option<Self::Item> {
        let (_, slot) = self.slots.next()?;
        self.remaining -= 1;
        let key = slot.key.as_ref().map(|k| self.arena.resolve(k));
        Some((key, VariantRef::new(self.arena, Some(&slot.data))))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_, '_> {}

/// Structural equality: same kinds and values, arrays in the same order,
/// objects with the same key set. Integers compare by value whether stored
/// signed or unsigned, and linked strings equal owned strings with the same
/// text. Unbound handles equal `null`.
impl<'b, 't> PartialEq<VariantRef<'b, 't>> for VariantRef<'_, '_> {
    fn eq(&self, other: &VariantRef<'b, 't>) -> bool {
        match (self.data.copied().unwrap_or_default(), other.data.copied().unwrap_or_default()) {
            (Data::Null, Data::Null) => true,
            (Data::Bool(a), Data::Bool(b)) => a == b,
            (Data::UInt(a), Data::UInt(b)) => a == b,
            (Data::Int(a), Data::Int(b)) => a == b,
            (Data::UInt(a), Data::Int(b)) | (Data::Int(b), Data::UInt(a)) => {
                u64::try_from(b).is_ok_and(|b| a == b)
            }
            #[allow(clippy::float_cmp)]
            (Data::Float(a), Data::Float(b)) => a == b,
            (Data::Str(_), Data::Str(_)) => self.as_str() == other.as_str(),
            (Data::Raw(_), Data::Raw(_)) => self.as_raw() == other.as_raw(),
            (Data::Array(a), Data::Array(b)) => {
                a.len == b.len && self.iter().zip(other.iter()).all(|((_, x), (_, y))| x == y)
            }
            (Data::Object(a), Data::Object(b)) => {
                a.len == b.len
                    && self.iter().all(|(key, x)| {
                        let y = other.get(key.unwrap_or_default());
                        !y.is_unbound() && x == y
                    })
            }
            _ => false,
        }
    }
}

impl fmt::Debug for VariantRef<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(data) = self.data else {
            return f.write_str("Unbound");
        };
        match *data {
            Data::Null => f.write_str("Null"),
            Data::Bool(b) => f.debug_tuple("Bool").field(&b).finish(),
            Data::UInt(n) => f.debug_tuple("UInt").field(&n).finish(),
            Data::Int(n) => f.debug_tuple("Int").field(&n).finish(),
            Data::Float(n) => f.debug_tuple("Float").field(&n).finish(),
            Data::Str(_) => f
                .debug_tuple("String")
                .field(&self.as_str().unwrap_or_default())
                .finish(),
            Data::Raw(_) => f
                .debug_tuple("Raw")
                .field(&BStr::new(self.as_raw().unwrap_or_default()))
                .finish(),
            Data::Array(_) => f
                .debug_tuple("Array")
                .field(&DebugList(*self))
                .finish(),
            Data::Object(_) => f
                .debug_tuple("Object")
                .field(&DebugMap(*self))
                .finish(),
        }
    }
}

struct DebugList<'a, 'src>(VariantRef<'a, 'src>);

impl fmt::Debug for DebugList<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter().map(|(_, v)| v)).finish()
    }
}

struct DebugMap<'a, 'src>(VariantRef<'a, 'src>);

impl fmt::Debug for DebugMap<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(k, v)| (k.unwrap_or_default(), v)))
            .finish()
    }
}

/// Sink adapter feeding a formatter. Raw fragments that are not UTF-8 are
/// rendered lossily.
struct FmtSink<'f, 'g>(&'f mut fmt::Formatter<'g>);

impl Sink for FmtSink<'_, '_> {
    fn write(&mut self, bytes: &[u8]) -> usize {
        match fmt::Display::fmt(BStr::new(bytes), self.0) {
            Ok(()) => bytes.len(),
            Err(_) => 0,
        }
    }
}

/// Compact JSON.
impl fmt::Display for VariantRef<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sink = FmtSink(f);
        json::to_writer(*self, &mut sink, JsonWriterOptions::default())
            .map(|_| ())
            .map_err(|_| fmt::Error)
    }
}

/// The exclusive handle used to build a document.
///
/// Navigation methods consume the handle and return one for the target, so
/// they chain; use [`reborrow`](Self::reborrow) to keep the original.
pub struct VariantMut<'a, 'src> {
    doc: &'a mut Document<'src>,
    node: Option<Node>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Container {
    Array,
    Object,
}

impl<'a, 'src> VariantMut<'a, 'src> {
    pub(crate) fn new(doc: &'a mut Document<'src>, node: Option<Node>) -> Self {
        Self { doc, node }
    }

    fn retarget(self, node: Option<Node>) -> Self {
        Self::new(self.doc, node)
    }

    /// A shared view of the same value.
    #[must_use]
    pub fn view(&self) -> VariantRef<'_, 'src> {
        VariantRef::new(&self.doc.arena, self.node.map(|n| self.doc.data(n)))
    }

    /// Converts into a shared view for the rest of `'a`.
    #[must_use]
    pub fn into_view(self) -> VariantRef<'a, 'src> {
        let doc: &'a Document<'src> = self.doc;
        VariantRef::new(&doc.arena, self.node.map(|n| doc.data(n)))
    }

    /// A shorter-lived handle to the same value.
    pub fn reborrow(&mut self) -> VariantMut<'_, 'src> {
        VariantMut::new(self.doc, self.node)
    }

    /// `true` for the null-reference handle.
    #[must_use]
    pub fn is_unbound(&self) -> bool {
        self.node.is_none()
    }

    fn store(&mut self, data: Data<'src>) -> bool {
        match self.node {
            Some(node) => {
                *self.doc.data_mut(node) = data;
                true
            }
            None => false,
        }
    }

    /// Resets to `null`. Any previous container contents stay in the arena
    /// until the next [`Document::compact`].
    pub fn set_null(&mut self) -> bool {
        self.store(Data::Null)
    }

    /// Stores a boolean.
    pub fn set_bool(&mut self, value: bool) -> bool {
        self.store(Data::Bool(value))
    }

    /// Stores a signed integer.
    pub fn set_int(&mut self, value: i64) -> bool {
        self.store(Data::Int(value))
    }

    /// Stores an unsigned integer.
    pub fn set_uint(&mut self, value: u64) -> bool {
        self.store(Data::UInt(value))
    }

    /// Stores a float.
    pub fn set_float(&mut self, value: f64) -> bool {
        self.store(Data::Float(value))
    }

    /// Copies `value` into the arena and stores it. On exhaustion the
    /// previous value is kept and `false` is returned.
    pub fn set_str(&mut self, value: &str) -> bool {
        if self.node.is_none() {
            return false;
        }
        match self.doc.arena.allocate_str(value) {
            Ok(span) => self.store(Data::Str(Str::Owned(span))),
            Err(_) => false,
        }
    }

    /// Stores a reference to `value` without copying it.
    pub fn set_linked_str(&mut self, value: &'src str) -> bool {
        self.store(Data::Str(Str::Linked(value)))
    }

    /// Copies pre-encoded bytes into the arena; writers emit them verbatim.
    pub fn set_raw(&mut self, value: &[u8]) -> bool {
        if self.node.is_none() {
            return false;
        }
        match self.doc.arena.allocate_bytes(value) {
            Ok(span) => self.store(Data::Raw(Raw::Owned(span))),
            Err(_) => false,
        }
    }

    /// Stores a reference to pre-encoded bytes without copying them.
    pub fn set_linked_raw(&mut self, value: &'src [u8]) -> bool {
        self.store(Data::Raw(Raw::Linked(value)))
    }

    /// Replaces this value with a deep copy of `source`, which may live in
    /// another document. Owned strings and fragments are copied into this
    /// arena; linked ones keep pointing at caller memory.
    ///
    /// On exhaustion the previous value is kept and `false` is returned.
    pub fn copy_from(&mut self, source: VariantRef<'_, 'src>) -> bool {
        if self.node.is_none() {
            return false;
        }
        let Some(data) = source.data() else {
            return self.set_null();
        };
        match crate::document::copy_data(&mut self.doc.arena, source.arena, data) {
            Ok(copy) => self.store(copy),
            Err(_) => false,
        }
    }

    /// Turns `null` into the given container. Succeeds without change if the
    /// value already is that container; any other kind is left untouched and
    /// yields `None`.
    fn promote(&mut self, container: Container) -> Option<Node> {
        let node = self.node?;
        let data = self.doc.data_mut(node);
        match (*data, container) {
            (Data::Null, Container::Array) => *data = Data::Array(Collection::default()),
            (Data::Null, Container::Object) => *data = Data::Object(Collection::default()),
            (Data::Array(_), Container::Array) | (Data::Object(_), Container::Object) => {}
            _ => return None,
        }
        Some(node)
    }

    /// Promotes `null` to an empty array.
    #[must_use]
    pub fn into_array(mut self) -> Self {
        let node = self.promote(Container::Array);
        self.retarget(node)
    }

    /// Promotes `null` to an empty object.
    #[must_use]
    pub fn into_object(mut self) -> Self {
        let node = self.promote(Container::Object);
        self.retarget(node)
    }

    /// Appends a `null` element to an array (promoting `null` first) and
    /// returns it.
    #[must_use]
    pub fn add(mut self) -> Self {
        let slot = self
            .promote(Container::Array)
            .and_then(|node| self.doc.append(node, None));
        self.retarget(slot.map(Node::Slot))
    }

    /// Mutable lookup, see [`VariantRef::get`].
    #[must_use]
    pub fn get_mut<I: Index>(self, index: I) -> Self {
        index.index_into_mut(self)
    }

    /// Like [`get_mut`](Self::get_mut), but creates what is missing.
    ///
    /// For a key, a `null` member is appended when absent and a `null`
    /// receiver becomes an object. For a position, `null` elements are
    /// appended until it exists and a `null` receiver becomes an array.
    /// Anything that cannot be promoted, or an exhausted arena, yields an
    /// unbound handle.
    #[must_use]
    pub fn get_or_create<I: Index>(self, index: I) -> Self {
        index.index_or_insert(self)
    }

    /// Like `get_or_create(key)`, but a newly appended member stores `key`
    /// by reference instead of copying it into the arena.
    ///
    /// An existing member is returned as is, whichever way its key was
    /// stored.
    #[must_use]
    pub fn get_or_create_linked(self, key: &'src str) -> Self {
        self.insert_member(key, Some(Str::Linked(key)))
    }

    pub(crate) fn element_mut(self, index: usize) -> Self {
        let slot = self.node.and_then(|node| match *self.doc.data(node) {
            Data::Array(c) => self.doc.arena.nth(c, index),
            _ => None,
        });
        self.retarget(slot.map(Node::Slot))
    }

    pub(crate) fn member_mut(self, key: &str) -> Self {
        let slot = self.node.and_then(|node| match *self.doc.data(node) {
            Data::Object(c) => self.doc.arena.find(c, key),
            _ => None,
        });
        self.retarget(slot.map(Node::Slot))
    }

    pub(crate) fn element_or_insert(mut self, index: usize) -> Self {
        let Some(node) = self.promote(Container::Array) else {
            return self.retarget(None);
        };
        let len = self.view().len();
        if index < len {
            return self.element_mut(index);
        }
        let mut last = None;
        for _ in len..=index {
            last = self.doc.append(node, None);
            if last.is_none() {
                break;
            }
        }
        self.retarget(last.map(Node::Slot))
    }

    pub(crate) fn member_or_insert(self, key: &str) -> Self {
        self.insert_member(key, None)
    }

    /// Finds `key` or appends it, using `linked` as the stored key when
    /// given and an owned copy otherwise.
    fn insert_member(mut self, key: &str, linked: Option<Str<'src>>) -> Self {
        let Some(node) = self.promote(Container::Object) else {
            return self.retarget(None);
        };
        if let Some(found) = self.doc.find_member(node, key) {
            return self.retarget(Some(Node::Slot(found)));
        }
        let stored = match linked {
            Some(linked) => Some(linked),
            None => self.doc.arena.allocate_str(key).ok().map(Str::Owned),
        };
        let slot = stored.and_then(|stored| self.doc.append(node, Some(stored)));
        self.retarget(slot.map(Node::Slot))
    }
}

impl fmt::Debug for VariantMut<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.view(), f)
    }
}
