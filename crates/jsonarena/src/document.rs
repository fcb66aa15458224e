//! The document: one root value plus the arena every other node lives in.

use core::fmt;

use crate::{
    arena::{Arena, ArenaConfig, SlotId},
    error::NoMemory,
    variant::{
        VariantMut, VariantRef,
        data::{Collection, Data, Raw, Str},
    },
};

/// Where a value is stored: the document root or a collection slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Node {
    Root,
    Slot(SlotId),
}

/// A JSON/MessagePack value tree backed by an [`Arena`].
///
/// `'src` is the lifetime of caller memory that linked strings and raw
/// fragments borrow from. Documents that only hold owned data can be
/// `Document<'static>`.
///
/// ```rust
/// use jsonarena::{ArenaConfig, Document, json};
///
/// let mut doc = Document::new(ArenaConfig::fixed(1024));
/// json::from_str(&mut doc, r#"{"sensor":"gps","data":[48.75,2.30]}"#).unwrap();
/// assert_eq!(doc.root().get("data").get(1).coerce::<f64>(), 2.30);
/// ```
pub struct Document<'src> {
    pub(crate) arena: Arena<'src>,
    root: Data<'src>,
}

impl<'src> Document<'src> {
    /// An empty document (root `null`) with the given arena.
    #[must_use]
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            arena: Arena::new(config),
            root: Data::Null,
        }
    }

    /// An empty document with a fixed arena of `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(ArenaConfig::fixed(capacity))
    }

    /// Read access to the root.
    #[must_use]
    pub fn root(&self) -> VariantRef<'_, 'src> {
        VariantRef::new(&self.arena, Some(&self.root))
    }

    /// Write access to the root.
    pub fn root_mut(&mut self) -> VariantMut<'_, 'src> {
        VariantMut::new(self, Some(Node::Root))
    }

    /// Resets the root to `null` and releases the whole arena.
    pub fn clear(&mut self) {
        self.root = Data::Null;
        self.arena.clear();
    }

    /// Bytes currently consumed in the arena.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.arena.used()
    }

    /// Arena capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// The backing arena.
    #[must_use]
    pub fn arena(&self) -> &Arena<'src> {
        &self.arena
    }

    /// Reclaims space held by values no longer reachable from the root, such
    /// as replaced members or overwritten strings, then shrinks a resizable
    /// arena to fit. Returns the new memory usage.
    ///
    /// The live tree is copied into a fresh arena; if that copy does not fit
    /// (which can only happen for a fixed arena already near its limit) the
    /// document is left as it was.
    pub fn compact(&mut self) -> usize {
        let config = ArenaConfig {
            capacity: self.arena.capacity(),
            growth: self.arena.growth(),
        };
        let mut fresh = Arena::new(config);
        match copy_data(&mut fresh, &self.arena, &self.root) {
            Ok(root) => {
                tracing::debug!(
                    before = self.arena.used(),
                    after = fresh.used(),
                    "document compacted"
                );
                self.arena = fresh;
                self.root = root;
                self.arena.compact();
            }
            Err(NoMemory) => tracing::debug!("document compaction skipped"),
        }
        self.arena.used()
    }

    pub(crate) fn data(&self, node: Node) -> &Data<'src> {
        match node {
            Node::Root => &self.root,
            Node::Slot(id) => &self.arena.slot(id).data,
        }
    }

    pub(crate) fn data_mut(&mut self, node: Node) -> &mut Data<'src> {
        match node {
            Node::Root => &mut self.root,
            Node::Slot(id) => &mut self.arena.slot_mut(id).data,
        }
    }

    /// Appends a `null` slot to the container at `node`. `None` when the
    /// arena is exhausted or `node` is not a container.
    pub(crate) fn append(&mut self, node: Node, key: Option<Str<'src>>) -> Option<SlotId> {
        let mut collection = self.data(node).collection()?;
        let id = self.arena.append(&mut collection, key, Data::Null).ok()?;
        self.data_mut(node).set_collection(collection);
        Some(id)
    }

    /// First member of the object at `node` with the given key.
    pub(crate) fn find_member(&self, node: Node, key: &str) -> Option<SlotId> {
        match *self.data(node) {
            Data::Object(c) => self.arena.find(c, key),
            _ => None,
        }
    }
}

impl Default for Document<'_> {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}

impl fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root())
            .field("memory_usage", &self.memory_usage())
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Deep-copies `data` from `source` into `target`. Owned bytes are copied;
/// linked strings and fragments keep borrowing caller memory.
pub(crate) fn copy_data<'d, 's: 'd>(
    target: &mut Arena<'d>,
    source: &Arena<'s>,
    data: &Data<'s>,
) -> Result<Data<'d>, NoMemory> {
    Ok(match *data {
        Data::Str(s) => Data::Str(copy_str(target, source, s)?),
        Data::Raw(Raw::Owned(span)) => Data::Raw(Raw::Owned(target.allocate_bytes(source.blob(span))?)),
        Data::Array(c) => Data::Array(copy_collection(target, source, c)?),
        Data::Object(c) => Data::Object(copy_collection(target, source, c)?),
        other => other,
    })
}

fn copy_str<'d, 's: 'd>(
    target: &mut Arena<'d>,
    source: &Arena<'s>,
    s: Str<'s>,
) -> Result<Str<'d>, NoMemory> {
    Ok(match s {
        Str::Linked(text) => Str::Linked(text),
        Str::Owned(span) => Str::Owned(target.allocate_str(source.text(span))?),
    })
}

fn copy_collection<'d, 's: 'd>(
    target: &mut Arena<'d>,
    source: &Arena<'s>,
    collection: Collection,
) -> Result<Collection, NoMemory> {
    let mut copy = Collection::default();
    for (_, slot) in source.slots(collection) {
        let key = slot.key.map(|k| copy_str(target, source, k)).transpose()?;
        let data = copy_data(target, source, &slot.data)?;
        target.append(&mut copy, key, data)?;
    }
    Ok(copy)
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use crate::{Document, Kind, SLOT_SIZE, json};

    #[test]
    fn compact_drops_unreachable_values() {
        let mut doc = Document::with_capacity(1024);
        let mut root = doc.root_mut();
        assert!(root.reborrow().get_or_create("name").set_str("first value"));
        assert!(root.reborrow().get_or_create("name").set_str("second"));
        assert!(root.reborrow().get_or_create("tmp").add().set_str("dropped"));
        assert!(root.get_or_create("tmp").set_null());

        let before = doc.memory_usage();
        let after = doc.compact();
        assert!(after < before);
        assert_eq!(after, 2 * SLOT_SIZE + "name".len() + "second".len() + "tmp".len());
        assert_eq!(doc.root().get("name").as_str(), Some("second"));
        assert!(doc.root().get("tmp").is_null());
        assert!(!doc.root().get("tmp").is_unbound());
    }

    #[test]
    fn compact_keeps_linked_strings_linked() {
        let input = String::from(r#"{"k":"v"}"#);
        let mut doc = Document::with_capacity(256);
        json::from_str(&mut doc, &input).unwrap();
        doc.compact();
        assert_eq!(doc.root().get("k").kind(), Kind::LinkedString);
        assert_eq!(doc.memory_usage(), SLOT_SIZE);
    }

    #[test]
    fn clear_resets_root_and_usage() {
        let mut doc = Document::with_capacity(256);
        json::from_str(&mut doc, "[1,2,3]").unwrap();
        assert_eq!(doc.memory_usage(), 3 * SLOT_SIZE);
        doc.clear();
        assert!(doc.root().is_null());
        assert_eq!(doc.memory_usage(), 0);
        assert_eq!(doc.capacity(), 256);
    }
}
