//! Bump allocation for document nodes and string bytes.
//!
//! An [`Arena`] is a byte budget with two fronts. Collection slots are
//! bump-allocated from the low end in fixed, word-aligned units of
//! [`SLOT_SIZE`] bytes; owned string and raw-fragment bytes are bump-allocated
//! from the high end. Allocation fails with [`NoMemory`] as soon as the two
//! fronts would cross.
//!
//! ```text
//! 0                         low              high                  capacity
//! ├── slot ── slot ── slot ──►│      free      │◄── "bytes" ── "key" ──┤
//! ```
//!
//! Nothing is ever freed individually. [`Document::clear`](crate::Document::clear)
//! resets both fronts and needs `&mut`, so no handle can outlive it.
//!
//! The fronts are backed by three buffers (slots, owned text, raw bytes)
//! that are grown on demand. Together they never reserve more heap than
//! [`Arena::capacity`]: a buffer grows geometrically while the budget has
//! headroom, and the slack of the other two is released when it does not.
//!
//! Every reference stored inside the arena is arena-relative: collections
//! link slots by index and owned strings are offset spans. Growing the
//! arena (see [`Growth`]) therefore never invalidates anything already
//! handed out.

use alloc::{string::String, vec::Vec};
use core::ops::Range;

use crate::{
    error::NoMemory,
    variant::data::{Collection, Data, Str},
};

/// Accounting size of one collection slot.
pub const SLOT_SIZE: usize = core::mem::size_of::<Slot<'static>>();

/// What the arena does when the fronts would cross.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Growth {
    /// Fail the allocation with [`NoMemory`].
    #[default]
    Fixed,
    /// Double the capacity (or grow to the requested size, if larger), never
    /// beyond `max_capacity`.
    Double {
        /// Upper bound on the capacity, in bytes.
        max_capacity: usize,
    },
}

/// Arena sizing policy.
///
/// # Examples
///
/// ```rust
/// use jsonarena::{ArenaConfig, Document, Growth};
///
/// let config = ArenaConfig {
///     capacity: 512,
///     growth: Growth::Double { max_capacity: 64 * 1024 },
/// };
/// let doc = Document::new(config);
/// assert_eq!(doc.capacity(), 512);
/// ```
///
/// # Default
///
/// 4 KiB, [`Growth::Fixed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Initial capacity, in bytes.
    pub capacity: usize,
    /// Behavior on exhaustion.
    pub growth: Growth,
}

impl ArenaConfig {
    /// A fixed-size arena of `capacity` bytes.
    #[must_use]
    pub const fn fixed(capacity: usize) -> Self {
        Self {
            capacity,
            growth: Growth::Fixed,
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::fixed(4096)
    }
}

/// Index of a slot in the low region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SlotId(u32);

impl SlotId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Location of owned bytes in the high region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    offset: u32,
    len: u32,
}

impl Span {
    fn range(self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.len as usize
    }

    pub(crate) fn len(self) -> usize {
        self.len as usize
    }
}

/// One member of a collection: an optional key, a value and the link to the
/// next member.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Slot<'src> {
    pub(crate) key: Option<Str<'src>>,
    pub(crate) data: Data<'src>,
    pub(crate) next: Option<SlotId>,
}

/// One of the buffers backing the fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Slots,
    Text,
    Blobs,
}

/// The memory backing one [`Document`](crate::Document).
#[derive(Debug)]
pub struct Arena<'src> {
    slots: Vec<Slot<'src>>,
    /// Owned string bytes.
    text: String,
    /// Owned raw fragments.
    blobs: Vec<u8>,
    capacity: usize,
    growth: Growth,
}

impl<'src> Arena<'src> {
    /// Creates an empty arena. Nothing is reserved until the first
    /// allocation.
    #[must_use]
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            slots: Vec::new(),
            text: String::new(),
            blobs: Vec::new(),
            capacity: config.capacity,
            growth: config.growth,
        }
    }

    /// Total budget, in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes consumed by both fronts.
    #[must_use]
    pub fn used(&self) -> usize {
        self.low() + self.high()
    }

    /// Bytes left between the two fronts.
    #[must_use]
    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.used())
    }

    /// The growth policy this arena was created with.
    #[must_use]
    pub fn growth(&self) -> Growth {
        self.growth
    }

    /// Heap bytes held by the backing buffers, used or not. Never exceeds
    /// [`capacity`](Self::capacity).
    #[must_use]
    pub fn reserved(&self) -> usize {
        self.slots.capacity() * SLOT_SIZE + self.text.capacity() + self.blobs.capacity()
    }

    fn low(&self) -> usize {
        self.slots.len() * SLOT_SIZE
    }

    fn high(&self) -> usize {
        self.text.len() + self.blobs.len()
    }

    /// Shrinks a resizable arena to exactly what it currently holds and
    /// returns the resulting capacity. A fixed arena keeps its capacity.
    ///
    /// This never runs implicitly. To also drop values that are no longer
    /// reachable from the root, use [`Document::compact`](crate::Document::compact).
    pub fn compact(&mut self) -> usize {
        if let Growth::Double { .. } = self.growth {
            let before = self.capacity;
            self.capacity = self.used();
            self.slots.shrink_to_fit();
            self.text.shrink_to_fit();
            self.blobs.shrink_to_fit();
            tracing::debug!(before, after = self.capacity, "arena compacted");
        }
        self.capacity
    }

    /// Resets both fronts. Every previously issued [`SlotId`] and [`Span`]
    /// becomes meaningless.
    pub(crate) fn clear(&mut self) {
        tracing::debug!(released = self.used(), "arena cleared");
        self.slots.clear();
        self.text.clear();
        self.blobs.clear();
    }

    /// Makes room for `size` more bytes between the fronts, growing if the
    /// policy allows.
    fn reserve(&mut self, size: usize) -> Result<(), NoMemory> {
        let needed = self.used().checked_add(size).ok_or(NoMemory)?;
        if needed <= self.capacity {
            return Ok(());
        }
        match self.growth {
            Growth::Double { max_capacity } if needed <= max_capacity => {
                let grown = self.capacity.saturating_mul(2).max(needed).min(max_capacity);
                tracing::debug!(from = self.capacity, to = grown, "arena grown");
                self.capacity = grown;
                Ok(())
            }
            _ => {
                tracing::trace!(requested = size, available = self.available(), "arena exhausted");
                Err(NoMemory)
            }
        }
    }

    fn extent(&self, region: Region) -> (usize, usize, usize) {
        match region {
            Region::Slots => (self.slots.len(), self.slots.capacity(), SLOT_SIZE),
            Region::Text => (self.text.len(), self.text.capacity(), 1),
            Region::Blobs => (self.blobs.len(), self.blobs.capacity(), 1),
        }
    }

    /// Shrinks every buffer but `keep` to its length.
    fn release_slack(&mut self, keep: Region) {
        if keep != Region::Slots {
            self.slots.shrink_to_fit();
        }
        if keep != Region::Text {
            self.text.shrink_to_fit();
        }
        if keep != Region::Blobs {
            self.blobs.shrink_to_fit();
        }
    }

    /// Makes sure `count` more units fit in the buffer behind `region`.
    ///
    /// Must follow a successful [`reserve`](Self::reserve) for the same
    /// bytes: that guarantees `used + count * unit <= capacity`, so once the
    /// other buffers have no slack the exact growth always fits the budget.
    fn make_room(&mut self, region: Region, count: usize) -> Result<(), NoMemory> {
        let (len, cap, unit) = self.extent(region);
        let needed = len + count;
        if needed <= cap {
            return Ok(());
        }
        if self.reserved() + (needed - cap) * unit > self.capacity {
            self.release_slack(region);
        }
        let headroom = self.capacity.saturating_sub(self.reserved()) / unit;
        let target = needed.max(cap + cap.max(4).min(headroom));
        let additional = target - len;
        let result = match region {
            Region::Slots => self.slots.try_reserve_exact(additional),
            Region::Text => self.text.try_reserve_exact(additional),
            Region::Blobs => self.blobs.try_reserve_exact(additional),
        };
        result.map_err(|_| NoMemory)
    }

    /// Bumps the low front by one slot.
    pub(crate) fn allocate_slot(&mut self, slot: Slot<'src>) -> Result<SlotId, NoMemory> {
        self.reserve(SLOT_SIZE)?;
        let id = u32::try_from(self.slots.len()).map_err(|_| NoMemory)?;
        self.make_room(Region::Slots, 1)?;
        self.slots.push(slot);
        Ok(SlotId(id))
    }

    /// Bumps the high front by `text.len()` bytes and copies `text` there.
    pub(crate) fn allocate_str(&mut self, text: &str) -> Result<Span, NoMemory> {
        self.reserve(text.len())?;
        let offset = u32::try_from(self.text.len()).map_err(|_| NoMemory)?;
        let len = u32::try_from(text.len()).map_err(|_| NoMemory)?;
        self.make_room(Region::Text, text.len())?;
        self.text.push_str(text);
        Ok(Span { offset, len })
    }

    /// Bumps the high front by `bytes.len()` bytes and copies `bytes` there.
    pub(crate) fn allocate_bytes(&mut self, bytes: &[u8]) -> Result<Span, NoMemory> {
        self.reserve(bytes.len())?;
        let offset = u32::try_from(self.blobs.len()).map_err(|_| NoMemory)?;
        let len = u32::try_from(bytes.len()).map_err(|_| NoMemory)?;
        self.make_room(Region::Blobs, bytes.len())?;
        self.blobs.extend_from_slice(bytes);
        Ok(Span { offset, len })
    }

    pub(crate) fn text(&self, span: Span) -> &str {
        &self.text[span.range()]
    }

    pub(crate) fn blob(&self, span: Span) -> &[u8] {
        &self.blobs[span.range()]
    }

    pub(crate) fn slot(&self, id: SlotId) -> &Slot<'src> {
        &self.slots[id.index()]
    }

    pub(crate) fn slot_mut(&mut self, id: SlotId) -> &mut Slot<'src> {
        &mut self.slots[id.index()]
    }

    /// Appends a slot to `collection` in O(1) through its cached tail.
    ///
    /// `collection` is only updated once the slot exists, so a failed
    /// allocation leaves it untouched.
    pub(crate) fn append(
        &mut self,
        collection: &mut Collection,
        key: Option<Str<'src>>,
        data: Data<'src>,
    ) -> Result<SlotId, NoMemory> {
        let id = self.allocate_slot(Slot {
            key,
            data,
            next: None,
        })?;
        match collection.tail {
            Some(tail) => self.slot_mut(tail).next = Some(id),
            None => collection.head = Some(id),
        }
        collection.tail = Some(id);
        collection.len += 1;
        Ok(id)
    }

    /// Walks `collection` in insertion order.
    pub(crate) fn slots(&self, collection: Collection) -> SlotIter<'_, 'src> {
        SlotIter {
            arena: self,
            next: collection.head,
        }
    }

    pub(crate) fn nth(&self, collection: Collection, index: usize) -> Option<SlotId> {
        self.slots(collection).nth(index).map(|(id, _)| id)
    }

    /// First member whose key equals `key`.
    pub(crate) fn find(&self, collection: Collection, key: &str) -> Option<SlotId> {
        self.slots(collection)
            .find(|(_, slot)| slot.key.is_some_and(|k| self.resolve(&k) == key))
            .map(|(id, _)| id)
    }

    pub(crate) fn resolve<'a>(&'a self, s: &Str<'src>) -> &'a str {
        match *s {
            Str::Linked(text) => text,
            Str::Owned(span) => self.text(span),
        }
    }
}

/// Iterator over the slots of one collection.
pub(crate) struct SlotIter<'a, 'src> {
    arena: &'a Arena<'src>,
    next: Option<SlotId>,
}

impl<'a, 'src> Iterator for SlotIter<'a, 'src> {
    type Item = (SlotId, &'a Slot<'src>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let slot = self.arena.slot(id);
        self.next = slot.next;
        Some((id, slot))
    }
}
