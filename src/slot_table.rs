//! SlotTable: structural layer with tri-state slots, linear probing and an
//! explicit insertion-order index list.
//!
//! The table knows nothing about load factors or growth policy; `ByteMap`
//! decides when to call `try_rebuild`. Slots are only ever returned to
//! `Empty` by a rebuild, so every index in `order` points at either the
//! entry it was pushed for or the tombstone that entry left behind.

use crate::error::AllocError;
use core::alloc::Layout;
use core::mem;

#[derive(Debug)]
pub(crate) struct Entry<K> {
    pub(crate) key: K,
    pub(crate) hash: u32,
    pub(crate) value: usize,
}

#[derive(Debug)]
pub(crate) enum Slot<K> {
    Empty,
    Occupied(Entry<K>),
    Tombstone,
}

pub(crate) struct SlotTable<K> {
    slots: Vec<Slot<K>>,
    // Slot indices in first-insertion order; len() is the live count.
    order: Vec<usize>,
    tombstones: usize,
}

/// Allocate `capacity` empty slots plus an order list that never needs to
/// reallocate (live count stays below capacity).
fn alloc_parts<K>(capacity: usize) -> Result<(Vec<Slot<K>>, Vec<usize>), AllocError> {
    Layout::array::<Slot<K>>(capacity).map_err(|_| AllocError::CapacityOverflow)?;
    Layout::array::<usize>(capacity).map_err(|_| AllocError::CapacityOverflow)?;

    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|_| AllocError::AllocFailed { capacity })?;
    let mut order = Vec::new();
    order
        .try_reserve_exact(capacity)
        .map_err(|_| AllocError::AllocFailed { capacity })?;

    slots.resize_with(capacity, || Slot::Empty);
    Ok((slots, order))
}

/// Infallible allocation policy, mirroring `std` collections: overflow
/// panics, allocator failure aborts through `handle_alloc_error`.
pub(crate) fn handle_alloc_failure<K>(err: AllocError) -> ! {
    match err {
        AllocError::CapacityOverflow => panic!("capacity overflow"),
        AllocError::AllocFailed { capacity } => match Layout::array::<Slot<K>>(capacity) {
            Ok(layout) => std::alloc::handle_alloc_error(layout),
            Err(_) => panic!("capacity overflow"),
        },
    }
}

impl<K> SlotTable<K>
where
    K: AsRef<[u8]>,
{
    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, AllocError> {
        debug_assert!(capacity > 0, "capacity must be positive");
        let (slots, order) = alloc_parts(capacity)?;
        Ok(Self {
            slots,
            order,
            tombstones: 0,
        })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Occupied plus tombstoned slots since the last rebuild.
    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub(crate) fn tombstones(&self) -> usize {
        self.tombstones
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.live() - self.tombstones
    }

    /// Index of the slot holding `key`, or of the first `Empty` slot on its
    /// probe path. Tombstones are stepped over, never returned.
    ///
    /// Terminates because callers keep `live() < capacity()`.
    pub(crate) fn resolve(&self, key: &[u8], hash: u32) -> usize {
        let capacity = self.capacity();
        let mut idx = hash as usize % capacity;
        loop {
            match &self.slots[idx] {
                Slot::Empty => return idx,
                Slot::Occupied(e)
                    if e.hash == hash && e.key.as_ref().len() == key.len() && e.key.as_ref() == key =>
                {
                    return idx
                }
                Slot::Occupied(_) | Slot::Tombstone => {}
            }
            idx = (idx + 1) % capacity;
        }
    }

    #[inline]
    pub(crate) fn entry(&self, idx: usize) -> Option<&Entry<K>> {
        match &self.slots[idx] {
            Slot::Occupied(e) => Some(e),
            Slot::Empty | Slot::Tombstone => None,
        }
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, idx: usize) -> Option<&mut Entry<K>> {
        match &mut self.slots[idx] {
            Slot::Occupied(e) => Some(e),
            Slot::Empty | Slot::Tombstone => None,
        }
    }

    /// Empty -> Occupied; appends the slot to the insertion order.
    pub(crate) fn occupy(&mut self, idx: usize, entry: Entry<K>) {
        debug_assert!(matches!(self.slots[idx], Slot::Empty));
        debug_assert!(self.live() < self.capacity());
        self.slots[idx] = Slot::Occupied(entry);
        self.order.push(idx);
    }

    /// Occupied -> Tombstone, handing the entry back. `None` if the slot
    /// holds no entry.
    pub(crate) fn bury(&mut self, idx: usize) -> Option<Entry<K>> {
        if !matches!(self.slots[idx], Slot::Occupied(_)) {
            return None;
        }
        match mem::replace(&mut self.slots[idx], Slot::Tombstone) {
            Slot::Occupied(e) => {
                self.tombstones += 1;
                Some(e)
            }
            Slot::Empty | Slot::Tombstone => None,
        }
    }

    /// Move every surviving entry into a fresh array of `new_capacity`
    /// slots, keeping relative insertion order and dropping tombstones.
    /// Returns the number of tombstones discarded.
    ///
    /// Both buffers are reserved before anything moves, so on error the
    /// table is untouched.
    pub(crate) fn try_rebuild(&mut self, new_capacity: usize) -> Result<usize, AllocError> {
        debug_assert!(new_capacity > self.len());
        let (new_slots, new_order) = alloc_parts(new_capacity)?;

        let mut old_slots = mem::replace(&mut self.slots, new_slots);
        let old_order = mem::replace(&mut self.order, new_order);
        let discarded = self.tombstones;

        for old_idx in old_order {
            if let Slot::Occupied(e) = mem::replace(&mut old_slots[old_idx], Slot::Empty) {
                let idx = self.first_empty(e.hash);
                self.slots[idx] = Slot::Occupied(e);
                self.order.push(idx);
            }
        }

        self.tombstones = 0;
        Ok(discarded)
    }

    // Probe used by rebuild: keys are already distinct and there are no
    // tombstones yet, so the first empty slot is the destination.
    fn first_empty(&self, hash: u32) -> usize {
        let capacity = self.capacity();
        let mut idx = hash as usize % capacity;
        while !matches!(self.slots[idx], Slot::Empty) {
            idx = (idx + 1) % capacity;
        }
        idx
    }

    pub(crate) fn entries(&self) -> Entries<'_, K> {
        Entries {
            order: self.order.iter(),
            slots: &self.slots,
        }
    }

    pub(crate) fn into_entries(self) -> IntoEntries<K> {
        IntoEntries {
            order: self.order.into_iter(),
            slots: self.slots,
        }
    }
}

/// Live entries in insertion order, skipping tombstones.
pub(crate) struct Entries<'a, K> {
    order: core::slice::Iter<'a, usize>,
    slots: &'a [Slot<K>],
}

impl<'a, K> Iterator for Entries<'a, K> {
    type Item = &'a Entry<K>;

    fn next(&mut self) -> Option<Self::Item> {
        for &idx in self.order.by_ref() {
            if let Slot::Occupied(e) = &self.slots[idx] {
                return Some(e);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.order.len()))
    }
}

impl<K> Clone for Entries<'_, K> {
    fn clone(&self) -> Self {
        Entries {
            order: self.order.clone(),
            slots: self.slots,
        }
    }
}

/// Owning counterpart of `Entries`.
pub(crate) struct IntoEntries<K> {
    order: std::vec::IntoIter<usize>,
    slots: Vec<Slot<K>>,
}

impl<K> Iterator for IntoEntries<K> {
    type Item = Entry<K>;

    fn next(&mut self) -> Option<Self::Item> {
        for idx in self.order.by_ref() {
            if let Slot::Occupied(e) = mem::replace(&mut self.slots[idx], Slot::Empty) {
                return Some(e);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.order.len()))
    }
}
