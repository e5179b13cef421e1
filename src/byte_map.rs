//! ByteMap: public API over `SlotTable`. Hashes keys, applies the growth
//! policy and exposes the insert/remove variants.

use crate::error::AllocError;
use crate::fingerprint::fingerprint;
use crate::slot_table::{handle_alloc_failure, Entries, Entry, IntoEntries, SlotTable};
use core::fmt;
use core::mem;

/// Slot count of a table created with [`ByteMap::new`].
pub const DEFAULT_CAPACITY: usize = 30;

// Grow once (live + 1) / capacity would exceed 3/4.
const LOAD_NUMERATOR: usize = 3;
const LOAD_DENOMINATOR: usize = 4;
const GROWTH_FACTOR: usize = 2;

/// Outcome of [`ByteMap::get_or_insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetOrInsert {
    /// The key was present; the table is unchanged.
    Existing(usize),
    /// The key was absent and has been inserted with this value.
    Inserted(usize),
}

impl GetOrInsert {
    /// `true` when the key was already present.
    pub fn found(self) -> bool {
        matches!(self, GetOrInsert::Existing(_))
    }

    /// The value now stored under the key.
    pub fn value(self) -> usize {
        match self {
            GetOrInsert::Existing(v) | GetOrInsert::Inserted(v) => v,
        }
    }
}

/// An insertion-ordered, open-addressing hash table from byte keys to
/// word-sized values.
///
/// `K` is anything that exposes its bytes through `AsRef<[u8]>`. Keys are
/// never copied: with `K = &[u8]` or `&str` the table borrows them and the
/// borrow checker ties their lifetime to the table's; with `Vec<u8>` or
/// `Box<[u8]>` it takes ownership.
///
/// Removal leaves a tombstone that is only reclaimed when the table grows,
/// and growth is triggered by live entries *plus* tombstones exceeding 3/4
/// of the capacity. Capacity never shrinks.
pub struct ByteMap<K> {
    table: SlotTable<K>,
}

impl<K> ByteMap<K>
where
    K: AsRef<[u8]>,
{
    /// Empty table with [`DEFAULT_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn try_new() -> Result<Self, AllocError> {
        Self::try_with_capacity(DEFAULT_CAPACITY)
    }

    /// Empty table with `capacity` slots (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity(capacity).unwrap_or_else(|e| handle_alloc_failure::<K>(e))
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self, AllocError> {
        let capacity = capacity.max(1);
        let table = SlotTable::try_with_capacity(capacity)?;
        log::trace!("byte map created with {} slots", capacity);
        Ok(Self { table })
    }

    /// Number of entries visible to lookups.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current slot count.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Removed entries still occupying slots until the next growth.
    #[inline]
    pub fn tombstones(&self) -> usize {
        self.table.tombstones()
    }

    pub fn get(&self, key: &[u8]) -> Option<usize> {
        let hash = fingerprint(key);
        let idx = self.table.resolve(key, hash);
        self.table.entry(idx).map(|e| e.value)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    fn needs_growth(&self) -> bool {
        (self.table.live() + 1).saturating_mul(LOAD_DENOMINATOR)
            > self.capacity().saturating_mul(LOAD_NUMERATOR)
    }

    fn try_reserve_one(&mut self) -> Result<(), AllocError> {
        if self.needs_growth() {
            self.try_resize()?;
        }
        Ok(())
    }

    /// Double the capacity, discarding tombstones. On error the table is
    /// left as it was.
    pub fn try_resize(&mut self) -> Result<(), AllocError> {
        let old_capacity = self.capacity();
        let new_capacity = old_capacity
            .checked_mul(GROWTH_FACTOR)
            .ok_or(AllocError::CapacityOverflow)?;
        match self.table.try_rebuild(new_capacity) {
            Ok(discarded) => {
                log::debug!(
                    "byte map grew from {} to {} slots, {} tombstones discarded",
                    old_capacity,
                    new_capacity,
                    discarded
                );
                Ok(())
            }
            Err(e) => {
                log::warn!("byte map failed to grow to {} slots: {}", new_capacity, e);
                Err(e)
            }
        }
    }

    /// Double the capacity, discarding tombstones. Also runs automatically
    /// from the insert family.
    ///
    /// # Panics
    /// On capacity overflow. Allocation failure aborts, as for `Vec`.
    pub fn resize(&mut self) {
        if let Err(e) = self.try_resize() {
            handle_alloc_failure::<K>(e)
        }
    }

    /// Insert or overwrite. Returns the previous value if the key was
    /// present; its stored key is kept and `key` is dropped.
    pub fn insert(&mut self, key: K, value: usize) -> Option<usize> {
        self.try_insert(key, value)
            .unwrap_or_else(|e| handle_alloc_failure::<K>(e))
    }

    pub fn try_insert(&mut self, key: K, value: usize) -> Result<Option<usize>, AllocError> {
        self.try_reserve_one()?;
        let hash = fingerprint(key.as_ref());
        let idx = self.table.resolve(key.as_ref(), hash);
        match self.table.entry_mut(idx) {
            Some(entry) => Ok(Some(mem::replace(&mut entry.value, value))),
            None => {
                self.table.occupy(idx, Entry { key, hash, value });
                Ok(None)
            }
        }
    }

    /// Return the stored value if `key` is present, otherwise insert
    /// `value`.
    pub fn get_or_insert(&mut self, key: K, value: usize) -> GetOrInsert {
        self.try_get_or_insert(key, value)
            .unwrap_or_else(|e| handle_alloc_failure::<K>(e))
    }

    pub fn try_get_or_insert(&mut self, key: K, value: usize) -> Result<GetOrInsert, AllocError> {
        self.try_reserve_one()?;
        let hash = fingerprint(key.as_ref());
        let idx = self.table.resolve(key.as_ref(), hash);
        if let Some(entry) = self.table.entry(idx) {
            return Ok(GetOrInsert::Existing(entry.value));
        }
        self.table.occupy(idx, Entry { key, hash, value });
        Ok(GetOrInsert::Inserted(value))
    }

    /// Insert or replace both key and value, handing back the replaced
    /// pair so the caller can release whatever it referred to.
    pub fn soft_insert_evicted(&mut self, key: K, value: usize) -> Option<(K, usize)> {
        self.try_soft_insert_evicted(key, value)
            .unwrap_or_else(|e| handle_alloc_failure::<K>(e))
    }

    pub fn try_soft_insert_evicted(
        &mut self,
        key: K,
        value: usize,
    ) -> Result<Option<(K, usize)>, AllocError> {
        self.try_reserve_one()?;
        let hash = fingerprint(key.as_ref());
        let idx = self.table.resolve(key.as_ref(), hash);
        match self.table.entry_mut(idx) {
            Some(entry) => {
                let old_key = mem::replace(&mut entry.key, key);
                let old_value = mem::replace(&mut entry.value, value);
                Ok(Some((old_key, old_value)))
            }
            None => {
                self.table.occupy(idx, Entry { key, hash, value });
                Ok(None)
            }
        }
    }

    /// Like [`insert`](Self::insert), but a replaced entry is passed to
    /// `evict` exactly once. `evict` is not called for a new key.
    pub fn soft_insert<F>(&mut self, key: K, value: usize, evict: F)
    where
        F: FnOnce(K, usize),
    {
        if let Some((old_key, old_value)) = self.soft_insert_evicted(key, value) {
            evict(old_key, old_value);
        }
    }

    /// Remove `key`, returning its entry. Absent keys are a no-op.
    pub fn remove(&mut self, key: &[u8]) -> Option<(K, usize)> {
        let hash = fingerprint(key);
        let idx = self.table.resolve(key, hash);
        self.table.bury(idx).map(|e| (e.key, e.value))
    }

    /// Remove `key` and pass the removed entry to `f`. `f` is not called
    /// when the key is absent, and runs after the table is consistent.
    pub fn remove_with<F>(&mut self, key: &[u8], f: F)
    where
        F: FnOnce(K, usize),
    {
        if let Some((k, v)) = self.remove(key) {
            f(k, v);
        }
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.table.entries(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Visit every entry in first-insertion order.
    pub fn for_each_entry<F>(&self, mut visit: F)
    where
        F: FnMut(&K, usize),
    {
        for (k, v) in self.iter() {
            visit(k, v);
        }
    }
}

impl<K> Default for ByteMap<K>
where
    K: AsRef<[u8]>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for ByteMap<K>
where
    K: AsRef<[u8]> + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K> Extend<(K, usize)> for ByteMap<K>
where
    K: AsRef<[u8]>,
{
    fn extend<I: IntoIterator<Item = (K, usize)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K> FromIterator<(K, usize)> for ByteMap<K>
where
    K: AsRef<[u8]>,
{
    fn from_iter<I: IntoIterator<Item = (K, usize)>>(iter: I) -> Self {
        let mut map = ByteMap::new();
        map.extend(iter);
        map
    }
}

/// Iterator over `(key, value)` in first-insertion order.
pub struct Iter<'a, K> {
    inner: Entries<'a, K>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = (&'a K, usize);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (&e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K> IntoIterator for &'a ByteMap<K>
where
    K: AsRef<[u8]>,
{
    type Item = (&'a K, usize);
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator over `(key, value)` in first-insertion order.
pub struct IntoIter<K> {
    inner: IntoEntries<K>,
}

impl<K> Iterator for IntoIter<K> {
    type Item = (K, usize);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> IntoIterator for ByteMap<K>
where
    K: AsRef<[u8]>,
{
    type Item = (K, usize);
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_entries(),
        }
    }
}
