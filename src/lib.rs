//! byte-map: a single-threaded, insertion-ordered open-addressing hash
//! table from byte-sequence keys to word-sized (`usize`) values.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: fast associative lookup over arbitrary byte keys without the
//!   table ever copying key bytes.
//! - Layers:
//!   - `fingerprint`: deterministic 32-bit hash over a byte slice. Its
//!     output is fixed; slot placement depends on it.
//!   - `SlotTable<K>`: structural layer. A flat array of tri-state slots
//!     (`Empty`/`Occupied`/`Tombstone`), linear-probing resolution, an
//!     explicit insertion-order list of slot indices, and the rebuild used
//!     by growth.
//!   - `ByteMap<K>`: public API. Hashes keys, applies the load-factor
//!     policy and implements insert/get-or-insert/soft-insert/remove and
//!     ordered iteration.
//!
//! Constraints
//! - Single-threaded: no internal locking. `ByteMap<K>` is `Send`/`Sync`
//!   when `K` is; wrap it in a `Mutex` to share mutation.
//! - Values are plain `usize` words. No value is reserved as a marker:
//!   slot state is an explicit enum.
//! - Capacity is always at least one slot and never shrinks.
//!
//! Key ownership
//! - Keys are any `K: AsRef<[u8]>` and are stored as given, never copied.
//!   Borrowed keys (`&[u8]`, `&str`) are tied to the table's lifetime by
//!   the borrow checker, so a key cannot be freed while the table can
//!   still read it. Owned keys (`Vec<u8>`, `Box<[u8]>`) are handed back on
//!   removal, eviction or consuming iteration.
//!
//! Resolution and tombstones
//! - Every key operation probes linearly from `hash % capacity` and stops
//!   at the matching entry or at the first `Empty` slot. Equal hashes are
//!   only a pre-filter; bytes are always compared.
//! - Removal turns a slot into a `Tombstone`. Tombstones keep probe chains
//!   intact and are never reused in place; they count toward the load
//!   factor and are discarded by the next growth.
//!
//! Growth
//! - Before any insert-family operation, if `live + 1 > 3/4 * capacity`
//!   (live counts tombstones) the capacity doubles. Survivors are moved,
//!   not rehashed: the cached fingerprint picks the new slot, and the
//!   insertion order of survivors is preserved.
//! - `try_*` operations reserve the new buffers first and return
//!   `AllocError` with the table unchanged on failure. The plain forms
//!   behave like `std` collections (panic on overflow, abort on OOM).
//!
//! Iteration
//! - Entries are visited in first-insertion order. Overwriting a value
//!   keeps the position; removing and re-inserting a key moves it to the
//!   end. Iterators borrow the table, so it cannot be mutated mid-walk.

mod byte_map;
mod byte_map_proptest;
mod error;
mod fingerprint;
mod slot_table;

// Public surface
pub use byte_map::{ByteMap, GetOrInsert, IntoIter, Iter, DEFAULT_CAPACITY};
pub use error::AllocError;
pub use fingerprint::fingerprint;
