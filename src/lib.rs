//! keyed-table: a single-threaded, chained hash table from raw byte keys
//! to caller-owned value handles.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small, reusable associative container whose only real
//!   decisions are the hash function, chaining and load-factor growth.
//! - Layers:
//!   - `hash`: 32-bit Murmur3 (seed 0) and reduction to a bucket index.
//!   - `KeyedTable<V>`: bucket array of chain heads plus an entry arena;
//!     insert/update, get, remove, clear and destroy.
//!
//! Storage
//! - Entries live in a `SlotMap` arena (free list, generational keys).
//!   Bucket heads and chain links are arena keys, so unlinking or
//!   rehoming an entry can never leave a dangling link behind.
//! - Each entry owns a copy of its key bytes.
//! - Values are handles of a caller-chosen `Copy` type. The table never
//!   owns or drops what a handle refers to.
//!
//! Growth
//! - After a new key is linked, the bucket array doubles when
//!   `4 * len > 3 * slots`. Every entry is relinked into the new array by
//!   key, recomputing its bucket from its own stored bytes.
//! - Updates never grow; removals never shrink.
//! - All fallible allocations of an insert (grown bucket array, key copy)
//!   are reserved before the table is touched, so a failed insert leaves
//!   the table unchanged.
//!
//! Key comparison
//! - A stored key matches when its leading `query.len()` bytes equal the
//!   query. Callers must use one length per logical key; a mismatched
//!   length is a silent miss (or a prefix hit within one bucket), never an
//!   error.
//!
//! Notes and non-goals
//! - Single-threaded: mutation takes `&mut self`; sharing across threads
//!   needs external locking.
//! - No shrink on delete, no custom hashers, no ordered iteration, no
//!   resistance to adversarial keys.
//! - The library logs through the `log` facade (creation, growth,
//!   destruction) and installs no logger itself.

pub mod hash;
pub mod keyed_table;
mod keyed_table_proptest;

// Public surface
pub use hash::{bucket_index, murmur3_32};
pub use keyed_table::{Iter, KeyedTable, TableError, DEFAULT_SLOTS};
