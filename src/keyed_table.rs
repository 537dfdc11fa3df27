//! KeyedTable: chained hash table from raw byte keys to caller-owned value handles.

use crate::hash::bucket_index;
use log::{debug, trace};
use slotmap::{new_key_type, SlotMap};
use std::collections::TryReserveError;
use thiserror::Error;

/// Slot count used by [`KeyedTable::new`].
pub const DEFAULT_SLOTS: usize = 16;

// Growth triggers once `len / slots > LOAD_NUMERATOR / LOAD_DENOMINATOR`.
pub(crate) const LOAD_NUMERATOR: usize = 3;
pub(crate) const LOAD_DENOMINATOR: usize = 4;

new_key_type! {
    /// Arena key of one chained entry.
    struct EntryKey;
}

#[derive(Debug)]
struct Entry<V> {
    key: Box<[u8]>,
    value: V,
    next: Option<EntryKey>,
}

impl<V> Entry<V> {
    // Compared over the caller's key length, not the stored one.
    #[inline]
    fn matches(&self, key: &[u8]) -> bool {
        self.key.get(..key.len()) == Some(key)
    }
}

/// Allocation failure while creating or growing a table.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("failed to allocate {what}")]
    Alloc {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },
    #[error("slot count {slots} cannot be doubled")]
    CapacityOverflow { slots: usize },
}

/// Chained hash table keyed by byte strings.
///
/// Values are handles of type `V` chosen by the caller (an index, an id, a
/// slotmap key, ...). The table copies and stores handles but never owns what
/// they refer to; disposing of the value behind a removed handle is up to the
/// caller.
///
/// Key equality is byte comparison over the length of the key passed to each
/// call. Always pass a logical key with the same length it was inserted with:
/// a stored key whose leading bytes equal a shorter query, and which lands in
/// the same bucket, is reported as a match.
#[derive(Debug)]
pub struct KeyedTable<V> {
    slots: Vec<Option<EntryKey>>,
    entries: SlotMap<EntryKey, Entry<V>>, // chain nodes, linked by key
}

impl<V> KeyedTable<V> {
    /// Create an empty table with [`DEFAULT_SLOTS`] buckets.
    pub fn new() -> Self {
        Self::from_slots(vec![None; DEFAULT_SLOTS])
    }

    /// Create an empty table with `initial_slots` buckets.
    ///
    /// Zero is rounded up to a single bucket. Fails if the bucket array cannot
    /// be allocated.
    pub fn with_slots(initial_slots: usize) -> Result<Self, TableError> {
        Ok(Self::from_slots(empty_slots(initial_slots.max(1))?))
    }

    fn from_slots(slots: Vec<Option<EntryKey>>) -> Self {
        trace!("created keyed table with {} slots", slots.len());
        Self {
            slots,
            entries: SlotMap::with_key(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current number of buckets.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.slot_count() as f64
    }

    /// Length of the longest bucket chain.
    pub fn longest_chain(&self) -> usize {
        (0..self.slots.len())
            .map(|i| self.chain(i).count())
            .max()
            .unwrap_or(0)
    }

    /// Insert or update `key`.
    ///
    /// Returns the displaced handle when `key` was already present (an update
    /// never grows the table), or `None` for a new key. After a new key is
    /// linked, the bucket array doubles whenever the entry count exceeds three
    /// quarters of the slot count. On error the table is left unchanged.
    pub fn insert(&mut self, key: &[u8], value: V) -> Result<Option<V>, TableError> {
        if let Some(k) = self.find(key) {
            let old = std::mem::replace(&mut self.entries[k].value, value);
            return Ok(Some(old));
        }

        // Reserve everything up front so a failure mutates nothing.
        let grown = if self.exceeds_load(self.entries.len() + 1) {
            let slots = self.slots.len();
            let doubled = slots
                .checked_mul(2)
                .ok_or(TableError::CapacityOverflow { slots })?;
            Some(empty_slots(doubled)?)
        } else {
            None
        };
        let mut owned = Vec::new();
        owned
            .try_reserve_exact(key.len())
            .map_err(|source| TableError::Alloc {
                what: "key copy",
                source,
            })?;
        owned.extend_from_slice(key);

        let idx = bucket_index(key, self.slots.len());
        let k = self.entries.insert(Entry {
            key: owned.into_boxed_slice(),
            value,
            next: self.slots[idx],
        });
        self.slots[idx] = Some(k);

        if let Some(new_slots) = grown {
            self.rehash(new_slots);
        }
        Ok(None)
    }

    /// Handle stored under `key`, if any.
    pub fn get(&self, key: &[u8]) -> Option<V>
    where
        V: Copy,
    {
        self.find(key).map(|k| self.entries[k].value)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        let k = self.find(key)?;
        self.entries.get_mut(k).map(|e| &mut e.value)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.find(key).is_some()
    }

    /// Unlink and release the entry for `key`, returning its handle.
    ///
    /// Absent keys are a no-op. The bucket array never shrinks.
    pub fn remove(&mut self, key: &[u8]) -> Option<V> {
        let idx = bucket_index(key, self.slots.len());
        let mut prev: Option<EntryKey> = None;
        let mut cur = self.slots[idx];
        while let Some(k) = cur {
            let entry = &self.entries[k];
            if entry.matches(key) {
                let next = entry.next;
                match prev {
                    None => self.slots[idx] = next,
                    Some(p) => self.entries[p].next = next,
                }
                return self.entries.remove(k).map(|e| e.value);
            }
            prev = cur;
            cur = entry.next;
        }
        None
    }

    /// Release every entry, keeping the current slot count.
    pub fn clear(&mut self) {
        trace!("clearing {} entries", self.entries.len());
        self.entries.clear();
        self.slots.fill(None);
    }

    /// Release all entries and the bucket array. Values are left untouched.
    ///
    /// Equivalent to dropping the table.
    pub fn destroy(self) {
        trace!(
            "destroying keyed table with {} entries in {} slots",
            self.entries.len(),
            self.slots.len()
        );
    }

    /// Iterate `(key, handle)` pairs in unspecified order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            it: self.entries.iter(),
        }
    }

    fn find(&self, key: &[u8]) -> Option<EntryKey> {
        let idx = bucket_index(key, self.slots.len());
        self.chain(idx).find(|&k| self.entries[k].matches(key))
    }

    fn chain(&self, idx: usize) -> Chain<'_, V> {
        Chain {
            entries: &self.entries,
            cur: self.slots[idx],
        }
    }

    fn exceeds_load(&self, entries: usize) -> bool {
        entries.saturating_mul(LOAD_DENOMINATOR) > self.slots.len().saturating_mul(LOAD_NUMERATOR)
    }

    // Relinks every entry by key into `new_slots`; no entry is copied.
    fn rehash(&mut self, new_slots: Vec<Option<EntryKey>>) {
        let old = std::mem::replace(&mut self.slots, new_slots);
        let (old_len, n) = (old.len(), self.slots.len());
        for head in old {
            let mut cur = head;
            while let Some(k) = cur {
                let entry = &mut self.entries[k];
                cur = entry.next;
                let idx = bucket_index(&entry.key, n);
                entry.next = self.slots[idx];
                self.slots[idx] = Some(k);
            }
        }
        debug!(
            "grew keyed table from {} to {} slots ({} entries)",
            old_len,
            n,
            self.entries.len()
        );
    }

    /// Panics if any structural invariant is broken.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let mut seen = 0usize;
        for i in 0..self.slots.len() {
            for k in self.chain(i) {
                let entry = &self.entries[k];
                assert_eq!(
                    bucket_index(&entry.key, self.slots.len()),
                    i,
                    "entry {:?} chained under the wrong slot",
                    entry.key
                );
                seen += 1;
            }
        }
        assert_eq!(seen, self.entries.len(), "unreachable or doubly linked entries");
        assert!(
            !self.exceeds_load(self.entries.len()),
            "load factor above threshold: {} entries in {} slots",
            self.entries.len(),
            self.slots.len()
        );
    }
}

impl<V> Default for KeyedTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn empty_slots(n: usize) -> Result<Vec<Option<EntryKey>>, TableError> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(n)
        .map_err(|source| TableError::Alloc {
            what: "bucket array",
            source,
        })?;
    slots.resize(n, None);
    Ok(slots)
}

/// Walks one bucket's chain, yielding entry keys.
struct Chain<'a, V> {
    entries: &'a SlotMap<EntryKey, Entry<V>>,
    cur: Option<EntryKey>,
}

impl<'a, V> Iterator for Chain<'a, V> {
    type Item = EntryKey;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.cur?;
        self.cur = self.entries[k].next;
        Some(k)
    }
}

/// Iterator over `(key, handle)` pairs of a `KeyedTable`.
pub struct Iter<'a, V> {
    it: slotmap::basic::Iter<'a, EntryKey, Entry<V>>,
}

impl<'a, V: Copy> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key[..], e.value))
    }
}
