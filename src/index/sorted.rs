//! Sorted (key, rowid) index
//!
//! An append-on-insert array kept ordered by (key asc, rowid asc). Insert and
//! delete binary-search for the position and shift; deleting by key removes
//! the whole contiguous equal-key run. The index does not enforce uniqueness;
//! callers do not insert the same (key, rowid) pair twice.

use crate::iter::IterColumn;
use crate::sortable::{Key, Sortable};

/// One index entry: the column key and the owning row's id.
#[derive(Debug, Clone, PartialEq)]
pub struct Kv {
    /// Index key (the column value)
    pub k: Key,
    /// Owning row id
    pub v: Key,
}

impl Kv {
    /// Builds an entry.
    pub fn new(k: impl Into<Key>, v: impl Into<Key>) -> Self {
        Kv {
            k: k.into(),
            v: v.into(),
        }
    }
}

/// First position whose entry is not ordered before `x` under (k, v).
fn search_kv(kvs: &[Kv], x: &Kv) -> usize {
    let mut i = 0;
    let mut j = kvs.len();
    while i < j {
        let h = (i + j) >> 1;
        if kvs[h].k.sort_less(&x.k) || (kvs[h].k.sort_equal(&x.k) && kvs[h].v.sort_less(&x.v)) {
            i = h + 1;
        } else {
            j = h;
        }
    }
    i
}

/// First position whose key is not less than `x`.
fn search_k(kvs: &[Kv], x: &Key) -> usize {
    let mut i = 0;
    let mut j = kvs.len();
    while i < j {
        let h = (i + j) >> 1;
        if kvs[h].k.sort_less(x) {
            i = h + 1;
        } else {
            j = h;
        }
    }
    i
}

/// A sorted (key, rowid) column index.
#[derive(Debug, Clone, Default)]
pub struct SortedIndex {
    kvs: Vec<Kv>,
}

impl SortedIndex {
    /// Creates an empty index with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        SortedIndex {
            kvs: Vec::with_capacity(capacity),
        }
    }

    /// Inserts an entry at its ordered position.
    ///
    /// Stable for equal keys: ties order by rowid ascending.
    pub fn insert(&mut self, kv: Kv) {
        let idx = search_kv(&self.kvs, &kv);
        self.kvs.insert(idx, kv);
    }

    /// Removes the entry matching both key and rowid.
    ///
    /// An absent pair is a silent no-op.
    pub fn delete(&mut self, kv: &Kv) {
        let idx = search_kv(&self.kvs, kv);
        if idx < self.kvs.len() && self.kvs[idx].k.sort_equal(&kv.k) && self.kvs[idx].v.sort_equal(&kv.v)
        {
            self.kvs.remove(idx);
        }
    }

    /// Removes every entry whose key equals `k`.
    ///
    /// Equal keys are contiguous, so this drops one run.
    pub fn delete_all_for_key(&mut self, k: &Key) {
        let lo = search_k(&self.kvs, k);
        if lo < self.kvs.len() && self.kvs[lo].k.sort_equal(k) {
            let mut hi = lo + 1;
            while hi < self.kvs.len() && self.kvs[hi].k.sort_equal(k) {
                hi += 1;
            }
            self.kvs.drain(lo..hi);
        }
    }

    /// The rowid stored at position `i`.
    pub fn rowid(&self, i: usize) -> &Key {
        &self.kvs[i].v
    }

    /// The rowids of every entry whose key equals `k`, as a sorted column.
    ///
    /// Entries with equal keys are contiguous and tie-broken by rowid
    /// ascending, so the run is itself a sorted id column: the piece that
    /// feeds merge and intersect when combining lookups across columns.
    pub fn ids_for_key(&self, k: &Key) -> IdRun<'_> {
        let lo = search_k(&self.kvs, k);
        let mut hi = lo;
        while hi < self.kvs.len() && self.kvs[hi].k.sort_equal(k) {
            hi += 1;
        }
        IdRun {
            kvs: &self.kvs[lo..hi],
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.kvs.len()
    }

    /// True when the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.kvs.is_empty()
    }
}

/// The rowid side of one equal-key run, viewed as a sorted column.
#[derive(Debug, Clone, Copy)]
pub struct IdRun<'a> {
    kvs: &'a [Kv],
}

impl IterColumn for IdRun<'_> {
    fn key(&self, i: usize) -> Key {
        self.kvs[i].v.clone()
    }

    fn len(&self) -> usize {
        self.kvs.len()
    }
}

impl IterColumn for SortedIndex {
    fn key(&self, i: usize) -> Key {
        self.kvs[i].k.clone()
    }

    fn len(&self) -> usize {
        self.kvs.len()
    }
}
