//! Intersect iterator
//!
//! N-way intersection with optional difference sets. Includes are kept
//! ordered by ascending cardinality so the smallest input drives the probe;
//! differences are kept descending so the most selective exclude is tried
//! first. Pairwise range checks at append time short-circuit provably empty
//! intersections before any input advances.

use crate::iter::IdIterator;
use crate::sortable::{Key, Sortable};

/// N-way intersection with difference sets.
///
/// Emits each key present in every include iterator and absent from every
/// difference iterator, in ascending order. At least one include is required
/// for a non-empty result.
pub struct IntersectIterator<'a> {
    iterators: Vec<Box<dyn IdIterator + 'a>>,
    iterdiffs: Vec<Box<dyn IdIterator + 'a>>,
    currid: Option<Key>,
    not_intersect: bool,
    last_jump: Option<Key>,
    last_jump_ok: bool,
}

impl<'a> IntersectIterator<'a> {
    /// Creates an empty intersection.
    pub fn new() -> Self {
        IntersectIterator {
            iterators: Vec::with_capacity(10),
            iterdiffs: Vec::with_capacity(2),
            currid: None,
            not_intersect: false,
            last_jump: None,
            last_jump_ok: false,
        }
    }

    /// Adds an include iterator; every emitted key must be present in it.
    ///
    /// Inputs must not be advanced after appending: the disjointness gate is
    /// evaluated here and not re-checked later.
    pub fn append(&mut self, iterator: Box<dyn IdIterator + 'a>) {
        let idx = self
            .iterators
            .partition_point(|it| it.cardinality() < iterator.cardinality());
        self.iterators.insert(idx, iterator);

        'check: for (i, it) in self.iterators.iter().enumerate() {
            let Some((imin, imax)) = it.range() else {
                self.not_intersect = true;
                break 'check;
            };
            for other in &self.iterators[i + 1..] {
                let Some((jmin, jmax)) = other.range() else {
                    self.not_intersect = true;
                    break 'check;
                };
                if jmax.sort_less(&imin) || imax.sort_less(&jmin) {
                    self.not_intersect = true;
                    break 'check;
                }
            }
        }
    }

    /// Adds a difference iterator; keys present in it are excluded.
    pub fn append_diff(&mut self, iterator: Box<dyn IdIterator + 'a>) {
        let idx = self
            .iterdiffs
            .partition_point(|it| it.cardinality() > iterator.cardinality());
        self.iterdiffs.insert(idx, iterator);
    }

    /// Number of include iterators.
    pub fn size(&self) -> usize {
        self.iterators.len()
    }

    /// Number of difference iterators.
    pub fn size_diffs(&self) -> usize {
        self.iterdiffs.len()
    }

    /// The n-th include iterator, in cardinality order.
    pub fn iter(&self, n: usize) -> &dyn IdIterator {
        self.iterators[n].as_ref()
    }

    /// The n-th difference iterator, in cardinality order.
    pub fn iter_diff(&self, n: usize) -> &dyn IdIterator {
        self.iterdiffs[n].as_ref()
    }
}

impl Default for IntersectIterator<'_> {
    fn default() -> Self {
        IntersectIterator::new()
    }
}

impl Clone for IntersectIterator<'_> {
    fn clone(&self) -> Self {
        IntersectIterator {
            iterators: self.iterators.iter().map(|i| i.boxed_clone()).collect(),
            iterdiffs: self.iterdiffs.iter().map(|i| i.boxed_clone()).collect(),
            currid: self.currid.clone(),
            not_intersect: self.not_intersect,
            last_jump: self.last_jump.clone(),
            last_jump_ok: self.last_jump_ok,
        }
    }
}

impl IntersectIterator<'_> {
    /// Walks the includes until they agree on a key that no difference
    /// contains. With `advance` set, every include steps forward first;
    /// without it, the walk starts from the current positions (used after a
    /// seek so the landed candidate is not consumed).
    fn converge(&mut self, mut advance: bool) -> bool {
        'retry: loop {
            if advance {
                for it in &mut self.iterators {
                    if !it.has_next() {
                        return false;
                    }
                }
            }
            advance = true;

            let mut cmp = self.iterators[0].next_id();
            let mut i = 1;
            loop {
                if i >= self.iterators.len() {
                    // candidate agreed by every include; apply excludes
                    for d in &mut self.iterdiffs {
                        if d.jump_to(&cmp) && d.next_id().sort_equal(&cmp) {
                            continue 'retry;
                        }
                    }
                    self.currid = Some(cmp);
                    return true;
                }

                let v = self.iterators[i].next_id();
                if v.sort_equal(&cmp) {
                    i += 1;
                } else if cmp.sort_less(&v) {
                    // the driver is behind; advance it to v
                    if !self.iterators[0].jump_to(&v) {
                        return false;
                    }
                    cmp = self.iterators[0].next_id();
                    i = 1;
                } else {
                    // v < cmp
                    if !self.iterators[i].jump_to(&cmp) {
                        return false;
                    }
                }
            }
        }
    }
}

impl IdIterator for IntersectIterator<'_> {
    fn has_next(&mut self) -> bool {
        if self.not_intersect || self.iterators.is_empty() {
            return false;
        }
        self.converge(true)
    }

    fn next_id(&self) -> Key {
        self.currid
            .clone()
            .expect("next_id before a successful has_next")
    }

    fn jump_to(&mut self, target: &Key) -> bool {
        if let Some(last) = &self.last_jump {
            if last.sort_equal(target) {
                return self.last_jump_ok;
            }
        }
        self.last_jump = Some(target.clone());

        if self.not_intersect || self.iterators.is_empty() {
            self.last_jump_ok = false;
            return false;
        }

        let mut diverged = false;
        let mut eqid: Option<Key> = None;

        for it in self.iterators.iter_mut() {
            if !it.jump_to(target) {
                self.last_jump_ok = false;
                return false;
            }
            if let Some(first) = &eqid {
                if !diverged && !it.next_id().sort_equal(first) {
                    diverged = true;
                }
            } else {
                eqid = Some(it.next_id());
            }
        }
        let eqid = eqid.expect("at least one include iterator");

        for d in &mut self.iterdiffs {
            if !diverged && d.jump_to(&eqid) && d.next_id().sort_equal(&eqid) {
                diverged = true;
            }
        }

        if diverged {
            // resume the walk from the landed positions so the smallest
            // agreeing key at or past the target is still found
            let ok = self.converge(false);
            self.last_jump_ok = ok;
            return ok;
        }

        self.currid = Some(eqid);
        self.last_jump_ok = true;
        true
    }

    fn range(&self) -> Option<(Key, Key)> {
        self.iterators.first().and_then(|it| it.range())
    }

    fn cardinality(&self) -> usize {
        self.iterators.first().map_or(0, |it| it.cardinality())
    }

    fn boxed_clone<'b>(&self) -> Box<dyn IdIterator + 'b>
    where
        Self: 'b,
    {
        Box::new(self.clone())
    }
}
