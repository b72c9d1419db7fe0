//! Merge iterator
//!
//! K-way union of sorted iterators driven by a min-heap; equal keys arriving
//! from multiple inputs are emitted once. Cardinality is the largest input's
//! (an estimate; cross-input duplicates are unknown without scanning).

use crate::iter::heap::MinHeap;
use crate::iter::IdIterator;
use crate::sortable::{Key, Sortable};

/// Deduplicating k-way union of sorted iterators.
pub struct MergeIterator<'a> {
    inputs: Vec<Box<dyn IdIterator + 'a>>,
    heap: MinHeap,
    currid: Option<Key>,
    cardinality: usize,
    min: Option<Key>,
    max: Option<Key>,
    last_jump: Option<Key>,
    last_jump_ok: bool,
}

impl<'a> MergeIterator<'a> {
    /// Builds a union over the given inputs.
    ///
    /// # Panics
    ///
    /// Panics when `inputs` is empty; a merge over nothing is a programmer
    /// error.
    pub fn new(mut inputs: Vec<Box<dyn IdIterator + 'a>>) -> Self {
        assert!(!inputs.is_empty(), "merge requires at least one input");

        let mut heap = MinHeap::with_capacity(inputs.len());
        let mut cardinality = 0;
        let mut min: Option<Key> = None;
        let mut max: Option<Key> = None;

        for (i, input) in inputs.iter_mut().enumerate() {
            if let Some((lo, hi)) = input.range() {
                if min.as_ref().map_or(true, |m| lo.sort_less(m)) {
                    min = Some(lo);
                }
                if max.as_ref().map_or(true, |m| m.sort_less(&hi)) {
                    max = Some(hi);
                }
            }
            cardinality = cardinality.max(input.cardinality());
            if input.has_next() {
                heap.push(input.next_id(), i);
            }
        }

        MergeIterator {
            inputs,
            heap,
            currid: None,
            cardinality,
            min,
            max,
            last_jump: None,
            last_jump_ok: false,
        }
    }
}

impl Clone for MergeIterator<'_> {
    fn clone(&self) -> Self {
        MergeIterator {
            inputs: self.inputs.iter().map(|i| i.boxed_clone()).collect(),
            heap: self.heap.clone(),
            currid: self.currid.clone(),
            cardinality: self.cardinality,
            min: self.min.clone(),
            max: self.max.clone(),
            last_jump: self.last_jump.clone(),
            last_jump_ok: self.last_jump_ok,
        }
    }
}

impl IdIterator for MergeIterator<'_> {
    fn has_next(&mut self) -> bool {
        while let Some(top) = self.heap.peek() {
            let key = top.key.clone();
            let input = top.input;

            let duplicate = matches!(&self.currid, Some(curr) if key.sort_equal(curr));
            if !duplicate {
                self.currid = Some(key);
                return true;
            }
            // duplicate of the previously emitted key
            if self.inputs[input].has_next() {
                let next = self.inputs[input].next_id();
                self.heap.replace_top(next);
            } else {
                self.heap.pop();
            }
        }
        false
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

        self.heap.clear();
        let mut ok = false;
        for (i, input) in self.inputs.iter_mut().enumerate() {
            if input.jump_to(target) {
                ok = true;
                self.heap.push(input.next_id(), i);
            }
        }

        self.currid = if ok {
            self.heap.peek().map(|e| e.key.clone())
        } else {
            None
        };
        self.last_jump_ok = ok;
        ok
    }

    fn range(&self) -> Option<(Key, Key)> {
        match (&self.min, &self.max) {
            (Some(lo), Some(hi)) => Some((lo.clone(), hi.clone())),
            _ => None,
        }
    }

    fn cardinality(&self) -> usize {
        self.cardinality
    }

    fn boxed_clone<'b>(&self) -> Box<dyn IdIterator + 'b>
    where
        Self: 'b,
    {
        Box::new(self.clone())
    }
}
