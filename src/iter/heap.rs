//! Min-heap over (key, input index) entries
//!
//! Backs the merge iterator. The top entry's key can be replaced in place,
//! which re-sifts once instead of popping and pushing.

use crate::sortable::{Key, Sortable};

/// One heap entry: the input's current key and its position in the merge's
/// input vector.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub key: Key,
    pub input: usize,
}

/// Binary min-heap keyed by sortable order.
#[derive(Debug, Clone, Default)]
pub(crate) struct MinHeap {
    elems: Vec<Entry>,
}

impl MinHeap {
    pub fn with_capacity(capacity: usize) -> Self {
        MinHeap {
            elems: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn clear(&mut self) {
        self.elems.clear();
    }

    pub fn peek(&self) -> Option<&Entry> {
        self.elems.first()
    }

    pub fn push(&mut self, key: Key, input: usize) {
        self.elems.push(Entry { key, input });
        self.sift_up(self.elems.len() - 1);
    }

    pub fn pop(&mut self) -> Option<Entry> {
        if self.elems.is_empty() {
            return None;
        }
        let last = self.elems.len() - 1;
        self.elems.swap(0, last);
        let top = self.elems.pop();
        if !self.elems.is_empty() {
            self.sift_down(0);
        }
        top
    }

    /// Replaces the top entry's key and restores heap order with one sift.
    pub fn replace_top(&mut self, key: Key) {
        self.elems[0].key = key;
        self.sift_down(0);
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.elems[i].key.sort_less(&self.elems[parent].key) {
                self.elems.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.elems.len();
        loop {
            let left = 2 * i + 1;
            if left >= n {
                break;
            }
            let mut smallest = left;
            let right = left + 1;
            if right < n && self.elems[right].key.sort_less(&self.elems[left].key) {
                smallest = right;
            }
            if self.elems[smallest].key.sort_less(&self.elems[i].key) {
                self.elems.swap(i, smallest);
                i = smallest;
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap_of(keys: &[&str]) -> MinHeap {
        let mut heap = MinHeap::with_capacity(keys.len());
        for (i, k) in keys.iter().enumerate() {
            heap.push(Key::from(*k), i);
        }
        heap
    }

    #[test]
    fn test_pop_order() {
        let mut heap = heap_of(&["m", "a", "z", "f"]);
        let mut out = Vec::new();
        while let Some(e) = heap.pop() {
            out.push(e.key.to_string());
        }
        assert_eq!(out, vec!["a", "f", "m", "z"]);
    }

    #[test]
    fn test_replace_top_resifts() {
        let mut heap = heap_of(&["a", "b", "c"]);
        heap.replace_top(Key::from("z"));
        assert_eq!(heap.peek().unwrap().key, Key::from("b"));
        assert_eq!(heap.len(), 3);
    }

    #[test]
    fn test_empty_pop() {
        let mut heap = MinHeap::default();
        assert!(heap.pop().is_none());
        assert!(heap.is_empty());
    }
}
