//! Column-scan iterator
//!
//! Forward cursor over one sorted column with an optional skip predicate and
//! binary-search seek. The skip predicate is shared between clones.

use std::rc::Rc;

use crate::iter::{IdIterator, IterColumn};
use crate::sortable::{Key, Sortable};

type SkipFn<'a> = dyn Fn(&Key) -> bool + 'a;

/// Forward cursor over a sorted column.
pub struct ColumnIterator<'a> {
    col: &'a dyn IterColumn,
    /// Position last emitted; `None` before the first `has_next`.
    pos: Option<usize>,
    min: usize,
    end: usize,
    skip: Option<Rc<SkipFn<'a>>>,
    last_jump: Option<Key>,
    last_jump_ok: bool,
}

impl<'a> ColumnIterator<'a> {
    /// Creates a cursor over the whole column.
    pub fn new(col: &'a dyn IterColumn) -> Self {
        ColumnIterator {
            col,
            pos: None,
            min: 0,
            end: col.len(),
            skip: None,
            last_jump: None,
            last_jump_ok: false,
        }
    }

    /// Creates a cursor that skips keys matching the predicate.
    pub fn with_skip(col: &'a dyn IterColumn, skip: impl Fn(&Key) -> bool + 'a) -> Self {
        let mut iter = ColumnIterator::new(col);
        iter.skip = Some(Rc::new(skip));
        iter
    }

    fn key_at(&self, i: usize) -> Key {
        self.col.key(i)
    }
}

impl Clone for ColumnIterator<'_> {
    fn clone(&self) -> Self {
        ColumnIterator {
            col: self.col,
            pos: self.pos,
            min: self.min,
            end: self.end,
            skip: self.skip.clone(),
            last_jump: self.last_jump.clone(),
            last_jump_ok: self.last_jump_ok,
        }
    }
}

impl IdIterator for ColumnIterator<'_> {
    fn has_next(&mut self) -> bool {
        let mut next = match self.pos {
            None => self.min,
            Some(p) => p + 1,
        };
        while next < self.end {
            let key = self.key_at(next);
            if let Some(skip) = self.skip.as_deref() {
                if skip(&key) {
                    next += 1;
                    continue;
                }
            }
            self.pos = Some(next);
            // a successful step doubles as a jump memo for this key
            self.last_jump = Some(key);
            self.last_jump_ok = true;
            return true;
        }
        false
    }

    fn next_id(&self) -> Key {
        let pos = self.pos.expect("next_id before a successful has_next");
        self.key_at(pos)
    }

    fn jump_to(&mut self, target: &Key) -> bool {
        if let Some(last) = &self.last_jump {
            if last.sort_equal(target) {
                return self.last_jump_ok;
            }
        }
        self.last_jump = Some(target.clone());

        if self.min >= self.end {
            self.last_jump_ok = false;
            return false;
        }
        if target.sort_less(&self.key_at(self.min)) || self.key_at(self.end - 1).sort_less(target) {
            self.last_jump_ok = false;
            return false;
        }
        if let Some(p) = self.pos {
            if self.key_at(p).sort_equal(target) {
                self.last_jump_ok = true;
                return true;
            }
        }

        // lower bound: first position whose key is not less than target
        let mut i = self.min;
        let mut j = self.end;
        while i < j {
            let h = (i + j) >> 1;
            if self.key_at(h).sort_less(target) {
                i = h + 1;
            } else {
                j = h;
            }
        }

        self.pos = if i == self.min { None } else { Some(i - 1) };
        self.last_jump_ok = self.has_next();
        self.last_jump_ok
    }

    fn range(&self) -> Option<(Key, Key)> {
        if self.min >= self.end {
            return None;
        }
        let a = self.key_at(self.min);
        let b = self.key_at(self.end - 1);
        if b.sort_less(&a) {
            Some((b, a))
        } else {
            Some((a, b))
        }
    }

    fn cardinality(&self) -> usize {
        self.end - self.min
    }

    fn boxed_clone<'b>(&self) -> Box<dyn IdIterator + 'b>
    where
        Self: 'b,
    {
        Box::new(self.clone())
    }
}
