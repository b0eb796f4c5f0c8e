//! Immutable, array-backed augmented interval index.
//!
//! Intervals are 0-based and half-open. The begin-sorted array doubles as an
//! implicit balanced binary tree: the root of any sub-range `[lo, hi)` is the
//! element at `(lo + hi) / 2`, its children are the roots of `[lo, mid)` and
//! `(mid, hi)`. Every element carries `max_end`, the largest `end` in its
//! subtree, which lets point and range searches skip whole subtrees.
//!
//! A second ordering by `(end, begin)` is kept for left-neighbour lookups.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    /// The extractor returned `end < begin`. No clamping is applied.
    #[error("malformed interval: end {end} < begin {begin}")]
    Malformed { begin: u32, end: u32 },
}

/// One stored interval with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub begin: u32,
    pub end: u32,
    pub value: T,
    max_end: u32,
}

impl<T> Interval<T> {
    /// Largest `end` in the implicit subtree rooted at this element.
    #[inline]
    pub fn max_end(&self) -> u32 {
        self.max_end
    }

    #[inline]
    pub fn contains(&self, pos: u32) -> bool {
        self.begin <= pos && pos < self.end
    }

    #[inline]
    pub fn overlaps(&self, lo: u32, hi: u32) -> bool {
        lo < self.end && self.begin < hi
    }
}

/// Result of a point or range query.
///
/// `left` and `right` are only filled when `overlaps` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult<'a, T> {
    /// Overlapping values in ascending `(begin, end)` order.
    pub overlaps: Vec<&'a T>,
    /// Nearest interval ending at or before the query position.
    pub left: Option<&'a T>,
    /// Nearest interval starting after the query position.
    pub right: Option<&'a T>,
}

impl<'a, T> QueryResult<'a, T> {
    pub fn is_empty(&self) -> bool {
        self.overlaps.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalIndex<T> {
    /// Sorted by `(begin, end)`, `max_end` filled in.
    by_begin: Vec<Interval<T>>,
    /// Positions into `by_begin`, sorted by `(end, begin)`.
    by_end: Vec<usize>,
}

impl<T> IntervalIndex<T> {
    /// Build the index from an unordered collection.
    ///
    /// `extractor` returns `(begin, end)` for each item. Any item with
    /// `end < begin` aborts the build; zero-length intervals are kept but
    /// never contain a point.
    ///
    /// # Example
    /// ```
    /// use genewise_mendel::interval::IntervalIndex;
    ///
    /// let idx = IntervalIndex::build(vec![(10, 20, "a"), (30, 40, "b")], |t| (t.0, t.1)).unwrap();
    ///
    /// let hit = idx.query_point(15);
    /// assert_eq!(hit.overlaps.len(), 1);
    ///
    /// let gap = idx.query_point(25);
    /// assert!(gap.overlaps.is_empty());
    /// assert_eq!(gap.left.map(|t| t.2), Some("a"));
    /// assert_eq!(gap.right.map(|t| t.2), Some("b"));
    /// ```
    pub fn build<I, F>(items: I, extractor: F) -> Result<Self, IntervalError>
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> (u32, u32),
    {
        let mut by_begin: Vec<Interval<T>> = Vec::new();
        for value in items {
            let (begin, end) = extractor(&value);
            if end < begin {
                return Err(IntervalError::Malformed { begin, end });
            }
            by_begin.push(Interval {
                begin,
                end,
                value,
                max_end: end,
            });
        }

        // stable: equal (begin, end) keep input order
        by_begin.sort_by_key(|iv| (iv.begin, iv.end));
        let n = by_begin.len();
        fill_max_end(&mut by_begin, 0, n);

        let mut by_end: Vec<usize> = (0..n).collect();
        by_end.sort_by_key(|&i| (by_begin[i].end, by_begin[i].begin));

        Ok(Self { by_begin, by_end })
    }

    pub fn len(&self) -> usize {
        self.by_begin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_begin.is_empty()
    }

    /// Stored intervals in `(begin, end)` order.
    pub fn intervals(&self) -> &[Interval<T>] {
        &self.by_begin
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.by_begin.iter().map(|iv| &iv.value)
    }

    /// All values whose interval contains `pos`, or the nearest neighbours
    /// when there are none.
    pub fn query_point(&self, pos: u32) -> QueryResult<'_, T> {
        let mut overlaps = Vec::new();
        self.collect_point(0, self.by_begin.len(), pos, &mut overlaps);
        self.finish(overlaps, pos)
    }

    /// All values overlapping `[lo, hi)`, or the neighbours of `lo` when
    /// there are none.
    pub fn query_range(&self, lo: u32, hi: u32) -> QueryResult<'_, T> {
        let mut overlaps = Vec::new();
        self.collect_range(0, self.by_begin.len(), lo, hi, &mut overlaps);
        self.finish(overlaps, lo)
    }

    fn finish<'a>(&'a self, overlaps: Vec<&'a T>, pos: u32) -> QueryResult<'a, T> {
        if !overlaps.is_empty() {
            return QueryResult {
                overlaps,
                left: None,
                right: None,
            };
        }
        QueryResult {
            overlaps,
            left: self.left_of(pos),
            right: self.right_of(pos),
        }
    }

    fn collect_point<'a>(&'a self, lo: usize, hi: usize, pos: u32, out: &mut Vec<&'a T>) {
        if lo >= hi {
            return;
        }
        let mid = (lo + hi) / 2;
        let node = &self.by_begin[mid];

        // whole subtree ends at or before pos
        if pos >= node.max_end {
            return;
        }

        self.collect_point(lo, mid, pos, out);

        if node.contains(pos) {
            out.push(&node.value);
        }

        // everything to the right begins at or after node.begin
        if pos < node.begin {
            return;
        }

        self.collect_point(mid + 1, hi, pos, out);
    }

    fn collect_range<'a>(
        &'a self,
        lo: usize,
        hi: usize,
        q_lo: u32,
        q_hi: u32,
        out: &mut Vec<&'a T>,
    ) {
        if lo >= hi {
            return;
        }
        let mid = (lo + hi) / 2;
        let node = &self.by_begin[mid];

        if q_lo >= node.max_end {
            return;
        }

        self.collect_range(lo, mid, q_lo, q_hi, out);

        if node.overlaps(q_lo, q_hi) {
            out.push(&node.value);
        }

        if node.begin >= q_hi {
            return;
        }

        self.collect_range(mid + 1, hi, q_lo, q_hi, out);
    }

    /// Interval with the largest `end <= pos` (ties: largest begin).
    ///
    /// Insertion point of the zero-length key `[pos, pos)` in the
    /// end-sorted order, minus one.
    fn left_of(&self, pos: u32) -> Option<&T> {
        let idx = self
            .by_end
            .partition_point(|&i| self.by_begin[i].end <= pos);
        if idx == 0 {
            return None;
        }
        let iv = &self.by_begin[self.by_end[idx - 1]];
        assert!(
            !iv.contains(pos),
            "left neighbour [{}, {}) contains query position {pos}",
            iv.begin,
            iv.end
        );
        Some(&iv.value)
    }

    /// Interval with the smallest `begin > pos` (ties: smallest end).
    fn right_of(&self, pos: u32) -> Option<&T> {
        let idx = self.by_begin.partition_point(|iv| iv.begin <= pos);
        let iv = self.by_begin.get(idx)?;
        assert!(
            !iv.contains(pos),
            "right neighbour [{}, {}) contains query position {pos}",
            iv.begin,
            iv.end
        );
        Some(&iv.value)
    }
}

/// Fill `max_end` for the implicit subtree over `[lo, hi)`; returns the
/// subtree maximum (0 for an empty range).
fn fill_max_end<T>(ivs: &mut [Interval<T>], lo: usize, hi: usize) -> u32 {
    if lo >= hi {
        return 0;
    }
    let mid = (lo + hi) / 2;
    let left = fill_max_end(ivs, lo, mid);
    let right = fill_max_end(ivs, mid + 1, hi);
    let max_end = ivs[mid].end.max(left).max(right);
    ivs[mid].max_end = max_end;
    max_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    type Item = (u32, u32, usize);

    fn index_of(spans: &[(u32, u32)]) -> IntervalIndex<Item> {
        let items: Vec<Item> = spans
            .iter()
            .enumerate()
            .map(|(i, &(b, e))| (b, e, i))
            .collect();
        IntervalIndex::build(items, |t| (t.0, t.1)).unwrap()
    }

    /// Recompute every node's subtree maximum directly from its range.
    fn check_max_end(ivs: &[Interval<Item>], lo: usize, hi: usize) {
        if lo >= hi {
            return;
        }
        let mid = (lo + hi) / 2;
        let brute = ivs[lo..hi].iter().map(|iv| iv.end).max().unwrap();
        assert_eq!(ivs[mid].max_end(), brute, "node {mid} over [{lo}, {hi})");
        check_max_end(ivs, lo, mid);
        check_max_end(ivs, mid + 1, hi);
    }

    fn sorted_brute<F: Fn(&Item) -> bool>(spans: &[(u32, u32)], keep: F) -> Vec<Item> {
        let mut out: Vec<Item> = spans
            .iter()
            .enumerate()
            .map(|(i, &(b, e))| (b, e, i))
            .filter(|t| keep(t))
            .collect();
        out.sort_by_key(|t| (t.0, t.1, t.2));
        out
    }

    #[test]
    fn rejects_end_before_begin() {
        let err = IntervalIndex::build(vec![(5u32, 10u32), (20, 19)], |t| (t.0, t.1)).unwrap_err();
        assert_eq!(err, IntervalError::Malformed { begin: 20, end: 19 });
    }

    #[test]
    fn empty_index_has_no_neighbours() {
        let idx = index_of(&[]);
        let res = idx.query_point(7);
        assert!(res.overlaps.is_empty());
        assert!(res.left.is_none());
        assert!(res.right.is_none());
    }

    #[test]
    fn zero_length_interval_is_a_neighbour_not_a_hit() {
        let idx = index_of(&[(10, 10), (20, 30)]);
        let res = idx.query_point(10);
        assert!(res.overlaps.is_empty());
        assert_eq!(res.left.map(|t| t.2), Some(0));
        assert_eq!(res.right.map(|t| t.2), Some(1));
    }

    #[test]
    fn point_query_orders_and_skips_neighbours() {
        let idx = index_of(&[(50, 60), (0, 100), (10, 20), (10, 15)]);
        let hits: Vec<usize> = idx.query_point(12).overlaps.iter().map(|t| t.2).collect();
        assert_eq!(hits, vec![1, 3, 2]);

        let res = idx.query_point(55);
        assert!(res.left.is_none() && res.right.is_none());
    }

    #[test]
    fn neighbours_at_index_ends() {
        let idx = index_of(&[(10, 20), (30, 40)]);

        let before = idx.query_point(5);
        assert!(before.left.is_none());
        assert_eq!(before.right.map(|t| t.2), Some(0));

        let after = idx.query_point(40);
        assert_eq!(after.left.map(|t| t.2), Some(1));
        assert!(after.right.is_none());
    }

    #[test]
    fn range_query_uses_half_open_overlap() {
        let idx = index_of(&[(10, 20), (20, 30), (40, 50)]);

        let hits: Vec<usize> = idx.query_range(15, 25).overlaps.iter().map(|t| t.2).collect();
        assert_eq!(hits, vec![0, 1]);

        let res = idx.query_range(30, 40);
        assert!(res.overlaps.is_empty());
        assert_eq!(res.left.map(|t| t.2), Some(1));
        assert_eq!(res.right.map(|t| t.2), Some(2));
    }

    fn spans_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
        proptest::collection::vec((0u32..1_000, 0u32..120), 0..80)
            .prop_map(|v| v.into_iter().map(|(b, len)| (b, b + len)).collect())
    }

    proptest! {
        #[test]
        fn prop_max_end_invariant(spans in spans_strategy()) {
            let idx = index_of(&spans);
            check_max_end(idx.intervals(), 0, idx.len());
        }

        #[test]
        fn prop_point_query_matches_brute_force(spans in spans_strategy(), pos in 0u32..1_200) {
            let idx = index_of(&spans);
            let res = idx.query_point(pos);
            let got: Vec<Item> = res.overlaps.iter().map(|t| **t).collect();
            let expected = sorted_brute(&spans, |t| t.0 <= pos && pos < t.1);
            prop_assert_eq!(&got, &expected);

            if expected.is_empty() {
                let left = spans.iter().filter(|s| s.1 <= pos).map(|s| (s.1, s.0)).max();
                let right = spans.iter().filter(|s| s.0 > pos).map(|s| (s.0, s.1)).min();
                prop_assert_eq!(res.left.map(|t| (t.1, t.0)), left);
                prop_assert_eq!(res.right.map(|t| (t.0, t.1)), right);
            } else {
                prop_assert!(res.left.is_none() && res.right.is_none());
            }
        }

        #[test]
        fn prop_range_query_matches_brute_force(
            spans in spans_strategy(),
            lo in 0u32..1_200,
            len in 0u32..60,
        ) {
            let hi = lo + len;
            let idx = index_of(&spans);
            let res = idx.query_range(lo, hi);
            let got: Vec<Item> = res.overlaps.iter().map(|t| **t).collect();
            let expected = sorted_brute(&spans, |t| lo < t.1 && t.0 < hi);
            prop_assert_eq!(&got, &expected);

            // neighbours are taken around `lo`
            if expected.is_empty() {
                let left = spans.iter().filter(|s| s.1 <= lo).map(|s| (s.1, s.0)).max();
                let right = spans.iter().filter(|s| s.0 > lo).map(|s| (s.0, s.1)).min();
                prop_assert_eq!(res.left.map(|t| (t.1, t.0)), left);
                prop_assert_eq!(res.right.map(|t| (t.0, t.1)), right);
            } else {
                prop_assert!(res.left.is_none() && res.right.is_none());
            }
        }
    }
}
