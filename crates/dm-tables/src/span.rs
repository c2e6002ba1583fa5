//! Closed integer intervals used as table keys.

use crate::error::{TableError, TableResult};

/// A closed interval `[start, end]` of dice sums.
///
/// Spans order by start, then end. Within one table spans never overlap, so
/// ordering by start alone is enough to walk a table from low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    start: u32,
    end: u32,
}

impl Span {
    /// Create a span, failing if `start > end`.
    pub fn new(start: u32, end: u32) -> TableResult<Self> {
        if start > end {
            return Err(TableError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A span covering a single value.
    pub fn single(value: u32) -> Self {
        Self {
            start: value,
            end: value,
        }
    }

    /// Lower bound (inclusive).
    pub fn start(self) -> u32 {
        self.start
    }

    /// Upper bound (inclusive).
    pub fn end(self) -> u32 {
        self.end
    }

    /// Whether `value` lies inside the span.
    pub fn contains(self, value: u32) -> bool {
        self.start <= value && value <= self.end
    }

    /// Whether `other` lies entirely inside this span.
    pub fn covers(self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the two spans share at least one value.
    pub fn overlaps(self, other: Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Number of values in the span.
    pub fn width(self) -> u64 {
        u64::from(self.end) - u64::from(self.start) + 1
    }

    /// Upper search bound for every span that starts at or before `value`.
    pub(crate) fn probe(value: u32) -> Span {
        Span {
            start: value,
            end: u32::MAX,
        }
    }

    /// What is left of `self` once `cut` is carved out of it: up to one
    /// piece below `cut` and one above.
    pub(crate) fn carve(self, cut: Span) -> (Option<Span>, Option<Span>) {
        let below = (self.start < cut.start).then(|| Span {
            start: self.start,
            end: cut.start - 1,
        });
        let above = (cut.end < self.end).then(|| Span {
            start: cut.end + 1,
            end: self.end,
        });
        (below, above)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(a: u32, b: u32) -> Span {
        Span::new(a, b).unwrap()
    }

    #[test]
    fn rejects_reversed_bounds() {
        assert_eq!(
            Span::new(5, 3),
            Err(TableError::InvalidRange { start: 5, end: 3 })
        );
    }

    #[test]
    fn contains_and_covers() {
        let s = span(3, 7);
        assert!(s.contains(3));
        assert!(s.contains(7));
        assert!(!s.contains(8));
        assert!(s.covers(span(4, 6)));
        assert!(s.covers(s));
        assert!(!s.covers(span(2, 6)));
    }

    #[test]
    fn overlaps() {
        assert!(span(1, 5).overlaps(span(5, 9)));
        assert!(span(4, 6).overlaps(span(1, 10)));
        assert!(!span(1, 3).overlaps(span(4, 6)));
    }

    #[test]
    fn width() {
        assert_eq!(Span::single(4).width(), 1);
        assert_eq!(span(2, 12).width(), 11);
        assert_eq!(span(0, u32::MAX).width(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn carve_middle_leaves_two_pieces() {
        assert_eq!(
            span(1, 10).carve(span(4, 6)),
            (Some(span(1, 3)), Some(span(7, 10)))
        );
    }

    #[test]
    fn carve_edges() {
        assert_eq!(span(1, 5).carve(span(4, 9)), (Some(span(1, 3)), None));
        assert_eq!(span(5, 9).carve(span(1, 6)), (None, Some(span(7, 9))));
        assert_eq!(span(4, 6).carve(span(1, 10)), (None, None));
    }

    #[test]
    fn ordering_is_by_start() {
        let mut spans = vec![span(7, 9), span(1, 2), span(3, 6)];
        spans.sort();
        assert_eq!(spans, vec![span(1, 2), span(3, 6), span(7, 9)]);
    }
}
