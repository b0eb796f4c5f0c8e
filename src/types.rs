use serde::{Serialize, Deserialize};

/// Genomic strand/orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize )]
pub enum Strand {
    Plus,
    Minus,
    Unknown,
}

impl Strand {
    /// Parse the strand column of GTF/GFF3 (`+`, `-`, `.`, `?`).
    pub fn from_symbol(s: &str) -> Option<Strand> {
        match s {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            "." | "?" => Some(Strand::Unknown),
            _ => None,
        }
    }

    #[inline]
    pub fn is_reverse(self) -> bool {
        self == Strand::Minus
    }
}

/// A contiguous genomic interval.
/// Coordinates are 0-based, half-open: [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize )]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Create a new span. Panics if start > end.
    pub fn new(start: u32, end: u32) -> Self {
        assert!(start <= end, "Span requires start <= end");
        Self { start, end }
    }

    #[inline]
    pub fn len(self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn overlaps(self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    #[inline]
    pub fn contains_pos(self, pos: u32) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Smallest span covering both.
    #[inline]
    pub fn union(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Map a span given on `strand` onto the forward strand of a contig of
    /// length `contig_len`.
    ///
    /// Minus-strand coordinates count from the contig end, so `[s, e)` on the
    /// reverse strand is `[len - e, len - s)` on the forward strand. Spans
    /// reaching past the contig end are clamped to it with a warning.
    pub fn to_forward(self, strand: Strand, contig_len: u32) -> Span {
        if !strand.is_reverse() {
            return self;
        }
        if self.end > contig_len {
            tracing::warn!(
                start = self.start,
                end = self.end,
                contig_len,
                "minus-strand span reaches past the contig end; clamping"
            );
        }
        let end = self.end.min(contig_len);
        let start = self.start.min(end);
        Span {
            start: contig_len - end,
            end: contig_len - start,
        }
    }
}
