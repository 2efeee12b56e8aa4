use std::fmt::Display;

use derive_getters::Dissolve;
use eyre::{eyre, Report, Result};

use crate::num::PrimInt;

/// Span is a closed interval [start, end], both ends inclusive.
///
/// Alignment search tools (blast, exonerate) report 1-based inclusive
/// coordinates, so unlike a half-open range a single residue is a valid
/// span with start == end. Spans with start > end are prohibited; callers
/// holding possibly-reversed raw coordinates must normalize before
/// construction.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Dissolve)]
pub struct Span<Idx: PrimInt> {
    start: Idx,
    end: Idx,
}

impl<Idx: PrimInt> Span<Idx> {
    pub fn new(start: Idx, end: Idx) -> Result<Self> {
        if start <= end {
            Ok(Self { start, end })
        } else {
            Err(eyre!("Invalid span: start > end"))
        }
    }

    #[inline(always)]
    pub fn start(&self) -> Idx {
        self.start
    }

    #[inline(always)]
    pub fn end(&self) -> Idx {
        self.end
    }

    /// Number of positions covered, end - start + 1.
    pub fn len(&self) -> Idx {
        self.end - self.start + Idx::one()
    }

    pub fn contains(&self, pos: Idx) -> bool {
        self.start <= pos && pos <= self.end
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl<Idx: PrimInt + Display> Display for Span<Idx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

impl<Idx: PrimInt> TryFrom<(Idx, Idx)> for Span<Idx> {
    type Error = Report;

    fn try_from(value: (Idx, Idx)) -> Result<Self, Self::Error> {
        Self::new(value.0, value.1)
    }
}

impl<Idx: PrimInt> From<Span<Idx>> for (Idx, Idx) {
    fn from(span: Span<Idx>) -> Self {
        (span.start, span.end)
    }
}

impl<Idx: PrimInt> PartialEq<(Idx, Idx)> for Span<Idx> {
    fn eq(&self, other: &(Idx, Idx)) -> bool {
        self.start == other.0 && self.end == other.1
    }
}
