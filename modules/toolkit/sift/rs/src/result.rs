use std::sync::Arc;

use ahash::HashMap;
use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;
use eyre::{eyre, Result};

use alnkit_core_rs::loc::{Span, Strand};
use alnkit_core_rs::num::{Float, PrimInt};
use alnkit_core_rs::seq::Sequence;

/// Conventional score names. Blast-style parsers emit expect/similarity/
/// identity per HSP, exonerate cigar parsers emit a single score.
pub const EXPECT: &str = "expect";
pub const SIMILARITY: &str = "similarity";
pub const IDENTITY: &str = "identity";
pub const SCORE: &str = "score";

/// Named scores attached to a match or a match part.
pub type Scores<S> = HashMap<String, S>;

/// One contiguous aligned segment within a match (an HSP in blast lingo).
#[derive(Clone, PartialEq, Debug, Constructor, Dissolve, Getters)]
pub struct MatchPart<Idx: PrimInt, S: Float> {
    query: Span<Idx>,
    query_strand: Strand,
    subject: Span<Idx>,
    subject_strand: Strand,
    scores: Scores<S>,
}

impl<Idx: PrimInt, S: Float> MatchPart<Idx, S> {
    /// Build a part from raw aligner coordinates, which may come reversed.
    ///
    /// The strand of each sequence is inferred from the coordinate order:
    /// start > end means the segment was reported on the reverse strand and
    /// the pair is swapped so that start <= end always holds afterwards.
    pub fn from_raw(query: (Idx, Idx), subject: (Idx, Idx), scores: Scores<S>) -> Self {
        let (query, query_strand) = Self::normalize(query);
        let (subject, subject_strand) = Self::normalize(subject);
        Self {
            query,
            query_strand,
            subject,
            subject_strand,
            scores,
        }
    }

    fn normalize(raw: (Idx, Idx)) -> (Span<Idx>, Strand) {
        let (start, end) = raw;
        if start <= end {
            (Span::new(start, end).unwrap(), Strand::Forward)
        } else {
            (Span::new(end, start).unwrap(), Strand::Reverse)
        }
    }

    pub fn score(&self, key: &str) -> Option<S> {
        self.scores.get(key).copied()
    }
}

/// One subject hit against the query, the union of its parts' query extents.
#[derive(Clone, PartialEq, Debug, Constructor, Dissolve, Getters)]
pub struct Match<Idx: PrimInt, S: Float> {
    subject: Arc<Sequence<Idx>>,
    span: Span<Idx>,
    scores: Scores<S>,
    parts: Vec<MatchPart<Idx, S>>,
}

impl<Idx: PrimInt, S: Float> Match<Idx, S> {
    /// Resolve a named score for the match.
    ///
    /// Match-level score maps may be incomplete; the lookup falls back to
    /// the first part, which upstream parsers list first as the best HSP.
    pub fn score(&self, key: &str) -> Result<S> {
        if let Some(score) = self.scores.get(key) {
            return Ok(*score);
        }
        self.parts
            .first()
            .and_then(|part| part.score(key))
            .ok_or_else(|| eyre!("Score '{key}' is missing from the match and its first part"))
    }

    /// Query-coordinate length of the whole match.
    pub fn length(&self) -> Idx {
        self.span.len()
    }
}

/// All matches of a single query against the searched database.
///
/// Produced by an upstream parser; matches come in the parser's order,
/// which for blast output is best-first.
#[derive(Clone, PartialEq, Debug, Constructor, Dissolve, Getters)]
pub struct SearchResult<Idx: PrimInt, S: Float> {
    query: Sequence<Idx>,
    matches: Vec<Match<Idx, S>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f64)]) -> Scores<f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_from_raw_normalization() {
        let part: MatchPart<i64, f64> =
            MatchPart::from_raw((484, 276), (477142, 477350), Scores::default());
        assert_eq!(*part.query(), (276, 484));
        assert_eq!(*part.query_strand(), Strand::Reverse);
        assert_eq!(*part.subject(), (477142, 477350));
        assert_eq!(*part.subject_strand(), Strand::Forward);
    }

    #[test]
    fn test_score_accessor() {
        let subject = Arc::new(Sequence::named("s1", 100i64));
        let part = MatchPart::new(
            Span::new(1, 10).unwrap(),
            Strand::Forward,
            Span::new(1, 10).unwrap(),
            Strand::Forward,
            scores(&[(SIMILARITY, 92.5), (EXPECT, 1e-10)]),
        );
        let mtch = Match::new(
            subject,
            Span::new(1, 10).unwrap(),
            scores(&[(EXPECT, 1e-12)]),
            vec![part],
        );

        // Match-level score wins, part-level fills the gaps.
        assert_eq!(mtch.score(EXPECT).unwrap(), 1e-12);
        assert_eq!(mtch.score(SIMILARITY).unwrap(), 92.5);
        assert!(mtch.score(IDENTITY).is_err());
    }

    #[test]
    fn test_match_length() {
        let subject = Arc::new(Sequence::named("s1", 100i64));
        let mtch: Match<i64, f64> = Match::new(
            subject,
            Span::new(1, 600).unwrap(),
            Scores::default(),
            vec![],
        );
        assert_eq!(mtch.length(), 600);
    }
}
