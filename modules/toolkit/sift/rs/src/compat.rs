use std::cmp::min;

use eyre::Result;

use alnkit_core_rs::loc::Strand;
use alnkit_core_rs::num::{Float, PrimInt};
use alnkit_core_rs::seq::Sequence;

use crate::merge::merge_parts;
use crate::result::Match;

/// Aligned ("compatible") and inferred-misaligned ("incompatible") lengths
/// of a match.
///
/// ```text
///     xxxxxxx      xxxxxxxxxx      xxx incompatible
/// ------------------------------------
///            ||||||          ||||||
///     ------------------------------------------
///            ******          ******    compatible
/// ```
///
/// The compatible length is the query span covered by the merged parts.
/// The incompatible length adds up the leading and trailing overshoot (the
/// shorter of the two unaligned edges, strand-aware) and the internal gaps
/// between merged parts along the query. Both are residue counts; the
/// incompatible length can dwarf the compatible one when the match covers a
/// small fraction of either sequence.
///
/// Pure function of the match geometry, the query length and
/// `min_similarity`; fails when the match has no parts.
pub fn compatible_incompatible<Idx: PrimInt, S: Float>(
    mtch: &Match<Idx, S>,
    query: &Sequence<Idx>,
    min_similarity: Option<S>,
) -> Result<(Idx, Idx)> {
    let merged = merge_parts(mtch.parts(), min_similarity)?;
    let one = Idx::one();

    let subject_len = *mtch.subject().length();
    let query_len = *query.length();

    // Leading overshoot: whatever hangs over the start of the match on the
    // shorter side. On the reverse strand the subject edge is measured from
    // its far end.
    let first = &merged[0];
    let first_incompatible = match first.query_strand() {
        Strand::Forward => min(first.query().start(), first.subject().start()),
        Strand::Reverse => min(
            first.query().start(),
            subject_len - first.subject().end() + one,
        ),
    };

    // Trailing overshoot, same idea at the other edge.
    let last = &merged[merged.len() - 1];
    let query_overlap = query_len - last.query().end() - one;
    let subject_overlap = match first.query_strand() {
        Strand::Forward => subject_len - last.subject().end() - one,
        Strand::Reverse => last.subject().start(),
    };
    let last_incompatible = min(query_overlap, subject_overlap);

    let compatible = merged
        .iter()
        .fold(Idx::zero(), |acc, part| acc + part.query().len());

    // Gaps between consecutive merged parts along the query.
    let match_incompatible = last.query().end() - first.query().start() + one - compatible;

    let incompatible = first_incompatible + last_incompatible + match_incompatible;
    Ok((compatible, incompatible))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alnkit_core_rs::loc::Span;

    use super::*;
    use crate::result::{MatchPart, Scores, EXPECT, SIMILARITY};

    fn part(
        query: (i64, i64),
        query_strand: Strand,
        subject: (i64, i64),
        similarity: f64,
    ) -> MatchPart<i64, f64> {
        MatchPart::new(
            Span::new(query.0, query.1).unwrap(),
            query_strand,
            Span::new(subject.0, subject.1).unwrap(),
            Strand::Forward,
            Scores::from_iter([(SIMILARITY.to_string(), similarity)]),
        )
    }

    fn mtch(
        subject_len: i64,
        span: (i64, i64),
        parts: Vec<MatchPart<i64, f64>>,
    ) -> Match<i64, f64> {
        Match::new(
            Arc::new(Sequence::named("subject", subject_len)),
            Span::new(span.0, span.1).unwrap(),
            Scores::from_iter([(EXPECT.to_string(), 0.01)]),
            parts,
        )
    }

    #[test]
    fn test_forward_pair_with_gap() {
        let query = Sequence::named("query", 21i64);
        let part1 = part((10, 13), Strand::Forward, (0, 3), 90.0);
        let part2 = part((15, 20), Strand::Forward, (5, 10), 90.0);

        let m = mtch(32, (10, 20), vec![part1.clone(), part2.clone()]);
        assert_eq!(compatible_incompatible(&m, &query, None).unwrap(), (10, 1));

        let m = mtch(32, (15, 20), vec![part2]);
        assert_eq!(compatible_incompatible(&m, &query, None).unwrap(), (6, 5));

        let m = mtch(32, (10, 13), vec![part1]);
        assert_eq!(compatible_incompatible(&m, &query, None).unwrap(), (4, 7));
    }

    #[test]
    fn test_overshoot_on_both_sequences() {
        let query = Sequence::named("query", 21i64);
        let part1 = part((1, 4), Strand::Forward, (10, 13), 90.0);
        let part2 = part((7, 11), Strand::Forward, (16, 20), 90.0);

        let m = mtch(22, (1, 11), vec![part1.clone(), part2.clone()]);
        assert_eq!(compatible_incompatible(&m, &query, None).unwrap(), (9, 4));

        let m = mtch(22, (1, 4), vec![part1]);
        assert_eq!(compatible_incompatible(&m, &query, None).unwrap(), (4, 9));

        let m = mtch(22, (7, 11), vec![part2]);
        assert_eq!(compatible_incompatible(&m, &query, None).unwrap(), (5, 8));
    }

    #[test]
    fn test_overlapping_parts_count_once() {
        let query = Sequence::named("query", 21i64);
        let part1 = part((1, 7), Strand::Forward, (10, 16), 90.0);
        let part2 = part((4, 11), Strand::Forward, (13, 20), 90.0);

        let m = mtch(21, (1, 11), vec![part1, part2]);
        assert_eq!(compatible_incompatible(&m, &query, None).unwrap(), (11, 1));
    }

    #[test]
    fn test_internal_gaps_only() {
        // Three disjoint 10 bp windows separated by 2 bp gaps, with both
        // sequences exactly as long as the match extent: the two internal
        // gaps are the whole incompatible length.
        let query = Sequence::named("query", 34i64);
        let parts = vec![
            part((1, 10), Strand::Forward, (1, 10), 90.0),
            part((13, 22), Strand::Forward, (13, 22), 90.0),
            part((25, 34), Strand::Forward, (25, 34), 90.0),
        ];
        let m = mtch(34, (1, 34), parts);
        assert_eq!(compatible_incompatible(&m, &query, None).unwrap(), (30, 4));
    }

    #[test]
    fn test_reverse_strand_anchor() {
        let query = Sequence::named("query", 110i64);
        let parts = vec![
            part((31, 94), Strand::Reverse, (1, 66), 96.96),
            part((1, 34), Strand::Reverse, (191, 224), 100.0),
        ];
        let m = mtch(250, (1, 94), parts);
        assert_eq!(compatible_incompatible(&m, &query, None).unwrap(), (64, 32));

        let query = Sequence::named("query", 180i64);
        let parts = vec![
            part((34, 166), Strand::Reverse, (158, 289), 98.4),
            part((1, 31), Strand::Reverse, (447, 477), 100.0),
        ];
        let m = mtch(500, (1, 166), parts);
        assert_eq!(compatible_incompatible(&m, &query, None).unwrap(), (133, 47));

        let query = Sequence::named("query", 260i64);
        let parts = vec![
            part((215, 251), Strand::Reverse, (1, 37), 100.0),
            part((223, 251), Strand::Reverse, (72, 100), 100.0),
        ];
        let m = mtch(110, (215, 251), parts);
        assert_eq!(compatible_incompatible(&m, &query, None).unwrap(), (37, 75));
    }

    #[test]
    fn test_reverse_strand_two_merged_parts() {
        let query = Sequence::named("query", 200i64);
        let parts = vec![
            part((1, 65), Strand::Reverse, (127, 187), 93.8),
            part((127, 185), Strand::Reverse, (5, 65), 96.7),
        ];
        let m = mtch(200, (1, 185), parts);
        assert_eq!(
            compatible_incompatible(&m, &query, None).unwrap(),
            (124, 67)
        );

        let query = Sequence::named("query", 220i64);
        let parts = vec![
            part((69, 156), Strand::Reverse, (100, 187), 100.0),
            part((179, 209), Strand::Reverse, (47, 77), 100.0),
        ];
        let m = mtch(220, (69, 209), parts);
        assert_eq!(
            compatible_incompatible(&m, &query, None).unwrap(),
            (119, 66)
        );
    }

    #[test]
    fn test_idempotent() {
        let query = Sequence::named("query", 21i64);
        let m = mtch(
            32,
            (10, 20),
            vec![
                part((10, 13), Strand::Forward, (0, 3), 90.0),
                part((15, 20), Strand::Forward, (5, 10), 90.0),
            ],
        );
        let first = compatible_incompatible(&m, &query, Some(60.0)).unwrap();
        let second = compatible_incompatible(&m, &query, Some(60.0)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_parts_propagates() {
        let query = Sequence::named("query", 21i64);
        let m = mtch(32, (10, 20), vec![]);
        assert!(compatible_incompatible(&m, &query, None).is_err());
    }
}
