use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;
use eyre::{ensure, eyre, Result};

use alnkit_core_rs::loc::{Span, Strand};
use alnkit_core_rs::num::{Float, PrimInt};

use crate::result::{MatchPart, SIMILARITY};

// Slope window around the unit diagonal in (query, subject) space. Parts
// further than 5% off the anchor's diagonal belong to a rearrangement, not
// to the same alignment.
const SLOPE_MIN: f64 = 0.95;
const SLOPE_MAX: f64 = 1.05;

/// A merged run of co-linear match parts. Per-part similarity and expect
/// values do not survive merging.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Constructor, Dissolve, Getters)]
pub struct MergedPart<Idx: PrimInt> {
    query: Span<Idx>,
    query_strand: Strand,
    subject: Span<Idx>,
    subject_strand: Strand,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Limit {
    Start,
    End,
}

/// Merge overlapping co-linear parts of a match into a reduced set of spans.
///
/// The first part anchors the orientation and the diagonal. Later parts are
/// excluded when their similarity falls below `min_similarity`, when either
/// strand differs from the anchor's, or when they sit off the anchor's
/// diagonal. Excluded parts are not reported as conflicts; see the module
/// debug log for drop counts.
///
/// Overlapping and nested survivors collapse into one span per maximal run
/// of open intervals along the query.
pub fn merge_parts<Idx: PrimInt, S: Float>(
    parts: &[MatchPart<Idx, S>],
    min_similarity: Option<S>,
) -> Result<Vec<MergedPart<Idx>>> {
    ensure!(!parts.is_empty(), "Cannot merge an empty list of match parts");

    let anchor = &parts[0];
    let query_strand = *anchor.query_strand();
    let subject_strand = *anchor.subject_strand();
    let anchor_qs = anchor.query().start();
    let anchor_qe = anchor.query().end();
    let anchor_se = anchor.subject().end();

    let cast = |x: Idx| S::from(x).unwrap();

    let mut accepted = vec![anchor];
    let mut dropped = 0usize;
    for part in &parts[1..] {
        if let Some(min) = min_similarity {
            let similarity = part.score(SIMILARITY).ok_or_else(|| {
                eyre!("Similarity-thresholded merging requires a '{SIMILARITY}' score on every part")
            })?;
            if similarity < min {
                continue;
            }
        }
        if *part.query_strand() != query_strand || *part.subject_strand() != subject_strand {
            dropped += 1;
            continue;
        }

        // Slope between the anchor's end and this part in (query, subject)
        // space. When the subject positions coincide with the anchor's, the
        // part's own end-to-end slope stands in.
        let slope = if query_strand == Strand::Forward {
            let run = part.subject().start() - anchor_se;
            if run != Idx::zero() {
                cast(part.query().start() - anchor_qe) / cast(run)
            } else {
                cast(part.query().end() - anchor_qe) / cast(part.subject().end() - anchor_se)
            }
        } else {
            let run = anchor_se - part.subject().start();
            if run != Idx::zero() {
                cast(anchor_qs - part.query().end()) / cast(run)
            } else {
                cast(anchor_qs - part.query().start()) / cast(part.subject().end() - anchor_se)
            }
        };

        let (mut slope_min, mut slope_max) = (
            S::from(SLOPE_MIN).unwrap(),
            S::from(SLOPE_MAX).unwrap(),
        );
        if query_strand != subject_strand {
            (slope_min, slope_max) = (-slope_max, -slope_min);
        }
        if slope >= slope_min && slope <= slope_max {
            accepted.push(part);
        } else {
            dropped += 1;
        }
    }

    // Sweep all start/end coordinates in query order, keeping a counter of
    // open intervals. Each time the counter returns to zero one merged span
    // is emitted.
    let mut limits = Vec::with_capacity(accepted.len() * 2);
    for part in &accepted {
        limits.push((part.query().start(), part.subject().start(), Limit::Start));
        limits.push((part.query().end(), part.subject().end(), Limit::End));
    }
    // Stable: ties keep their original relative order.
    limits.sort_by_key(|(query, _, _)| *query);

    let mut merged = Vec::new();
    let mut open = 0usize;
    let (mut query_start, mut subject_start) = (Idx::zero(), Idx::zero());
    for (query, subject, limit) in limits {
        match limit {
            Limit::Start => {
                open += 1;
                if open == 1 {
                    query_start = query;
                    subject_start = subject;
                }
            }
            Limit::End => {
                open -= 1;
                if open == 0 {
                    merged.push(MergedPart::new(
                        Span::new(query_start, query)?,
                        query_strand,
                        Span::new(subject_start, subject)?,
                        subject_strand,
                    ));
                }
            }
        }
    }

    if dropped > 0 {
        log::debug!("Excluded {dropped} off-diagonal or opposite-strand part(s) while merging");
    }
    Ok(merged)
}
