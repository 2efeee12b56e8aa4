use eyre::{eyre, Result};

use alnkit_core_rs::num::{Float, PrimInt};
use alnkit_core_rs::seq::Sequence;

use crate::compat::compatible_incompatible;
use crate::result::{Match, SearchResult, SIMILARITY};

/// A single score threshold. Blast expect-values get better as they shrink,
/// bit scores and similarities as they grow, so a filter carries exactly one
/// direction.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum ScoreBound<S: Float> {
    Min(S),
    Max(S),
}

/// Minimum-length criterion: absolute base pairs, or a percentage of the
/// query or subject length. Exactly one kind per filter, by construction.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum LengthThreshold<Idx: PrimInt, S: Float> {
    BasePairs(Idx),
    QueryPercent(S),
    SubjectPercent(S),
}

/// One criterion for pruning matches from a search result.
///
/// Filters are pure configuration: all per-result state (the best score of
/// the first match) is resolved when the filter is applied. Chains apply in
/// order, each filter seeing the survivors of the previous one.
#[derive(Clone, PartialEq, Debug)]
pub enum MatchFilter<Idx: PrimInt, S: Float> {
    /// Keep the best match and everything within `tolerance` (a
    /// log10-scale factor) of its score, subject to an absolute bound.
    ///
    /// Precondition: the result's matches are sorted best-first; the first
    /// match defines the best score.
    BestScores {
        score_key: String,
        tolerance: S,
        bound: ScoreBound<S>,
    },
    /// Keep matches meeting an absolute score bound.
    MinScores { score_key: String, bound: ScoreBound<S> },
    /// Keep matches at least this long.
    MinLength(LengthThreshold<Idx, S>),
    /// Keep matches aligned over at least `min_compatibility` residues and
    /// misaligned over at most `max_incompatibility`, considering only
    /// parts at or above `min_similarity`.
    Compatibility {
        min_compatibility: Idx,
        max_incompatibility: Idx,
        min_similarity: S,
    },
}

/// Apply a filter chain to a result, returning a new result with the
/// surviving matches. The query and the matches themselves are untouched.
pub fn filter_matches<Idx: PrimInt, S: Float>(
    result: SearchResult<Idx, S>,
    filters: &[MatchFilter<Idx, S>],
) -> Result<SearchResult<Idx, S>> {
    let (query, mut matches) = result.dissolve();
    for filter in filters {
        matches = apply(filter, &query, matches)?;
    }
    Ok(SearchResult::new(query, matches))
}

fn apply<Idx: PrimInt, S: Float>(
    filter: &MatchFilter<Idx, S>,
    query: &Sequence<Idx>,
    matches: Vec<Match<Idx, S>>,
) -> Result<Vec<Match<Idx, S>>> {
    match filter {
        MatchFilter::BestScores {
            score_key,
            tolerance,
            bound,
        } => {
            // Nothing to rank on an empty list.
            let Some(best) = matches.first() else {
                return Ok(matches);
            };
            let best_score = best.score(score_key)?;
            // A perfect expect of 0.0 has no logarithm; it anchors at 0.
            let log_best = if best_score == S::zero() {
                S::zero()
            } else {
                best_score.log10()
            };
            let log_tolerance = tolerance.log10();

            try_retain(matches, |mtch| {
                let score = mtch.score(score_key)?;
                Ok(match bound {
                    ScoreBound::Max(_) if score == S::zero() => true,
                    ScoreBound::Min(min) if score <= *min => false,
                    ScoreBound::Max(max) if score >= *max => false,
                    _ => (score.log10() - log_best).abs() < log_tolerance,
                })
            })
        }
        MatchFilter::MinScores { score_key, bound } => try_retain(matches, |mtch| {
            let score = mtch.score(score_key)?;
            Ok(match bound {
                ScoreBound::Min(min) => score >= *min,
                ScoreBound::Max(max) => score <= *max,
            })
        }),
        MatchFilter::MinLength(threshold) => {
            let hundred = S::from(100).unwrap();
            try_retain(matches, |mtch| {
                let length = mtch.length();
                Ok(match threshold {
                    LengthThreshold::BasePairs(min) => length >= *min,
                    LengthThreshold::QueryPercent(min) => {
                        let pct = S::from(length).unwrap() / S::from(*query.length()).unwrap()
                            * hundred;
                        pct >= *min
                    }
                    LengthThreshold::SubjectPercent(min) => {
                        let pct = S::from(length).unwrap()
                            / S::from(*mtch.subject().length()).unwrap()
                            * hundred;
                        pct >= *min
                    }
                })
            })
        }
        MatchFilter::Compatibility {
            min_compatibility,
            max_incompatibility,
            min_similarity,
        } => try_retain(matches, |mtch| {
            // A match whose every part falls below the similarity cutoff
            // has nothing left to measure.
            let mut survivors = 0usize;
            for part in mtch.parts() {
                let similarity = part.score(SIMILARITY).ok_or_else(|| {
                    eyre!("Compatibility filtering requires a '{SIMILARITY}' score on every part")
                })?;
                if similarity >= *min_similarity {
                    survivors += 1;
                }
            }
            if survivors == 0 {
                return Ok(false);
            }
            let (compatible, incompatible) =
                compatible_incompatible(mtch, query, Some(*min_similarity))?;
            Ok(compatible >= *min_compatibility && incompatible <= *max_incompatibility)
        }),
    }
}

fn try_retain<Idx: PrimInt, S: Float>(
    matches: Vec<Match<Idx, S>>,
    mut keep: impl FnMut(&Match<Idx, S>) -> Result<bool>,
) -> Result<Vec<Match<Idx, S>>> {
    let mut kept = Vec::with_capacity(matches.len());
    for mtch in matches {
        if keep(&mtch)? {
            kept.push(mtch);
        }
    }
    Ok(kept)
}

/// Iterator adaptor applying the same filter chain to every result of a
/// stream. Results are independent: no state crosses between them.
pub struct FilteredResults<I, Idx: PrimInt, S: Float> {
    results: I,
    filters: Vec<MatchFilter<Idx, S>>,
}

impl<I, Idx: PrimInt, S: Float> FilteredResults<I, Idx, S>
where
    I: Iterator<Item = SearchResult<Idx, S>>,
{
    pub fn new(results: I, filters: Vec<MatchFilter<Idx, S>>) -> Self {
        Self { results, filters }
    }
}

impl<I, Idx: PrimInt, S: Float> Iterator for FilteredResults<I, Idx, S>
where
    I: Iterator<Item = SearchResult<Idx, S>>,
{
    type Item = Result<SearchResult<Idx, S>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.results
            .next()
            .map(|result| filter_matches(result, &self.filters))
    }
}
