use std::cmp::min;
use std::fmt::Display;
use std::io::Write;

use eyre::{ensure, Result};
use itertools::Itertools;
use itertools::MinMaxResult;

use alnkit_core_rs::num::{Float, PrimInt};

use crate::compat::compatible_incompatible;
use crate::result::SearchResult;

/// Histogram of a score dimension over a stream of search results,
/// optionally cross-tabulated against the incompatibility percentage.
///
/// Cells are `Option`: `None` means no data point fell into the cell, which
/// is not the same thing as a zero count.
#[derive(Clone, PartialEq, Debug)]
pub enum Distribution<Idx: PrimInt, S: Float> {
    OneDim {
        distribution: Vec<Option<Idx>>,
        /// nbins + 1 ascending bin boundaries.
        bins: Vec<S>,
    },
    TwoDim {
        /// Indexed as distribution[score_bin][incompatibility_bin].
        distribution: Vec<Vec<Option<Idx>>>,
        score_bins: Vec<S>,
        incompatibility_bins: Vec<S>,
    },
}

/// Configuration for building score distributions.
///
/// A plain value object with chainable setters; each `run` is independent
/// and read-only over the results it consumes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ScoreDistribution {
    score_key: String,
    nbins: usize,
    use_length: bool,
    calc_incompatibility: bool,
    filter_self_hits: bool,
}

impl ScoreDistribution {
    pub fn new(score_key: impl Into<String>) -> Self {
        Self {
            score_key: score_key.into(),
            nbins: 20,
            use_length: true,
            calc_incompatibility: false,
            filter_self_hits: true,
        }
    }

    pub fn set_nbins(&mut self, nbins: usize) -> &mut Self {
        self.nbins = nbins;
        self
    }

    /// Weight each match by its query-span length instead of counting 1.
    pub fn set_use_length(&mut self, use_length: bool) -> &mut Self {
        self.use_length = use_length;
        self
    }

    /// Add a second dimension: the incompatibility percentage of each
    /// match, relative to the shorter of query and subject.
    pub fn set_calc_incompatibility(&mut self, calc: bool) -> &mut Self {
        self.calc_incompatibility = calc;
        self
    }

    /// Skip matches where the query and the subject share a name, as in
    /// all-vs-all searches of a set against itself.
    pub fn set_filter_self_hits(&mut self, filter: bool) -> &mut Self {
        self.filter_self_hits = filter;
        self
    }

    /// Aggregate the distribution over `results`.
    ///
    /// When a `sink` is given, one tab-separated line per retained match is
    /// written: query name, subject name, score and (in incompatibility
    /// mode) the incompatibility percentage, floats with two decimals.
    pub fn run<'a, Idx, S>(
        &self,
        results: impl IntoIterator<Item = &'a SearchResult<Idx, S>>,
        mut sink: Option<&mut dyn Write>,
    ) -> Result<Distribution<Idx, S>>
    where
        Idx: PrimInt + 'a,
        S: Float + Display + 'a,
    {
        ensure!(self.nbins > 0, "A distribution needs at least one bin");
        let hundred = S::from(100).unwrap();

        // Single pass: collect scores, lengths and (optionally) the
        // incompatibility percentage of every retained match.
        let mut scores = Vec::new();
        let mut lengths = Vec::new();
        let mut incomps = Vec::new();
        for result in results {
            let query = result.query();
            for mtch in result.matches() {
                if self.filter_self_hits && query.name() == mtch.subject().name() {
                    continue;
                }
                let score = mtch.score(&self.score_key)?;
                scores.push(score);
                lengths.push(mtch.length());

                let mut incomp_pct = None;
                if self.calc_incompatibility {
                    let (_, incompatible) = compatible_incompatible(mtch, query, None)?;
                    let shorter = min(*query.length(), *mtch.subject().length());
                    let pct = S::from(incompatible).unwrap() / S::from(shorter).unwrap() * hundred;
                    ensure!(
                        pct >= S::zero() && pct <= hundred,
                        "Incompatibility percentage {pct} for query '{}' vs subject '{}' is outside [0, 100]",
                        query.name(),
                        mtch.subject().name(),
                    );
                    incomps.push(pct);
                    incomp_pct = Some(pct);
                }

                if let Some(out) = sink.as_deref_mut() {
                    match incomp_pct {
                        Some(pct) => writeln!(
                            out,
                            "{}\t{}\t{:.2}\t{:.2}",
                            query.name(),
                            mtch.subject().name(),
                            score,
                            pct
                        )?,
                        None => writeln!(
                            out,
                            "{}\t{}\t{:.2}",
                            query.name(),
                            mtch.subject().name(),
                            score
                        )?,
                    }
                }
            }
        }
        ensure!(!scores.is_empty(), "No matches to aggregate into a distribution");

        let (min_score, max_score) = spread(&scores);
        let incomp_spread = self.calc_incompatibility.then(|| spread(&incomps));

        // Always a square grid; without the incompatibility dimension only
        // the first column is populated and the rest is flattened away.
        let mut grid: Vec<Vec<Option<Idx>>> = vec![vec![None; self.nbins]; self.nbins];
        for (index, score) in scores.iter().enumerate() {
            let score_index = bin_index(*score, min_score, max_score, self.nbins);
            let incomp_index = match incomp_spread {
                Some((lo, hi)) => bin_index(incomps[index], lo, hi, self.nbins),
                None => Some(0),
            };
            let (Some(si), Some(ii)) = (score_index, incomp_index) else {
                continue;
            };
            let weight = if self.use_length {
                lengths[index]
            } else {
                Idx::one()
            };
            grid[si][ii] = Some(grid[si][ii].unwrap_or_else(Idx::zero) + weight);
        }

        let bins = boundaries(min_score, max_score, self.nbins);
        match incomp_spread {
            Some((lo, hi)) => Ok(Distribution::TwoDim {
                distribution: grid,
                score_bins: bins,
                incompatibility_bins: boundaries(lo, hi, self.nbins),
            }),
            None => Ok(Distribution::OneDim {
                distribution: grid
                    .into_iter()
                    .map(|mut row| row.swap_remove(0))
                    .collect(),
                bins,
            }),
        }
    }
}

fn spread<S: Float>(values: &[S]) -> (S, S) {
    match values.iter().cloned().minmax() {
        MinMaxResult::NoElements => (S::zero(), S::zero()),
        MinMaxResult::OneElement(value) => (value, value),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    }
}

/// Bin index of `value` over `nbins` equal bins spanning [min, max].
///
/// Historical convention, preserved for compatibility with existing
/// outputs: the raw index is truncated-division minus one, then clamped
/// back to zero, so the minimum lands in bin 0 and the maximum in bin
/// nbins - 1. Values strictly outside [min, max] belong to no bin.
fn bin_index<S: Float>(value: S, min: S, max: S, nbins: usize) -> Option<usize> {
    if value < min || value > max {
        return None;
    }
    if value == min {
        return Some(0);
    }
    let bin_length = (max - min) / S::from(nbins).unwrap();
    let mut index = ((value - min) / bin_length).to_isize()? - 1;
    if index == -1 {
        index = 0;
    }
    Some(index as usize)
}

/// nbins + 1 ascending boundaries by repeated addition of the bin width.
fn boundaries<S: Float>(min: S, max: S, nbins: usize) -> Vec<S> {
    let bin_length = (max - min) / S::from(nbins).unwrap();
    let mut bins = vec![min];
    for _ in 0..nbins {
        bins.push(*bins.last().unwrap() + bin_length);
    }
    bins
}
