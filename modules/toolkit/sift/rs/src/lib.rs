pub use compat::compatible_incompatible;
pub use distribution::{Distribution, ScoreDistribution};
pub use filtering::{filter_matches, FilteredResults, LengthThreshold, MatchFilter, ScoreBound};
pub use merge::{merge_parts, MergedPart};
pub use result::{Match, MatchPart, Scores, SearchResult};

mod compat;
mod distribution;
mod filtering;
mod merge;
pub mod result;
