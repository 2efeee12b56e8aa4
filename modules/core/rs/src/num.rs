use std::fmt::Debug;

/// Alignment coordinates and lengths. Intermediate values in the
/// compatibility arithmetic can go negative, so signed types are expected
/// in practice (i32/i64).
pub trait PrimInt: ::num::PrimInt + Debug + Default {}
impl<T: ::num::PrimInt + Debug + Default> PrimInt for T {}

/// Scores, similarities and percentages.
pub trait Float: ::num::Float + Debug + Default {}

impl<T: ::num::Float + Debug + Default> Float for T {}
