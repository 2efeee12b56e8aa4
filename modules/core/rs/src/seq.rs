use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;

use crate::num::PrimInt;

/// A named sequence record as seen by the search-result core: only the
/// name and the total length matter here, the residues themselves stay
/// with the upstream parsers.
#[derive(Clone, PartialEq, Eq, Debug, Default, Constructor, Dissolve, Getters)]
pub struct Sequence<Idx: PrimInt> {
    name: String,
    description: Option<String>,
    length: Idx,
}

impl<Idx: PrimInt> Sequence<Idx> {
    /// Shorthand for records without a definition line.
    pub fn named(name: impl Into<String>, length: Idx) -> Self {
        Self {
            name: name.into(),
            description: None,
            length,
        }
    }
}
