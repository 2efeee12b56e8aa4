use std::fmt::Display;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(i8)]
pub enum Strand {
    /// The forward strand, also known as the positive or plus strand.
    Forward = 1,
    /// The reverse strand, also known as the negative or minus strand.
    Reverse = -1,
}

impl Strand {
    /// Flip the strand from forward to reverse or vice versa.
    pub fn flip(&mut self) -> &mut Self {
        *self = self.flipped();
        self
    }

    /// New strand that is the opposite of the current one.
    pub fn flipped(&self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }

    /// Get the symbolic representation of the strand.
    pub fn symbol(&self) -> char {
        match self {
            Self::Forward => '+',
            Self::Reverse => '-',
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl TryFrom<char> for Strand {
    type Error = ();

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '+' => Ok(Self::Forward),
            '-' => Ok(Self::Reverse),
            _ => Err(()),
        }
    }
}

impl TryFrom<i8> for Strand {
    type Error = ();

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Forward),
            -1 => Ok(Self::Reverse),
            _ => Err(()),
        }
    }
}

impl Default for Strand {
    fn default() -> Self {
        Self::Forward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strand_flip() {
        assert_eq!(*Strand::Forward.flip(), Strand::Reverse);
        assert_eq!(*Strand::Reverse.flip(), Strand::Forward);
        assert_eq!(Strand::Forward.flipped(), Strand::Reverse);
    }

    #[test]
    fn test_strand_symbol() {
        assert_eq!(Strand::Forward.symbol(), '+');
        assert_eq!(format!("{}", Strand::Reverse), "-");
    }

    #[test]
    fn test_strand_try_from() {
        assert_eq!(Strand::try_from('+'), Ok(Strand::Forward));
        assert_eq!(Strand::try_from('-'), Ok(Strand::Reverse));
        assert_eq!(Strand::try_from('x'), Err(()));
        assert_eq!(Strand::try_from(1i8), Ok(Strand::Forward));
        assert_eq!(Strand::try_from(-1i8), Ok(Strand::Reverse));
        assert_eq!(Strand::try_from(0i8), Err(()));
    }
}
