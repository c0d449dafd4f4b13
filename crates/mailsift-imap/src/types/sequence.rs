//! Sequence sets.

use super::SeqNum;

/// A set of message sequence numbers, as used by FETCH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceSet {
    /// A single message.
    Single(SeqNum),
    /// An inclusive range.
    Range(SeqNum, SeqNum),
    /// From a message to the last one (`n:*`).
    RangeFrom(SeqNum),
    /// Every message (`1:*`).
    All,
    /// A comma-separated union.
    Set(Vec<Self>),
}

impl SequenceSet {
    /// A single message, or `None` for 0.
    #[must_use]
    pub fn single(n: u32) -> Option<Self> {
        SeqNum::new(n).map(Self::Single)
    }

    /// An inclusive range, or `None` if either end is 0.
    #[must_use]
    pub fn range(start: u32, end: u32) -> Option<Self> {
        Some(Self::Range(SeqNum::new(start)?, SeqNum::new(end)?))
    }
}

impl From<SeqNum> for SequenceSet {
    fn from(seq: SeqNum) -> Self {
        Self::Single(seq)
    }
}

impl std::fmt::Display for SequenceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(n) => write!(f, "{n}"),
            Self::Range(a, b) => write!(f, "{a}:{b}"),
            Self::RangeFrom(a) => write!(f, "{a}:*"),
            Self::All => f.write_str("1:*"),
            Self::Set(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(SequenceSet::single(4).unwrap().to_string(), "4");
        assert_eq!(SequenceSet::range(2, 9).unwrap().to_string(), "2:9");
        assert_eq!(SequenceSet::All.to_string(), "1:*");
        let set = SequenceSet::Set(vec![
            SequenceSet::single(1).unwrap(),
            SequenceSet::RangeFrom(SeqNum::new(5).unwrap()),
        ]);
        assert_eq!(set.to_string(), "1,5:*");
    }

    #[test]
    fn zero_rejected() {
        assert!(SequenceSet::single(0).is_none());
        assert!(SequenceSet::range(0, 3).is_none());
    }
}
