use std::fmt::{Display, Formatter, Result as FmtResult};

/// Outcome of the most recent attempt to fetch a title's store metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    /// The store returned details for the title.
    Accessible,
    /// The store gave a definitive "no": delisted, unknown, or region locked.
    /// Re-probing will not change the answer any time soon.
    NotAccessible,
    /// Every attempt failed with a transient error. Worth asking again later.
    Unresolved,
}
impl Availability {
    pub fn is_accessible(&self) -> bool {
        matches!(self, Self::Accessible)
    }

    /// Returns `true` if the failure was transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unresolved)
    }

    /// Rebuild from the two persisted flags.
    pub fn from_flags(accessible: bool, retryable: bool) -> Self {
        match (accessible, retryable) {
            (true, _) => Self::Accessible,
            (false, false) => Self::NotAccessible,
            (false, true) => Self::Unresolved,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accessible => "accessible",
            Self::NotAccessible => "not accessible",
            Self::Unresolved => "unresolved",
        }
    }
}
impl Display for Availability {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Availability::Accessible)]
    #[case(Availability::NotAccessible)]
    #[case(Availability::Unresolved)]
    fn test_flags(#[case] availability: Availability) {
        let restored = Availability::from_flags(availability.is_accessible(), availability.is_retryable());
        assert_eq!(restored, availability);
    }
}
