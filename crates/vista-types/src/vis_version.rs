use std::fmt;
use std::str::FromStr;

/// A VIS release tag.
///
/// Versions are totally ordered; `latest()` is the maximum. Every versioned
/// entity in the SDK (Gmod, Codebooks, Locations, paths, LocalIds) carries
/// one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VisVersion {
    V3_4a,
    V3_5a,
    V3_6a,
    V3_7a,
    V3_8a,
    V3_9a,
}

impl VisVersion {
    /// All supported versions, in ascending order.
    pub const ALL: [VisVersion; 6] = [
        VisVersion::V3_4a,
        VisVersion::V3_5a,
        VisVersion::V3_6a,
        VisVersion::V3_7a,
        VisVersion::V3_8a,
        VisVersion::V3_9a,
    ];

    /// The most recent supported version.
    pub fn latest() -> VisVersion {
        *VisVersion::ALL.last().expect("at least one VIS version")
    }

    /// The wire form of this version (e.g. `"3-4a"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            VisVersion::V3_4a => "3-4a",
            VisVersion::V3_5a => "3-5a",
            VisVersion::V3_6a => "3-6a",
            VisVersion::V3_7a => "3-7a",
            VisVersion::V3_8a => "3-8a",
            VisVersion::V3_9a => "3-9a",
        }
    }

    /// The next version after this one, if any.
    ///
    /// Used to walk adjacent version steps during cross-version conversion.
    pub fn successor(&self) -> Option<VisVersion> {
        let idx = VisVersion::ALL.iter().position(|v| v == self)?;
        VisVersion::ALL.get(idx + 1).copied()
    }
}

impl fmt::Display for VisVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known VIS version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVisVersionError {
    input: String,
}

impl ParseVisVersionError {
    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ParseVisVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown VIS version '{}'", self.input)
    }
}

impl std::error::Error for ParseVisVersionError {}

impl FromStr for VisVersion {
    type Err = ParseVisVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VisVersion::ALL
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| ParseVisVersionError {
                input: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_total() {
        assert!(VisVersion::V3_4a < VisVersion::V3_5a);
        assert!(VisVersion::V3_8a < VisVersion::V3_9a);
        assert_eq!(VisVersion::latest(), VisVersion::V3_9a);
    }

    #[test]
    fn test_round_trip_all_versions() {
        for v in VisVersion::ALL {
            assert_eq!(v.as_str().parse::<VisVersion>().unwrap(), v);
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "3-3a".parse::<VisVersion>().unwrap_err();
        assert_eq!(err.input(), "3-3a");
        assert_eq!(err.to_string(), "unknown VIS version '3-3a'");
    }

    #[test]
    fn test_successor_chain() {
        assert_eq!(VisVersion::V3_4a.successor(), Some(VisVersion::V3_5a));
        assert_eq!(VisVersion::V3_9a.successor(), None);

        let mut count = 1;
        let mut v = VisVersion::V3_4a;
        while let Some(next) = v.successor() {
            assert!(next > v);
            v = next;
            count += 1;
        }
        assert_eq!(count, VisVersion::ALL.len());
    }
}
