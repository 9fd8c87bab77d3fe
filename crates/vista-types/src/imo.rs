use std::fmt;
use std::str::FromStr;

/// A validated IMO ship identification number.
///
/// Seven digits where the rightmost digit is a check digit: each of the
/// first six digits, multiplied by its position from the right plus one
/// (factors 7 down to 2), must sum to the check digit modulo 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImoNumber {
    value: u32,
}

impl ImoNumber {
    /// Validates and wraps a candidate IMO number.
    pub fn new(value: u32) -> Result<Self, ParseImoNumberError> {
        if !Self::is_valid(value) {
            return Err(ParseImoNumberError {
                input: value.to_string(),
            });
        }
        Ok(Self { value })
    }

    /// Checks the 7-digit range and the checksum.
    pub fn is_valid(value: u32) -> bool {
        if !(1_000_000..=9_999_999).contains(&value) {
            return false;
        }

        let mut digits = [0u32; 7];
        let mut temp = value;
        for d in digits.iter_mut() {
            *d = temp % 10;
            temp /= 10;
        }

        let checksum: u32 = (1..7).map(|i| digits[i] * (i as u32 + 1)).sum();
        checksum % 10 == digits[0]
    }

    /// The numeric value.
    pub fn value(&self) -> u32 {
        self.value
    }
}

impl fmt::Display for ImoNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IMO{}", self.value)
    }
}

impl FromStr for ImoNumber {
    type Err = ParseImoNumberError;

    /// Parses `"9074729"` or `"IMO9074729"` (prefix is case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseImoNumberError {
                input: s.to_string(),
            });
        }

        let digits = match trimmed.get(..3) {
            Some(prefix) if prefix.eq_ignore_ascii_case("IMO") => &trimmed[3..],
            _ => trimmed,
        };

        let value: u32 = digits.parse().map_err(|_| ParseImoNumberError {
            input: s.to_string(),
        })?;

        ImoNumber::new(value).map_err(|_| ParseImoNumberError {
            input: s.to_string(),
        })
    }
}

/// Error returned for an out-of-range or checksum-failing IMO number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseImoNumberError {
    input: String,
}

impl ParseImoNumberError {
    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ParseImoNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid IMO number: {}", self.input)
    }
}

impl std::error::Error for ParseImoNumberError {}

/// A vessel identifier: either a validated IMO number or some other
/// free-form id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShipId {
    Imo(ImoNumber),
    Other(String),
}

impl ShipId {
    /// Parses a ship id, preferring the IMO form when it validates.
    pub fn parse(s: &str) -> ShipId {
        match s.parse::<ImoNumber>() {
            Ok(imo) => ShipId::Imo(imo),
            Err(_) => ShipId::Other(s.to_string()),
        }
    }
}

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShipId::Imo(imo) => imo.fmt(f),
            ShipId::Other(id) => f.write_str(id),
        }
    }
}
