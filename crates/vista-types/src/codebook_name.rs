use std::fmt;

/// Identifier for one VIS metadata codebook.
///
/// Each codebook has a fixed short prefix used in LocalId strings
/// (e.g. `qty` for Quantity, `pos` for Position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CodebookName {
    Quantity = 1,
    Content,
    Calculation,
    State,
    Command,
    Type,
    FunctionalServices,
    MaintenanceCategory,
    ActivityType,
    Position,
    Detail,
}

impl CodebookName {
    /// All codebooks, in canonical order.
    pub const ALL: [CodebookName; 11] = [
        CodebookName::Quantity,
        CodebookName::Content,
        CodebookName::Calculation,
        CodebookName::State,
        CodebookName::Command,
        CodebookName::Type,
        CodebookName::FunctionalServices,
        CodebookName::MaintenanceCategory,
        CodebookName::ActivityType,
        CodebookName::Position,
        CodebookName::Detail,
    ];

    /// The LocalId tag prefix for this codebook.
    pub fn prefix(&self) -> &'static str {
        match self {
            CodebookName::Quantity => "qty",
            CodebookName::Content => "cnt",
            CodebookName::Calculation => "calc",
            CodebookName::State => "state",
            CodebookName::Command => "cmd",
            CodebookName::Type => "type",
            CodebookName::FunctionalServices => "funct.svc",
            CodebookName::MaintenanceCategory => "maint.cat",
            CodebookName::ActivityType => "act.type",
            CodebookName::Position => "pos",
            CodebookName::Detail => "detail",
        }
    }

    /// Resolves a LocalId tag prefix back to its codebook.
    pub fn from_prefix(prefix: &str) -> Result<CodebookName, ParseCodebookNameError> {
        CodebookName::ALL
            .iter()
            .find(|n| n.prefix() == prefix)
            .copied()
            .ok_or_else(|| ParseCodebookNameError {
                prefix: prefix.to_string(),
            })
    }
}

impl fmt::Display for CodebookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Error returned when a tag prefix does not name a codebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCodebookNameError {
    prefix: String,
}

impl ParseCodebookNameError {
    /// The rejected prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl fmt::Display for ParseCodebookNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown codebook prefix '{}'", self.prefix)
    }
}

impl std::error::Error for ParseCodebookNameError {}
