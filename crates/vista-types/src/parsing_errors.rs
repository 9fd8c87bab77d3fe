use std::fmt;

/// Accumulated parse errors, each tagged with the parser state that
/// produced it.
///
/// Parsers in this SDK report every problem they find rather than stopping
/// at the first. The report prints one line per entry:
///
/// ```text
/// \t<state-tag> - <message>
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsingErrors {
    entries: Vec<(String, String)>,
}

impl ParsingErrors {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one error under the given state tag.
    pub fn push(&mut self, state: impl Into<String>, message: impl Into<String>) {
        self.entries.push((state.into(), message.into()));
    }

    /// `true` if at least one error was recorded.
    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Number of recorded errors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no error was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(state-tag, message)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, m)| (s.as_str(), m.as_str()))
    }
}

impl fmt::Display for ParsingErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (state, message)) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "\t{state} - {message}")?;
        }
        Ok(())
    }
}
