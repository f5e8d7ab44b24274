//! Parse issues for recoverable syntax problems
//!
//! The tolerant parser never fails. Fragments it cannot turn into nodes are
//! reported as issues, which the analysis engine forwards verbatim as
//! diagnostics.

use super::ast::Position;
use core::fmt;

/// Recoverable syntax problem found while building the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Human-readable message, e.g. `{ expected`
    pub message: String,
    /// Where the missing or unexpected token belongs
    pub position: Position,
}

impl ParseIssue {
    /// Create a new issue
    #[must_use]
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    /// `identifier expected` after a dangling `.`, `:`, or `#`
    #[must_use]
    pub fn identifier_expected(position: Position) -> Self {
        Self::new("identifier expected", position)
    }

    /// `{ expected` after a selector that never opens a block
    #[must_use]
    pub fn block_expected(position: Position) -> Self {
        Self::new("{ expected", position)
    }

    /// `; expected` after a declaration left open at end of input
    #[must_use]
    pub fn semicolon_expected(position: Position) -> Self {
        Self::new("; expected", position)
    }

    /// `: expected` after a property without a value separator
    #[must_use]
    pub fn colon_expected(position: Position) -> Self {
        Self::new(": expected", position)
    }

    /// `property value expected` after `prop:` with nothing following
    #[must_use]
    pub fn value_expected(position: Position) -> Self {
        Self::new("property value expected", position)
    }
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}] {}",
            self.position.line, self.position.column, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let issue = ParseIssue::block_expected(Position::new(10, 3, 7));
        assert_eq!(issue.to_string(), "[3:7] { expected");
    }
}
