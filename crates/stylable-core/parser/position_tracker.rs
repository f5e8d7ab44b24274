//! Position tracking for the tolerant parser
//!
//! Walks source text character by character while keeping byte offset, line,
//! and column in sync, so every node can be stamped with an exact position.

use super::ast::{Position, Span};

/// Tracks current position in source text with line/column information
#[derive(Debug, Clone)]
pub struct PositionTracker<'a> {
    /// Source text being tracked
    source: &'a str,
    /// Current position
    position: Position,
}

impl<'a> PositionTracker<'a> {
    /// Create a new position tracker for source text
    #[must_use]
    pub const fn new(source: &'a str) -> Self {
        Self {
            source,
            position: Position::start(),
        }
    }

    /// Current position
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Current byte offset
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.position.offset
    }

    /// Check if at end of source
    #[must_use]
    pub const fn is_at_end(&self) -> bool {
        self.position.offset >= self.source.len()
    }

    /// Remaining source text from current position
    #[must_use]
    pub fn remaining(&self) -> &'a str {
        &self.source[self.position.offset..]
    }

    /// Character at the current position
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Check whether the remaining text starts with `prefix`
    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.remaining().starts_with(prefix)
    }

    /// Advance by one character, returning it
    pub fn advance_char(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position.offset += ch.len_utf8();
        if ch == '\n' {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
        Some(ch)
    }

    /// Advance to a byte offset at or after the current one
    pub fn advance_to(&mut self, target_offset: usize) {
        while self.position.offset < target_offset && self.advance_char().is_some() {}
    }

    /// Skip whitespace characters
    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.advance_char();
        }
    }

    /// Source slice between two byte offsets
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.source[start..end]
    }

    /// Span from `start` to the current position
    #[must_use]
    pub const fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_creation() {
        let tracker = PositionTracker::new("a\nb");
        assert_eq!(tracker.offset(), 0);
        assert_eq!(tracker.position().line, 1);
        assert_eq!(tracker.position().column, 1);
    }

    #[test]
    fn tracker_advance_multiline() {
        let mut tracker = PositionTracker::new("ab\ncd");
        tracker.advance_to(4);
        assert_eq!(tracker.position(), Position::new(4, 2, 2));
        assert_eq!(tracker.remaining(), "d");
    }

    #[test]
    fn tracker_skip_whitespace() {
        let mut tracker = PositionTracker::new("  \n\t x");
        tracker.skip_whitespace();
        assert_eq!(tracker.peek(), Some('x'));
        assert_eq!(tracker.position().line, 2);
        assert_eq!(tracker.position().column, 3);
    }

    #[test]
    fn tracker_end() {
        let mut tracker = PositionTracker::new("a");
        assert!(!tracker.is_at_end());
        assert_eq!(tracker.advance_char(), Some('a'));
        assert!(tracker.is_at_end());
        assert_eq!(tracker.advance_char(), None);
    }
}
