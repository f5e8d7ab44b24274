//! Syntax tree definitions for component stylesheets
//!
//! The tree is the read-only input of the analysis engine. It can come from the
//! bundled tolerant parser ([`crate::parser::Stylesheet::parse`]) or be built by
//! a host from its own parser's output via [`crate::parser::Stylesheet::from_nodes`].
//!
//! Every node records where it starts and ends. Rules additionally record where
//! their selector starts; declarations record where their property and their
//! value start, so that diagnostics can point at individual tokens.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in source text
///
/// `line` and `column` are 1-based; `column` counts characters, not bytes.
/// `offset` is the byte offset from the start of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    /// Byte offset in source
    pub offset: usize,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
}

impl Position {
    /// Create a position from its parts
    #[must_use]
    pub const fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Position of the first character of a source
    #[must_use]
    pub const fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Position reached after walking over `text` from this position
    ///
    /// Used to locate tokens inside selectors and values relative to the start
    /// of the node that contains them.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stylable_core::parser::Position;
    ///
    /// let pos = Position::new(10, 2, 5).advance("ab\ncd");
    /// assert_eq!((pos.line, pos.column, pos.offset), (3, 3, 15));
    /// ```
    #[must_use]
    pub fn advance(self, text: &str) -> Self {
        let mut pos = self;
        for ch in text.chars() {
            pos.offset += ch.len_utf8();
            if ch == '\n' {
                pos.line += 1;
                pos.column = 1;
            } else {
                pos.column += 1;
            }
        }
        pos
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

/// A range of source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    /// First position covered
    pub start: Position,
    /// Position just past the end
    pub end: Position,
}

impl Span {
    /// Create a span from two positions
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Span covering `text` starting at `start`
    #[must_use]
    pub fn covering(start: Position, text: &str) -> Self {
        Self::new(start, start.advance(text))
    }
}

/// Node of a stylesheet tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Ruleset: `selector { ... }`
    Rule(Rule),
    /// Declaration: `prop: value;`
    Declaration(Declaration),
    /// At-rule: `@name params;` or `@name params { ... }`
    AtRule(AtRule),
    /// Comment: `/* text */`
    Comment(Comment),
}

impl Node {
    /// Source span of the node
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Rule(rule) => rule.span,
            Self::Declaration(decl) => decl.span,
            Self::AtRule(at_rule) => at_rule.span,
            Self::Comment(comment) => comment.span,
        }
    }
}

/// Ruleset with its selector text and child nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Selector text, trimmed
    pub selector: String,
    /// Position of the first selector character
    pub selector_start: Position,
    /// Child declarations, nested rules, comments
    pub nodes: Vec<Node>,
    /// Whole rule
    pub span: Span,
}

impl Rule {
    /// Create a rule whose span starts at its selector
    #[must_use]
    pub fn new(selector: impl Into<String>, selector_start: Position, nodes: Vec<Node>) -> Self {
        let selector = selector.into();
        let end = selector_start.advance(&selector);
        Self {
            selector,
            selector_start,
            nodes,
            span: Span::new(selector_start, end),
        }
    }

    /// Direct child declarations in document order
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Declaration(decl) => Some(decl),
            _ => None,
        })
    }

    /// Position of a byte offset inside the selector text
    #[must_use]
    pub fn selector_position(&self, offset: usize) -> Position {
        let end = offset.min(self.selector.len());
        self.selector_start.advance(&self.selector[..end])
    }
}

/// Property/value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Property name, trimmed
    pub prop: String,
    /// Value text, trimmed
    pub value: String,
    /// Position of the first property character
    pub prop_start: Position,
    /// Position of the first value character (just after `:` when empty)
    pub value_start: Position,
    /// Whether the declaration was closed by `;`
    pub terminated: bool,
    /// Whole declaration
    pub span: Span,
}

impl Declaration {
    /// Create a terminated declaration whose value follows `prop:` directly
    #[must_use]
    pub fn new(prop: impl Into<String>, value: impl Into<String>, prop_start: Position) -> Self {
        let prop = prop.into();
        let value = value.into();
        let value_start = prop_start.advance(&prop).advance(":");
        let end = value_start.advance(&value);
        Self {
            prop,
            value,
            prop_start,
            value_start,
            terminated: true,
            span: Span::new(prop_start, end),
        }
    }

    /// Position of a byte offset inside the value text
    #[must_use]
    pub fn value_position(&self, offset: usize) -> Position {
        let end = offset.min(self.value.len());
        self.value_start.advance(&self.value[..end])
    }
}

/// At-rule such as `@namespace "button";` or `@media screen { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// Name without the `@`
    pub name: String,
    /// Parameter text, trimmed
    pub params: String,
    /// Block contents, `None` for statement at-rules
    pub nodes: Option<Vec<Node>>,
    /// Whole at-rule
    pub span: Span,
}

/// Comment text without delimiters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Text between `/*` and `*/`
    pub text: String,
    /// Whole comment
    pub span: Span,
}
