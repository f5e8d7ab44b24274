//! Tolerant stylesheet parser and the tree it produces
//!
//! The analysis engine consumes a position-annotated tree. This module owns the
//! tree types and a bundled parser that behaves like a PostCSS "safe parse":
//! it never fails, closes blocks left open at end of input, and turns dangling
//! fragments into [`ParseIssue`]s instead of errors.
//!
//! # Example
//!
//! ```rust
//! use stylable_core::parser::{Node, Stylesheet};
//!
//! let sheet = Stylesheet::parse("./button.st.css", ".root { color: red; }");
//! assert_eq!(sheet.namespace(), "button");
//! assert!(matches!(sheet.nodes()[0], Node::Rule(_)));
//! assert!(sheet.issues().is_empty());
//! ```

pub mod ast;
pub mod errors;
pub mod position_tracker;

pub use ast::{AtRule, Comment, Declaration, Node, Position, Rule, Span};
pub use errors::ParseIssue;
pub use position_tracker::PositionTracker;

use crate::utils::{leading_whitespace, unquote};

/// One stylesheet: identity, tree, and the parse issues found while building it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    /// Identity of the stylesheet (usually its path)
    id: String,
    /// Top-level nodes
    nodes: Vec<Node>,
    /// Recoverable syntax problems
    issues: Vec<ParseIssue>,
}

impl Stylesheet {
    /// Parse source text into a tree
    ///
    /// Never fails: malformed fragments are dropped from the tree and reported
    /// through [`Stylesheet::issues`].
    #[must_use]
    pub fn parse(id: impl Into<String>, source: &str) -> Self {
        let mut parser = Parser::new(source);
        let nodes = parser.parse_nodes(false);
        Self {
            id: id.into(),
            nodes,
            issues: parser.issues,
        }
    }

    /// Wrap a tree produced by an external parser
    #[must_use]
    pub fn from_nodes(id: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            id: id.into(),
            nodes,
            issues: Vec::new(),
        }
    }

    /// Attach syntax issues reported by an external parser
    #[must_use]
    pub fn with_issues(mut self, issues: Vec<ParseIssue>) -> Self {
        self.issues = issues;
        self
    }

    /// Identity of the stylesheet
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Top-level nodes in document order
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Parse issues in document order
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Namespace of the stylesheet
    ///
    /// The value of a top-level `@namespace` at-rule when present, otherwise
    /// the file stem of the identity (`"./theme.st.css"` gives `"theme"`).
    #[must_use]
    pub fn namespace(&self) -> String {
        let declared = self.nodes.iter().find_map(|node| match node {
            Node::AtRule(at_rule) if at_rule.name == "namespace" => {
                let value = unquote(&at_rule.params);
                (!value.is_empty()).then(|| value.to_string())
            }
            _ => None,
        });

        declared.unwrap_or_else(|| file_stem(&self.id).to_string())
    }
}

/// File name of `id` up to its first `.`, or `id` itself when that is empty
fn file_stem(id: &str) -> &str {
    let name = id.rsplit(['/', '\\']).next().unwrap_or(id);
    let stem = name.split('.').next().unwrap_or(name);
    if stem.is_empty() {
        id
    } else {
        stem
    }
}

/// Recursive-descent tolerant parser
struct Parser<'a> {
    /// Cursor over the source
    tracker: PositionTracker<'a>,
    /// Collected syntax issues
    issues: Vec<ParseIssue>,
}

impl<'a> Parser<'a> {
    /// Create a parser, skipping a leading byte-order mark
    fn new(source: &'a str) -> Self {
        let mut tracker = PositionTracker::new(source);
        if tracker.starts_with("\u{FEFF}") {
            tracker.advance_to('\u{FEFF}'.len_utf8());
        }
        Self {
            tracker,
            issues: Vec::new(),
        }
    }

    /// Parse nodes until end of input or, when `nested`, the closing `}`
    fn parse_nodes(&mut self, nested: bool) -> Vec<Node> {
        let mut nodes = Vec::new();
        loop {
            self.tracker.skip_whitespace();
            let Some(ch) = self.tracker.peek() else {
                if nested {
                    self.check_unterminated(&nodes);
                }
                return nodes;
            };

            if self.tracker.starts_with("/*") {
                nodes.push(Node::Comment(self.parse_comment()));
                continue;
            }

            match ch {
                '}' => {
                    self.tracker.advance_char();
                    if nested {
                        return nodes;
                    }
                }
                ';' => {
                    self.tracker.advance_char();
                }
                '@' => nodes.push(Node::AtRule(self.parse_at_rule())),
                _ => {
                    if let Some(node) = self.parse_statement(nested) {
                        nodes.push(node);
                    }
                }
            }
        }
    }

    /// A block closed by end of input whose last declaration lacks `;`
    fn check_unterminated(&mut self, nodes: &[Node]) {
        if let Some(Node::Declaration(decl)) = nodes.last() {
            if !decl.terminated {
                self.issues.push(ParseIssue::semicolon_expected(decl.span.end));
            }
        }
    }

    /// Parse `/* ... */`, tolerating a missing terminator
    fn parse_comment(&mut self) -> Comment {
        let start = self.tracker.position();
        let body_start = start.offset + 2;
        let rest = &self.tracker.remaining()[2..];
        let (text, end) = rest.find("*/").map_or_else(
            || (rest, body_start + rest.len()),
            |idx| (&rest[..idx], body_start + idx + 2),
        );
        self.tracker.advance_to(end);
        Comment {
            text: text.to_string(),
            span: self.tracker.span_from(start),
        }
    }

    /// Parse `@name params;` or `@name params { ... }`
    fn parse_at_rule(&mut self) -> AtRule {
        let start = self.tracker.position();
        self.tracker.advance_char();
        let name_start = self.tracker.offset();
        while matches!(self.tracker.peek(), Some(ch) if crate::utils::is_ident_char(ch)) {
            self.tracker.advance_char();
        }
        let name = self.tracker.slice(name_start, self.tracker.offset()).to_string();

        let params_start = self.tracker.offset();
        let (end, stop) = self.scan_statement_end();
        let params = self.tracker.slice(params_start, end).trim().to_string();
        self.tracker.advance_to(end);

        let nodes = match stop {
            Some('{') => {
                self.tracker.advance_char();
                Some(self.parse_nodes(true))
            }
            Some(';') => {
                self.tracker.advance_char();
                None
            }
            _ => None,
        };

        AtRule {
            name,
            params,
            nodes,
            span: self.tracker.span_from(start),
        }
    }

    /// Parse a rule or declaration starting at the current position
    fn parse_statement(&mut self, nested: bool) -> Option<Node> {
        let start = self.tracker.position();
        let (end, stop) = self.scan_statement_end();
        let raw = self.tracker.slice(start.offset, end);
        self.tracker.advance_to(end);

        if stop == Some('{') {
            self.tracker.advance_char();
            let nodes = self.parse_nodes(true);
            return Some(Node::Rule(Rule {
                selector: raw.trim_end().to_string(),
                selector_start: start,
                nodes,
                span: self.tracker.span_from(start),
            }));
        }

        let terminated = stop == Some(';');
        if terminated {
            self.tracker.advance_char();
        }

        if nested {
            self.parse_declaration(start, raw, terminated)
        } else {
            self.dangling_fragment(start, raw);
            None
        }
    }

    /// Report a top-level fragment that never opened a block
    fn dangling_fragment(&mut self, start: Position, raw: &str) {
        let trimmed = raw.trim_end();
        let end = start.advance(trimmed);
        if trimmed.ends_with(['.', ':', '#']) {
            self.issues.push(ParseIssue::identifier_expected(end));
        } else {
            self.issues.push(ParseIssue::block_expected(end));
        }
    }

    /// Build a declaration from `prop: value` text
    fn parse_declaration(&mut self, start: Position, raw: &str, terminated: bool) -> Option<Node> {
        let Some(colon) = find_colon(raw) else {
            self.issues
                .push(ParseIssue::colon_expected(start.advance(raw.trim_end())));
            return None;
        };

        let prop = raw[..colon].trim_end();
        let after = &raw[colon + 1..];
        let value = after.trim();
        let colon_end = start.advance(&raw[..=colon]);
        if value.is_empty() {
            self.issues.push(ParseIssue::value_expected(colon_end));
            return None;
        }

        let value_start = colon_end.advance(&after[..leading_whitespace(after)]);
        let end = if terminated {
            self.tracker.position()
        } else {
            value_start.advance(value)
        };

        Some(Node::Declaration(Declaration {
            prop: prop.to_string(),
            value: value.to_string(),
            prop_start: start,
            value_start,
            terminated,
            span: Span::new(start, end),
        }))
    }

    /// Find the end of the current statement
    ///
    /// Returns the byte offset of the first `{`, `;`, or `}` outside quotes,
    /// parentheses, and comments, together with that character; `None` when
    /// the statement runs to end of input.
    fn scan_statement_end(&self) -> (usize, Option<char>) {
        let base = self.tracker.offset();
        let rest = self.tracker.remaining();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        let mut skip_until = 0usize;
        let mut escaped = false;

        for (idx, ch) in rest.char_indices() {
            if idx < skip_until {
                continue;
            }
            if escaped {
                escaped = false;
                continue;
            }
            if ch == '\\' {
                escaped = true;
                continue;
            }
            if let Some(q) = quote {
                if ch == q {
                    quote = None;
                }
                continue;
            }
            match ch {
                '"' | '\'' => quote = Some(ch),
                '/' if rest[idx..].starts_with("/*") => match rest[idx + 2..].find("*/") {
                    Some(close) => skip_until = idx + 2 + close + 2,
                    None => return (base + rest.len(), None),
                },
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                '{' | ';' | '}' if depth == 0 => return (base + idx, Some(ch)),
                _ => {}
            }
        }

        (base + rest.len(), None)
    }
}

/// Byte offset of the first `:` outside quotes and parentheses
fn find_colon(raw: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (idx, ch) in raw.char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => return Some(idx),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule(node: &Node) -> &Rule {
        match node {
            Node::Rule(rule) => rule,
            other => panic!("expected rule, got {other:?}"),
        }
    }

    fn decl(node: &Node) -> &Declaration {
        match node {
            Node::Declaration(decl) => decl,
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn parses_rules_and_declarations_with_positions() {
        let sheet = Stylesheet::parse("main.css", "\n  .root {\n    color: red;\n  }\n");
        assert!(sheet.issues().is_empty());

        let root = rule(&sheet.nodes()[0]);
        assert_eq!(root.selector, ".root");
        assert_eq!(root.selector_start, Position::new(3, 2, 3));

        let color = decl(&root.nodes[0]);
        assert_eq!(color.prop, "color");
        assert_eq!(color.value, "red");
        assert_eq!(color.prop_start.line, 3);
        assert_eq!(color.prop_start.column, 5);
        assert_eq!(color.value_start.column, 12);
        assert!(color.terminated);
    }

    #[test]
    fn last_declaration_without_semicolon_is_kept() {
        let sheet = Stylesheet::parse("main.css", ".a{color:red}");
        let a = rule(&sheet.nodes()[0]);
        let color = decl(&a.nodes[0]);
        assert_eq!(color.value, "red");
        assert!(!color.terminated);
        assert!(sheet.issues().is_empty());
    }

    #[test]
    fn values_keep_strings_and_parentheses() {
        let sheet = Stylesheet::parse(
            "main.css",
            ":import{-st-from:\"./a;b\";} .x{background:url(data:a;b);}",
        );
        let import = rule(&sheet.nodes()[0]);
        assert_eq!(decl(&import.nodes[0]).value, "\"./a;b\"");
        let x = rule(&sheet.nodes()[1]);
        assert_eq!(decl(&x.nodes[0]).value, "url(data:a;b)");
    }

    #[test]
    fn nested_rules_and_unclosed_blocks() {
        let sheet = Stylesheet::parse("main.css", ":import{\n-st-from:\"./f\";\n.root{\ncolor:red;\n}\n");
        assert!(sheet.issues().is_empty());
        let import = rule(&sheet.nodes()[0]);
        assert_eq!(import.nodes.len(), 2);
        assert_eq!(rule(&import.nodes[1]).selector, ".root");
    }

    #[test]
    fn unterminated_ruleset_reports_semicolon() {
        let sheet = Stylesheet::parse("main.css", ".gaga{\n  color:red\n");
        assert_eq!(sheet.issues().len(), 1);
        assert_eq!(sheet.issues()[0].message, "; expected");
        assert_eq!(sheet.issues()[0].position.line, 2);
        assert_eq!(sheet.issues()[0].position.column, 12);
    }

    #[test]
    fn dangling_fragments() {
        let sheet = Stylesheet::parse("main.css", ".root{}\n.");
        assert_eq!(sheet.issues()[0].message, "identifier expected");
        assert_eq!(sheet.issues()[0].position.column, 2);

        let sheet = Stylesheet::parse("main.css", ".root{}\n.gaga");
        assert_eq!(sheet.issues()[0].message, "{ expected");
        assert_eq!(sheet.issues()[0].position.column, 6);
    }

    #[test]
    fn declaration_errors() {
        let sheet = Stylesheet::parse("main.css", ".gaga{\n  color\n}");
        assert_eq!(sheet.issues()[0].message, ": expected");
        assert_eq!(sheet.issues()[0].position, Position::new(14, 2, 8));
        assert!(rule(&sheet.nodes()[0]).nodes.is_empty());

        let sheet = Stylesheet::parse("main.css", ".gaga{\n  color:\n}");
        assert_eq!(sheet.issues()[0].message, "property value expected");
        assert_eq!(sheet.issues()[0].position.column, 9);
    }

    #[test]
    fn at_rules_and_comments() {
        let sheet = Stylesheet::parse(
            "./file.st.css",
            "@namespace \"Button\";\n/* note */\n@media screen { .a { color: red; } }",
        );
        assert_eq!(sheet.namespace(), "Button");
        assert!(matches!(&sheet.nodes()[1], Node::Comment(c) if c.text == " note "));
        match &sheet.nodes()[2] {
            Node::AtRule(media) => {
                assert_eq!(media.name, "media");
                assert_eq!(media.params, "screen");
                assert_eq!(media.nodes.as_ref().map(Vec::len), Some(1));
            }
            other => panic!("expected at-rule, got {other:?}"),
        }
    }

    #[test]
    fn namespace_falls_back_to_file_stem() {
        assert_eq!(Stylesheet::parse("./file", "").namespace(), "file");
        assert_eq!(Stylesheet::parse("a/b/comp.st.css", "").namespace(), "comp");
        assert_eq!(Stylesheet::parse("C:\\x\\theme.css", "").namespace(), "theme");
    }

    #[test]
    fn unterminated_comment_runs_to_end() {
        let sheet = Stylesheet::parse("main.css", "/* open");
        assert!(matches!(&sheet.nodes()[0], Node::Comment(c) if c.text == " open"));
    }
}
