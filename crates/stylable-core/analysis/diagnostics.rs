//! Diagnostics produced by one analysis run
//!
//! Every rule violation becomes a [`Diagnostic`] with the exact message, a
//! source span, a severity, and the id of the rule that produced it. The
//! [`Reporter`] applies the host's [`ProcessConfig`] filters while the engine
//! runs; [`Diagnostics`] is the ordered result handed back to the caller.

use super::config::ProcessConfig;
use crate::parser::{Position, Span};
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rule identifiers attached to diagnostics
///
/// Hosts can silence a rule through [`ProcessConfig::with_disabled_rule`].
pub mod rules {
    /// Syntax problems forwarded from the parser
    pub const SYNTAX: &str = "syntax";
    /// `-st-*` declaration that is not part of the language
    pub const UNKNOWN_DIRECTIVE: &str = "unknown-directive";
    /// Unrecognized CSS property
    pub const UNKNOWN_PROPERTY: &str = "unknown-property";
    /// Character outside the selector alphabet
    pub const ILLEGAL_CHARACTER: &str = "illegal-character";
    /// Capitalized tag without a matching import
    pub const UNKNOWN_COMPONENT: &str = "unknown-component";
    /// Pseudo-class or pseudo-element without an element
    pub const GLOBAL_PSEUDO: &str = "global-pseudo";
    /// Pseudo-element that is neither native nor a part of the component
    pub const UNKNOWN_PSEUDO_ELEMENT: &str = "unknown-pseudo-element";
    /// Pseudo-class not declared through `-st-states`
    pub const UNKNOWN_STATE: &str = "unknown-state";
    /// `.root` after the first compound
    pub const ROOT_POSITION: &str = "root-position";
    /// Directive or block that needs a simple selector
    pub const COMPLEX_SELECTOR: &str = "complex-selector";
    /// Class-only directive on an element selector
    pub const ELEMENT_DEFINITION: &str = "element-definition";
    /// `-st-variant` with a value other than `true` or `false`
    pub const VARIANT_VALUE: &str = "variant-value";
    /// Variant applied outside its component
    pub const VARIANT_SCOPE: &str = "variant-scope";
    /// `value()` reference that does not resolve
    pub const UNKNOWN_VAR: &str = "unknown-var";
    /// Var whose `value()` references lead back to itself
    pub const VAR_CYCLE: &str = "var-cycle";
    /// `-st-mixin` target that does not resolve
    pub const UNKNOWN_MIXIN: &str = "unknown-mixin";
    /// `-st-extends` target that does not resolve
    pub const UNKNOWN_STYLESHEET: &str = "unknown-stylesheet";
    /// Symbol used where another kind is required
    pub const KIND_MISMATCH: &str = "kind-mismatch";
    /// Malformed `:import` block or failed import
    pub const IMPORT: &str = "import";
    /// Wrong arguments for a mixin or variant
    pub const MIXIN_ARGUMENTS: &str = "mixin-arguments";
    /// Mixin implementation failure
    pub const MIXIN_ERROR: &str = "mixin-error";
    /// Compound reachable through two different extends
    pub const CONFLICTING_EXTENDS: &str = "conflicting-extends";
}

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Severity {
    /// Suspicious but valid construct
    Warning,
    /// Rule violation
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One reported problem
///
/// Rule ids are `&'static str`, so the `serde` feature only derives
/// `Serialize` here.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Diagnostic {
    /// Human-readable message
    message: String,
    /// Severity level
    severity: Severity,
    /// Offending source range
    location: Span,
    /// Id of the rule that produced the diagnostic
    rule: &'static str,
}

impl Diagnostic {
    /// Create an error-level diagnostic
    pub fn error(rule: &'static str, message: impl Into<String>, location: Span) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
            location,
            rule,
        }
    }

    /// Create a warning-level diagnostic
    pub fn warning(rule: &'static str, message: impl Into<String>, location: Span) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(rule, message, location)
        }
    }

    /// Message text
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Severity level
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Offending source range
    #[must_use]
    pub const fn location(&self) -> Span {
        self.location
    }

    /// Start of the offending source range
    #[must_use]
    pub const fn start(&self) -> Position {
        self.location.start
    }

    /// Id of the rule that produced the diagnostic
    #[must_use]
    pub const fn rule(&self) -> &'static str {
        self.rule
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}: {}",
            self.location.start.line, self.location.start.column, self.severity, self.message
        )
    }
}

/// Ordered diagnostics of one analysis run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Diagnostics {
    /// Reports in emission order
    reports: Vec<Diagnostic>,
    /// Reports dropped because of `max_diagnostics`
    truncated: usize,
}

impl Diagnostics {
    /// Reports in emission order
    #[must_use]
    pub fn reports(&self) -> &[Diagnostic] {
        &self.reports
    }

    /// Number of reports
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Check whether nothing was reported
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Messages in emission order
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.reports.iter().map(Diagnostic::message).collect()
    }

    /// Check whether any report is an error
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.reports
            .iter()
            .any(|report| report.severity() == Severity::Error)
    }

    /// Number of reports dropped by the `max_diagnostics` limit
    #[must_use]
    pub const fn truncated(&self) -> usize {
        self.truncated
    }

    /// Iterate over reports
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.reports.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.reports.into_iter()
    }
}

/// Collects diagnostics while honoring the host configuration
#[derive(Debug)]
pub(crate) struct Reporter<'c> {
    /// Host configuration
    config: &'c ProcessConfig,
    /// Accepted reports
    reports: Vec<Diagnostic>,
    /// Reports dropped by the limit
    truncated: usize,
}

impl<'c> Reporter<'c> {
    /// Create an empty reporter
    pub(crate) const fn new(config: &'c ProcessConfig) -> Self {
        Self {
            config,
            reports: Vec::new(),
            truncated: 0,
        }
    }

    /// Record a diagnostic unless filtered out
    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        if !self.config.is_rule_enabled(diagnostic.rule())
            || !self.config.should_report_severity(diagnostic.severity())
        {
            return;
        }
        let max = self.config.max_diagnostics;
        if max > 0 && self.reports.len() >= max {
            self.truncated += 1;
            return;
        }
        self.reports.push(diagnostic);
    }

    /// Error-level report covering `text` starting at `at`
    pub(crate) fn error_covering(
        &mut self,
        rule: &'static str,
        message: impl Into<String>,
        at: Position,
        text: &str,
    ) {
        self.report(Diagnostic::error(rule, message, Span::covering(at, text)));
    }

    /// Finish and hand back the ordered reports
    pub(crate) fn finish(self) -> Diagnostics {
        Diagnostics {
            reports: self.reports,
            truncated: self.truncated,
        }
    }
}
