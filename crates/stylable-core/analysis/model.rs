//! Resolved model returned next to the diagnostics
//!
//! Rules keep their selector text and the declarations that survive analysis:
//! plain declarations with `value()` references substituted, followed by the
//! declarations contributed by mixins and variants.

use super::symbols::SymbolTable;
use crate::modules::MixinDeclaration;
use crate::parser::Position;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Property/value pair of the resolved model
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolvedDeclaration {
    /// Property name
    pub prop: String,
    /// Value after substitution
    pub value: String,
}

impl ResolvedDeclaration {
    /// Create a declaration
    pub fn new(prop: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            prop: prop.into(),
            value: value.into(),
        }
    }
}

impl From<MixinDeclaration> for ResolvedDeclaration {
    fn from(decl: MixinDeclaration) -> Self {
        Self {
            prop: decl.prop,
            value: decl.value,
        }
    }
}

/// One ruleset of the resolved model
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolvedRule {
    /// Selector text
    pub selector: String,
    /// Position of the selector in the source
    pub start: Position,
    /// Declarations, unique by property
    pub declarations: Vec<ResolvedDeclaration>,
}

impl ResolvedRule {
    /// Create an empty rule
    pub fn new(selector: impl Into<String>, start: Position) -> Self {
        Self {
            selector: selector.into(),
            start,
            declarations: Vec::new(),
        }
    }

    /// Value of a property
    #[must_use]
    pub fn get(&self, prop: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|decl| decl.prop == prop)
            .map(|decl| decl.value.as_str())
    }

    /// Merge a declaration, replacing an earlier value of the same property
    pub fn merge(&mut self, decl: ResolvedDeclaration) {
        merge_declaration(&mut self.declarations, decl);
    }
}

/// Insert `decl`, replacing the value of an earlier declaration of the same property
pub(crate) fn merge_declaration(declarations: &mut Vec<ResolvedDeclaration>, decl: ResolvedDeclaration) {
    match declarations.iter_mut().find(|d| d.prop == decl.prop) {
        Some(existing) => existing.value = decl.value,
        None => declarations.push(decl),
    }
}

/// Resolved view of one stylesheet
#[derive(Debug, Clone)]
pub struct StylesheetModel {
    /// Symbol table of the stylesheet
    symbols: SymbolTable,
    /// Rules in document order
    rules: Vec<ResolvedRule>,
}

impl StylesheetModel {
    /// Bundle a symbol table with its resolved rules
    pub(crate) fn new(symbols: SymbolTable, rules: Vec<ResolvedRule>) -> Self {
        Self { symbols, rules }
    }

    /// Identity of the stylesheet
    #[must_use]
    pub fn id(&self) -> &str {
        self.symbols.id()
    }

    /// Namespace of the stylesheet
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.symbols.namespace()
    }

    /// Symbol table
    #[must_use]
    pub const fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Rules in document order
    #[must_use]
    pub fn rules(&self) -> &[ResolvedRule] {
        &self.rules
    }

    /// First rule with the given selector text
    #[must_use]
    pub fn rule(&self, selector: &str) -> Option<&ResolvedRule> {
        self.rules.iter().find(|rule| rule.selector == selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_last_write_wins() {
        let mut rule = ResolvedRule::new(".a", Position::start());
        rule.merge(ResolvedDeclaration::new("color", "red"));
        rule.merge(ResolvedDeclaration::new("margin", "0"));
        rule.merge(MixinDeclaration::new("color", "blue").into());
        assert_eq!(rule.get("color"), Some("blue"));
        assert_eq!(rule.declarations.len(), 2);
        assert_eq!(rule.declarations[0].prop, "color");
    }
}
