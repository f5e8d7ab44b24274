//! Declaration checks: directives, properties, and `value()` references

use super::known::is_known_property;
use super::Validator;
use crate::analysis::diagnostics::rules;
use crate::analysis::directives::Directive;
use crate::analysis::mixins::MixinApplier;
use crate::analysis::model::ResolvedDeclaration;
use crate::analysis::symbols::{Symbol, SymbolTable};
use crate::parser::{Declaration, Rule};
use crate::selector::{SelectorList, SimpleKind};
use crate::utils::{create_hash_map, create_hash_set, is_ident_char, unquote};
use ahash::RandomState;
use std::collections::HashMap;

/// Opening of a var reference
const VALUE_CALL: &str = "value(";

/// `value(name)` occurrence inside a declaration value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueReference<'a> {
    /// Byte offset of `value(` in the value text
    pub offset: usize,
    /// Whole `value(...)` text
    pub text: &'a str,
    /// Referenced identifier, unquoted
    pub name: &'a str,
}

/// Find the `value()` references of a value in order
///
/// # Example
///
/// ```rust
/// use stylable_core::analysis::validation::declarations::value_references;
///
/// let refs = value_references("1px solid value(brand)");
/// assert_eq!(refs[0].name, "brand");
/// assert_eq!(refs[0].offset, 10);
/// ```
#[must_use]
pub fn value_references(value: &str) -> Vec<ValueReference<'_>> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(relative) = value[from..].find(VALUE_CALL) {
        let offset = from + relative;
        from = offset + VALUE_CALL.len();
        let preceded_by_ident = value[..offset].chars().next_back().is_some_and(is_ident_char);
        if preceded_by_ident {
            continue;
        }
        let Some(close) = value[from..].find(')') else {
            break;
        };
        let end = from + close + 1;
        found.push(ValueReference {
            offset,
            text: &value[offset..end],
            name: unquote(&value[from..from + close]),
        });
        from = end;
    }
    found
}

/// Replace var references with their values, leaving unresolved ones intact
///
/// One-off form of [`VarSubstitution::substitute`].
#[must_use]
pub fn substitute_vars(table: &SymbolTable, value: &str) -> String {
    VarSubstitution::new(table).substitute(value)
}

/// Check whether following the var references of `value` leads to `target`
#[must_use]
pub fn refers_to<'a>(table: &'a SymbolTable, value: &'a str, target: &str) -> bool {
    let mut seen = create_hash_set();
    let mut stack: Vec<&'a str> = value_references(value).iter().map(|r| r.name).collect();
    while let Some(name) = stack.pop() {
        if name == target {
            return true;
        }
        if !seen.insert(name) {
            continue;
        }
        if let Some(raw) = table.var_value(name) {
            stack.extend(value_references(raw).iter().map(|r| r.name));
        }
    }
    false
}

/// Memoized `value()` expansion over one symbol table
///
/// Vars that reach themselves through their references are never expanded
/// and keep their `value()` text. Every other var only leads to vars that end,
/// so its expansion is computed once and reused.
#[derive(Debug)]
pub struct VarSubstitution<'t> {
    /// Symbols providing var values
    table: &'t SymbolTable,
    /// Expanded values of non-cyclic vars
    expanded: HashMap<String, String, RandomState>,
    /// Cycle membership per var
    cyclic: HashMap<String, bool, RandomState>,
}

impl<'t> VarSubstitution<'t> {
    /// Create an empty cache over `table`
    #[must_use]
    pub fn new(table: &'t SymbolTable) -> Self {
        Self {
            table,
            expanded: create_hash_map(),
            cyclic: create_hash_map(),
        }
    }

    /// Replace var references in `value`, leaving unresolved and cyclic ones intact
    pub fn substitute(&mut self, value: &str) -> String {
        let references = value_references(value);
        if references.is_empty() {
            return value.to_string();
        }
        let mut out = String::with_capacity(value.len());
        let mut cursor = 0;
        for reference in references {
            out.push_str(&value[cursor..reference.offset]);
            match self.expand(reference.name) {
                Some(resolved) => out.push_str(&resolved),
                None => out.push_str(reference.text),
            }
            cursor = reference.offset + reference.text.len();
        }
        out.push_str(&value[cursor..]);
        out
    }

    /// Check whether `name` reaches itself through its references
    pub fn is_cyclic(&mut self, name: &str) -> bool {
        if let Some(&cyclic) = self.cyclic.get(name) {
            return cyclic;
        }
        let table = self.table;
        let cyclic = table
            .var_value(name)
            .is_some_and(|raw| refers_to(table, raw, name));
        self.cyclic.insert(name.to_string(), cyclic);
        cyclic
    }

    /// Expanded value of a var, `None` when it is unknown or cyclic
    fn expand(&mut self, name: &str) -> Option<String> {
        if let Some(done) = self.expanded.get(name) {
            return Some(done.clone());
        }
        let table = self.table;
        let raw = table.var_value(name)?;
        if self.is_cyclic(name) {
            return None;
        }
        let resolved = self.substitute(raw);
        self.expanded.insert(name.to_string(), resolved.clone());
        Some(resolved)
    }
}

impl Validator<'_, '_> {
    /// Check one declaration of a plain rule and fold it into the model
    pub(super) fn check_declaration(
        &mut self,
        rule: &Rule,
        list: &SelectorList,
        element: Option<SimpleKind>,
        decl: &Declaration,
        index: usize,
    ) {
        let simple = element.is_some();
        let on_tag = element == Some(SimpleKind::Tag);
        if !Directive::is_directive(&decl.prop) {
            if self.config.check_properties && !is_known_property(&decl.prop, self.config) {
                self.reporter.error_covering(
                    rules::UNKNOWN_PROPERTY,
                    format!("unknown rule \"{}\"", decl.prop),
                    decl.prop_start,
                    &decl.prop,
                );
            }
            self.check_value_refs(decl);
            let value = self.vars.substitute(&decl.value);
            self.rules[index].merge(ResolvedDeclaration::new(decl.prop.as_str(), value));
            return;
        }

        match Directive::parse(&decl.prop) {
            Some(Directive::States) if !simple => self.reporter.error_covering(
                rules::COMPLEX_SELECTOR,
                "cannot define pseudo states inside complex selectors",
                decl.prop_start,
                &decl.prop,
            ),
            Some(Directive::States) if on_tag => self.reporter.error_covering(
                rules::ELEMENT_DEFINITION,
                "cannot define pseudo states inside element selectors",
                decl.prop_start,
                &decl.prop,
            ),
            Some(Directive::Variant) if !simple => self.reporter.error_covering(
                rules::COMPLEX_SELECTOR,
                "cannot define \"-st-variant\" inside complex selector",
                decl.prop_start,
                &decl.prop,
            ),
            Some(Directive::Variant) if on_tag => self.reporter.error_covering(
                rules::ELEMENT_DEFINITION,
                "cannot define \"-st-variant\" inside element selectors",
                decl.prop_start,
                &decl.prop,
            ),
            Some(Directive::Variant) => {
                if !matches!(decl.value.as_str(), "true" | "false") {
                    self.reporter.error_covering(
                        rules::VARIANT_VALUE,
                        format!(
                            "-st-variant can only be true or false, the value \"{}\" is illegal",
                            decl.value
                        ),
                        decl.value_start,
                        &decl.value,
                    );
                }
            }
            Some(Directive::Extends) if !simple => self.reporter.error_covering(
                rules::COMPLEX_SELECTOR,
                "cannot define \"-sb-extend\" inside complex selector",
                decl.prop_start,
                &decl.prop,
            ),
            Some(Directive::Extends) if decl.value.contains('(') => self.apply_mixins(rule, list, decl, index),
            Some(Directive::Extends) => self.check_extends(decl),
            Some(Directive::Mixin) => self.apply_mixins(rule, list, decl, index),
            Some(Directive::States) => {}
            Some(Directive::From | Directive::Default | Directive::Named) | None => {
                self.reporter.error_covering(
                    rules::UNKNOWN_DIRECTIVE,
                    format!("unknown directive \"{}\"", decl.prop),
                    decl.prop_start,
                    &decl.prop,
                );
            }
        }
    }

    /// Check that an `-st-extends` target names a stylesheet
    fn check_extends(&mut self, decl: &Declaration) {
        let name = decl.value.as_str();
        let message = match self.table.lookup(name) {
            Some(Symbol::Stylesheet(_)) => return,
            None => (rules::UNKNOWN_STYLESHEET, format!("unknown stylesheet \"{name}\"")),
            Some(other) => (
                rules::KIND_MISMATCH,
                format!("\"{name}\" is a {} and cannot be used as a stylesheet", other.kind()),
            ),
        };
        self.reporter
            .error_covering(message.0, message.1, decl.value_start, name);
    }

    /// Run the mixin applier for one declaration
    fn apply_mixins(&mut self, rule: &Rule, list: &SelectorList, decl: &Declaration, index: usize) {
        MixinApplier::new(self.table).apply(rule, list, decl, &mut self.reporter, &mut self.rules[index]);
    }

    /// Report a `:vars` entry whose references lead back to itself
    pub(super) fn check_var_cycle(&mut self, decl: &Declaration) {
        if refers_to(self.table, &decl.value, &decl.prop) {
            self.reporter.error_covering(
                rules::VAR_CYCLE,
                format!("cyclic var \"{}\"", decl.prop),
                decl.prop_start,
                &decl.prop,
            );
        }
    }

    /// Check every `value()` reference of a declaration
    pub(super) fn check_value_refs(&mut self, decl: &Declaration) {
        for reference in value_references(&decl.value) {
            let name = reference.name;
            let message = match self.table.lookup(name) {
                Some(Symbol::Var(_)) => continue,
                None => (rules::UNKNOWN_VAR, format!("unknown var \"{name}\"")),
                Some(other) => (
                    rules::KIND_MISMATCH,
                    format!("\"{name}\" is a {} and cannot be used as a var", other.kind()),
                ),
            };
            self.reporter.error_covering(
                message.0,
                message.1,
                decl.value_position(reference.offset),
                reference.text,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::symbols::VarSymbol;

    fn table() -> SymbolTable {
        let mut table = SymbolTable::new("main.css", "main");
        for (name, value) in [("gap", "4px"), ("double", "value(gap) value(gap)"), ("loop", "value(loop)")] {
            table.define(
                name,
                Symbol::Var(VarSymbol {
                    name: name.to_string(),
                    value: value.to_string(),
                }),
            );
        }
        table
    }

    #[test]
    fn finds_references() {
        let refs = value_references("value(a) myvalue(b) value( 'c' ) value(d");
        let names: Vec<&str> = refs.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(refs[1].text, "value( 'c' )");
    }

    #[test]
    fn substitutes_nested_vars() {
        let table = table();
        assert_eq!(substitute_vars(&table, "margin value(gap)"), "margin 4px");
        assert_eq!(substitute_vars(&table, "value(double)"), "4px 4px");
        assert_eq!(substitute_vars(&table, "value(nope)"), "value(nope)");
        assert_eq!(substitute_vars(&table, "value(loop)"), "value(loop)");
    }

    #[test]
    fn cyclic_vars_stay_unexpanded() {
        let mut table = table();
        for (name, value) in [("x", "value(y) value(y)"), ("y", "1px value(x)"), ("z", "value(y) solid")] {
            table.define(
                name,
                Symbol::Var(VarSymbol {
                    name: name.to_string(),
                    value: value.to_string(),
                }),
            );
        }
        assert!(refers_to(&table, "value(y)", "x"));
        assert!(!refers_to(&table, "value(double)", "double"));

        let mut vars = VarSubstitution::new(&table);
        assert!(vars.is_cyclic("x"));
        assert!(vars.is_cyclic("loop"));
        assert!(!vars.is_cyclic("z"));
        assert_eq!(vars.substitute("value(z) value(double)"), "value(y) solid 4px 4px");
        assert_eq!(vars.substitute("value(x)"), "value(x)");
    }
}
