//! Symbol table construction
//!
//! One pass over a stylesheet registers every class that appears in a
//! selector, the directives of simple class rules, `:vars` entries, and the
//! bindings of each `:import` block. Imported stylesheets are built through
//! the same builder, so the stack of stylesheets currently being built is what
//! detects cycles.

use super::diagnostics::Diagnostic;
use super::directives::{parse_states, simple_element, BlockKind, Directive};
use super::imports::ImportDeclaration;
use super::model::{merge_declaration, ResolvedDeclaration};
use super::symbols::{Symbol, SymbolTable, VarSymbol};
use crate::modules::ModuleResolver;
use crate::parser::{Node, Rule, Stylesheet};
use crate::selector::{parse_selector, SelectorList, SimpleKind};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

/// Import diagnostics keyed by the byte offset of their `:import` selector
pub(crate) type ImportReports = BTreeMap<usize, Vec<Diagnostic>>;

/// Result of building one stylesheet's table
#[derive(Debug)]
pub(crate) struct BuiltTable {
    /// Symbols of the stylesheet
    pub(crate) table: SymbolTable,
    /// Diagnostics of its `:import` blocks
    pub(crate) import_reports: ImportReports,
}

/// Builds symbol tables, recursing into imported stylesheets
pub(crate) struct TableBuilder<'r> {
    /// Host resolver
    resolver: &'r dyn ModuleResolver,
    /// Identities of the stylesheets being built, outermost first
    in_flight: Vec<String>,
}

impl<'r> TableBuilder<'r> {
    /// Create a builder with nothing in flight
    pub(crate) fn new(resolver: &'r dyn ModuleResolver) -> Self {
        Self {
            resolver,
            in_flight: Vec::new(),
        }
    }

    /// Host resolver
    pub(crate) fn resolver(&self) -> &'r dyn ModuleResolver {
        self.resolver
    }

    /// Build the table of `sheet`
    pub(crate) fn build(&mut self, sheet: &Stylesheet) -> BuiltTable {
        self.in_flight.push(sheet.id().to_string());
        let mut table = SymbolTable::new(sheet.id(), sheet.namespace());
        let mut import_reports = ImportReports::new();
        self.collect(sheet.nodes(), &mut table, &mut import_reports);
        self.in_flight.pop();
        BuiltTable {
            table,
            import_reports,
        }
    }

    /// Build an imported stylesheet's table, `None` when that would be a cycle
    pub(crate) fn nested_table(&mut self, sheet: &Stylesheet) -> Option<Arc<SymbolTable>> {
        if self.in_flight.iter().any(|id| id == sheet.id()) {
            return None;
        }
        trace!(id = sheet.id(), depth = self.in_flight.len(), "building imported table");
        Some(Arc::new(self.build(sheet).table))
    }

    /// Walk rules and conditional group at-rules
    fn collect(&mut self, nodes: &[Node], table: &mut SymbolTable, reports: &mut ImportReports) {
        for node in nodes {
            match node {
                Node::Rule(rule) => self.collect_rule(rule, table, reports),
                Node::AtRule(at_rule) if is_conditional_group(&at_rule.name) => {
                    if let Some(children) = &at_rule.nodes {
                        self.collect(children, table, reports);
                    }
                }
                _ => {}
            }
        }
    }

    /// Register what one rule contributes, then its nested rules
    fn collect_rule(&mut self, rule: &Rule, table: &mut SymbolTable, reports: &mut ImportReports) {
        let list = parse_selector(&rule.selector);
        match BlockKind::classify(&list) {
            BlockKind::Import => {
                let mut pending = Vec::new();
                if let Some(import) = ImportDeclaration::from_rule(rule, &mut pending) {
                    self.bind_import(&import, table, &mut pending);
                    table.push_import(import);
                }
                if !pending.is_empty() {
                    pending.sort_by_key(|report| report.start().offset);
                    reports
                        .entry(rule.selector_start.offset)
                        .or_default()
                        .extend(pending);
                }
            }
            BlockKind::Vars => {
                for decl in rule.declarations() {
                    table.define(
                        decl.prop.clone(),
                        Symbol::Var(VarSymbol {
                            name: decl.prop.clone(),
                            value: decl.value.clone(),
                        }),
                    );
                }
            }
            BlockKind::ComplexImport | BlockKind::ComplexVars => {}
            BlockKind::Plain => collect_classes(rule, &list, table),
        }
        self.collect(&rule.nodes, table, reports);
    }
}

/// Register classes of a plain rule and the directives of a simple class rule
fn collect_classes(rule: &Rule, list: &SelectorList, table: &mut SymbolTable) {
    for compound in list.compounds() {
        for part in &compound.parts {
            if part.kind == SimpleKind::Class && !part.name.is_empty() {
                table.ensure_class(&part.name);
            }
        }
    }

    let Some(element) = simple_element(list).filter(|part| part.kind == SimpleKind::Class) else {
        return;
    };
    let class = table.ensure_class(&element.name);
    for decl in rule.declarations() {
        match Directive::parse(&decl.prop) {
            Some(Directive::States) => {
                for state in parse_states(&decl.value) {
                    if !class.states.contains(&state) {
                        class.states.push(state);
                    }
                }
            }
            Some(Directive::Variant) => class.variant = decl.value.trim() == "true",
            Some(Directive::Extends) if !decl.value.contains('(') => {
                class.extends = Some(decl.value.trim().to_string());
            }
            Some(_) => {}
            None if Directive::is_directive(&decl.prop) => {}
            None => merge_declaration(
                &mut class.declarations,
                ResolvedDeclaration::new(decl.prop.as_str(), decl.value.as_str()),
            ),
        }
    }
}

/// At-rules whose blocks contain ordinary rules
pub(crate) fn is_conditional_group(name: &str) -> bool {
    matches!(name, "media" | "supports" | "document" | "layer" | "container")
}
