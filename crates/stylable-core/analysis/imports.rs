//! `:import` blocks: reading declarations and binding imported symbols
//!
//! Reading a block yields an [`ImportDeclaration`] plus diagnostics for
//! anything that does not belong in it. Binding asks the
//! [`ModuleResolver`](crate::modules::ModuleResolver)
//! for the module, builds the target's symbol table recursively through the
//! table builder, and copies the requested symbols under their local names.

use super::builder::TableBuilder;
use super::diagnostics::{rules, Diagnostic};
use super::directives::Directive;
use super::symbols::{MixinSymbol, StylesheetSymbol, Symbol, SymbolTable, VarSymbol};
use crate::modules::{Export, ResolvedModule, ScriptModule};
use crate::parser::{Declaration, Position, Rule, Span};
use crate::utils::{split_top_level, unquote};
use std::sync::Arc;
use tracing::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One entry of `-st-named`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NamedImport {
    /// Name exported by the target
    pub exported: String,
    /// Local name
    pub alias: String,
    /// Position of the exported name
    pub position: Position,
}

/// Contents of one `:import` block
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImportDeclaration {
    /// Request passed to the resolver, quotes stripped
    pub from_path: String,
    /// Position of the `-st-from` value
    pub from_position: Position,
    /// Local name of the default import
    pub default_name: Option<String>,
    /// Position of the `-st-default` value
    pub default_position: Position,
    /// Named imports in declaration order
    pub named: Vec<NamedImport>,
    /// Position of the block's selector
    pub rule_start: Position,
}

impl ImportDeclaration {
    /// Read a bare `:import` rule
    ///
    /// Foreign declarations are reported and ignored. Returns `None`, with a
    /// diagnostic, when `-st-from` is missing or empty.
    pub(crate) fn from_rule(rule: &Rule, reports: &mut Vec<Diagnostic>) -> Option<Self> {
        let mut from: Option<(String, Position)> = None;
        let mut default: Option<(String, Position)> = None;
        let mut named = Vec::new();

        for decl in rule.declarations() {
            match Directive::parse(&decl.prop) {
                Some(Directive::From) => {
                    from = Some((unquote(&decl.value).to_string(), decl.value_start));
                }
                Some(Directive::Default) => {
                    default = Some((decl.value.trim().to_string(), decl.value_start));
                }
                Some(Directive::Named) => named.extend(parse_named(decl)),
                _ => reports.push(Diagnostic::error(
                    rules::IMPORT,
                    format!("\"{}\" css attribute cannot be used inside import block", decl.prop),
                    Span::covering(decl.prop_start, &decl.prop),
                )),
            }
        }

        let Some((from_path, from_position)) = from.filter(|(path, _)| !path.is_empty()) else {
            reports.push(Diagnostic::error(
                rules::IMPORT,
                "\"-st-from\" is missing in import block",
                Span::covering(rule.selector_start, &rule.selector),
            ));
            return None;
        };

        let (default_name, default_position) = match default {
            Some((name, position)) if !name.is_empty() => (Some(name), position),
            _ => (None, rule.selector_start),
        };

        Some(Self {
            from_path,
            from_position,
            default_name,
            default_position,
            named,
            rule_start: rule.selector_start,
        })
    }
}

/// Parse `a, b as c` with the position of each exported name
fn parse_named(decl: &Declaration) -> Vec<NamedImport> {
    split_top_level(&decl.value, ',')
        .into_iter()
        .filter_map(|(offset, piece)| {
            let lead = piece.len() - piece.trim_start().len();
            let mut words = piece.split_whitespace();
            let exported = words.next()?;
            let alias = match (words.next(), words.next()) {
                (Some("as"), Some(alias)) => alias,
                _ => exported,
            };
            Some(NamedImport {
                exported: exported.to_string(),
                alias: alias.to_string(),
                position: decl.value_position(offset + lead),
            })
        })
        .collect()
}

impl TableBuilder<'_> {
    /// Resolve an import and bind its symbols into `table`
    pub(crate) fn bind_import(
        &mut self,
        import: &ImportDeclaration,
        table: &mut SymbolTable,
        reports: &mut Vec<Diagnostic>,
    ) {
        let path = import.from_path.as_str();
        trace!(importer = table.id(), request = path, "resolving import");

        let Some(module) = self.resolver().resolve(path) else {
            trace!(request = path, "import not found");
            reports.push(Diagnostic::error(
                rules::IMPORT,
                format!("could not find file \"{path}\""),
                Span::new(import.from_position, import.from_position),
            ));
            return;
        };

        match module {
            ResolvedModule::Stylesheet(sheet) => {
                let Some(target) = self.nested_table(&sheet) else {
                    reports.push(cyclic(import));
                    return;
                };
                if let Some(name) = &import.default_name {
                    table.define(
                        name.clone(),
                        Symbol::Stylesheet(StylesheetSymbol {
                            alias: name.clone(),
                            table: Arc::clone(&target),
                        }),
                    );
                }
                for named in &import.named {
                    match target.lookup(&named.exported) {
                        Some(symbol) => table.define(named.alias.clone(), symbol),
                        None => reports.push(missing_export(&named.exported, named.position, path)),
                    }
                }
            }
            ResolvedModule::Script(script) => {
                if let Some(name) = &import.default_name {
                    match script.export(ScriptModule::DEFAULT_EXPORT) {
                        Some(export) => self.bind_export(name, export, import, table, reports),
                        None => reports.push(missing_export(
                            ScriptModule::DEFAULT_EXPORT,
                            import.default_position,
                            path,
                        )),
                    }
                }
                for named in &import.named {
                    match script.export(&named.exported) {
                        Some(export) => self.bind_export(&named.alias, export, import, table, reports),
                        None => reports.push(missing_export(&named.exported, named.position, path)),
                    }
                }
            }
        }
    }

    /// Bind one script export under `alias`
    fn bind_export(
        &mut self,
        alias: &str,
        export: &Export,
        import: &ImportDeclaration,
        table: &mut SymbolTable,
        reports: &mut Vec<Diagnostic>,
    ) {
        let symbol = match export {
            Export::Mixin(mixin) => Symbol::Mixin(MixinSymbol {
                name: alias.to_string(),
                mixin: Arc::clone(mixin),
            }),
            Export::Var(value) => Symbol::Var(VarSymbol {
                name: alias.to_string(),
                value: value.clone(),
            }),
            Export::Stylesheet(sheet) => {
                let Some(target) = self.nested_table(sheet) else {
                    reports.push(cyclic(import));
                    return;
                };
                Symbol::Stylesheet(StylesheetSymbol {
                    alias: alias.to_string(),
                    table: target,
                })
            }
        };
        table.define(alias, symbol);
    }
}

/// `cannot find export` diagnostic
fn missing_export(name: &str, position: Position, path: &str) -> Diagnostic {
    Diagnostic::error(
        rules::IMPORT,
        format!("cannot find export \"{name}\" in \"{path}\""),
        Span::covering(position, name),
    )
}

/// `cyclic import` diagnostic at the `-st-from` value
fn cyclic(import: &ImportDeclaration) -> Diagnostic {
    trace!(request = %import.from_path, "cyclic import");
    Diagnostic::error(
        rules::IMPORT,
        format!("cyclic import of \"{}\"", import.from_path),
        Span::new(import.from_position, import.from_position),
    )
}
