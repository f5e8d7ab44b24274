//! Conflicting extends detection
//!
//! A compound selector such as `.my-a.my-b` targets one element. When its
//! classes extend different stylesheets, or a component tag is combined with a
//! class extending another component, the element would have to belong to two
//! components at once. The check runs after traversal over the compounds the
//! validator recorded, in source order.

use super::diagnostics::{rules, Diagnostic, Reporter};
use super::symbols::SymbolTable;
use crate::parser::{Position, Span};
use crate::selector::{Compound, SimpleKind};
use crate::utils::create_hash_set;
use std::collections::BTreeSet;

/// Compound of a plain rule with its absolute source position
#[derive(Debug, Clone)]
pub(crate) struct RecordedCompound {
    /// Parsed compound
    pub(crate) compound: Compound,
    /// Position of the compound's first character
    pub(crate) start: Position,
}

/// Namespaces a compound's element selectors extend
///
/// Classes contribute the namespace of the stylesheet they extend and
/// capitalized tags the namespace of the component they name. Selectors after
/// the first pseudo-element target a part, not the element, and are skipped.
pub(crate) fn provenance<'t>(table: &'t SymbolTable, compound: &Compound) -> BTreeSet<&'t str> {
    compound
        .parts
        .iter()
        .take_while(|part| part.kind != SimpleKind::PseudoElement)
        .filter_map(|part| match part.kind {
            SimpleKind::Class => table.extended_table(&part.name),
            SimpleKind::Tag => table.stylesheet(&part.name),
            _ => None,
        })
        .map(|target| target.namespace())
        .collect()
}

/// Report every compound with more than one provenance, once per text
pub(crate) fn detect(table: &SymbolTable, compounds: &[RecordedCompound], reporter: &mut Reporter<'_>) {
    let mut seen = create_hash_set();
    for recorded in compounds {
        if provenance(table, &recorded.compound).len() < 2 {
            continue;
        }
        let text = recorded.compound.text.as_str();
        if !seen.insert(text) {
            continue;
        }
        reporter.report(Diagnostic::warning(
            rules::CONFLICTING_EXTENDS,
            format!("conflicting extends matching same target [{text}]"),
            Span::covering(recorded.start, text),
        ));
    }
}
