//! Mixin and variant application
//!
//! `-st-mixin` (and `-st-extend` with arguments) names one or more
//! invocations. Each one resolves to a host mixin, which runs synchronously
//! and contributes declarations, or to a variant, whose declarations are
//! copied after checking that the rule targets the variant's component.
//! Failures of either become diagnostics; the applier is the only place where
//! mixin errors and panics are turned into reports.

use super::diagnostics::{rules, Reporter};
use super::extends::provenance;
use super::model::ResolvedRule;
use super::symbols::{MixinSymbol, Symbol, SymbolTable, VariantSymbol};
use crate::parser::{Declaration, Position, Rule};
use crate::selector::SelectorList;
use crate::utils::{leading_whitespace, split_top_level, unquote, CoreError};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{trace, warn};

/// One `name(args)` item of a mixin declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixinInvocation {
    /// Referenced identifier
    pub name: String,
    /// Arguments, trimmed and unquoted
    pub args: Vec<String>,
    /// Trimmed source text of the item
    pub text: String,
    /// Byte offset of the item inside the declaration value
    pub offset: usize,
}

/// Split a declaration value into invocations
///
/// `name` and `name()` both take zero arguments.
#[must_use]
pub fn parse_invocations(value: &str) -> Vec<MixinInvocation> {
    split_top_level(value, ',')
        .into_iter()
        .filter_map(|(offset, piece)| {
            let text = piece.trim();
            if text.is_empty() {
                return None;
            }
            let (name, args) = match text.find('(') {
                Some(open) => {
                    let inner = &text[open + 1..];
                    let inner = inner.strip_suffix(')').unwrap_or(inner);
                    (text[..open].trim(), parse_arguments(inner))
                }
                None => (text, Vec::new()),
            };
            Some(MixinInvocation {
                name: name.to_string(),
                args,
                text: text.to_string(),
                offset: offset + leading_whitespace(piece),
            })
        })
        .collect()
}

/// Split an argument list on top-level commas
fn parse_arguments(inner: &str) -> Vec<String> {
    if inner.trim().is_empty() {
        return Vec::new();
    }
    split_top_level(inner, ',')
        .into_iter()
        .map(|(_, arg)| unquote(arg).to_string())
        .collect()
}

/// Text of a panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "mixin panicked".to_string()
    }
}

/// Applies the invocations of one declaration to the owning rule's model
pub(crate) struct MixinApplier<'t> {
    /// Symbols of the stylesheet being analyzed
    table: &'t SymbolTable,
}

impl<'t> MixinApplier<'t> {
    /// Create an applier for one stylesheet
    pub(crate) const fn new(table: &'t SymbolTable) -> Self {
        Self { table }
    }

    /// Apply every invocation of `decl`, merging results into `target`
    pub(crate) fn apply(
        &self,
        rule: &Rule,
        list: &SelectorList,
        decl: &Declaration,
        reporter: &mut Reporter<'_>,
        target: &mut ResolvedRule,
    ) {
        for invocation in parse_invocations(&decl.value) {
            let at = decl.value_position(invocation.offset);
            let name = invocation.name.as_str();
            match self.table.lookup(name) {
                None => reporter.error_covering(
                    rules::UNKNOWN_MIXIN,
                    format!("unknown mixin: \"{name}\""),
                    at,
                    &invocation.text,
                ),
                Some(Symbol::Mixin(mixin)) => invoke(&mixin, &invocation, at, reporter, target),
                Some(Symbol::Variant(variant)) => {
                    self.apply_variant(&variant, &invocation, rule, list, at, reporter, target);
                }
                Some(other) => reporter.error_covering(
                    rules::KIND_MISMATCH,
                    format!("\"{name}\" is a {} and cannot be used as a mixin", other.kind()),
                    at,
                    &invocation.text,
                ),
            }
        }
    }

    /// Copy a variant's declarations when the rule targets its component
    #[allow(clippy::too_many_arguments)]
    fn apply_variant(
        &self,
        variant: &VariantSymbol,
        invocation: &MixinInvocation,
        rule: &Rule,
        list: &SelectorList,
        at: Position,
        reporter: &mut Reporter<'_>,
        target: &mut ResolvedRule,
    ) {
        let name = invocation.name.as_str();
        if !invocation.args.is_empty() {
            reporter.error_covering(
                rules::MIXIN_ARGUMENTS,
                format!("invalid mixin arguments: \"{name}\" is a variant and does not accept arguments"),
                at,
                &invocation.text,
            );
            return;
        }

        if variant.namespace != self.table.namespace() {
            for complex in list.complexes() {
                let refers = complex
                    .subject()
                    .map(|subject| provenance(self.table, subject))
                    .unwrap_or_default();
                if refers.contains(variant.namespace.as_str()) {
                    continue;
                }
                let selector = rule.selector.as_str();
                let target_ns = &variant.namespace;
                let message = match refers.first() {
                    None => format!(
                        "\"{name}\" cannot be applied to \"{selector}\", \"{selector}\" refers to a native node and \"{name}\" can only be spplied to \"@namespace of {target_ns}\""
                    ),
                    Some(other) => format!(
                        "\"{name}\" cannot be applied to \"{selector}\", \"{selector}\" refers to \"@namespace of {other}\" and \"{name}\" can only be spplied to \"@namespace of {target_ns}\""
                    ),
                };
                reporter.error_covering(rules::VARIANT_SCOPE, message, at, &invocation.text);
                return;
            }
        }

        for decl in &variant.declarations {
            target.merge(decl.clone());
        }
    }
}

/// Run a host mixin, turning failures into diagnostics
fn invoke(
    symbol: &MixinSymbol,
    invocation: &MixinInvocation,
    at: Position,
    reporter: &mut Reporter<'_>,
    target: &mut ResolvedRule,
) {
    let name = invocation.name.as_str();
    let expected = symbol.mixin.arity();
    let received = invocation.args.len();
    if expected != received {
        reporter.error_covering(
            rules::MIXIN_ARGUMENTS,
            format!("invalid mixin arguments: \"{name}\" expects {expected} arguments but recieved {received}"),
            at,
            &invocation.text,
        );
        return;
    }

    trace!(mixin = name, args = received, "invoking mixin");
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| symbol.call(&invocation.args)));
    let error = match outcome {
        Ok(Ok(declarations)) => {
            for decl in declarations {
                target.merge(decl.into());
            }
            return;
        }
        Ok(Err(CoreError::Mixin { message, .. })) => message,
        Ok(Err(other)) => other.to_string(),
        Err(payload) => {
            let text = panic_message(payload.as_ref());
            warn!(mixin = name, error = %text, "mixin panicked");
            text
        }
    };
    reporter.error_covering(
        rules::MIXIN_ERROR,
        format!("\"{name}\" has thrown an error: {error}"),
        at,
        &invocation.text,
    );
}
