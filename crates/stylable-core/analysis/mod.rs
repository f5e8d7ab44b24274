//! Semantic analysis of component stylesheets
//!
//! One call to [`Processor::process`] builds the symbol table of a stylesheet
//! (resolving its imports recursively through the host's
//! [`ModuleResolver`]), validates the tree in document order, applies mixins
//! and variants, and finally checks compounds for conflicting extends.
//!
//! Analysis never fails: every problem becomes a [`Diagnostic`]. Only host
//! configuration can be rejected, through [`Processor::with_config`].
//!
//! # Example
//!
//! ```rust
//! use stylable_core::analysis::{process, Processor, ProcessConfig};
//! use stylable_core::modules::MemoryResolver;
//! use stylable_core::parser::Stylesheet;
//!
//! let sheet = Stylesheet::parse("main.st.css", ".root:hover { color: red; }");
//! let resolver = MemoryResolver::new();
//!
//! let result = process(&sheet, &resolver);
//! assert_eq!(result.diagnostics.messages(), vec!["unknown state \"hover\""]);
//!
//! let quiet = Processor::new(&resolver)
//!     .with_config(ProcessConfig::default().with_property_checks(false))?
//!     .process(&sheet);
//! assert_eq!(quiet.model.rules()[0].get("color"), Some("red"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
pub mod config;
pub mod diagnostics;
pub mod directives;
mod extends;
pub mod imports;
pub mod mixins;
pub mod model;
pub mod symbols;
pub mod validation;

use crate::modules::ModuleResolver;
use crate::parser::Stylesheet;
use crate::Result;
use builder::TableBuilder;
use tracing::debug;
use validation::{ValidationOutput, Validator};

pub use config::ProcessConfig;
pub use diagnostics::{rules, Diagnostic, Diagnostics, Severity};
pub use directives::{BlockKind, Directive};
pub use imports::{ImportDeclaration, NamedImport};
pub use mixins::{parse_invocations, MixinInvocation};
pub use model::{ResolvedDeclaration, ResolvedRule, StylesheetModel};
pub use symbols::{
    ClassSymbol, MixinSymbol, StateSymbol, StylesheetSymbol, Symbol, SymbolKind, SymbolTable,
    VarSymbol, VariantSymbol,
};

/// Outcome of analyzing one stylesheet
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Symbols and resolved rules
    pub model: StylesheetModel,
    /// Reports in emission order
    pub diagnostics: Diagnostics,
}

/// Analysis entry point bound to a host resolver
///
/// A processor holds no state between calls; the same stylesheet processed
/// twice yields identical results.
pub struct Processor<'r> {
    /// Host resolver for `-st-from` requests
    resolver: &'r dyn ModuleResolver,
    /// Reporting configuration
    config: ProcessConfig,
}

impl<'r> Processor<'r> {
    /// Create a processor with the default configuration
    #[must_use]
    pub fn new(resolver: &'r dyn ModuleResolver) -> Self {
        Self {
            resolver,
            config: ProcessConfig::default(),
        }
    }

    /// Replace the configuration
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`](crate::CoreError::Config) when the
    /// configuration names an invalid extra property or pseudo-element.
    pub fn with_config(mut self, config: ProcessConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &ProcessConfig {
        &self.config
    }

    /// Analyze a stylesheet
    #[must_use]
    pub fn process(&self, sheet: &Stylesheet) -> ProcessResult {
        debug!(id = sheet.id(), nodes = sheet.nodes().len(), "processing stylesheet");

        let built = TableBuilder::new(self.resolver).build(sheet);
        let ValidationOutput {
            mut reporter,
            rules,
            compounds,
        } = Validator::new(&built.table, &self.config, sheet.issues(), built.import_reports)
            .run(sheet);
        extends::detect(&built.table, &compounds, &mut reporter);
        let diagnostics = reporter.finish();

        debug!(
            id = sheet.id(),
            reports = diagnostics.len(),
            truncated = diagnostics.truncated(),
            "processed stylesheet"
        );
        ProcessResult {
            model: StylesheetModel::new(built.table, rules),
            diagnostics,
        }
    }
}

impl core::fmt::Debug for Processor<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Processor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Analyze a stylesheet with the default configuration
#[must_use]
pub fn process(sheet: &Stylesheet, resolver: &dyn ModuleResolver) -> ProcessResult {
    Processor::new(resolver).process(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::MemoryResolver;

    #[test]
    fn invalid_config_is_rejected() {
        let resolver = MemoryResolver::new();
        let config = ProcessConfig::default().with_extra_property("bad name");
        assert!(Processor::new(&resolver).with_config(config).is_err());
    }

    #[test]
    fn model_keeps_substituted_declarations() {
        let resolver = MemoryResolver::new();
        let sheet = Stylesheet::parse(
            "main.css",
            ":vars{ gap: 4px; }\n.a{ margin: value(gap); color: red; color: blue; }",
        );
        let result = process(&sheet, &resolver);
        assert!(result.diagnostics.is_empty());
        let rule = result.model.rule(".a").expect("rule .a");
        assert_eq!(rule.get("margin"), Some("4px"));
        assert_eq!(rule.get("color"), Some("blue"));
        assert_eq!(rule.declarations.len(), 2);
        assert_eq!(result.model.namespace(), "main");
    }
}
