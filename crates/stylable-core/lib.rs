//! # Stylable Core
//!
//! Semantic analysis and diagnostics for component stylesheets: CSS extended
//! with `-st-*` directives, `:import` and `:vars` blocks, custom pseudo-states,
//! and component parts exposed as pseudo-elements.
//!
//! ## Features
//!
//! - **Tolerant parsing**: syntax problems become issues, never failures
//! - **Symbol resolution**: imports resolved recursively through a host resolver
//! - **Exact diagnostics**: one message per problem, located at the offending token
//! - **Mixins and variants**: host mixins run synchronously, errors and panics are caught
//! - **Thread-safe**: built tables are immutable and shared through `Arc`
//!
//! ## Quick Start
//!
//! ```rust
//! use stylable_core::{process, MemoryResolver, Stylesheet};
//!
//! let mut resolver = MemoryResolver::new();
//! resolver.register_stylesheet(
//!     "./button",
//!     Stylesheet::parse("button.st.css", ".root { -st-states: pressed; } .label {}"),
//! )?;
//!
//! let sheet = Stylesheet::parse(
//!     "main.st.css",
//!     r#"
//!     :import { -st-from: "./button"; -st-default: Button; }
//!     Button:pressed::label { color: red; }
//!     Button::icon { color: blue; }
//!     "#,
//! );
//!
//! let result = process(&sheet, &resolver);
//! assert_eq!(result.diagnostics.messages(), vec!["unknown pseudo element \"icon\""]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(clippy::all)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod modules;
pub mod parser;
pub mod selector;
pub mod utils;

pub use analysis::{
    process, Diagnostic, Diagnostics, ProcessConfig, ProcessResult, Processor, Severity,
    StylesheetModel, Symbol, SymbolKind, SymbolTable,
};
pub use modules::{
    Export, FnMixin, MemoryResolver, Mixin, MixinDeclaration, MixinError, ModuleResolver,
    ResolvedModule, ScriptModule,
};
pub use parser::{Position, Span, Stylesheet};
pub use utils::{CoreError, ErrorCategory};

/// Crate version for runtime compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for fallible host-facing operations
pub type Result<T> = core::result::Result<T, CoreError>;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn engine_types_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Stylesheet>();
        assert_send_sync::<SymbolTable>();
        assert_send_sync::<StylesheetModel>();
        assert_send_sync::<Diagnostics>();
        assert_send_sync::<MemoryResolver>();
        assert_send_sync::<ScriptModule>();
    }
}
