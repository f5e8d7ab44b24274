//! Module resolution and host-provided script modules
//!
//! The analysis engine never touches the file system. Every `-st-from` request
//! goes through a [`ModuleResolver`], which answers with either another
//! stylesheet or a [`ScriptModule`]: a host module exporting mixins, vars, and
//! stylesheets by name.
//!
//! # Example
//!
//! ```rust
//! use stylable_core::modules::{FnMixin, MemoryResolver, MixinDeclaration, ModuleResolver, ScriptModule};
//! use stylable_core::parser::Stylesheet;
//!
//! let mut mixins = ScriptModule::new("mixins.js");
//! mixins
//!     .register_mixin("flex", FnMixin::new(0, |_| Ok(vec![MixinDeclaration::new("display", "flex")])))
//!     .unwrap();
//!
//! let mut resolver = MemoryResolver::new();
//! resolver.register_stylesheet("./button", Stylesheet::parse("button.st.css", ".root{}")).unwrap();
//! resolver.register_script("./mixins", mixins).unwrap();
//!
//! assert!(resolver.resolve("./button").is_some());
//! assert!(resolver.resolve("./missing").is_none());
//! ```

use crate::parser::Stylesheet;
use crate::utils::{create_hash_map, CoreError, Result};
use ahash::RandomState;
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Answer of a resolver for one import request
#[derive(Debug, Clone)]
pub enum ResolvedModule {
    /// Another stylesheet, analyzed recursively
    Stylesheet(Arc<Stylesheet>),
    /// Host module with named exports
    Script(Arc<ScriptModule>),
}

impl ResolvedModule {
    /// Identity of the resolved module, used for cycle detection
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Stylesheet(sheet) => sheet.id(),
            Self::Script(script) => script.id(),
        }
    }
}

/// Turns `-st-from` requests into modules
pub trait ModuleResolver {
    /// Resolve a request, `None` when nothing matches
    fn resolve(&self, request: &str) -> Option<ResolvedModule>;
}

impl<F> ModuleResolver for F
where
    F: Fn(&str) -> Option<ResolvedModule>,
{
    fn resolve(&self, request: &str) -> Option<ResolvedModule> {
        self(request)
    }
}

/// Declaration returned by a mixin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixinDeclaration {
    /// Property name
    pub prop: String,
    /// Property value
    pub value: String,
}

impl MixinDeclaration {
    /// Create a declaration
    pub fn new(prop: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            prop: prop.into(),
            value: value.into(),
        }
    }
}

/// Failure reported by a mixin implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct MixinError {
    /// Error text shown in the diagnostic
    pub message: String,
}

impl MixinError {
    /// Create an error from its text
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parameterized procedure contributing declarations to a rule
///
/// Implementations run synchronously inside the analysis pass. Errors and
/// panics are both turned into diagnostics by the caller.
pub trait Mixin: Send + Sync {
    /// Number of formal parameters
    fn arity(&self) -> usize;

    /// Run the mixin with already-parsed arguments
    ///
    /// # Errors
    ///
    /// Returns [`MixinError`] when the mixin cannot produce declarations.
    fn invoke(&self, args: &[String]) -> core::result::Result<Vec<MixinDeclaration>, MixinError>;
}

/// Signature of closures wrapped by [`FnMixin`]
type MixinFn = dyn Fn(&[String]) -> core::result::Result<Vec<MixinDeclaration>, MixinError>
    + Send
    + Sync;

/// Mixin backed by a closure
pub struct FnMixin {
    /// Declared parameter count
    arity: usize,
    /// Implementation
    func: Box<MixinFn>,
}

impl FnMixin {
    /// Wrap a closure with its declared arity
    pub fn new<F>(arity: usize, func: F) -> Self
    where
        F: Fn(&[String]) -> core::result::Result<Vec<MixinDeclaration>, MixinError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            arity,
            func: Box::new(func),
        }
    }
}

impl Mixin for FnMixin {
    fn arity(&self) -> usize {
        self.arity
    }

    fn invoke(&self, args: &[String]) -> core::result::Result<Vec<MixinDeclaration>, MixinError> {
        (self.func)(args)
    }
}

impl fmt::Debug for FnMixin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMixin").field("arity", &self.arity).finish()
    }
}

/// Value exported by a script module
#[derive(Clone)]
pub enum Export {
    /// Callable mixin
    Mixin(Arc<dyn Mixin>),
    /// Plain value usable through `value()`
    Var(String),
    /// Stylesheet usable as a component
    Stylesheet(Arc<Stylesheet>),
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mixin(mixin) => f.debug_tuple("Mixin").field(&mixin.arity()).finish(),
            Self::Var(value) => f.debug_tuple("Var").field(value).finish(),
            Self::Stylesheet(sheet) => f.debug_tuple("Stylesheet").field(&sheet.id()).finish(),
        }
    }
}

/// Host module exporting values by name
#[derive(Debug, Clone)]
pub struct ScriptModule {
    /// Module identity
    id: String,
    /// Exports by name
    exports: HashMap<String, Export, RandomState>,
}

impl ScriptModule {
    /// Name of the export bound by `-st-default`
    pub const DEFAULT_EXPORT: &'static str = "default";

    /// Create an empty module
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            exports: create_hash_map(),
        }
    }

    /// Module identity
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Look up an export by name
    #[must_use]
    pub fn export(&self, name: &str) -> Option<&Export> {
        self.exports.get(name)
    }

    /// Number of exports
    #[must_use]
    pub fn export_count(&self) -> usize {
        self.exports.len()
    }

    /// Register an export
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Resolve`] if `name` is already exported.
    pub fn register(&mut self, name: impl Into<String>, export: Export) -> Result<()> {
        let name = name.into();
        if self.exports.contains_key(&name) {
            return Err(CoreError::resolve(
                &self.id,
                format!("export \"{name}\" already registered"),
            ));
        }
        self.exports.insert(name, export);
        Ok(())
    }

    /// Register a mixin export
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Resolve`] if `name` is already exported.
    pub fn register_mixin(&mut self, name: impl Into<String>, mixin: impl Mixin + 'static) -> Result<()> {
        self.register(name, Export::Mixin(Arc::new(mixin)))
    }

    /// Register a var export
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Resolve`] if `name` is already exported.
    pub fn register_var(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.register(name, Export::Var(value.into()))
    }

    /// Register a stylesheet export
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Resolve`] if `name` is already exported.
    pub fn register_stylesheet(&mut self, name: impl Into<String>, sheet: Stylesheet) -> Result<()> {
        self.register(name, Export::Stylesheet(Arc::new(sheet)))
    }
}

/// Resolver backed by an in-memory table of exact request strings
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    /// Modules by request
    modules: HashMap<String, ResolvedModule, RandomState>,
}

impl MemoryResolver {
    /// Create an empty resolver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under a request string
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Resolve`] if `request` is already registered.
    pub fn register(&mut self, request: impl Into<String>, module: ResolvedModule) -> Result<()> {
        let request = request.into();
        if self.modules.contains_key(&request) {
            return Err(CoreError::resolve(&request, "request already registered"));
        }
        self.modules.insert(request, module);
        Ok(())
    }

    /// Register a stylesheet under a request string
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Resolve`] if `request` is already registered.
    pub fn register_stylesheet(&mut self, request: impl Into<String>, sheet: Stylesheet) -> Result<()> {
        self.register(request, ResolvedModule::Stylesheet(Arc::new(sheet)))
    }

    /// Register a script module under a request string
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Resolve`] if `request` is already registered.
    pub fn register_script(&mut self, request: impl Into<String>, script: ScriptModule) -> Result<()> {
        self.register(request, ResolvedModule::Script(Arc::new(script)))
    }

    /// Number of registered requests
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleResolver for MemoryResolver {
    fn resolve(&self, request: &str) -> Option<ResolvedModule> {
        self.modules.get(request).cloned()
    }
}
