//! Symbol tables: what each identifier of a stylesheet means
//!
//! Identifiers in the language are syntactically indistinguishable: `Comp`,
//! `my-variant`, and `gap` only get a meaning once imports are resolved. A
//! [`SymbolTable`] records local classes, declared states, vars, and imported
//! bindings, and classifies any identifier as one [`Symbol`] through
//! [`SymbolTable::lookup`].

use super::imports::ImportDeclaration;
use super::model::ResolvedDeclaration;
use crate::modules::{Mixin, MixinDeclaration};
use crate::utils::{create_hash_map, CoreError, Result};
use ahash::RandomState;
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the implicit root class
pub const ROOT_CLASS: &str = "root";

/// Limit for following `-st-extends` chains
const MAX_EXTENDS_DEPTH: usize = 32;

/// Kind of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Local class
    Class,
    /// Pseudo-state declared through `-st-states`
    State,
    /// Value usable through `value()`
    Var,
    /// Host mixin
    Mixin,
    /// Class declared with `-st-variant: true`
    Variant,
    /// Imported stylesheet
    Stylesheet,
}

impl SymbolKind {
    /// Noun used in messages
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::State => "state",
            Self::Var => "var",
            Self::Mixin => "mixin",
            Self::Variant => "variant",
            Self::Stylesheet => "stylesheet",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// Class of a stylesheet with its directives
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassSymbol {
    /// Class name without the dot
    pub name: String,
    /// States declared through `-st-states`
    pub states: Vec<String>,
    /// Identifier named by `-st-extends`
    pub extends: Option<String>,
    /// Declared with `-st-variant: true`
    pub variant: bool,
    /// Plain declarations of the class's simple rules
    pub declarations: Vec<ResolvedDeclaration>,
}

impl ClassSymbol {
    /// Create a class without directives
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Pseudo-state found by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSymbol {
    /// State name
    pub name: String,
    /// Class declaring the state
    pub owner: String,
}

/// Var from `:vars` or a script module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarSymbol {
    /// Var name
    pub name: String,
    /// Raw value
    pub value: String,
}

/// Mixin imported from a script module
#[derive(Clone)]
pub struct MixinSymbol {
    /// Local name
    pub name: String,
    /// Implementation
    pub mixin: Arc<dyn Mixin>,
}

impl MixinSymbol {
    /// Run the mixin with parsed arguments
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Mixin`] carrying the text of the mixin's own error.
    pub fn call(&self, args: &[String]) -> Result<Vec<MixinDeclaration>> {
        self.mixin
            .invoke(args)
            .map_err(|err| CoreError::mixin(&self.name, err))
    }
}

impl fmt::Debug for MixinSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixinSymbol")
            .field("name", &self.name)
            .field("arity", &self.mixin.arity())
            .finish()
    }
}

/// Variant class, local or imported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSymbol {
    /// Class name in the declaring stylesheet
    pub name: String,
    /// Namespace of the declaring stylesheet
    pub namespace: String,
    /// Declarations merged when the variant is applied
    pub declarations: Vec<ResolvedDeclaration>,
}

/// Imported stylesheet binding
#[derive(Debug, Clone)]
pub struct StylesheetSymbol {
    /// Local name
    pub alias: String,
    /// Symbol table of the imported stylesheet
    pub table: Arc<SymbolTable>,
}

impl StylesheetSymbol {
    /// Namespace of the imported stylesheet
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.table.namespace()
    }
}

/// Meaning of an identifier
#[derive(Debug, Clone)]
pub enum Symbol {
    /// Local class
    Class(ClassSymbol),
    /// Declared pseudo-state
    State(StateSymbol),
    /// Var
    Var(VarSymbol),
    /// Mixin
    Mixin(MixinSymbol),
    /// Variant class
    Variant(VariantSymbol),
    /// Stylesheet
    Stylesheet(StylesheetSymbol),
}

impl Symbol {
    /// Kind tag
    #[must_use]
    pub const fn kind(&self) -> SymbolKind {
        match self {
            Self::Class(_) => SymbolKind::Class,
            Self::State(_) => SymbolKind::State,
            Self::Var(_) => SymbolKind::Var,
            Self::Mixin(_) => SymbolKind::Mixin,
            Self::Variant(_) => SymbolKind::Variant,
            Self::Stylesheet(_) => SymbolKind::Stylesheet,
        }
    }

    /// Name of the symbol
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Class(class) => &class.name,
            Self::State(state) => &state.name,
            Self::Var(var) => &var.name,
            Self::Mixin(mixin) => &mixin.name,
            Self::Variant(variant) => &variant.name,
            Self::Stylesheet(sheet) => &sheet.alias,
        }
    }
}

/// Symbols of one stylesheet
#[derive(Debug, Clone)]
pub struct SymbolTable {
    /// Identity of the stylesheet
    id: String,
    /// Namespace of the stylesheet
    namespace: String,
    /// Classes by name, `root` always present
    classes: HashMap<String, ClassSymbol, RandomState>,
    /// Vars and imported bindings by local name
    identifiers: HashMap<String, Symbol, RandomState>,
    /// Import declarations in document order
    imports: Vec<ImportDeclaration>,
}

impl SymbolTable {
    /// Create a table holding only the root class
    pub fn new(id: impl Into<String>, namespace: impl Into<String>) -> Self {
        let mut classes = create_hash_map();
        classes.insert(ROOT_CLASS.to_string(), ClassSymbol::new(ROOT_CLASS));
        Self {
            id: id.into(),
            namespace: namespace.into(),
            classes,
            identifiers: create_hash_map(),
            imports: Vec::new(),
        }
    }

    /// Identity of the stylesheet
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Namespace of the stylesheet
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Class by name
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&ClassSymbol> {
        self.classes.get(name)
    }

    /// Number of classes, root included
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Var or imported binding by local name
    #[must_use]
    pub fn identifier(&self, name: &str) -> Option<&Symbol> {
        self.identifiers.get(name)
    }

    /// Import declarations in document order
    #[must_use]
    pub fn imports(&self) -> &[ImportDeclaration] {
        &self.imports
    }

    /// Classify an identifier
    ///
    /// Vars and imported bindings win over classes; a class declared with
    /// `-st-variant: true` is a variant; otherwise a declared state name is a
    /// state.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        if let Some(symbol) = self.identifiers.get(name) {
            return Some(symbol.clone());
        }
        if let Some(class) = self.classes.get(name) {
            if class.variant {
                return Some(Symbol::Variant(VariantSymbol {
                    name: class.name.clone(),
                    namespace: self.namespace.clone(),
                    declarations: class.declarations.clone(),
                }));
            }
            return Some(Symbol::Class(class.clone()));
        }
        self.classes
            .values()
            .filter(|class| class.states.iter().any(|state| state == name))
            .map(|class| class.name.as_str())
            .min()
            .map(|owner| {
                Symbol::State(StateSymbol {
                    name: name.to_string(),
                    owner: owner.to_string(),
                })
            })
    }

    /// Imported stylesheet bound to a local name
    #[must_use]
    pub fn stylesheet(&self, name: &str) -> Option<&Arc<SymbolTable>> {
        match self.identifiers.get(name) {
            Some(Symbol::Stylesheet(sheet)) => Some(&sheet.table),
            _ => None,
        }
    }

    /// Stylesheet a class extends, when its `-st-extends` resolves
    #[must_use]
    pub fn extended_table(&self, class: &str) -> Option<&Arc<SymbolTable>> {
        let target = self.classes.get(class)?.extends.as_deref()?;
        self.stylesheet(target)
    }

    /// Check whether `class` declares `state`, following `-st-extends`
    #[must_use]
    pub fn has_state(&self, class: &str, state: &str) -> bool {
        self.has_state_within(class, state, 0)
    }

    /// Depth-limited [`SymbolTable::has_state`]
    fn has_state_within(&self, class: &str, state: &str, depth: usize) -> bool {
        if depth > MAX_EXTENDS_DEPTH {
            return false;
        }
        let Some(symbol) = self.classes.get(class) else {
            return false;
        };
        if symbol.states.iter().any(|declared| declared == state) {
            return true;
        }
        self.extended_table(class)
            .is_some_and(|target| target.has_state_within(ROOT_CLASS, state, depth + 1))
    }

    /// Table declaring `part` as a class of the stylesheet `class` extends
    ///
    /// Follows the root extends of the target when it does not declare the
    /// part itself.
    #[must_use]
    pub fn resolve_part(&self, class: &str, part: &str) -> Option<&Arc<SymbolTable>> {
        let mut target = self.extended_table(class)?;
        for _ in 0..MAX_EXTENDS_DEPTH {
            if target.classes.contains_key(part) {
                return Some(target);
            }
            target = target.extended_table(ROOT_CLASS)?;
        }
        None
    }

    /// Value of a var, when the identifier is one
    #[must_use]
    pub fn var_value(&self, name: &str) -> Option<&str> {
        match self.identifiers.get(name) {
            Some(Symbol::Var(var)) => Some(&var.value),
            _ => None,
        }
    }

    /// Class entry, created on first use
    pub(crate) fn ensure_class(&mut self, name: &str) -> &mut ClassSymbol {
        self.classes
            .entry(name.to_string())
            .or_insert_with(|| ClassSymbol::new(name))
    }

    /// Bind an identifier, overwriting an earlier binding
    pub(crate) fn define(&mut self, name: impl Into<String>, symbol: Symbol) {
        self.identifiers.insert(name.into(), symbol);
    }

    /// Record an import declaration
    pub(crate) fn push_import(&mut self, import: ImportDeclaration) {
        self.imports.push(import);
    }
}
