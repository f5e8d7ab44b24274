//! Language vocabulary: `-st-*` directives and special blocks

use crate::selector::{SelectorList, SimpleKind, SimpleSelector};

/// Prefix shared by every directive
pub const DIRECTIVE_PREFIX: &str = "-st-";

/// Recognized `-st-*` declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// `-st-states`
    States,
    /// `-st-variant`
    Variant,
    /// `-st-extend` or `-st-extends`
    Extends,
    /// `-st-mixin` or `-st-apply`
    Mixin,
    /// `-st-from`, only inside `:import`
    From,
    /// `-st-default`, only inside `:import`
    Default,
    /// `-st-named`, only inside `:import`
    Named,
}

impl Directive {
    /// Classify a property name, `None` for anything unrecognized
    #[must_use]
    pub fn parse(prop: &str) -> Option<Self> {
        match prop {
            "-st-states" => Some(Self::States),
            "-st-variant" => Some(Self::Variant),
            "-st-extend" | "-st-extends" => Some(Self::Extends),
            "-st-mixin" | "-st-apply" => Some(Self::Mixin),
            "-st-from" => Some(Self::From),
            "-st-default" => Some(Self::Default),
            "-st-named" => Some(Self::Named),
            _ => None,
        }
    }

    /// Check whether a property uses the directive prefix
    #[must_use]
    pub fn is_directive(prop: &str) -> bool {
        prop.starts_with(DIRECTIVE_PREFIX)
    }

    /// Directives that define something and need a simple selector
    #[must_use]
    pub const fn is_definition(self) -> bool {
        matches!(self, Self::States | Self::Variant | Self::Extends)
    }
}

/// Role of a ruleset, decided by its selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Ordinary ruleset
    Plain,
    /// Bare `:import`
    Import,
    /// `:import` combined with anything else
    ComplexImport,
    /// Bare `:vars`
    Vars,
    /// `:vars` combined with anything else
    ComplexVars,
}

impl BlockKind {
    /// Classify a parsed selector
    #[must_use]
    pub fn classify(list: &SelectorList) -> Self {
        let special = |name: &str| {
            list.compounds().any(|compound| {
                compound.parts.iter().any(|part| {
                    part.kind == SimpleKind::PseudoClass && part.args.is_none() && part.name == name
                })
            })
        };
        let bare = list
            .single_compound()
            .is_some_and(|compound| compound.parts.len() == 1);

        if special("import") {
            if bare {
                Self::Import
            } else {
                Self::ComplexImport
            }
        } else if special("vars") {
            if bare {
                Self::Vars
            } else {
                Self::ComplexVars
            }
        } else {
            Self::Plain
        }
    }
}

/// The only class or tag of a simple selector
///
/// A simple selector is one compound made of a single class (including
/// `.root`) or a single tag, with no pseudo-classes or pseudo-elements.
#[must_use]
pub fn simple_element(list: &SelectorList) -> Option<&SimpleSelector> {
    list.single_compound()
        .filter(|compound| compound.parts.len() == 1)
        .and_then(|compound| compound.parts.first())
        .filter(|part| matches!(part.kind, SimpleKind::Class | SimpleKind::Tag))
}

/// Split a `-st-states` value into state names
#[must_use]
pub fn parse_states(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
