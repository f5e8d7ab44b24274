//! Selector parsing into list, complex, compound, and simple selectors
//!
//! Every piece records its byte offset inside the selector text so that
//! diagnostics can point at the exact token. Parsing is tolerant: characters
//! outside the selector alphabet are skipped and the first one is remembered
//! for the `illegal character` check.
//!
//! # Example
//!
//! ```rust
//! use stylable_core::selector::{parse_selector, SimpleKind};
//!
//! let list = parse_selector(".root:hover > .label");
//! let complex = &list.complexes()[0];
//! assert_eq!(complex.compounds.len(), 2);
//! assert_eq!(complex.compounds[0].parts[1].kind, SimpleKind::PseudoClass);
//! assert_eq!(complex.compounds[0].parts[1].name_offset, 6);
//! ```

use crate::utils::{is_ident_char, split_top_level};
use bitflags::bitflags;

bitflags! {
    /// Kinds of simple selectors present in a compound
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CompoundFlags: u16 {
        /// `.class`
        const CLASS = 1 << 0;
        /// `#id`
        const ID = 1 << 1;
        /// `tag`
        const TAG = 1 << 2;
        /// `*`
        const UNIVERSAL = 1 << 3;
        /// `[attr]`
        const ATTRIBUTE = 1 << 4;
        /// `:state`
        const PSEUDO_CLASS = 1 << 5;
        /// `::part`
        const PSEUDO_ELEMENT = 1 << 6;
        /// `&`
        const NESTING = 1 << 7;
    }
}

/// Kind of a simple selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimpleKind {
    /// `.name`
    Class,
    /// `#name`
    Id,
    /// `name`
    Tag,
    /// `*`
    Universal,
    /// `[...]`
    Attribute,
    /// `:name` or `:name(...)`
    PseudoClass,
    /// `::name`
    PseudoElement,
    /// `&`
    Nesting,
}

impl SimpleKind {
    /// Flag recorded on the owning compound
    #[must_use]
    pub const fn flag(self) -> CompoundFlags {
        match self {
            Self::Class => CompoundFlags::CLASS,
            Self::Id => CompoundFlags::ID,
            Self::Tag => CompoundFlags::TAG,
            Self::Universal => CompoundFlags::UNIVERSAL,
            Self::Attribute => CompoundFlags::ATTRIBUTE,
            Self::PseudoClass => CompoundFlags::PSEUDO_CLASS,
            Self::PseudoElement => CompoundFlags::PSEUDO_ELEMENT,
            Self::Nesting => CompoundFlags::NESTING,
        }
    }
}

/// Single token of a compound selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleSelector {
    /// Token kind
    pub kind: SimpleKind,
    /// Name without prefix (`hover` for `:hover`); attribute body for `[...]`
    pub name: String,
    /// Byte offset of the token's first character, prefix included
    pub offset: usize,
    /// Byte offset of the name
    pub name_offset: usize,
    /// Text between the parentheses of a functional pseudo-class
    pub args: Option<String>,
}

/// Sequence of simple selectors not separated by combinators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    /// Source text of the compound
    pub text: String,
    /// Byte offset of the compound in the selector text
    pub offset: usize,
    /// Simple selectors in source order
    pub parts: Vec<SimpleSelector>,
    /// Kinds present
    pub flags: CompoundFlags,
}

impl Compound {
    /// Simple selectors that name the element: class, tag, id, `*`, `&`
    pub fn elements(&self) -> impl Iterator<Item = &SimpleSelector> {
        self.parts.iter().filter(|part| {
            !matches!(
                part.kind,
                SimpleKind::PseudoClass | SimpleKind::PseudoElement | SimpleKind::Attribute
            )
        })
    }
}

/// Relationship between two compounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace
    Descendant,
    /// `>`
    Child,
    /// `+`
    Adjacent,
    /// `~`
    Sibling,
}

/// Compounds joined by combinators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// Trimmed source text
    pub text: String,
    /// Byte offset of the first character in the selector text
    pub offset: usize,
    /// Compounds in source order
    pub compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    pub combinators: Vec<Combinator>,
}

impl ComplexSelector {
    /// Last compound, the subject of the selector
    #[must_use]
    pub fn subject(&self) -> Option<&Compound> {
        self.compounds.last()
    }
}

/// Comma-separated list of complex selectors
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorList {
    /// Complex selectors in source order, empty ones dropped
    complexes: Vec<ComplexSelector>,
    /// First character outside the selector alphabet and its byte offset
    illegal: Option<(char, usize)>,
}

impl SelectorList {
    /// Complex selectors in source order
    #[must_use]
    pub fn complexes(&self) -> &[ComplexSelector] {
        &self.complexes
    }

    /// First illegal character and its byte offset
    #[must_use]
    pub const fn illegal(&self) -> Option<(char, usize)> {
        self.illegal
    }

    /// Check whether the list is one complex selector with one compound
    #[must_use]
    pub fn is_single_compound(&self) -> bool {
        self.complexes.len() == 1 && self.complexes[0].compounds.len() == 1
    }

    /// The only compound when the list has exactly one
    #[must_use]
    pub fn single_compound(&self) -> Option<&Compound> {
        if self.is_single_compound() {
            self.complexes[0].compounds.first()
        } else {
            None
        }
    }

    /// All compounds of all complex selectors in source order
    pub fn compounds(&self) -> impl Iterator<Item = &Compound> {
        self.complexes.iter().flat_map(|complex| complex.compounds.iter())
    }
}

/// Parse selector text
#[must_use]
pub fn parse_selector(text: &str) -> SelectorList {
    let mut list = SelectorList::default();
    for (base, piece) in split_top_level(text, ',') {
        let lead = piece.len() - piece.trim_start().len();
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }
        let offset = base + lead;
        let mut scanner = Scanner::new(trimmed, offset);
        let complex = scanner.complex();
        if list.illegal.is_none() {
            list.illegal = scanner.illegal;
        }
        list.complexes.push(complex);
    }
    list
}

/// Cursor over one complex selector
struct Scanner<'a> {
    /// Complex selector text
    text: &'a str,
    /// Offset of `text` in the full selector
    base: usize,
    /// Current byte position in `text`
    pos: usize,
    /// First illegal character seen
    illegal: Option<(char, usize)>,
}

impl<'a> Scanner<'a> {
    /// Create a scanner for a trimmed complex selector
    const fn new(text: &'a str, base: usize) -> Self {
        Self {
            text,
            base,
            pos: 0,
            illegal: None,
        }
    }

    /// Character at the current position
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    /// Character after the current one
    fn peek_second(&self) -> Option<char> {
        let mut chars = self.text[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Consume identifier characters and escapes, returning the identifier
    fn ident(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.pos += 1;
                if let Some(escaped) = self.peek() {
                    self.pos += escaped.len_utf8();
                }
            } else if is_ident_char(ch) {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        &self.text[start..self.pos]
    }

    /// Consume up to the matching `close`, returning the enclosed text
    fn enclosed(&mut self, open: char, close: char) -> &'a str {
        self.pos += open.len_utf8();
        let start = self.pos;
        let mut depth = 1usize;
        let mut quote: Option<char> = None;
        while let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
            if let Some(q) = quote {
                if ch == q {
                    quote = None;
                }
                continue;
            }
            match ch {
                '"' | '\'' => quote = Some(ch),
                _ if ch == open => depth += 1,
                _ if ch == close => {
                    depth -= 1;
                    if depth == 0 {
                        return &self.text[start..self.pos - close.len_utf8()];
                    }
                }
                _ => {}
            }
        }
        &self.text[start..]
    }

    /// Parse the whole complex selector
    fn complex(&mut self) -> ComplexSelector {
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();
        let mut pending: Option<Combinator> = None;

        while let Some(ch) = self.peek() {
            let explicit = match ch {
                '>' => Some(Combinator::Child),
                '+' => Some(Combinator::Adjacent),
                '~' => Some(Combinator::Sibling),
                _ => None,
            };
            if let Some(combinator) = explicit {
                pending = Some(combinator);
                self.pos += 1;
                continue;
            }
            if ch.is_whitespace() {
                pending.get_or_insert(Combinator::Descendant);
                self.pos += ch.len_utf8();
                continue;
            }

            if let Some(compound) = self.compound() {
                if !compounds.is_empty() {
                    combinators.push(pending.unwrap_or(Combinator::Descendant));
                }
                compounds.push(compound);
            }
            pending = None;
        }

        ComplexSelector {
            text: self.text.to_string(),
            offset: self.base,
            compounds,
            combinators,
        }
    }

    /// Parse one compound; `None` when only illegal characters were found
    fn compound(&mut self) -> Option<Compound> {
        let start = self.pos;
        let mut parts = Vec::new();
        let mut flags = CompoundFlags::empty();

        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || matches!(ch, '>' | '+' | '~') {
                break;
            }
            let token_start = self.pos;
            let part = match ch {
                '.' | '#' => {
                    self.pos += 1;
                    let name_offset = self.pos;
                    let name = self.ident();
                    let kind = if ch == '.' { SimpleKind::Class } else { SimpleKind::Id };
                    self.simple(kind, name, token_start, name_offset, None)
                }
                ':' => {
                    let kind = if self.peek_second() == Some(':') {
                        self.pos += 2;
                        SimpleKind::PseudoElement
                    } else {
                        self.pos += 1;
                        SimpleKind::PseudoClass
                    };
                    let name_offset = self.pos;
                    let name = self.ident();
                    let args = (self.peek() == Some('('))
                        .then(|| self.enclosed('(', ')').to_string());
                    self.simple(kind, name, token_start, name_offset, args)
                }
                '[' => {
                    let body = self.enclosed('[', ']');
                    self.simple(SimpleKind::Attribute, body, token_start, token_start + 1, None)
                }
                '*' => {
                    self.pos += 1;
                    self.simple(SimpleKind::Universal, "*", token_start, token_start, None)
                }
                '&' => {
                    self.pos += 1;
                    self.simple(SimpleKind::Nesting, "&", token_start, token_start, None)
                }
                _ if is_ident_char(ch) || ch == '\\' => {
                    let name = self.ident();
                    self.simple(SimpleKind::Tag, name, token_start, token_start, None)
                }
                _ => {
                    if self.illegal.is_none() {
                        self.illegal = Some((ch, self.base + token_start));
                    }
                    self.pos += ch.len_utf8();
                    continue;
                }
            };
            flags |= part.kind.flag();
            parts.push(part);
        }

        if parts.is_empty() {
            return None;
        }
        let first = parts[0].offset - self.base;
        debug_assert!(first >= start);
        Some(Compound {
            text: self.text[first..self.pos].to_string(),
            offset: self.base + first,
            parts,
            flags,
        })
    }

    /// Build a simple selector with offsets relative to the full selector
    fn simple(
        &self,
        kind: SimpleKind,
        name: &str,
        offset: usize,
        name_offset: usize,
        args: Option<String>,
    ) -> SimpleSelector {
        SimpleSelector {
            kind,
            name: name.to_string(),
            offset: self.base + offset,
            name_offset: self.base + name_offset,
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_compound_parts() {
        let list = parse_selector(".my-a.my-b");
        let compound = list.single_compound().expect("one compound");
        assert_eq!(compound.text, ".my-a.my-b");
        assert_eq!(compound.parts.len(), 2);
        assert_eq!(compound.parts[1].name, "my-b");
        assert_eq!(compound.parts[1].offset, 5);
        assert_eq!(compound.flags, CompoundFlags::CLASS);
    }

    #[test]
    fn tag_and_class_compound() {
        let list = parse_selector("SheetA.my-b");
        let compound = list.single_compound().expect("one compound");
        assert_eq!(compound.parts[0].kind, SimpleKind::Tag);
        assert_eq!(compound.parts[0].name, "SheetA");
        assert!(compound.flags.contains(CompoundFlags::TAG | CompoundFlags::CLASS));
    }

    #[test]
    fn combinators_and_offsets() {
        let list = parse_selector(".gaga  > .root ~ span");
        let complex = &list.complexes()[0];
        assert_eq!(complex.compounds.len(), 3);
        assert_eq!(
            complex.combinators,
            vec![Combinator::Child, Combinator::Sibling]
        );
        assert_eq!(complex.compounds[1].offset, 9);
        assert_eq!(complex.subject().map(|c| c.text.as_str()), Some("span"));
    }

    #[test]
    fn descendant_combinator() {
        let list = parse_selector(".gaga .root");
        let complex = &list.complexes()[0];
        assert_eq!(complex.combinators, vec![Combinator::Descendant]);
        assert!(!list.is_single_compound());
    }

    #[test]
    fn pseudo_classes_and_elements() {
        let list = parse_selector(".root::label:not(.a, .b):hover");
        let parts = &list.single_compound().expect("one compound").parts;
        assert_eq!(parts[1].kind, SimpleKind::PseudoElement);
        assert_eq!(parts[1].name, "label");
        assert_eq!(parts[1].name_offset, 7);
        assert_eq!(parts[2].kind, SimpleKind::PseudoClass);
        assert_eq!(parts[2].args.as_deref(), Some(".a, .b"));
        assert_eq!(parts[3].name, "hover");
    }

    #[test]
    fn selector_lists_keep_offsets() {
        let list = parse_selector(".a, \n  .b");
        assert_eq!(list.complexes().len(), 2);
        assert_eq!(list.complexes()[1].offset, 7);
        assert_eq!(list.compounds().count(), 2);
    }

    #[test]
    fn attributes_and_universal() {
        let list = parse_selector("*[data-x=\"a]b\"]");
        let compound = list.single_compound().expect("one compound");
        assert_eq!(compound.parts[0].kind, SimpleKind::Universal);
        assert_eq!(compound.parts[1].kind, SimpleKind::Attribute);
        assert_eq!(compound.parts[1].name, "data-x=\"a]b\"");
    }

    #[test]
    fn records_first_illegal_character() {
        let list = parse_selector("<");
        assert_eq!(list.illegal(), Some(('<', 0)));
        assert!(list.complexes()[0].compounds.is_empty());

        let list = parse_selector(".a, .b!$");
        assert_eq!(list.illegal(), Some(('!', 6)));
    }

    #[test]
    fn bare_pseudo_class_compound() {
        let list = parse_selector(":import");
        let compound = list.single_compound().expect("one compound");
        assert_eq!(compound.parts[0].kind, SimpleKind::PseudoClass);
        assert_eq!(compound.elements().count(), 0);
    }
}
