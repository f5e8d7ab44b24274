//! Selector checks: illegal characters, components, states, and parts

use super::known::is_native_pseudo_element;
use super::Validator;
use crate::analysis::diagnostics::rules;
use crate::analysis::symbols::{SymbolTable, ROOT_CLASS};
use crate::parser::Rule;
use crate::selector::{Compound, SelectorList, SimpleKind, SimpleSelector};

/// Element a pseudo-class or pseudo-element is resolved against
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    /// Class of a stylesheet: states are its own, parts come from what it extends
    Class {
        /// Stylesheet declaring the class
        table: &'a SymbolTable,
        /// Class name
        class: &'a str,
    },
    /// Root of a component named by a tag: states of its root, parts are its classes
    Component(&'a SymbolTable),
}

impl<'a> Target<'a> {
    /// Check whether the element declares `state`
    fn has_state(self, state: &str) -> bool {
        match self {
            Self::Class { table, class } => table.has_state(class, state),
            Self::Component(table) => table.has_state(ROOT_CLASS, state),
        }
    }

    /// Stylesheet declaring `part` as a class reachable from this element
    fn part(self, part: &str) -> Option<&'a SymbolTable> {
        match self {
            Self::Class { table, class } => table.resolve_part(class, part).map(AsRef::as_ref),
            Self::Component(table) if table.class(part).is_some() => Some(table),
            Self::Component(table) => table.resolve_part(ROOT_CLASS, part).map(AsRef::as_ref),
        }
    }
}

impl<'t> Validator<'t, '_> {
    /// Check a plain rule's selector
    ///
    /// Returns `false` when the selector holds an illegal character, in which
    /// case nothing else about it is checked. With `skip_states`, pseudo-classes
    /// are not resolved because the rule already reports a misplaced
    /// definition.
    pub(super) fn check_selector(&mut self, rule: &Rule, list: &SelectorList, skip_states: bool) -> bool {
        if let Some((ch, offset)) = list.illegal() {
            self.reporter.error_covering(
                rules::ILLEGAL_CHARACTER,
                format!("illegal character {ch}"),
                rule.selector_position(offset),
                ch.encode_utf8(&mut [0; 4]),
            );
            return false;
        }

        for complex in list.complexes() {
            let misplaced_root = complex.compounds.iter().skip(1).any(|compound| {
                compound
                    .parts
                    .iter()
                    .any(|part| part.kind == SimpleKind::Class && part.name == ROOT_CLASS)
            });
            if misplaced_root {
                self.reporter.error_covering(
                    rules::ROOT_POSITION,
                    ".root can only be used as the root of the component",
                    rule.selector_position(complex.offset),
                    &complex.text,
                );
            }
            for (index, compound) in complex.compounds.iter().enumerate() {
                self.check_compound(rule, compound, index == 0, skip_states);
            }
        }
        true
    }

    /// Check the simple selectors of one compound
    ///
    /// Pseudo-classes may appear anywhere among the element selectors they
    /// qualify (`:hover.root`), so they are checked once the element of their
    /// segment is known: at the next pseudo-element or at the end.
    fn check_compound(&mut self, rule: &Rule, compound: &Compound, first: bool, skip_states: bool) {
        if first && compound.elements().next().is_none() && self.check_global_pseudo(rule, compound) {
            return;
        }

        let table = self.table;
        let mut targets: Vec<Target<'_>> = Vec::new();
        let mut pending: Vec<&SimpleSelector> = Vec::new();
        // Set once the element is native or cannot be resolved
        let mut opaque = false;

        for part in &compound.parts {
            match part.kind {
                SimpleKind::Class => targets.push(Target::Class {
                    table,
                    class: &part.name,
                }),
                SimpleKind::Tag => {
                    if let Some(component) = self.check_component_tag(rule, part) {
                        targets.push(Target::Component(component));
                    }
                }
                SimpleKind::Nesting => opaque = true,
                SimpleKind::Id | SimpleKind::Universal | SimpleKind::Attribute => {}
                SimpleKind::PseudoClass => {
                    if !skip_states && part.args.is_none() {
                        pending.push(part);
                    }
                }
                SimpleKind::PseudoElement => {
                    self.check_states(rule, &targets, opaque, &mut pending);
                    if is_native_pseudo_element(&part.name, self.config) {
                        targets.clear();
                        opaque = true;
                        continue;
                    }
                    let resolved = targets.iter().find_map(|target| target.part(&part.name));
                    match resolved {
                        Some(owner) => {
                            targets = vec![Target::Class {
                                table: owner,
                                class: &part.name,
                            }];
                        }
                        None => {
                            if !opaque && !targets.is_empty() {
                                self.reporter.error_covering(
                                    rules::UNKNOWN_PSEUDO_ELEMENT,
                                    format!("unknown pseudo element \"{}\"", part.name),
                                    rule.selector_position(part.name_offset),
                                    &part.name,
                                );
                            }
                            targets.clear();
                            opaque = true;
                        }
                    }
                }
            }
        }
        self.check_states(rule, &targets, opaque, &mut pending);
    }

    /// Resolve the pseudo-classes collected for one element
    fn check_states(
        &mut self,
        rule: &Rule,
        targets: &[Target<'_>],
        opaque: bool,
        pending: &mut Vec<&SimpleSelector>,
    ) {
        for part in pending.drain(..) {
            if opaque || targets.is_empty() {
                continue;
            }
            if !targets.iter().any(|target| target.has_state(&part.name)) {
                self.reporter.error_covering(
                    rules::UNKNOWN_STATE,
                    format!("unknown state \"{}\"", part.name),
                    rule.selector_position(part.name_offset),
                    &part.name,
                );
            }
        }
    }

    /// Report a pseudo-class or pseudo-element used without an element
    ///
    /// Returns `true` when a report was made.
    fn check_global_pseudo(&mut self, rule: &Rule, compound: &Compound) -> bool {
        let Some(part) = compound.parts.first() else {
            return false;
        };
        let message = match part.kind {
            SimpleKind::PseudoClass if part.args.is_none() => format!(
                "global states are not supported, use .root:{} instead",
                part.name
            ),
            SimpleKind::PseudoElement => format!(
                "global pseudo elements are not allowed, you can use \".root::{}\" instead",
                part.name
            ),
            _ => return false,
        };
        self.reporter.error_covering(
            rules::GLOBAL_PSEUDO,
            message,
            rule.selector_position(compound.offset),
            &compound.text,
        );
        true
    }

    /// Resolve a capitalized tag to the component it names
    ///
    /// Lowercase tags are native elements and resolve to nothing without a
    /// report.
    fn check_component_tag(&mut self, rule: &Rule, part: &SimpleSelector) -> Option<&'t SymbolTable> {
        if !part.name.starts_with(|ch: char| ch.is_ascii_uppercase()) {
            return None;
        }
        let table = self.table;
        if let Some(component) = table.stylesheet(&part.name) {
            return Some(component.as_ref());
        }
        let at = rule.selector_position(part.offset);
        match table.lookup(&part.name) {
            None => self.reporter.error_covering(
                rules::UNKNOWN_COMPONENT,
                format!("\"{}\" component is not imported", part.name),
                at,
                &part.name,
            ),
            Some(symbol) => self.reporter.error_covering(
                rules::KIND_MISMATCH,
                format!(
                    "\"{}\" is a {} and cannot be used as a stylesheet",
                    part.name,
                    symbol.kind()
                ),
                at,
                &part.name,
            ),
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::builder::TableBuilder;
    use crate::analysis::config::ProcessConfig;
    use crate::modules::MemoryResolver;
    use crate::parser::Stylesheet;

    const COMP: &str = ".root{ -st-states: shmover; } .my-part{ -st-states: open; } .label{}";

    fn validate(source: &str) -> Vec<String> {
        let mut resolver = MemoryResolver::new();
        resolver
            .register_stylesheet("./comp", Stylesheet::parse("comp.st.css", COMP))
            .expect("register");
        let sheet = Stylesheet::parse("main.css", source);
        let built = TableBuilder::new(&resolver).build(&sheet);
        let config = ProcessConfig::default();
        let output = Validator::new(&built.table, &config, sheet.issues(), built.import_reports).run(&sheet);
        output
            .reporter
            .finish()
            .messages()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    const IMPORT: &str = ":import{ -st-from: \"./comp\"; -st-default: Comp; }\n";

    #[test]
    fn states_follow_components_and_parts() {
        let source = format!(
            "{IMPORT}.gaga{{ -st-extends: Comp; }}\n\
             .gaga:shmover{{}}\n\
             Comp:shmover{{}}\n\
             Comp::my-part:open{{}}\n\
             .gaga::my-part:open{{}}\n\
             .gaga::label:open{{}}\n\
             div:anything{{}}\n\
             .gaga:not(.x){{}}\n\
             .root::before:hover{{}}"
        );
        assert_eq!(validate(&source), vec!["unknown state \"open\""]);
    }

    #[test]
    fn unknown_parts_and_components() {
        let source = format!("{IMPORT}.root::mybtn{{}}\nComp::nope{{}}\nButton{{}}\ndiv::nope{{}}");
        assert_eq!(
            validate(&source),
            vec![
                "unknown pseudo element \"mybtn\"",
                "unknown pseudo element \"nope\"",
                "\"Button\" component is not imported",
            ]
        );
    }

    #[test]
    fn global_pseudos_and_root_position() {
        assert_eq!(
            validate(":hover{}\n::before{}\n:not(.a){}\n.gaga .root{}"),
            vec![
                "global states are not supported, use .root:hover instead",
                "global pseudo elements are not allowed, you can use \".root::before\" instead",
                ".root can only be used as the root of the component",
            ]
        );
    }

    #[test]
    fn illegal_character_stops_selector_checks() {
        assert_eq!(validate("<:nope{}"), vec!["illegal character <"]);
    }

    #[test]
    fn states_before_the_element_are_checked() {
        let source = format!("{IMPORT}:nope.root{{}}\n.root:nope2{{}}\n:hover Comp{{}}\nComp:open::my-part{{}}\n:shmover:open Comp{{}}");
        assert_eq!(
            validate(&source),
            vec![
                "unknown state \"nope\"",
                "unknown state \"nope2\"",
                "global states are not supported, use .root:hover instead",
                "unknown state \"open\"",
                "global states are not supported, use .root:shmover instead",
            ]
        );
    }
}
