//! Validation engine
//!
//! Walks the tree once in document order. Every check reports the moment its
//! node is visited, and parse issues are interleaved by source offset, so the
//! diagnostics come out in document order. While walking, the validator also
//! builds the resolved model and records the compounds the extends conflict
//! check needs afterwards.
//!
//! The checks themselves live in [`selectors`] and [`declarations`];
//! [`known`] holds the built-in CSS vocabulary they consult.

pub mod declarations;
pub mod known;
pub mod selectors;

use super::builder::{is_conditional_group, ImportReports};
use super::config::ProcessConfig;
use super::diagnostics::{rules, Diagnostic, Reporter};
use super::directives::{simple_element, BlockKind, Directive};
use super::extends::RecordedCompound;
use super::model::ResolvedRule;
use super::symbols::SymbolTable;
use declarations::VarSubstitution;
use crate::parser::{AtRule, Declaration, Node, ParseIssue, Rule, Span, Stylesheet};
use crate::selector::{parse_selector, SelectorList, SimpleKind};

/// What one validation pass produced
pub(crate) struct ValidationOutput<'c> {
    /// Diagnostics collected so far
    pub(crate) reporter: Reporter<'c>,
    /// Resolved rules in document order
    pub(crate) rules: Vec<ResolvedRule>,
    /// Compounds of plain rules in document order
    pub(crate) compounds: Vec<RecordedCompound>,
}

/// Single-pass checker for one stylesheet
pub(crate) struct Validator<'t, 'c> {
    /// Symbols of the stylesheet
    table: &'t SymbolTable,
    /// Host configuration
    config: &'c ProcessConfig,
    /// Diagnostic sink
    reporter: Reporter<'c>,
    /// Parse issues sorted by offset
    issues: Vec<&'t ParseIssue>,
    /// Index of the first issue not yet forwarded
    next_issue: usize,
    /// Import diagnostics waiting for their block to be visited
    import_reports: ImportReports,
    /// Resolved model under construction
    rules: Vec<ResolvedRule>,
    /// Compounds for the extends conflict check
    compounds: Vec<RecordedCompound>,
    /// Memoized var expansion for the model
    vars: VarSubstitution<'t>,
}

impl<'t, 'c> Validator<'t, 'c> {
    /// Create a validator
    pub(crate) fn new(
        table: &'t SymbolTable,
        config: &'c ProcessConfig,
        issues: &'t [ParseIssue],
        import_reports: ImportReports,
    ) -> Self {
        let mut issues: Vec<&ParseIssue> = issues.iter().collect();
        issues.sort_by_key(|issue| issue.position.offset);
        Self {
            table,
            config,
            reporter: Reporter::new(config),
            issues,
            next_issue: 0,
            import_reports,
            rules: Vec::new(),
            compounds: Vec::new(),
            vars: VarSubstitution::new(table),
        }
    }

    /// Validate a whole stylesheet
    pub(crate) fn run(mut self, sheet: &Stylesheet) -> ValidationOutput<'c> {
        self.visit_nodes(sheet.nodes());
        self.flush_issues(usize::MAX);

        let leftovers = std::mem::take(&mut self.import_reports);
        for report in leftovers.into_values().flatten() {
            self.reporter.report(report);
        }

        ValidationOutput {
            reporter: self.reporter,
            rules: self.rules,
            compounds: self.compounds,
        }
    }

    /// Forward parse issues located at or before `offset`
    fn flush_issues(&mut self, offset: usize) {
        while let Some(issue) = self.issues.get(self.next_issue) {
            if issue.position.offset > offset {
                break;
            }
            self.reporter.report(Diagnostic::error(
                rules::SYNTAX,
                issue.message.clone(),
                Span::new(issue.position, issue.position),
            ));
            self.next_issue += 1;
        }
    }

    /// Visit sibling nodes
    fn visit_nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::Rule(rule) => self.visit_rule(rule),
                Node::AtRule(at_rule) => self.visit_at_rule(at_rule),
                Node::Declaration(decl) => self.flush_issues(decl.span.start.offset),
                Node::Comment(_) => {}
            }
        }
    }

    /// Recurse into conditional groups; `@keyframes` and friends are left alone
    fn visit_at_rule(&mut self, at_rule: &AtRule) {
        self.flush_issues(at_rule.span.start.offset);
        if !is_conditional_group(&at_rule.name) {
            return;
        }
        if let Some(children) = &at_rule.nodes {
            self.visit_nodes(children);
        }
    }

    /// Dispatch on the role of the rule's selector
    fn visit_rule(&mut self, rule: &Rule) {
        self.flush_issues(rule.span.start.offset);
        let list = parse_selector(&rule.selector);
        match BlockKind::classify(&list) {
            BlockKind::Import => {
                if let Some(reports) = self.import_reports.remove(&rule.selector_start.offset) {
                    for report in reports {
                        self.flush_issues(report.start().offset);
                        self.reporter.report(report);
                    }
                }
                self.visit_children(rule, |_, _| {});
            }
            BlockKind::ComplexImport => {
                self.reporter.error_covering(
                    rules::COMPLEX_SELECTOR,
                    "cannot define \":import\" inside complex selector",
                    rule.selector_start,
                    &rule.selector,
                );
                self.visit_children(rule, |_, _| {});
            }
            BlockKind::Vars => {
                self.visit_children(rule, |validator, decl| {
                    validator.check_value_refs(decl);
                    validator.check_var_cycle(decl);
                });
            }
            BlockKind::ComplexVars => {
                self.reporter.error_covering(
                    rules::COMPLEX_SELECTOR,
                    "cannot define \"vars\" inside a complex selector",
                    rule.selector_start,
                    &rule.selector,
                );
                self.visit_children(rule, |_, _| {});
            }
            BlockKind::Plain => self.visit_plain_rule(rule, &list),
        }
    }

    /// Visit a rule's children in order, handing its declarations to `check`
    fn visit_children(&mut self, rule: &Rule, mut check: impl FnMut(&mut Self, &Declaration)) {
        for node in &rule.nodes {
            match node {
                Node::Declaration(decl) => {
                    self.flush_issues(decl.span.start.offset);
                    check(self, decl);
                }
                Node::Rule(nested) => self.visit_rule(nested),
                Node::AtRule(at_rule) => self.visit_at_rule(at_rule),
                Node::Comment(_) => {}
            }
        }
    }

    /// Check an ordinary ruleset and add it to the model
    fn visit_plain_rule(&mut self, rule: &Rule, list: &SelectorList) {
        let element = simple_element(list).map(|part| part.kind);
        let forbidden_definition = element.is_none()
            && rule
                .declarations()
                .any(|decl| Directive::parse(&decl.prop).is_some_and(Directive::is_definition));

        if self.check_selector(rule, list, forbidden_definition) {
            self.record_compounds(rule, list);
        }

        let index = self.rules.len();
        self.rules
            .push(ResolvedRule::new(rule.selector.as_str(), rule.selector_start));

        self.visit_children(rule, |validator, decl| {
            validator.check_declaration(rule, list, element, decl, index);
        });
    }

    /// Remember element-bearing compounds for the conflict check
    fn record_compounds(&mut self, rule: &Rule, list: &SelectorList) {
        for compound in list.compounds() {
            let has_element = compound
                .parts
                .iter()
                .any(|part| matches!(part.kind, SimpleKind::Class | SimpleKind::Tag));
            if has_element {
                self.compounds.push(RecordedCompound {
                    compound: compound.clone(),
                    start: rule.selector_position(compound.offset),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::builder::TableBuilder;
    use crate::modules::MemoryResolver;

    fn validate(source: &str) -> Vec<String> {
        let sheet = Stylesheet::parse("main.css", source);
        let resolver = MemoryResolver::new();
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

    #[test]
    fn parse_issues_interleave_in_document_order() {
        let messages = validate(".a{ hello: 1; }\n.b{ color }\n.c{ nope: 2; }");
        assert_eq!(
            messages,
            vec!["unknown rule \"hello\"", ": expected", "unknown rule \"nope\""]
        );
    }

    #[test]
    fn opaque_at_rules_are_skipped() {
        let messages = validate("@keyframes spin { from { nope: 1; } }\n@media screen { .a{ nope: 1; } }");
        assert_eq!(messages, vec!["unknown rule \"nope\""]);
    }

    #[test]
    fn special_blocks_report_once() {
        let messages = validate(".a:vars{ x: 1; }\n.b:import{ -st-from: \"./x\"; }");
        assert_eq!(
            messages,
            vec![
                "cannot define \"vars\" inside a complex selector",
                "cannot define \":import\" inside complex selector",
            ]
        );
    }
}
