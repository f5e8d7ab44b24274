//! Diagnostics produced for each language rule.
//!
//! Every test feeds one marked stylesheet through the full pipeline and checks
//! the exact messages, plus the start of each report when the source carries a
//! `|` marker.

mod common;

use common::{expect_diagnostics, expect_diagnostics_alone};

#[cfg(test)]
mod syntax {
    use super::*;

    #[test]
    fn test_unimported_component_tag() {
        expect_diagnostics(
            "
                |Something| {

                }
            ",
            &["\"Something\" component is not imported"],
        );
    }

    #[test]
    fn test_unterminated_class_selector() {
        expect_diagnostics(
            "
                .root{

                }
                .|
            ",
            &["identifier expected"],
        );
    }

    #[test]
    fn test_unterminated_pseudo_selector() {
        expect_diagnostics(
            "
                .root{

                }
                :|
            ",
            &["identifier expected"],
        );
    }

    #[test]
    fn test_selector_without_block() {
        expect_diagnostics(
            "
                .root{

                }
                .gaga|
            ",
            &["{ expected"],
        );
    }

    #[test]
    fn test_unterminated_ruleset() {
        expect_diagnostics(
            "
                .root{

                }
                .gaga{
                    color:red|
            ",
            &["; expected"],
        );
    }

    #[test]
    fn test_declaration_without_colon() {
        expect_diagnostics(
            "
                .root{

                }
                .gaga{
                    color|
                }
            ",
            &[": expected"],
        );
    }

    #[test]
    fn test_declaration_without_value() {
        expect_diagnostics(
            "
                .root{

                }
                .gaga{
                    color:|
                }
            ",
            &["property value expected"],
        );
    }

    #[test]
    fn test_unknown_rule() {
        expect_diagnostics(
            "
                .root{
                    |hello|:yossi;
                }
            ",
            &["unknown rule \"hello\""],
        );
    }

    #[test]
    fn test_illegal_character() {
        expect_diagnostics(
            "
                |<{

                }
            ",
            &["illegal character <"],
        );
    }

    #[test]
    fn test_unknown_directive() {
        expect_diagnostics(
            "
                .gaga{
                    |-st-something|:true;
                }
            ",
            &["unknown directive \"-st-something\""],
        );
    }

    #[test]
    fn test_import_directive_outside_import() {
        expect_diagnostics(
            "
                .gaga{
                    |-st-from|:\"./file\";
                }
            ",
            &["unknown directive \"-st-from\""],
        );
    }
}

#[cfg(test)]
mod states_and_pseudo_elements {
    use super::*;

    #[test]
    fn test_global_state() {
        expect_diagnostics(
            "
                |:hover|{

                }
            ",
            &["global states are not supported, use .root:hover instead"],
        );
    }

    #[test]
    fn test_unknown_state() {
        expect_diagnostics(
            "
                .root:|shmover|{

                }
            ",
            &["unknown state \"shmover\""],
        );
    }

    #[test]
    fn test_declared_state_is_accepted() {
        expect_diagnostics(
            "
                .root{
                    -st-states: shmover, toggled;
                }
                .root:shmover, .root:toggled:not(.x){

                }
            ",
            &[],
        );
    }

    #[test]
    fn test_global_pseudo_element() {
        expect_diagnostics(
            "
                |::before|{

                }
            ",
            &["global pseudo elements are not allowed, you can use \".root::before\" instead"],
        );
    }

    #[test]
    fn test_unknown_pseudo_element() {
        expect_diagnostics(
            "
                .root::|mybtn|{

                }
            ",
            &["unknown pseudo element \"mybtn\""],
        );
    }

    #[test]
    fn test_parts_and_states_of_extended_component() {
        expect_diagnostics(
            "
                :import{
                    -st-from:\"./file\";
                    -st-default:Comp;
                }
                .root{
                    -st-extends:Comp;
                }
                .root:shmover::my-part{}
                Comp::my-part{}
                .root::before{}
            ",
            &[],
        );
    }
}

#[cfg(test)]
mod structure {
    use super::*;

    #[test]
    fn test_root_after_selector() {
        expect_diagnostics(
            "
                |.gaga .root|{

                }
            ",
            &[".root can only be used as the root of the component"],
        );
    }

    #[test]
    fn test_states_in_complex_selector() {
        expect_diagnostics(
            "
                .gaga:hover{
                    |-st-states|:shmover;
                }
            ",
            &["cannot define pseudo states inside complex selectors"],
        );
    }

    #[test]
    fn test_unknown_mixin() {
        expect_diagnostics(
            "
                .gaga{
                    -st-mixin:|myMixin|;
                }
            ",
            &["unknown mixin: \"myMixin\""],
        );
    }

    #[test]
    fn test_unknown_var() {
        expect_diagnostics(
            "
                .gaga{
                    color:|value(myColor)|;
                }
            ",
            &["unknown var \"myColor\""],
        );
    }

    #[test]
    fn test_unknown_var_inside_vars() {
        expect_diagnostics(
            "
                :vars{
                    border:1px solid |value(myColor)|;
                }
            ",
            &["unknown var \"myColor\""],
        );
    }

    #[test]
    fn test_vars_in_complex_selector() {
        expect_diagnostics(
            "
                |.gaga:vars|{
                    myColor:red;
                }

            ",
            &["cannot define \"vars\" inside a complex selector"],
        );
    }

    #[test]
    fn test_variant_in_complex_selector() {
        expect_diagnostics(
            "
                .gaga:hover{
                    |-st-variant|:true;
                }
            ",
            &["cannot define \"-st-variant\" inside complex selector"],
        );
    }

    #[test]
    fn test_variant_value_must_be_boolean() {
        expect_diagnostics(
            "
                .gaga {
                    -st-variant:|red|;
                }
            ",
            &["-st-variant can only be true or false, the value \"red\" is illegal"],
        );
    }

    #[test]
    fn test_extend_in_complex_selector() {
        expect_diagnostics(
            "
                :import{
                    -st-from:\"./file\";
                    -st-default:Comp;
                }
                .root:hover{
                    |-st-extend|:Comp;
                }
            ",
            &["cannot define \"-sb-extend\" inside complex selector"],
        );
    }

    #[test]
    fn test_extend_call_in_complex_selector() {
        let result = expect_diagnostics(
            "
                :import{
                    -st-from:\"./mixins\";
                    -st-named:mixinWith2Args;
                }
                .root:hover{
                    |-st-extend|:mixinWith2Args(a, b);
                }
            ",
            &["cannot define \"-sb-extend\" inside complex selector"],
        );
        assert!(result.model.rule(".root:hover").and_then(|r| r.get("margin")).is_none());
    }

    #[test]
    fn test_states_on_element_selector() {
        expect_diagnostics(
            "
                div{
                    |-st-states|:open;
                }
            ",
            &["cannot define pseudo states inside element selectors"],
        );
    }

    #[test]
    fn test_variant_on_element_selector() {
        expect_diagnostics(
            "
                span{
                    |-st-variant|:true;
                }
            ",
            &["cannot define \"-st-variant\" inside element selectors"],
        );
    }

    #[test]
    fn test_unknown_extend_target() {
        expect_diagnostics(
            "
                .root{
                    -st-extends:|Missing|;
                }
            ",
            &["unknown stylesheet \"Missing\""],
        );
    }
}

#[cfg(test)]
mod imports {
    use super::*;

    #[test]
    fn test_unknown_file() {
        expect_diagnostics_alone(
            "

                :import{
                    -st-from:|\"./file\"|;
                    -st-default:Theme;
                }
            ",
            &["could not find file \"./file\""],
        );
    }

    #[test]
    fn test_import_in_complex_selector() {
        expect_diagnostics(
            "
                |.gaga:import|{
                    -st-from:\"./file\";
                    -st-default:Theme;
                }
            ",
            &["cannot define \":import\" inside complex selector"],
        );
    }

    #[test]
    fn test_unknown_named_export() {
        expect_diagnostics(
            "

                :import{
                    -st-from:\"./file\";
                    -st-default:Comp;
                    -st-named:|variant|;
                }
            ",
            &["cannot find export \"variant\" in \"./file\""],
        );
    }

    #[test]
    fn test_foreign_declaration_in_import() {
        expect_diagnostics(
            "

                :import{
                    -st-from:\"./file\";
                    -st-default:Comp;
                    |color|:red
                }
            ",
            &["\"color\" css attribute cannot be used inside import block"],
        );
    }

    #[test]
    fn test_missing_from() {
        expect_diagnostics(
            "

                |:import{
                    -st-default:Comp;
                }
            ",
            &["\"-st-from\" is missing in import block"],
        );
    }

    #[test]
    fn test_missing_default_export_of_script() {
        expect_diagnostics(
            "
                :import{
                    -st-from:\"./mixins\";
                    -st-default:|Mixins|;
                }
            ",
            &["cannot find export \"default\" in \"./mixins\""],
        );
    }

    #[test]
    fn test_script_vars_resolve() {
        let result = expect_diagnostics(
            "
                :import{
                    -st-from:\"./mixins\";
                    -st-named:brand;
                }
                .root{
                    color:value(brand);
                }
            ",
            &[],
        );
        let root = result.model.rule(".root").expect("root rule");
        assert_eq!(root.get("color"), Some("#ff0000"));
    }
}

#[cfg(test)]
mod cross_variance {
    use super::*;

    #[test]
    fn test_variant_as_var() {
        expect_diagnostics(
            "
                :import{
                    -st-from:\"./file\";
                    -st-default:Comp;
                    -st-named:my-variant;
                }
                .root{
                    color:|value(my-variant)|;
                }
            ",
            &["\"my-variant\" is a variant and cannot be used as a var"],
        );
    }

    #[test]
    fn test_mixin_as_var() {
        expect_diagnostics(
            "
                :import{
                    -st-from:\"./mixins\";
                    -st-named:my-mixin;
                }
                .root{
                    color:|value(my-mixin)|;
                }
            ",
            &["\"my-mixin\" is a mixin and cannot be used as a var"],
        );
    }

    #[test]
    fn test_mixin_as_stylesheet() {
        expect_diagnostics(
            "
                :import{
                    -st-from:\"./mixins\";
                    -st-named:my-mixin;
                }
                .root{
                    -st-extend:|my-mixin|;
                }
            ",
            &["\"my-mixin\" is a mixin and cannot be used as a stylesheet"],
        );
    }

    #[test]
    fn test_stylesheet_as_var() {
        expect_diagnostics(
            "
                :import{
                    -st-from:\"./file\";
                    -st-default:Comp;
                .root{
                    color:|value(Comp)|;
                }
            ",
            &["\"Comp\" is a stylesheet and cannot be used as a var"],
        );
    }

    #[test]
    fn test_stylesheet_as_mixin() {
        expect_diagnostics(
            "
                :import{
                    -st-from:\"./file\";
                    -st-default:Comp;
                    -st-named:my-variant;
                }
                .root{
                    -st-mixin:|Comp|;
                }
            ",
            &["\"Comp\" is a stylesheet and cannot be used as a mixin"],
        );
    }

    #[test]
    fn test_variant_on_native_node() {
        expect_diagnostics(
            "
                :import{
                    -st-from:\"./file\";
                    -st-default:Comp;
                    -st-named:my-variant;
                }

                .gaga{
                    -st-mixin:|my-variant|;
                }
            ",
            &["\"my-variant\" cannot be applied to \".gaga\", \".gaga\" refers to a native node and \"my-variant\" can only be spplied to \"@namespace of comp\""],
        );
    }

    #[test]
    fn test_variant_of_other_component() {
        expect_diagnostics(
            "
                :import{
                    -st-from:\"./file\";
                    -st-default:Comp;
                    -st-named:my-variant;
                }
                :import{
                    -st-from:\"./file2\";
                    -st-default:Comp2;
                    -st-named:my-variant2;
                }
                .gaga{
                    -st-extends:Comp;
                    -st-apply:|my-variant2|;
                }
            ",
            &["\"my-variant2\" cannot be applied to \".gaga\", \".gaga\" refers to \"@namespace of comp\" and \"my-variant2\" can only be spplied to \"@namespace of Comp2\""],
        );
    }

    #[test]
    fn test_variant_with_params() {
        expect_diagnostics(
            "
                :import{
                    -st-from:\"./file\";
                    -st-default:Comp;
                    -st-named:my-variant;
                }
                .root{
                    -st-extend:Comp;
                    -st-mixin:|my-variant(param)|;
                }
            ",
            &["invalid mixin arguments: \"my-variant\" is a variant and does not accept arguments"],
        );
    }

    #[test]
    fn test_mixin_arity() {
        expect_diagnostics(
            "
                :import{
                    -st-from:\"./mixins\";
                    -st-named:mixinWith2Args;
                }
                .root{
                    -st-mixin:|mixinWith2Args(param)|;
                }
            ",
            &["invalid mixin arguments: \"mixinWith2Args\" expects 2 arguments but recieved 1"],
        );
    }

    #[test]
    fn test_mixin_error() {
        expect_diagnostics(
            "
                :import{
                    -st-from:\"./mixins\";
                    -st-named:mixinThatExplodes;
                }
                .root{
                    -st-mixin:|mixinThatExplodes(param)|;
                }
            ",
            &["\"mixinThatExplodes\" has thrown an error: error text"],
        );
    }
}

#[cfg(test)]
mod selectors {
    use super::*;
    use stylable_core::Severity;

    #[test]
    fn test_conflicting_extends() {
        let result = expect_diagnostics(
            "
                :import {
                    -st-from: \"./sheetA\";
                    -st-named: SheetA;
                }
                :import {
                    -st-from: \"./sheetB\";
                    -st-named: SheetB;
                }
                .my-a { -st-extends: SheetA }
                .my-b { -st-extends: SheetB }

                .my-a.my-b {}
                SheetA.my-b {}
                SheetB.my-a {}
            ",
            &[
                "conflicting extends matching same target [.my-a.my-b]",
                "conflicting extends matching same target [SheetA.my-b]",
                "conflicting extends matching same target [SheetB.my-a]",
            ],
        );
        assert!(result
            .diagnostics
            .iter()
            .all(|report| report.severity() == Severity::Warning));
        let lines: Vec<usize> = result.diagnostics.iter().map(|r| r.start().line).collect();
        assert_eq!(lines, vec![13, 14, 15]);
    }

    #[test]
    fn test_conflicts_are_reported_once_per_text() {
        expect_diagnostics(
            "
                :import {
                    -st-from: \"./sheetA\";
                    -st-named: SheetA;
                }
                :import {
                    -st-from: \"./sheetB\";
                    -st-named: SheetB;
                }
                .my-a { -st-extends: SheetA }
                .my-b { -st-extends: SheetB }
                .x .my-a.my-b {}
                .y .my-a.my-b:hover {}
                .z .my-a.my-b {}
            ",
            &[
                "unknown state \"hover\"",
                "conflicting extends matching same target [.my-a.my-b]",
                "conflicting extends matching same target [.my-a.my-b:hover]",
            ],
        );
    }
}
