//! Shared helpers for integration tests
//!
//! Sources use `|` markers to point at the expected diagnostic location: the
//! first marker is where every expected report must start. Markers are
//! stripped before parsing; a source without markers only checks messages.

#![allow(dead_code)]

use pretty_assertions::assert_eq;
use stylable_core::{
    process, Diagnostics, FnMixin, MemoryResolver, MixinDeclaration, MixinError, ProcessResult,
    ScriptModule, Stylesheet,
};

/// Component used by most fixtures: a root state, a part, and a variant
pub const CUSTOM_BUTTON: &str = "
    .root{
        -st-states:shmover;
    }
    .my-part{

    }
    .my-variant{
        -st-variant:true;
        color:red;
    }
";

/// Second component with an explicit namespace
pub const SECOND_COMPONENT: &str = "
    @namespace \"Comp2\";
    .my-variant2{
        -st-variant:true;
        background:blue;
    }
";

/// Line and column of the first marker, 1-based, markers not counted
pub fn find_test_location(src: &str) -> Option<(usize, usize)> {
    let mut line = 1;
    let mut column = 1;
    for ch in src.chars() {
        if ch == '|' {
            return Some((line, column));
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    None
}

/// Resolver with every module the fixtures import
pub fn fixtures() -> MemoryResolver {
    let mut resolver = MemoryResolver::new();
    resolver
        .register_stylesheet("./file", Stylesheet::parse("comp.st.css", CUSTOM_BUTTON))
        .expect("register ./file");
    resolver
        .register_stylesheet("./file2", Stylesheet::parse("comp2.st.css", SECOND_COMPONENT))
        .expect("register ./file2");

    let mut mixins = ScriptModule::new("mixins.ts");
    mixins
        .register_mixin(
            "my-mixin",
            FnMixin::new(0, |_: &[String]| Ok(vec![MixinDeclaration::new("color", "green")])),
        )
        .expect("register my-mixin");
    mixins
        .register_mixin(
            "mixinWith2Args",
            FnMixin::new(2, |args: &[String]| {
                Ok(vec![MixinDeclaration::new(
                    "margin",
                    format!("{} {}", args[0], args[1]),
                )])
            }),
        )
        .expect("register mixinWith2Args");
    mixins
        .register_mixin(
            "mixinThatExplodes",
            FnMixin::new(1, |_: &[String]| Err(MixinError::new("error text"))),
        )
        .expect("register mixinThatExplodes");
    mixins.register_var("brand", "#ff0000").expect("register brand");
    resolver.register_script("./mixins", mixins).expect("register ./mixins");

    for (request, id, export) in [
        ("./sheetA", "sheetA.ts", "SheetA"),
        ("./sheetB", "sheetB.ts", "SheetB"),
    ] {
        let mut script = ScriptModule::new(id);
        let stem = id.trim_end_matches(".ts");
        script
            .register_stylesheet(export, Stylesheet::parse(format!("{stem}.st.css"), ".root{}"))
            .expect("register sheet export");
        resolver.register_script(request, script).expect("register sheet module");
    }
    resolver
}

/// Process a marked source against a resolver
pub fn run_with(src: &str, resolver: &MemoryResolver) -> ProcessResult {
    let sheet = Stylesheet::parse("main.css", &src.replace('|', ""));
    process(&sheet, resolver)
}

/// Process a marked source against the fixtures
pub fn run(src: &str) -> ProcessResult {
    run_with(src, &fixtures())
}

/// Assert messages in order, and the marker location when one is present
pub fn assert_reports(src: &str, diagnostics: &Diagnostics, expected: &[&str]) {
    assert_eq!(diagnostics.messages(), expected.to_vec());
    if let Some(location) = find_test_location(src) {
        for report in diagnostics.iter() {
            let start = report.start();
            assert_eq!(
                (start.line, start.column),
                location,
                "location of \"{}\"",
                report.message()
            );
        }
    }
}

/// Process against the fixtures and assert the reports
pub fn expect_diagnostics(src: &str, expected: &[&str]) -> ProcessResult {
    let result = run(src);
    assert_reports(src, &result.diagnostics, expected);
    result
}

/// Process against an empty resolver and assert the reports
pub fn expect_diagnostics_alone(src: &str, expected: &[&str]) -> ProcessResult {
    let result = run_with(src, &MemoryResolver::new());
    assert_reports(src, &result.diagnostics, expected);
    result
}
