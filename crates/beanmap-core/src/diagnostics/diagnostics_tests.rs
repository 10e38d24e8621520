#![allow(non_snake_case)]

use super::*;

#[test]
fn Diagnostics___warn_then_error___keeps_order() {
    let mut diagnostics = Diagnostics::new();

    diagnostics.warn("Property 'x' is ignored.");
    diagnostics.error("Cannot generate mapper");

    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics.entries()[0].level, Level::Warn);
    assert_eq!(diagnostics.entries()[1].level, Level::Error);
    assert!(diagnostics.has_errors());
}

#[test]
fn Diagnostics___warnings_only___has_no_errors() {
    let mut diagnostics = Diagnostics::new();

    diagnostics.warn("a");
    diagnostics.warn("b");

    assert!(!diagnostics.has_errors());
    assert_eq!(diagnostics.warnings().count(), 2);
}

#[test]
fn Diagnostics___mentions___searches_messages() {
    let mut diagnostics = Diagnostics::new();

    diagnostics.warn("Property 'matrix' is ignored.");

    assert!(diagnostics.mentions("'matrix'"));
    assert!(!diagnostics.mentions("'other'"));
}

#[test]
fn Diagnostic___display___prefixes_level() {
    let diagnostic = Diagnostic {
        level: Level::Warn,
        message: "dropped".into(),
    };

    assert_eq!(diagnostic.to_string(), "[WARN] dropped");
}
