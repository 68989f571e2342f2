use pretty_assertions::assert_eq;

use super::*;

#[test]
fn display_with_location_and_subject() {
    let diag = Diagnostic::error(ErrorCode::E1005)
        .with_message("classes with attributes cannot be final: HeaderModel")
        .with_subject(QualifiedName::new("com.app.HeaderModel"))
        .with_location(Some(SourceLocation::new("HeaderModel.java", 12)));
    assert_eq!(
        diag.to_string(),
        "error[E1005]: classes with attributes cannot be final: HeaderModel\n  \
         --> HeaderModel.java:12 (com.app.HeaderModel)"
    );
}

#[test]
fn display_subject_only_with_note() {
    let diag = Diagnostic::warning(ErrorCode::W0001)
        .with_message("unknown option `colour`")
        .with_subject(QualifiedName::new("options"))
        .with_note("ignored");
    assert_eq!(
        diag.to_string(),
        "warning[W0001]: unknown option `colour`\n  --> options\n  = note: ignored"
    );
}

#[test]
fn severity_helpers() {
    assert!(Diagnostic::error(ErrorCode::E3001).is_error());
    assert!(!Diagnostic::warning(ErrorCode::W0001).is_error());
}
