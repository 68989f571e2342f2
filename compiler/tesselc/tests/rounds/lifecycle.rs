//! Round sequencing: repeated rounds, the final round and deferred
//! diagnostics.

use pretty_assertions::assert_eq;
use tessel_diagnostic::ErrorCode;
use tessel_ir::Modifiers;
use tesselc::{MemorySink, Round};

use crate::common::{attribute_names, codes, driver, run, Host};

#[test]
fn repeating_a_round_changes_nothing() {
    let mut host = Host::new();
    let base = host.model("com.app.BaseModel");
    let id = host.attribute(base, "id");
    let card = host.model_extending("com.app.CardModel", base);
    let title = host.attribute(card, "title");
    let elements = vec![base, id, card, title];

    let (repeated, out) = run(host.table, &[], vec![elements.clone(), elements.clone(), elements]);
    assert!(repeated.diagnostics.is_empty(), "{:?}", repeated.diagnostics);
    assert_eq!(attribute_names(&repeated, "com.app.CardModel"), ["id", "title"]);
    let card = out.get("com/app/CardModel_.model").unwrap();
    assert_eq!(card.contents.matches("attribute id:").count(), 1);
}

#[test]
fn final_round_elements_are_validated() {
    let mut host = Host::new();
    let card = host.model("com.app.CardModel");
    let title = host.attribute(card, "title");
    let late = host.model("com.app.LateModel");
    let runnable = host.runnable.clone();
    let listener = host.typed_attribute(late, "listener", runnable, Modifiers::PUBLIC);

    let mut driver = driver(host.table, &[("require-hash-contract", "true")]);
    let mut out = MemorySink::new();
    assert!(driver.process(Round::new(vec![card, title]), &mut out).unwrap().is_none());
    let outcome = driver
        .process(Round::last(vec![late, listener]), &mut out)
        .unwrap()
        .unwrap();

    assert_eq!(codes(&outcome), [ErrorCode::E3001]);
    assert_eq!(outcome.violations, 1);
    let subject = outcome.diagnostics[0].subject.as_ref().unwrap();
    assert_eq!(subject.as_str(), "com.app.LateModel.listener");
    assert_eq!(outcome.models.len(), 2);
    assert_eq!(outcome.emitted.len(), 2);
}

#[test]
fn declaration_errors_surface_with_the_final_outcome() {
    let mut host = Host::new();
    let broken = host
        .table
        .class("com.app.BrokenModel")
        .modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
        .id();
    let broken_field = host.attribute(broken, "title");
    let card = host.model("com.app.CardModel");
    let title = host.attribute(card, "title");

    let mut driver = driver(host.table, &[]);
    let mut out = MemorySink::new();
    assert!(driver
        .process(Round::new(vec![broken_field, card, title]), &mut out)
        .unwrap()
        .is_none());
    // Reported but held until the end.
    assert!(driver.sink().has_errors().is_some());
    assert!(out.is_empty());

    let outcome = driver.finish(&mut out).unwrap();
    assert!(outcome.has_errors());
    assert!(codes(&outcome).contains(&ErrorCode::E1005));
    assert!(driver.sink().is_empty());
    assert!(out.get("com/app/CardModel_.model").is_some());
}

#[test]
fn warnings_alone_do_not_fail_the_run() {
    let mut host = Host::new();
    let card = host.model("com.app.CardModel");
    let (outcome, _) = run(host.table, &[("unknown-option", "1")], vec![vec![card]]);
    assert_eq!(codes(&outcome), [ErrorCode::W0001]);
    assert!(!outcome.has_errors());
}
