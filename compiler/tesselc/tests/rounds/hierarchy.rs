//! Inheritance between models of one unit and imports from other modules.

use pretty_assertions::assert_eq;

use crate::common::{attribute_names, run, Host};

#[test]
fn same_package_subclass_inherits_package_private_attributes() {
    let mut host = Host::new();
    let base = host.model("com.app.BaseModel");
    let id = host.attribute(base, "id");
    let secret = host.package_private_attribute(base, "secret");
    let card = host.model_extending("com.app.CardModel", base);
    let title = host.attribute(card, "title");

    let (outcome, _) = run(host.table, &[], vec![vec![base, id, secret, card, title]]);
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
    assert_eq!(attribute_names(&outcome, "com.app.BaseModel"), ["id", "secret"]);
    assert_eq!(
        attribute_names(&outcome, "com.app.CardModel"),
        ["id", "secret", "title"]
    );
}

#[test]
fn other_package_subclass_skips_package_private_attributes() {
    let mut host = Host::new();
    let base = host.model("com.app.BaseModel");
    let id = host.attribute(base, "id");
    let secret = host.package_private_attribute(base, "secret");
    let row = host.model_extending("com.app.feed.RowModel", base);
    let label = host.attribute(row, "label");

    let (outcome, _) = run(host.table, &[], vec![vec![base, id, secret, row, label]]);
    assert_eq!(attribute_names(&outcome, "com.app.feed.RowModel"), ["id", "label"]);
}

#[test]
fn attributes_of_classes_compiled_elsewhere_are_imported() {
    let mut host = Host::new();
    let library = host.library_class("lib.BaseCard");
    host.attribute(library, "label");
    let card = host.model_extending("com.app.CardModel", library);
    let title = host.attribute(card, "title");

    // The library class and its attribute are not elements of any round.
    let (outcome, out) = run(host.table, &[], vec![vec![card, title]]);
    assert_eq!(attribute_names(&outcome, "com.app.CardModel"), ["label", "title"]);
    assert!(outcome.models.model(&"lib.BaseCard".into()).is_none());
    assert_eq!(outcome.models.len(), 1);
    assert_eq!(
        out.paths().collect::<Vec<_>>(),
        ["com/app/CardModel_.model", "com/app/TesselModelExtensions.ext"]
    );
}

#[test]
fn subclass_from_a_later_round_inherits() {
    let mut host = Host::new();
    let base = host.model("com.app.BaseModel");
    let id = host.attribute(base, "id");
    let card = host.model_extending("com.app.CardModel", base);
    let title = host.attribute(card, "title");
    let banner = host.model_extending("com.app.BannerModel", card);

    let (outcome, _) = run(
        host.table,
        &[],
        vec![vec![base, id], vec![card, title], vec![banner]],
    );
    assert_eq!(attribute_names(&outcome, "com.app.CardModel"), ["id", "title"]);
    assert_eq!(attribute_names(&outcome, "com.app.BannerModel"), ["id", "title"]);
}
