//! Aggregation results do not depend on element order or parallelism.

use proptest::prelude::*;
use tessel_ir::{DeclId, MemorySymbolTable};
use tesselc::ProcessingOutcome;

use crate::common::{run, Host};

struct Fixture {
    table: MemorySymbolTable,
    elements: Vec<DeclId>,
    /// `CardModel`'s own `id`, hiding `BaseModel`'s.
    card_id: DeclId,
}

/// Three packages, a three-level hierarchy, a library superclass, a
/// package-private attribute and an attribute name declared on two levels.
fn fixture() -> Fixture {
    let mut host = Host::new();
    let library = host.library_class("lib.BaseCard");
    host.attribute(library, "label");

    let base = host.model_extending("com.app.BaseModel", library);
    let id = host.attribute(base, "id");
    let secret = host.package_private_attribute(base, "secret");
    let card = host.model_extending("com.app.CardModel", base);
    let title = host.attribute(card, "title");
    let subtitle = host.attribute(card, "subtitle");
    let card_id = host.attribute(card, "id");
    let row = host.model_extending("com.app.feed.RowModel", card);
    let index = host.attribute(row, "index");
    let banner = host.model_extending("com.app.BannerModel", card);
    let image = host.attribute(banner, "image");

    let elements = vec![
        base, id, secret, card, title, subtitle, card_id, row, index, banner, image,
    ];
    Fixture {
        table: host.table,
        elements,
        card_id,
    }
}

/// Each model with its sorted `(attribute, origin)` pairs.
fn attribute_sets(outcome: &ProcessingOutcome) -> Vec<(String, Vec<(String, DeclId)>)> {
    outcome
        .models
        .models()
        .iter()
        .map(|model| {
            let mut attributes: Vec<(String, DeclId)> = model
                .attributes()
                .map(|a| (a.name.to_string(), a.origin))
                .collect();
            attributes.sort();
            (model.source_name().to_string(), attributes)
        })
        .collect()
}

fn reference() -> Vec<(String, Vec<(String, DeclId)>)> {
    let Fixture { table, elements, .. } = fixture();
    let (outcome, _) = run(table, &[("enable-parallelism", "false")], vec![elements]);
    attribute_sets(&outcome)
}

#[test]
fn reference_run_is_complete() {
    let sets = reference();
    let names: Vec<&str> = sets.iter().map(|(model, _)| model.as_str()).collect();
    assert_eq!(
        names,
        [
            "com.app.BannerModel",
            "com.app.BaseModel",
            "com.app.CardModel",
            "com.app.feed.RowModel"
        ]
    );
    let row = &sets[3].1;
    let row_names: Vec<&str> = row.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(row_names, ["id", "index", "label", "subtitle", "title"]);

    // The nearest declaration of `id` wins on every subtype of the card.
    let card_id = fixture().card_id;
    for (model, attributes) in &sets {
        if model == "com.app.BaseModel" {
            continue;
        }
        let id = attributes.iter().find(|(name, _)| name == "id").map(|(_, origin)| *origin);
        assert_eq!(id, Some(card_id), "{model}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn shuffled_elements_give_the_same_attribute_sets(
        order in Just(fixture().elements).prop_shuffle(),
        parallel in any::<bool>(),
    ) {
        let Fixture { table, .. } = fixture();
        let parallel = if parallel { "true" } else { "false" };
        let (outcome, _) = run(table, &[("enable-parallelism", parallel)], vec![order]);
        prop_assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
        prop_assert_eq!(attribute_sets(&outcome), reference());
    }
}
