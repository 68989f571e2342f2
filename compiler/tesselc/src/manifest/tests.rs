use pretty_assertions::assert_eq;
use tessel_ir::{DeclKind, NestingKind, Primitive, SymbolTable};

use super::*;

const SAMPLE: &str = r#"{
  "options": { "require-hash-contract": "true" },
  "declarations": [
    { "name": "tessel.runtime.Model", "modifiers": ["public", "abstract"], "type_params": ["V"] },
    { "name": "java.lang.String", "modifiers": ["public", "final"] },
    { "kind": "interface", "name": "java.util.List", "type_params": ["E"] },
    { "kind": "package", "name": "com.app",
      "annotations": [{ "package_config": { "require_abstract_models": true } }] },
    {
      "name": "com.app.HeaderModel",
      "modifiers": ["public", "abstract"],
      "extends": "tessel.runtime.Model<HeaderView>",
      "annotations": [{ "model_class": { "layout": "header" } }],
      "line": 4,
      "members": [
        { "kind": "field", "name": "title", "type": "java.lang.String", "line": 7,
          "annotations": [{ "attribute": { "do_not_hash": true } }] },
        { "kind": "field", "name": "tags", "type": "java.util.List<java.lang.String>",
          "annotations": [{ "attribute": {} }] },
        { "kind": "method", "name": "setCount", "params": [{ "name": "count", "type": "int" }],
          "annotations": [{ "attribute": {} }] },
        { "kind": "constructor", "modifiers": ["public"],
          "params": [{ "name": "ids", "type": "long[]" }], "varargs": true }
      ],
      "nested": [
        { "name": "Row", "modifiers": ["public", "static", "abstract"],
          "extends": "tessel.runtime.Model<HeaderView>",
          "annotations": [{ "model_class": {} }] }
      ]
    },
    { "name": "com.app.HeaderView", "annotations": ["styleable"] },
    { "name": "com.app.HeaderViewStyleBuilder", "round": 2 }
  ]
}"#;

fn sample() -> Manifest {
    Manifest::from_json(SAMPLE).unwrap_or_else(|e| panic!("sample manifest: {e}"))
}

fn find(host: &MemorySymbolTable, name: &str) -> DeclId {
    host.find_type(&QualifiedName::new(name))
        .unwrap_or_else(|| panic!("`{name}` is not registered"))
}

fn member(host: &MemorySymbolTable, owner: DeclId, simple: &str) -> DeclId {
    host.enclosed(owner)
        .into_iter()
        .find(|&id| host.name(id).simple_name() == simple)
        .unwrap_or_else(|| panic!("no member `{simple}`"))
}

#[test]
fn parses_options_and_rounds() {
    let manifest = sample();
    assert_eq!(
        manifest.options.get("require-hash-contract").map(String::as_str),
        Some("true")
    );
    assert_eq!(manifest.rounds(), vec![1, 2]);
    assert_eq!(Manifest::default().rounds(), vec![1]);
}

#[test]
fn registers_types_members_and_annotations() {
    let manifest = sample();
    let mut host = MemorySymbolTable::new();
    let elements = manifest.register_round(&mut host, 1).unwrap_or_else(|e| panic!("{e}"));

    let header = find(&host, "com.app.HeaderModel");
    let view = find(&host, "com.app.HeaderView");
    let base = find(&host, "tessel.runtime.Model");
    assert_eq!(host.kind(find(&host, "java.util.List")), DeclKind::Interface);
    assert!(host.find_type(&QualifiedName::new("com.app.HeaderViewStyleBuilder")).is_none());

    let superclass = host.superclass(header).unwrap_or_else(|| panic!("no superclass"));
    assert_eq!(superclass.decl(), Some(base));
    assert_eq!(superclass.args().first().and_then(TypeRef::decl), Some(view));
    assert_eq!(
        host.location(header).map(|l| l.to_string()),
        Some("HeaderModel.java:4".to_owned())
    );

    let title = member(&host, header, "title");
    assert_eq!(host.value_type(title).to_string(), "java.lang.String");
    assert!(matches!(
        host.annotations(title).as_slice(),
        [Annotation::Attribute(options)] if options.do_not_hash
    ));
    assert_eq!(
        host.value_type(member(&host, header, "tags")).to_string(),
        "java.util.List<java.lang.String>"
    );

    let setter = member(&host, header, "setCount");
    assert_eq!(host.value_type(setter), TypeRef::Void);
    assert_eq!(host.params(setter)[0].ty, TypeRef::Primitive(Primitive::Int));

    let constructor = member(&host, header, "<init>");
    assert!(host.is_varargs(constructor));
    assert_eq!(host.params(constructor)[0].ty.to_string(), "long[]");

    let row = find(&host, "com.app.HeaderModel.Row");
    assert_eq!(host.nesting(row), NestingKind::Member);
    assert_eq!(host.enclosing(row), Some(header));

    let package = elements
        .iter()
        .copied()
        .find(|&id| host.kind(id) == DeclKind::Package)
        .unwrap_or_else(|| panic!("package config is an element"));
    assert_eq!(host.name(package).as_str(), "com.app");

    let mut expected = vec![
        package,
        header,
        title,
        member(&host, header, "tags"),
        setter,
        row,
        view,
    ];
    expected.sort_unstable();
    assert_eq!(elements, expected);
}

#[test]
fn later_rounds_see_earlier_types() {
    let manifest = sample();
    let mut host = MemorySymbolTable::new();
    manifest.register_round(&mut host, 1).unwrap_or_else(|e| panic!("{e}"));
    let elements = manifest.register_round(&mut host, 2).unwrap_or_else(|e| panic!("{e}"));
    assert!(elements.is_empty());
    assert!(host.find_type(&QualifiedName::new("com.app.HeaderViewStyleBuilder")).is_some());
}

#[test]
fn type_expressions() {
    let manifest = Manifest::from_json(
        r#"{ "declarations": [
            { "name": "java.lang.String" },
            { "name": "java.util.Map", "type_params": ["K", "V"] },
            { "name": "com.app.Holder", "type_params": ["T"], "members": [
                { "kind": "field", "name": "a", "type": "java.util.Map<java.lang.String, java.util.Map<T, int[]>>" },
                { "kind": "field", "name": "b", "type": "(java.lang.String, T) -> void" },
                { "kind": "field", "name": "c", "type": "java.util.Map<(int) -> T, java.lang.String>[]" },
                { "kind": "field", "name": "d", "type": "() -> boolean" }
            ] }
        ] }"#,
    )
    .unwrap_or_else(|e| panic!("{e}"));
    let mut host = MemorySymbolTable::new();
    manifest.register_round(&mut host, 1).unwrap_or_else(|e| panic!("{e}"));
    let holder = find(&host, "com.app.Holder");
    let render = |simple: &str| host.value_type(member(&host, holder, simple)).to_string();

    assert_eq!(
        render("a"),
        "java.util.Map<java.lang.String, java.util.Map<T, int[]>>"
    );
    assert_eq!(render("b"), "(java.lang.String, T) -> void");
    assert_eq!(render("c"), "java.util.Map<(int) -> T, java.lang.String>[]");
    assert_eq!(render("d"), "() -> boolean");
}

#[test]
fn unqualified_names_resolve_in_the_owner_package() {
    let manifest = Manifest::from_json(
        r#"{ "declarations": [
            { "name": "com.app.Badge" },
            { "name": "com.app.Card", "members": [
                { "kind": "field", "name": "badge", "type": "Badge" }
            ] }
        ] }"#,
    )
    .unwrap_or_else(|e| panic!("{e}"));
    let mut host = MemorySymbolTable::new();
    manifest.register_round(&mut host, 1).unwrap_or_else(|e| panic!("{e}"));
    let card = find(&host, "com.app.Card");
    assert_eq!(
        host.value_type(member(&host, card, "badge")).decl(),
        Some(find(&host, "com.app.Badge"))
    );
}

fn load_error(json: &str) -> ManifestError {
    let manifest = Manifest::from_json(json).unwrap_or_else(|e| panic!("{e}"));
    let mut host = MemorySymbolTable::new();
    match manifest.register_round(&mut host, 1) {
        Ok(elements) => panic!("expected an error, got {elements:?}"),
        Err(error) => error,
    }
}

#[test]
fn unknown_type_is_reported_with_its_user() {
    let error = load_error(
        r#"{ "declarations": [ { "name": "com.app.Card", "members": [
            { "kind": "field", "name": "badge", "type": "Badge" } ] } ] }"#,
    );
    assert!(matches!(
        &error,
        ManifestError::UnknownType { decl, ty } if decl == "com.app.Card" && ty == "Badge"
    ));
}

#[test]
fn malformed_types() {
    for ty in ["", "List<", "(int -> void", "(int) void", "a..b", "int<int>"] {
        let json = format!(
            r#"{{ "declarations": [ {{ "name": "com.app.Card", "members": [
                {{ "kind": "field", "name": "x", "type": "{ty}" }} ] }} ] }}"#
        );
        let error = load_error(&json);
        assert!(
            matches!(error, ManifestError::MalformedType { .. } | ManifestError::UnknownType { .. }),
            "`{ty}`: {error}"
        );
    }
}

#[test]
fn unknown_modifier() {
    let error = load_error(r#"{ "declarations": [ { "name": "com.app.Card", "modifiers": ["sealed"] } ] }"#);
    assert_eq!(error.to_string(), "unknown modifier `sealed` on `com.app.Card`");
}

#[test]
fn duplicate_type() {
    let error = load_error(
        r#"{ "declarations": [ { "name": "com.app.Card" }, { "name": "com.app.Card" } ] }"#,
    );
    assert!(matches!(error, ManifestError::DuplicateType(name) if name == "com.app.Card"));
}

#[test]
fn nested_declarations_must_be_classes() {
    let error = load_error(
        r#"{ "declarations": [ { "name": "com.app.Card",
            "nested": [ { "kind": "interface", "name": "Listener" } ] } ] }"#,
    );
    assert!(matches!(error, ManifestError::NestedKind(name) if name == "com.app.Card.Listener"));
}

#[test]
fn rejects_unknown_fields() {
    assert!(matches!(
        Manifest::from_json(r#"{ "declarations": [ { "name": "a.B", "extend": "a.C" } ] }"#),
        Err(ManifestError::Json(_))
    ));
}
