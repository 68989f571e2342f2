use std::sync::Arc;

use pretty_assertions::assert_eq;
use tessel_diagnostic::DiagnosticSink;
use tessel_ir::{
    Annotation, AttributeOptions, MemorySymbolTable, Modifiers, PackageConfigOptions, Primitive,
};

use super::*;
use crate::test_support::{with_hash_contract, Fixture};
use crate::{Aggregator, ModelOptions, DEFAULT_MODEL_BASE};

fn facts() -> HierarchyFacts {
    HierarchyFacts::new(QualifiedName::new(DEFAULT_MODEL_BASE))
}

#[test]
fn value_shapes() {
    let mut fx = Fixture::new();
    let list = fx.host.interface("java.util.List").type_param("E", Vec::new()).id();
    let plain = fx.host.class("com.app.Plain").id();
    let valued = fx.host.class("com.app.Valued").id();
    with_hash_contract(&mut fx.host, valued);
    let valued_ty = fx.type_of(valued);
    let derived = fx.host.class("com.app.Derived").extends(valued_ty.clone()).id();
    let color = fx.host.enumeration("com.app.Color").id();
    let listener = fx.host.interface("com.app.Listener").id();

    let list_ty = fx.type_of(list);
    let plain_ty = fx.type_of(plain);
    let derived_ty = fx.type_of(derived);
    let color_ty = fx.type_of(color);
    let listener_ty = fx.type_of(listener);
    let string = fx.string.clone();
    let lookup = fx.lookup();
    let facts = facts();
    let validator = HashValidator::new(&lookup, &facts);

    for ok in [
        TypeRef::Primitive(Primitive::Long),
        string.clone(),
        valued_ty,
        derived_ty,
        color_ty,
        TypeRef::array_of(TypeRef::Primitive(Primitive::Int)),
        list_ty.clone().with_args(vec![string]),
    ] {
        assert_eq!(validator.check(&ok), Ok(()), "{ok}");
    }

    assert_eq!(
        validator.check(&plain_ty),
        Err(HashViolation::MissingMethods(QualifiedName::new("com.app.Plain")))
    );
    assert_eq!(
        validator.check(&listener_ty),
        Err(HashViolation::Interface(QualifiedName::new("com.app.Listener")))
    );
    assert_eq!(
        validator.check(&TypeRef::array_of(plain_ty.clone())),
        Err(HashViolation::MissingMethods(QualifiedName::new("com.app.Plain")))
    );
    assert_eq!(
        validator.check(&list_ty.with_args(vec![plain_ty])),
        Err(HashViolation::MissingMethods(QualifiedName::new("com.app.Plain")))
    );
    assert_eq!(
        validator.check(&TypeRef::var("T")),
        Err(HashViolation::TypeVariable("T".to_owned()))
    );
}

#[test]
fn abstract_hash_methods_do_not_count() {
    let mut fx = Fixture::new();
    let shape = fx.host.class("com.app.Shape").modifiers(Modifiers::ABSTRACT).id();
    fx.host
        .method(shape, "equals", TypeRef::Primitive(Primitive::Bool))
        .modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
        .param("other", TypeRef::var("Object"))
        .id();
    fx.host
        .method(shape, "hashCode", TypeRef::Primitive(Primitive::Int))
        .modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
        .id();
    let ty = fx.type_of(shape);
    let lookup = fx.lookup();
    let facts = facts();

    assert!(HashValidator::new(&lookup, &facts).check(&ty).is_err());
}

fn run(fx: Fixture, options: ModelOptions) -> (usize, Vec<Diagnostic>) {
    let lookup = fx.lookup();
    let harness = Harness::new(true, Arc::new(DiagnosticSink::new()));
    let aggregator = Aggregator::new(options);
    let elements = lookup.read(MemorySymbolTable::annotated);
    aggregator.process_round(1, &elements, &lookup, &harness);
    let set = aggregator.finish(harness.sink());
    let count = validate_hash_contracts(&set, &lookup, &harness);
    (count, harness.sink().flush())
}

fn header_with_listener(fx: &mut Fixture) {
    let listener = fx.host.interface("com.app.Listener").id();
    let listener_ty = fx.type_of(listener);
    let header = fx.model("com.app.HeaderModel");
    fx.attribute(header, "listener", listener_ty, Modifiers::PUBLIC);
}

#[test]
fn violations_are_reported_only_when_required() {
    let mut fx = Fixture::new();
    header_with_listener(&mut fx);
    let (count, diagnostics) = run(fx, ModelOptions::default());
    assert_eq!(count, 0);
    assert!(diagnostics.is_empty());

    let mut fx = Fixture::new();
    header_with_listener(&mut fx);
    let (count, diagnostics) = run(
        fx,
        ModelOptions {
            require_hash_contract: true,
            ..ModelOptions::default()
        },
    );
    assert_eq!(count, 1);
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.code, ErrorCode::E3001);
    assert_eq!(
        diagnostic.subject,
        Some(QualifiedName::new("com.app.HeaderModel.listener"))
    );
    assert!(diagnostic.message.contains("com.app.HeaderModel_"));
    assert!(diagnostic.message.contains("interface `com.app.Listener`"));
}

#[test]
fn opted_out_attributes_are_skipped() {
    let mut fx = Fixture::new();
    let listener = fx.host.interface("com.app.Listener").id();
    let listener_ty = fx.type_of(listener);
    let header = fx.model("com.app.HeaderModel");
    for (name, options) in [
        (
            "unhashed",
            AttributeOptions {
                do_not_hash: true,
                ..AttributeOptions::default()
            },
        ),
        (
            "ignored",
            AttributeOptions {
                ignore_require_hash: true,
                ..AttributeOptions::default()
            },
        ),
    ] {
        fx.host
            .field(header, name, listener_ty.clone())
            .modifiers(Modifiers::PUBLIC)
            .annotate(Annotation::Attribute(options))
            .id();
    }

    let (count, diagnostics) = run(
        fx,
        ModelOptions {
            require_hash_contract: true,
            ..ModelOptions::default()
        },
    );
    assert_eq!(count, 0);
    assert!(diagnostics.is_empty());
}

#[test]
fn package_config_turns_the_check_on() {
    let mut fx = Fixture::new();
    fx.host
        .package("com.app")
        .annotate(Annotation::PackageConfig(PackageConfigOptions {
            require_hash_contract: Some(true),
            require_abstract_models: None,
        }))
        .id();
    header_with_listener(&mut fx);

    let (count, diagnostics) = run(fx, ModelOptions::default());
    assert_eq!(count, 1);
    assert_eq!(diagnostics[0].code, ErrorCode::E3001);
}
