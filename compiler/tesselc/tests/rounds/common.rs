//! Host fixtures for round tests.

use std::sync::Arc;

use tessel_diagnostic::{DiagnosticSink, ErrorCode};
use tessel_ir::{
    Annotation, AttributeOptions, DeclId, MemorySymbolTable, ModelClassOptions, Modifiers,
    QualifiedName, TypeRef,
};
use tesselc::{Driver, MemorySink, ProcessingOutcome, ProcessorConfig, Round};

pub const MODEL_BASE: &str = "tessel.runtime.Model";

/// A host with the model base type, `String` and `Runnable` registered.
pub struct Host {
    pub table: MemorySymbolTable,
    base: TypeRef,
    pub string: TypeRef,
    pub runnable: TypeRef,
}

impl Host {
    pub fn new() -> Self {
        let mut table = MemorySymbolTable::new();
        let base = table
            .class(MODEL_BASE)
            .modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
            .type_param("V", Vec::new())
            .id();
        let string = table
            .class("java.lang.String")
            .modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
            .id();
        let runnable = table
            .interface("java.lang.Runnable")
            .modifiers(Modifiers::PUBLIC)
            .id();
        Host {
            base: table.type_of(base),
            string: table.type_of(string),
            runnable: table.type_of(runnable),
            table,
        }
    }

    /// Public abstract model class with a layout, extending the model base.
    pub fn model(&mut self, name: &str) -> DeclId {
        let base = self.base.clone();
        self.model_extending_type(name, base)
    }

    pub fn model_extending(&mut self, name: &str, superclass: DeclId) -> DeclId {
        let ty = self.table.type_of(superclass);
        self.model_extending_type(name, ty)
    }

    fn model_extending_type(&mut self, name: &str, superclass: TypeRef) -> DeclId {
        self.table
            .class(name)
            .modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
            .extends(superclass)
            .annotate(Annotation::ModelClass(ModelClassOptions {
                layout: Some("layout".to_owned()),
            }))
            .id()
    }

    /// Abstract class extending the model base with no model annotation,
    /// as a library compiled elsewhere would ship it.
    pub fn library_class(&mut self, name: &str) -> DeclId {
        let base = self.base.clone();
        self.table
            .class(name)
            .modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
            .extends(base)
            .id()
    }

    /// Public `String` attribute.
    pub fn attribute(&mut self, owner: DeclId, name: &str) -> DeclId {
        let ty = self.string.clone();
        self.typed_attribute(owner, name, ty, Modifiers::PUBLIC)
    }

    pub fn package_private_attribute(&mut self, owner: DeclId, name: &str) -> DeclId {
        let ty = self.string.clone();
        self.typed_attribute(owner, name, ty, Modifiers::empty())
    }

    pub fn typed_attribute(
        &mut self,
        owner: DeclId,
        name: &str,
        ty: TypeRef,
        modifiers: Modifiers,
    ) -> DeclId {
        self.table
            .field(owner, name, ty)
            .modifiers(modifiers)
            .annotate(Annotation::Attribute(AttributeOptions::default()))
            .id()
    }
}

pub fn driver(host: MemorySymbolTable, options: &[(&str, &str)]) -> Driver<MemorySymbolTable> {
    let sink = Arc::new(DiagnosticSink::new());
    let config = ProcessorConfig::from_options(options.iter().copied(), &sink).unwrap();
    Driver::new(host, config, sink)
}

/// Process each round's elements, then finish.
pub fn run(
    host: MemorySymbolTable,
    options: &[(&str, &str)],
    rounds: Vec<Vec<DeclId>>,
) -> (ProcessingOutcome, MemorySink) {
    let mut driver = driver(host, options);
    let mut out = MemorySink::new();
    for elements in rounds {
        assert!(driver.process(Round::new(elements), &mut out).unwrap().is_none());
    }
    let outcome = driver.finish(&mut out).unwrap();
    (outcome, out)
}

/// Sorted attribute names of the model generated from `source`.
pub fn attribute_names(outcome: &ProcessingOutcome, source: &str) -> Vec<String> {
    let model = outcome
        .models
        .model(&QualifiedName::new(source))
        .unwrap_or_else(|| panic!("no model for `{source}`"));
    let mut names: Vec<String> = model.attributes().map(|a| a.name.to_string()).collect();
    names.sort();
    names
}

pub fn codes(outcome: &ProcessingOutcome) -> Vec<ErrorCode> {
    outcome.diagnostics.iter().map(|d| d.code).collect()
}
