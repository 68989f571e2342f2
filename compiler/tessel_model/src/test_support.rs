//! Host fixtures shared by the unit tests of this crate.

use tessel_harness::SymbolLookup;
use tessel_ir::{
    Annotation, AttributeOptions, DeclId, MemorySymbolTable, ModelClassOptions, Modifiers,
    Primitive, TypeRef,
};

use crate::options::DEFAULT_MODEL_BASE;

pub(crate) struct Fixture {
    pub host: MemorySymbolTable,
    pub base: DeclId,
    pub string: TypeRef,
}

impl Fixture {
    pub fn new() -> Self {
        let mut host = MemorySymbolTable::new();
        let base = host
            .class(DEFAULT_MODEL_BASE)
            .modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
            .type_param("V", Vec::new())
            .id();
        let string_id = host
            .class("java.lang.String")
            .modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
            .id();
        let string = host.type_of(string_id);
        let _ = with_hash_contract(&mut host, string_id);
        Fixture { host, base, string }
    }

    pub fn type_of(&self, decl: DeclId) -> TypeRef {
        self.host.type_of(decl)
    }

    /// Public abstract class extending the model base.
    pub fn model(&mut self, name: &str) -> DeclId {
        let base = self.host.type_of(self.base);
        self.model_extending_type(name, base)
    }

    pub fn model_extending(&mut self, name: &str, superclass: DeclId) -> DeclId {
        let ty = self.host.type_of(superclass);
        self.model_extending_type(name, ty)
    }

    pub fn model_extending_type(&mut self, name: &str, superclass: TypeRef) -> DeclId {
        self.host
            .class(name)
            .modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
            .extends(superclass)
            .located(&format!("{}.java", name.rsplit('.').next().unwrap_or(name)), 1)
            .id()
    }

    /// Attribute field with the given modifiers.
    pub fn attribute(&mut self, owner: DeclId, name: &str, ty: TypeRef, modifiers: Modifiers) -> DeclId {
        self.host
            .field(owner, name, ty)
            .modifiers(modifiers)
            .annotate(Annotation::Attribute(AttributeOptions::default()))
            .id()
    }

    pub fn int_attribute(&mut self, owner: DeclId, name: &str) -> DeclId {
        self.attribute(owner, name, TypeRef::Primitive(Primitive::Int), Modifiers::empty())
    }

    pub fn lookup(self) -> SymbolLookup<MemorySymbolTable> {
        SymbolLookup::new(self.host)
    }
}

/// Give `class` concrete `equals(Object)` and `hashCode()` methods.
pub(crate) fn with_hash_contract(host: &mut MemorySymbolTable, class: DeclId) -> DeclId {
    host.method(class, "equals", TypeRef::Primitive(Primitive::Bool))
        .modifiers(Modifiers::PUBLIC)
        .param("other", TypeRef::var("Object"))
        .id();
    host.method(class, "hashCode", TypeRef::Primitive(Primitive::Int))
        .modifiers(Modifiers::PUBLIC)
        .id();
    class
}

pub(crate) fn model_class(layout: Option<&str>) -> Annotation {
    Annotation::ModelClass(ModelClassOptions {
        layout: layout.map(str::to_owned),
    })
}
