//! The host compiler's symbol table, as seen by Tessel.
//!
//! Every query is read-only. Hosts may materialize declarations lazily:
//! `complete` forces a declaration (and its members) to be fully loaded and
//! is the only method taking `&mut self`. Callers running queries from
//! several threads serialize completion through a single lookup-wide lock
//! and treat completed declarations as immutable afterwards.

mod memory;

pub use memory::{DeclBuilder, MemorySymbolTable};

use crate::{
    Annotation, AnnotationKind, DeclId, DeclKind, Modifiers, NestingKind, Params, QualifiedName,
    SourceLocation, TypeParam, TypeRef,
};

/// Read-only query interface of the host compiler.
pub trait SymbolTable {
    /// Whether `decl` is fully materialized.
    fn is_complete(&self, decl: DeclId) -> bool;

    /// Force `decl` to be fully materialized.
    fn complete(&mut self, decl: DeclId);

    /// Fully qualified name. Members are named `<owner>.<member>`.
    fn name(&self, decl: DeclId) -> QualifiedName;

    fn kind(&self, decl: DeclId) -> DeclKind;

    fn modifiers(&self, decl: DeclId) -> Modifiers;

    fn nesting(&self, decl: DeclId) -> NestingKind;

    /// Declaration directly containing `decl` (`None` for top-level types).
    fn enclosing(&self, decl: DeclId) -> Option<DeclId>;

    /// Package containing `decl`.
    fn package_of(&self, decl: DeclId) -> QualifiedName;

    fn annotations(&self, decl: DeclId) -> Vec<Annotation>;

    /// Members declared directly in `decl`, in source order.
    fn enclosed(&self, decl: DeclId) -> Vec<DeclId>;

    /// Direct superclass, or `None` at the top of the hierarchy.
    fn superclass(&self, decl: DeclId) -> Option<TypeRef>;

    fn interfaces(&self, decl: DeclId) -> Vec<TypeRef>;

    /// Parameters of a method or constructor.
    fn params(&self, decl: DeclId) -> Params;

    fn is_varargs(&self, decl: DeclId) -> bool;

    /// Field type, or method return type.
    fn value_type(&self, decl: DeclId) -> TypeRef;

    fn type_params(&self, decl: DeclId) -> Vec<TypeParam>;

    /// Look up a type declaration by name.
    fn find_type(&self, name: &QualifiedName) -> Option<DeclId>;

    /// Whether `sub` is `sup` or inherits from it.
    fn is_subtype(&self, sub: DeclId, sup: DeclId) -> bool;

    fn location(&self, decl: DeclId) -> Option<SourceLocation>;

    /// Whether `decl` carries an annotation of `kind`.
    fn has_annotation(&self, decl: DeclId, kind: AnnotationKind) -> bool {
        self.annotations(decl).iter().any(|a| a.kind() == kind)
    }
}
