//! Synchronized access to the host symbol table.
//!
//! Host declarations may be materialized lazily, which mutates the host.
//! `SymbolLookup` wraps the host in one lookup-wide `RwLock`: completing a
//! declaration takes the write lock once, every later query takes the read
//! lock for the duration of a single call and returns an owned value. No
//! guard escapes a method, so callers on worker threads can never hold the
//! host across another query.

use parking_lot::RwLock;
use tessel_ir::{
    Annotation, AnnotationKind, DeclId, DeclKind, Modifiers, NestingKind, Params, QualifiedName,
    SourceLocation, SymbolTable, TypeParam, TypeRef,
};

/// Thread-safe accessor over a host symbol table.
pub struct SymbolLookup<S> {
    host: RwLock<S>,
}

impl<S: SymbolTable> SymbolLookup<S> {
    pub fn new(host: S) -> Self {
        SymbolLookup {
            host: RwLock::new(host),
        }
    }

    /// Run `f` against `decl` after making sure it is complete.
    pub fn with<R>(&self, decl: DeclId, f: impl FnOnce(&S) -> R) -> R {
        self.ensure_complete(decl);
        f(&self.host.read())
    }

    /// Run `f` against the host without completing anything.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.host.read())
    }

    /// Exclusive access to the host, e.g. to register the declarations of
    /// the next round.
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.host.write())
    }

    pub fn into_inner(self) -> S {
        self.host.into_inner()
    }

    fn ensure_complete(&self, decl: DeclId) {
        if self.host.read().is_complete(decl) {
            return;
        }
        let mut host = self.host.write();
        if !host.is_complete(decl) {
            tracing::trace!(?decl, "completing declaration");
            host.complete(decl);
        }
    }

    pub fn name(&self, decl: DeclId) -> QualifiedName {
        self.with(decl, |h| h.name(decl))
    }

    pub fn kind(&self, decl: DeclId) -> DeclKind {
        self.with(decl, |h| h.kind(decl))
    }

    pub fn modifiers(&self, decl: DeclId) -> Modifiers {
        self.with(decl, |h| h.modifiers(decl))
    }

    pub fn nesting(&self, decl: DeclId) -> NestingKind {
        self.with(decl, |h| h.nesting(decl))
    }

    pub fn enclosing(&self, decl: DeclId) -> Option<DeclId> {
        self.with(decl, |h| h.enclosing(decl))
    }

    pub fn package_of(&self, decl: DeclId) -> QualifiedName {
        self.with(decl, |h| h.package_of(decl))
    }

    pub fn annotations(&self, decl: DeclId) -> Vec<Annotation> {
        self.with(decl, |h| h.annotations(decl))
    }

    pub fn has_annotation(&self, decl: DeclId, kind: AnnotationKind) -> bool {
        self.with(decl, |h| h.has_annotation(decl, kind))
    }

    pub fn enclosed(&self, decl: DeclId) -> Vec<DeclId> {
        self.with(decl, |h| h.enclosed(decl))
    }

    pub fn superclass(&self, decl: DeclId) -> Option<TypeRef> {
        self.with(decl, |h| h.superclass(decl))
    }

    pub fn interfaces(&self, decl: DeclId) -> Vec<TypeRef> {
        self.with(decl, |h| h.interfaces(decl))
    }

    pub fn params(&self, decl: DeclId) -> Params {
        self.with(decl, |h| h.params(decl))
    }

    pub fn is_varargs(&self, decl: DeclId) -> bool {
        self.with(decl, |h| h.is_varargs(decl))
    }

    pub fn value_type(&self, decl: DeclId) -> TypeRef {
        self.with(decl, |h| h.value_type(decl))
    }

    pub fn type_params(&self, decl: DeclId) -> Vec<TypeParam> {
        self.with(decl, |h| h.type_params(decl))
    }

    pub fn location(&self, decl: DeclId) -> Option<SourceLocation> {
        self.read(|h| h.location(decl))
    }

    pub fn find_type(&self, name: &QualifiedName) -> Option<DeclId> {
        self.read(|h| h.find_type(name))
    }

    pub fn is_subtype(&self, sub: DeclId, sup: DeclId) -> bool {
        self.with(sub, |h| h.is_subtype(sub, sup))
    }
}
