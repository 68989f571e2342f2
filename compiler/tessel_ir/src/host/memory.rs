//! In-memory reference host.
//!
//! Declarations are registered through a small builder API. Every new
//! declaration starts out incomplete; `complete` flips it and counts the
//! completion so callers can observe that lazy loading happened exactly once.

use rustc_hash::{FxHashMap, FxHashSet};

use super::SymbolTable;
use crate::{
    Annotation, DeclId, DeclKind, Modifiers, NestingKind, Param, Params, QualifiedName,
    SourceLocation, TypeParam, TypeRef,
};

#[derive(Clone, Debug)]
struct DeclData {
    name: QualifiedName,
    kind: DeclKind,
    modifiers: Modifiers,
    nesting: NestingKind,
    enclosing: Option<DeclId>,
    package: QualifiedName,
    annotations: Vec<Annotation>,
    enclosed: Vec<DeclId>,
    superclass: Option<TypeRef>,
    interfaces: Vec<TypeRef>,
    params: Params,
    varargs: bool,
    value_type: TypeRef,
    type_params: Vec<TypeParam>,
    location: Option<SourceLocation>,
}

/// Symbol table backed by plain vectors.
#[derive(Clone, Debug, Default)]
pub struct MemorySymbolTable {
    decls: Vec<DeclData>,
    complete: Vec<bool>,
    types_by_name: FxHashMap<QualifiedName, DeclId>,
    completions: usize,
}

impl MemorySymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered declarations.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// How many times `complete` actually materialized a declaration.
    pub fn completions(&self) -> usize {
        self.completions
    }

    /// All declarations carrying at least one annotation, in registration order.
    pub fn annotated(&self) -> Vec<DeclId> {
        self.ids()
            .filter(|id| !self.decls[id.index()].annotations.is_empty())
            .collect()
    }

    /// All registered declaration handles.
    pub fn ids(&self) -> impl Iterator<Item = DeclId> + '_ {
        (0..self.decls.len()).map(|i| DeclId::new(to_raw(i)))
    }

    /// Declared type reference for a type declaration, without arguments.
    pub fn type_of(&self, decl: DeclId) -> TypeRef {
        TypeRef::declared(decl, self.decls[decl.index()].name.clone())
    }

    /// Register a top-level class. The package is the name's parent.
    pub fn class(&mut self, name: &str) -> DeclBuilder<'_> {
        self.top_level(name, DeclKind::Class)
    }

    pub fn interface(&mut self, name: &str) -> DeclBuilder<'_> {
        self.top_level(name, DeclKind::Interface)
    }

    pub fn enumeration(&mut self, name: &str) -> DeclBuilder<'_> {
        self.top_level(name, DeclKind::Enum)
    }

    /// Register a package-level declaration (the holder of package annotations).
    pub fn package(&mut self, name: &str) -> DeclBuilder<'_> {
        let qualified = QualifiedName::new(name);
        let id = self.push(DeclData::new(qualified.clone(), DeclKind::Package, qualified));
        DeclBuilder { table: self, id }
    }

    /// Register a member class nested in `outer`.
    pub fn nested_class(&mut self, outer: DeclId, simple: &str) -> DeclBuilder<'_> {
        let outer_data = &self.decls[outer.index()];
        let name = outer_data.name.child(simple);
        let package = outer_data.package.clone();
        let mut data = DeclData::new(name.clone(), DeclKind::Class, package);
        data.nesting = NestingKind::Member;
        data.enclosing = Some(outer);
        let id = self.push(data);
        self.types_by_name.insert(name, id);
        self.decls[outer.index()].enclosed.push(id);
        DeclBuilder { table: self, id }
    }

    /// Register a field of `owner`.
    pub fn field(&mut self, owner: DeclId, simple: &str, ty: TypeRef) -> DeclBuilder<'_> {
        let id = self.member(owner, simple, DeclKind::Field);
        self.decls[id.index()].value_type = ty;
        DeclBuilder { table: self, id }
    }

    /// Register a method of `owner` returning `ret`.
    pub fn method(&mut self, owner: DeclId, simple: &str, ret: TypeRef) -> DeclBuilder<'_> {
        let id = self.member(owner, simple, DeclKind::Method);
        self.decls[id.index()].value_type = ret;
        DeclBuilder { table: self, id }
    }

    /// Register a constructor of `owner`.
    pub fn constructor(&mut self, owner: DeclId) -> DeclBuilder<'_> {
        let id = self.member(owner, "<init>", DeclKind::Constructor);
        DeclBuilder { table: self, id }
    }

    /// Continue registering details of an existing declaration.
    pub fn edit(&mut self, decl: DeclId) -> DeclBuilder<'_> {
        DeclBuilder { table: self, id: decl }
    }

    /// Mark every declaration complete without counting completions.
    pub fn complete_all(&mut self) {
        self.complete.iter_mut().for_each(|c| *c = true);
    }

    fn top_level(&mut self, name: &str, kind: DeclKind) -> DeclBuilder<'_> {
        let qualified = QualifiedName::new(name);
        let id = self.push(DeclData::new(qualified.clone(), kind, qualified.parent()));
        self.types_by_name.insert(qualified, id);
        DeclBuilder { table: self, id }
    }

    fn member(&mut self, owner: DeclId, simple: &str, kind: DeclKind) -> DeclId {
        let owner_data = &self.decls[owner.index()];
        let mut data = DeclData::new(owner_data.name.child(simple), kind, owner_data.package.clone());
        data.enclosing = Some(owner);
        let id = self.push(data);
        self.decls[owner.index()].enclosed.push(id);
        id
    }

    fn push(&mut self, data: DeclData) -> DeclId {
        let id = DeclId::new(to_raw(self.decls.len()));
        self.decls.push(data);
        self.complete.push(false);
        id
    }

    fn data(&self, decl: DeclId) -> &DeclData {
        &self.decls[decl.index()]
    }
}

fn to_raw(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

impl DeclData {
    fn new(name: QualifiedName, kind: DeclKind, package: QualifiedName) -> Self {
        DeclData {
            name,
            kind,
            modifiers: Modifiers::empty(),
            nesting: NestingKind::TopLevel,
            enclosing: None,
            package,
            annotations: Vec::new(),
            enclosed: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            params: Params::new(),
            varargs: false,
            value_type: TypeRef::Void,
            type_params: Vec::new(),
            location: None,
        }
    }
}

impl SymbolTable for MemorySymbolTable {
    fn is_complete(&self, decl: DeclId) -> bool {
        self.complete[decl.index()]
    }

    fn complete(&mut self, decl: DeclId) {
        let slot = &mut self.complete[decl.index()];
        if !*slot {
            *slot = true;
            self.completions += 1;
        }
    }

    fn name(&self, decl: DeclId) -> QualifiedName {
        self.data(decl).name.clone()
    }

    fn kind(&self, decl: DeclId) -> DeclKind {
        self.data(decl).kind
    }

    fn modifiers(&self, decl: DeclId) -> Modifiers {
        self.data(decl).modifiers
    }

    fn nesting(&self, decl: DeclId) -> NestingKind {
        self.data(decl).nesting
    }

    fn enclosing(&self, decl: DeclId) -> Option<DeclId> {
        self.data(decl).enclosing
    }

    fn package_of(&self, decl: DeclId) -> QualifiedName {
        self.data(decl).package.clone()
    }

    fn annotations(&self, decl: DeclId) -> Vec<Annotation> {
        self.data(decl).annotations.clone()
    }

    fn enclosed(&self, decl: DeclId) -> Vec<DeclId> {
        self.data(decl).enclosed.clone()
    }

    fn superclass(&self, decl: DeclId) -> Option<TypeRef> {
        self.data(decl).superclass.clone()
    }

    fn interfaces(&self, decl: DeclId) -> Vec<TypeRef> {
        self.data(decl).interfaces.clone()
    }

    fn params(&self, decl: DeclId) -> Params {
        self.data(decl).params.clone()
    }

    fn is_varargs(&self, decl: DeclId) -> bool {
        self.data(decl).varargs
    }

    fn value_type(&self, decl: DeclId) -> TypeRef {
        self.data(decl).value_type.clone()
    }

    fn type_params(&self, decl: DeclId) -> Vec<TypeParam> {
        self.data(decl).type_params.clone()
    }

    fn find_type(&self, name: &QualifiedName) -> Option<DeclId> {
        self.types_by_name.get(name).copied()
    }

    fn is_subtype(&self, sub: DeclId, sup: DeclId) -> bool {
        let mut seen = FxHashSet::default();
        let mut stack = vec![sub];
        while let Some(current) = stack.pop() {
            if current == sup {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            let data = self.data(current);
            stack.extend(data.superclass.iter().filter_map(TypeRef::decl));
            stack.extend(data.interfaces.iter().filter_map(TypeRef::decl));
        }
        false
    }

    fn location(&self, decl: DeclId) -> Option<SourceLocation> {
        self.data(decl).location.clone()
    }
}

/// Fluent registration of one declaration's details.
pub struct DeclBuilder<'a> {
    table: &'a mut MemorySymbolTable,
    id: DeclId,
}

impl DeclBuilder<'_> {
    #[must_use]
    pub fn modifiers(self, modifiers: Modifiers) -> Self {
        self.table.decls[self.id.index()].modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn annotate(self, annotation: Annotation) -> Self {
        self.table.decls[self.id.index()].annotations.push(annotation);
        self
    }

    #[must_use]
    pub fn extends(self, superclass: TypeRef) -> Self {
        self.table.decls[self.id.index()].superclass = Some(superclass);
        self
    }

    #[must_use]
    pub fn implements(self, interface: TypeRef) -> Self {
        self.table.decls[self.id.index()].interfaces.push(interface);
        self
    }

    #[must_use]
    pub fn param(self, name: &str, ty: TypeRef) -> Self {
        self.table.decls[self.id.index()]
            .params
            .push(Param::new(name, ty));
        self
    }

    #[must_use]
    pub fn varargs(self) -> Self {
        self.table.decls[self.id.index()].varargs = true;
        self
    }

    #[must_use]
    pub fn type_param(self, name: &str, bounds: Vec<TypeRef>) -> Self {
        self.table.decls[self.id.index()].type_params.push(TypeParam {
            name: name.into(),
            bounds,
        });
        self
    }

    #[must_use]
    pub fn located(self, file: &str, line: u32) -> Self {
        self.table.decls[self.id.index()].location = Some(SourceLocation::new(file, line));
        self
    }

    /// Finish the declaration and return its handle.
    pub fn id(self) -> DeclId {
        self.id
    }
}
