//! Memoized facts about the source class hierarchy.
//!
//! Each fact is computed once per type and shared by every task that asks,
//! keyed by the type's qualified name. Hierarchy walks are iterative and
//! guarded against cycles in malformed inputs.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tessel_harness::{Memo, SymbolLookup};
use tessel_ir::{AnnotationKind, DeclId, DeclKind, Modifiers, QualifiedName, SymbolTable};

use crate::descriptor::{ConstructorInfo, MethodInfo};

/// Name of the no-argument method that resets a model; never chained.
const RESET_METHOD: &str = "reset";

/// Process-wide cache of hierarchy facts.
pub struct HierarchyFacts {
    model_base: QualifiedName,
    model_types: Memo<QualifiedName, bool>,
    chained_methods: Memo<QualifiedName, Arc<[MethodInfo]>>,
    constructors: Memo<QualifiedName, Arc<[ConstructorInfo]>>,
    hash_contract: Memo<QualifiedName, bool>,
}

impl HierarchyFacts {
    pub fn new(model_base: QualifiedName) -> Self {
        HierarchyFacts {
            model_base,
            model_types: Memo::new(),
            chained_methods: Memo::new(),
            constructors: Memo::new(),
            hash_contract: Memo::new(),
        }
    }

    pub fn model_base(&self) -> &QualifiedName {
        &self.model_base
    }

    /// Whether `decl` is the model base type or extends it.
    pub fn is_model_type<S: SymbolTable>(&self, lookup: &SymbolLookup<S>, decl: DeclId) -> bool {
        let key = lookup.name(decl);
        self.model_types.get_or_compute(&key, || {
            superclass_chain(lookup, decl).any(|level| lookup.name(level) == self.model_base)
        })
    }

    /// Overridable methods of `class` and its superclasses that return the
    /// class's own type (or a supertype of it).
    pub fn chained_methods<S: SymbolTable>(
        &self,
        lookup: &SymbolLookup<S>,
        class: DeclId,
    ) -> Arc<[MethodInfo]> {
        let key = lookup.name(class);
        self.chained_methods.get_or_compute(&key, || {
            let mut methods = Vec::new();
            for level in superclass_chain(lookup, class) {
                methods.extend(
                    lookup
                        .enclosed(level)
                        .into_iter()
                        .filter_map(|member| chained_method(lookup, level, member)),
                );
            }
            methods.into()
        })
    }

    /// Non-private constructors of `class`.
    pub fn constructors<S: SymbolTable>(
        &self,
        lookup: &SymbolLookup<S>,
        class: DeclId,
    ) -> Arc<[ConstructorInfo]> {
        let key = lookup.name(class);
        self.constructors.get_or_compute(&key, || {
            lookup
                .enclosed(class)
                .into_iter()
                .filter(|&member| {
                    lookup.kind(member) == DeclKind::Constructor
                        && !lookup.modifiers(member).contains(Modifiers::PRIVATE)
                })
                .map(|ctor| ConstructorInfo {
                    modifiers: lookup.modifiers(ctor),
                    params: lookup.params(ctor),
                    varargs: lookup.is_varargs(ctor),
                })
                .collect::<Vec<_>>()
                .into()
        })
    }

    /// Whether `decl` or one of its superclasses implements both
    /// `equals(other)` and `hashCode()`.
    pub fn declares_hash_contract<S: SymbolTable>(
        &self,
        lookup: &SymbolLookup<S>,
        decl: DeclId,
    ) -> bool {
        let key = lookup.name(decl);
        self.hash_contract.get_or_compute(&key, || {
            let mut equals = false;
            let mut hash_code = false;
            for level in superclass_chain(lookup, decl) {
                for member in lookup.enclosed(level) {
                    if lookup.kind(member) != DeclKind::Method
                        || lookup.modifiers(member).contains(Modifiers::ABSTRACT)
                    {
                        continue;
                    }
                    let name = lookup.name(member);
                    match (name.simple_name(), lookup.params(member).len()) {
                        ("equals", 1) => equals = true,
                        ("hashCode", 0) => hash_code = true,
                        _ => {}
                    }
                }
                if equals && hash_code {
                    return true;
                }
            }
            false
        })
    }
}

fn chained_method<S: SymbolTable>(
    lookup: &SymbolLookup<S>,
    level: DeclId,
    member: DeclId,
) -> Option<MethodInfo> {
    if lookup.kind(member) != DeclKind::Method {
        return None;
    }
    let modifiers = lookup.modifiers(member);
    if modifiers.intersects(Modifiers::PRIVATE | Modifiers::FINAL | Modifiers::STATIC) {
        return None;
    }
    let returns = lookup.value_type(member).decl()?;
    if !lookup.is_subtype(level, returns) {
        return None;
    }
    let params = lookup.params(member);
    let name = lookup.name(member);
    if name.simple_name() == RESET_METHOD && params.is_empty() {
        return None;
    }
    Some(MethodInfo {
        name: name.simple_name().into(),
        modifiers,
        params,
        varargs: lookup.is_varargs(member),
        is_attribute: lookup.has_annotation(member, AnnotationKind::Attribute),
    })
}

/// `start` followed by its superclasses, nearest first.
pub(crate) fn superclass_chain<'a, S: SymbolTable>(
    lookup: &'a SymbolLookup<S>,
    start: DeclId,
) -> impl Iterator<Item = DeclId> + 'a {
    let mut seen = FxHashSet::default();
    let mut next = Some(start);
    std::iter::from_fn(move || {
        let current = next.take()?;
        if !seen.insert(current) {
            return None;
        }
        next = lookup.superclass(current).and_then(|ty| ty.decl());
        Some(current)
    })
}
