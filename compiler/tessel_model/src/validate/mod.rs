//! Hash/equality contract validation.
//!
//! Generated models compare and hash their attributes, so an attribute type
//! that falls back to identity semantics silently breaks model diffing. This
//! pass runs once, after every round, over every attribute that participates
//! in hashing where the contract is required.

use tessel_diagnostic::{Diagnostic, ErrorCode};
use tessel_harness::{Harness, SymbolLookup, TaskFailure};
use tessel_ir::{DeclKind, QualifiedName, SymbolTable, TypeRef};

use crate::facts::HierarchyFacts;
use crate::{AttributeDescriptor, ModelSet};

/// Library types known to implement value equality.
const VALUE_TYPES: &[&str] = &[
    "java.lang.String",
    "java.lang.CharSequence",
    "java.lang.Boolean",
    "java.lang.Byte",
    "java.lang.Short",
    "java.lang.Integer",
    "java.lang.Long",
    "java.lang.Character",
    "java.lang.Float",
    "java.lang.Double",
];

/// Library containers whose equality delegates to their elements.
const CONTAINER_TYPES: &[&str] = &[
    "java.util.Collection",
    "java.util.List",
    "java.util.Set",
    "java.util.Map",
];

/// Why a type cannot be used in a generated hash/equality.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum HashViolation {
    #[error("type variable `{0}` cannot be checked for hashCode and equals")]
    TypeVariable(String),
    #[error("function types do not implement hashCode and equals")]
    FunctionType,
    #[error("interface `{0}` does not declare hashCode and equals")]
    Interface(QualifiedName),
    #[error("`{0}` does not implement hashCode and equals")]
    MissingMethods(QualifiedName),
    #[error("`void` is not a value type")]
    Void,
}

/// Checks types against the hash/equality contract.
pub struct HashValidator<'a, S> {
    lookup: &'a SymbolLookup<S>,
    facts: &'a HierarchyFacts,
}

impl<'a, S: SymbolTable> HashValidator<'a, S> {
    pub fn new(lookup: &'a SymbolLookup<S>, facts: &'a HierarchyFacts) -> Self {
        HashValidator { lookup, facts }
    }

    pub fn check(&self, ty: &TypeRef) -> Result<(), HashViolation> {
        match ty {
            TypeRef::Void => Err(HashViolation::Void),
            TypeRef::Primitive(_) => Ok(()),
            TypeRef::Array(element) => self.check(element),
            TypeRef::Var(name) => Err(HashViolation::TypeVariable(name.to_string())),
            TypeRef::Function { .. } => Err(HashViolation::FunctionType),
            TypeRef::Declared { decl, name, args } => {
                if VALUE_TYPES.contains(&name.as_str()) {
                    return Ok(());
                }
                if !CONTAINER_TYPES.contains(&name.as_str()) {
                    let kind = self.lookup.kind(*decl);
                    if kind != DeclKind::Enum
                        && !self.facts.declares_hash_contract(self.lookup, *decl)
                    {
                        return Err(if kind == DeclKind::Interface {
                            HashViolation::Interface(name.clone())
                        } else {
                            HashViolation::MissingMethods(name.clone())
                        });
                    }
                }
                args.iter().try_for_each(|arg| self.check(arg))
            }
        }
    }
}

/// Report every attribute whose type breaks a required hash contract.
///
/// Returns the number of violations.
#[tracing::instrument(level = "debug", skip_all, fields(models = set.models().len()))]
pub fn validate_hash_contracts<S>(set: &ModelSet, lookup: &SymbolLookup<S>, harness: &Harness) -> usize
where
    S: SymbolTable + Send + Sync,
{
    let validator = HashValidator::new(lookup, set.facts());
    let checked: Vec<(&QualifiedName, &AttributeDescriptor)> = set
        .models()
        .iter()
        .flat_map(|model| model.attributes().map(move |a| (model.generated_name(), a)))
        .filter(|(_, attribute)| {
            attribute.use_in_hash()
                && !attribute.ignore_require_hash
                && set
                    .packages()
                    .requires_hash_contract(&attribute.package, set.options())
        })
        .collect();

    let violations = harness.filter_map(
        "validate hash contracts",
        checked,
        true,
        |(model, attribute)| -> Result<Option<Diagnostic>, TaskFailure> {
            Ok(validator.check(&attribute.ty).err().map(|violation| {
                Diagnostic::error(ErrorCode::E3001)
                    .with_message(format!(
                        "attribute `{}` of `{model}` must implement hashCode and equals: {violation}",
                        attribute.name
                    ))
                    .with_subject(attribute.declaring_class.child(&attribute.name))
                    .with_location(attribute.location.clone())
                    .with_note(
                        "opt out with do_not_hash or ignore_require_hash on the attribute",
                    )
            }))
        },
    );
    let count = violations.len();
    for diagnostic in violations {
        harness.sink().report(diagnostic);
    }
    count
}

#[cfg(test)]
mod tests;
