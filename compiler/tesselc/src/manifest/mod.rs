//! JSON declaration manifests.
//!
//! A manifest stands in for the host compiler: it lists type declarations
//! with their members and annotations, each tagged with the round in which
//! the host makes it visible. [`Manifest::register_round`] loads one round
//! into a [`MemorySymbolTable`] and returns the round's annotated elements.
//!
//! ```json
//! {
//!   "options": { "require-hash-contract": "true" },
//!   "declarations": [
//!     {
//!       "kind": "class",
//!       "name": "com.app.HeaderModel",
//!       "modifiers": ["public", "abstract"],
//!       "extends": "tessel.runtime.Model<com.app.HeaderView>",
//!       "annotations": [{ "model_class": {} }],
//!       "members": [
//!         { "kind": "field", "name": "title", "type": "java.lang.String",
//!           "annotations": [{ "attribute": {} }] }
//!       ]
//!     }
//!   ]
//! }
//! ```

mod types;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tessel_ir::{
    Annotation, AttributeOptions, DeclId, MemorySymbolTable, ModelClassOptions, Modifiers,
    PackageConfigOptions, QualifiedName, SymbolTable, TypeRef,
};

use types::{parse_type, TypeScope};

/// Errors from reading or loading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown modifier `{modifier}` on `{decl}`")]
    UnknownModifier { decl: String, modifier: String },
    #[error("unknown type `{ty}` referenced by `{decl}`")]
    UnknownType { decl: String, ty: String },
    #[error("malformed type `{ty}` in `{decl}`")]
    MalformedType { decl: String, ty: String },
    #[error("type `{0}` is declared twice")]
    DuplicateType(String),
    #[error("nested declaration `{0}` must be a class")]
    NestedKind(String),
}

/// Kind of a type-level manifest entry.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Enum,
    /// Holder of package annotations.
    Package,
}

/// A type declaration and its members.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDecl {
    #[serde(default)]
    pub kind: TypeKind,
    /// Qualified for top-level entries, simple for nested ones.
    pub name: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationSpec>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default = "first_round")]
    pub round: u32,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
    #[serde(default)]
    pub nested: Vec<TypeDecl>,
}

/// A field, method or constructor.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberDecl {
    Field {
        name: String,
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        modifiers: Vec<String>,
        #[serde(default)]
        annotations: Vec<AnnotationSpec>,
        #[serde(default)]
        line: Option<u32>,
    },
    Method {
        name: String,
        #[serde(default = "void")]
        returns: String,
        #[serde(default)]
        params: Vec<ParamSpec>,
        #[serde(default)]
        varargs: bool,
        #[serde(default)]
        modifiers: Vec<String>,
        #[serde(default)]
        annotations: Vec<AnnotationSpec>,
        #[serde(default)]
        line: Option<u32>,
    },
    Constructor {
        #[serde(default)]
        params: Vec<ParamSpec>,
        #[serde(default)]
        varargs: bool,
        #[serde(default)]
        modifiers: Vec<String>,
    },
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// `{ "attribute": {} }`, `{ "model_class": { "layout": "row" } }`,
/// `"styleable"` or `{ "package_config": { ... } }`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationSpec {
    Attribute(AttributeSpec),
    ModelClass(ModelClassSpec),
    Styleable,
    PackageConfig(PackageConfigSpec),
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "Mirrors the attribute annotation flags"
)]
pub struct AttributeSpec {
    pub do_not_hash: bool,
    pub ignore_require_hash: bool,
    pub generate_getter: bool,
    pub generate_setter: bool,
}

impl Default for AttributeSpec {
    fn default() -> Self {
        let defaults = AttributeOptions::default();
        AttributeSpec {
            do_not_hash: defaults.do_not_hash,
            ignore_require_hash: defaults.ignore_require_hash,
            generate_getter: defaults.generate_getter,
            generate_setter: defaults.generate_setter,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelClassSpec {
    pub layout: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfigSpec {
    pub require_hash_contract: Option<bool>,
    pub require_abstract_models: Option<bool>,
}

impl From<&AnnotationSpec> for Annotation {
    fn from(spec: &AnnotationSpec) -> Self {
        match spec {
            AnnotationSpec::Attribute(a) => Annotation::Attribute(AttributeOptions {
                do_not_hash: a.do_not_hash,
                ignore_require_hash: a.ignore_require_hash,
                generate_setter: a.generate_setter,
                generate_getter: a.generate_getter,
            }),
            AnnotationSpec::ModelClass(m) => Annotation::ModelClass(ModelClassOptions {
                layout: m.layout.clone(),
            }),
            AnnotationSpec::Styleable => Annotation::Styleable,
            AnnotationSpec::PackageConfig(p) => Annotation::PackageConfig(PackageConfigOptions {
                require_hash_contract: p.require_hash_contract,
                require_abstract_models: p.require_abstract_models,
            }),
        }
    }
}

fn first_round() -> u32 {
    1
}

fn void() -> String {
    "void".to_owned()
}

/// A parsed declaration manifest.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Processor options, as the host would pass them.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    #[serde(default)]
    pub declarations: Vec<TypeDecl>,
}

impl Manifest {
    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn read(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Round numbers in ascending order. Always contains at least one
    /// round, so a run always reaches its final round.
    pub fn rounds(&self) -> Vec<u32> {
        let mut rounds: Vec<u32> = self.declarations.iter().map(|d| d.round).collect();
        rounds.push(first_round());
        rounds.sort_unstable();
        rounds.dedup();
        rounds
    }

    /// Register every declaration of `round` into `host`.
    ///
    /// Types are registered first so members and supertypes may refer to
    /// any type of the round or of earlier rounds. Returns the annotated
    /// declarations of the round in registration order.
    pub fn register_round(
        &self,
        host: &mut MemorySymbolTable,
        round: u32,
    ) -> Result<Vec<DeclId>, ManifestError> {
        let mut registered = Vec::new();
        for decl in self.declarations.iter().filter(|d| d.round == round) {
            register_type(host, decl, None, &mut registered)?;
        }
        for (decl, id) in &registered {
            resolve_type(host, decl, *id)?;
        }
        let mut elements: Vec<DeclId> = registered
            .iter()
            .flat_map(|&(_, id)| std::iter::once(id).chain(host.enclosed(id)))
            .filter(|&id| !host.annotations(id).is_empty())
            .collect();
        elements.sort_unstable();
        elements.dedup();
        tracing::debug!(
            round,
            types = registered.len(),
            elements = elements.len(),
            "registered manifest round"
        );
        Ok(elements)
    }
}

fn register_type<'m>(
    host: &mut MemorySymbolTable,
    decl: &'m TypeDecl,
    outer: Option<DeclId>,
    registered: &mut Vec<(&'m TypeDecl, DeclId)>,
) -> Result<(), ManifestError> {
    let name = match outer {
        Some(outer) => host.name(outer).child(&decl.name),
        None => QualifiedName::new(&decl.name),
    };
    if decl.kind != TypeKind::Package && host.find_type(&name).is_some() {
        return Err(ManifestError::DuplicateType(name.to_string()));
    }
    let modifiers = parse_modifiers(&name, &decl.modifiers)?;
    let mut builder = match (outer, decl.kind) {
        (Some(outer), TypeKind::Class) => host.nested_class(outer, &decl.name),
        (Some(_), _) => return Err(ManifestError::NestedKind(name.to_string())),
        (None, TypeKind::Class) => host.class(&decl.name),
        (None, TypeKind::Interface) => host.interface(&decl.name),
        (None, TypeKind::Enum) => host.enumeration(&decl.name),
        (None, TypeKind::Package) => host.package(&decl.name),
    }
    .modifiers(modifiers);
    for param in &decl.type_params {
        builder = builder.type_param(param, Vec::new());
    }
    for annotation in &decl.annotations {
        builder = builder.annotate(annotation.into());
    }
    if let Some(line) = decl.line {
        builder = builder.located(&source_file(decl, &name), line);
    }
    let id = builder.id();
    registered.push((decl, id));
    for nested in &decl.nested {
        register_type(host, nested, Some(id), registered)?;
    }
    Ok(())
}

/// Supertypes and members, once every type of the round is known.
fn resolve_type(host: &mut MemorySymbolTable, decl: &TypeDecl, id: DeclId) -> Result<(), ManifestError> {
    let name = host.name(id);
    let scope = TypeScope::enclosing(host, id);
    let resolve = |host: &MemorySymbolTable, text: &str| parse_type(host, &scope, &name, text);

    if let Some(extends) = &decl.extends {
        let ty = resolve(host, extends)?;
        host.edit(id).extends(ty).id();
    }
    for interface in &decl.implements {
        let ty = resolve(host, interface)?;
        host.edit(id).implements(ty).id();
    }

    let file = source_file(decl, &name);
    for member in &decl.members {
        match member {
            MemberDecl::Field {
                name: field,
                ty,
                modifiers: words,
                annotations,
                line,
            } => {
                let ty = resolve(host, ty)?;
                let modifiers = parse_modifiers(&name, words)?;
                let mut builder = host.field(id, field, ty).modifiers(modifiers);
                for annotation in annotations {
                    builder = builder.annotate(annotation.into());
                }
                if let Some(line) = line {
                    builder = builder.located(&file, *line);
                }
                builder.id();
            }
            MemberDecl::Method {
                name: method,
                returns,
                params,
                varargs,
                modifiers: words,
                annotations,
                line,
            } => {
                let ret = resolve(host, returns)?;
                let params = resolve_params(host, &scope, &name, params)?;
                let modifiers = parse_modifiers(&name, words)?;
                let mut builder = host.method(id, method, ret).modifiers(modifiers);
                for (param, ty) in params {
                    builder = builder.param(&param, ty);
                }
                if *varargs {
                    builder = builder.varargs();
                }
                for annotation in annotations {
                    builder = builder.annotate(annotation.into());
                }
                if let Some(line) = line {
                    builder = builder.located(&file, *line);
                }
                builder.id();
            }
            MemberDecl::Constructor {
                params,
                varargs,
                modifiers: words,
            } => {
                let params = resolve_params(host, &scope, &name, params)?;
                let modifiers = parse_modifiers(&name, words)?;
                let mut builder = host.constructor(id).modifiers(modifiers);
                for (param, ty) in params {
                    builder = builder.param(&param, ty);
                }
                if *varargs {
                    builder = builder.varargs();
                }
                builder.id();
            }
        }
    }
    Ok(())
}

fn resolve_params(
    host: &MemorySymbolTable,
    scope: &TypeScope,
    owner: &QualifiedName,
    params: &[ParamSpec],
) -> Result<Vec<(String, TypeRef)>, ManifestError> {
    params
        .iter()
        .map(|p| Ok((p.name.clone(), parse_type(host, scope, owner, &p.ty)?)))
        .collect()
}

fn parse_modifiers(decl: &QualifiedName, words: &[String]) -> Result<Modifiers, ManifestError> {
    words.iter().try_fold(Modifiers::empty(), |acc, word| {
        Modifiers::from_keyword(word)
            .map(|m| acc | m)
            .ok_or_else(|| ManifestError::UnknownModifier {
                decl: decl.to_string(),
                modifier: word.clone(),
            })
    })
}

/// Declared file, or `<Simple>.java`.
fn source_file(decl: &TypeDecl, name: &QualifiedName) -> String {
    decl.file
        .clone()
        .unwrap_or_else(|| format!("{}.java", name.simple_name()))
}

#[cfg(test)]
mod tests;
