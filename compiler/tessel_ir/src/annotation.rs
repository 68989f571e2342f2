//! Annotations the model processor reacts to.

/// Options of an attribute annotation on a field or setter.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "Annotation options: each bool mirrors an independent annotation flag"
)]
pub struct AttributeOptions {
    /// Leave the attribute out of the generated hash/equality.
    pub do_not_hash: bool,
    /// Skip the hash contract check even when the package requires it.
    pub ignore_require_hash: bool,
    pub generate_setter: bool,
    pub generate_getter: bool,
}

impl Default for AttributeOptions {
    fn default() -> Self {
        AttributeOptions {
            do_not_hash: false,
            ignore_require_hash: false,
            generate_setter: true,
            generate_getter: true,
        }
    }
}

/// Options of the model-class annotation.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ModelClassOptions {
    /// Layout resource; `None` means the view is built programmatically.
    pub layout: Option<String>,
}

/// Per-package overrides of processor options.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub struct PackageConfigOptions {
    pub require_hash_contract: Option<bool>,
    pub require_abstract_models: Option<bool>,
}

/// An annotation attached to a declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Annotation {
    Attribute(AttributeOptions),
    ModelClass(ModelClassOptions),
    /// Structural marker: a style builder will be generated for this type.
    Styleable,
    PackageConfig(PackageConfigOptions),
}

/// Discriminant of [`Annotation`], used to query annotated declarations.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AnnotationKind {
    Attribute,
    ModelClass,
    Styleable,
    PackageConfig,
}

impl Annotation {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::Attribute(_) => AnnotationKind::Attribute,
            Annotation::ModelClass(_) => AnnotationKind::ModelClass,
            Annotation::Styleable => AnnotationKind::Styleable,
            Annotation::PackageConfig(_) => AnnotationKind::PackageConfig,
        }
    }
}
