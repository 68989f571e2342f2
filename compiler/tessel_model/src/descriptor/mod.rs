//! Attribute and model descriptors.
//!
//! A `ModelDescriptor` is the mutable, process-wide description of one
//! generated model. Attributes are identified by name within their model:
//! adding an attribute whose name is already present replaces the earlier one
//! in place, so the insertion position of the first occurrence is kept.

use std::fmt;
use std::sync::Arc;

use tessel_ir::{DeclId, Modifiers, Params, QualifiedName, SourceLocation, TypeRef, Visibility};

/// Suffix appended to a source class name to form the generated name.
pub const GENERATED_SUFFIX: &str = "_";

/// Whether generated code in another package may access an attribute.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AttributeVisibility {
    Public,
    PackagePrivate,
}

impl From<Visibility> for AttributeVisibility {
    fn from(visibility: Visibility) -> Self {
        if visibility.crosses_packages() {
            AttributeVisibility::Public
        } else {
            AttributeVisibility::PackagePrivate
        }
    }
}

/// One attribute of a model.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "Descriptor: each bool mirrors an independent attribute option"
)]
pub struct AttributeDescriptor {
    pub name: Arc<str>,
    pub ty: TypeRef,
    /// Field or setter the attribute was declared on. Synthesized
    /// attributes point at the declaration that caused them.
    pub origin: DeclId,
    pub declaring_class: QualifiedName,
    pub package: QualifiedName,
    pub generate_getter: bool,
    pub generate_setter: bool,
    pub visibility: AttributeVisibility,
    use_in_hash: bool,
    pub ignore_require_hash: bool,
    pub synthesized: bool,
    pub location: Option<SourceLocation>,
}

impl AttributeDescriptor {
    #[expect(clippy::too_many_arguments, reason = "Plain constructor mirroring the fields")]
    pub fn new(
        name: &str,
        ty: TypeRef,
        origin: DeclId,
        declaring_class: QualifiedName,
        package: QualifiedName,
        visibility: AttributeVisibility,
        use_in_hash: bool,
        location: Option<SourceLocation>,
    ) -> Self {
        AttributeDescriptor {
            name: Arc::from(name),
            ty,
            origin,
            declaring_class,
            package,
            generate_getter: true,
            generate_setter: true,
            visibility,
            use_in_hash,
            ignore_require_hash: false,
            synthesized: false,
            location,
        }
    }

    pub fn use_in_hash(&self) -> bool {
        self.use_in_hash
    }

    /// The only property that may change after the attribute is attached.
    pub fn set_use_in_hash(&mut self, use_in_hash: bool) {
        self.use_in_hash = use_in_hash;
    }

    pub fn is_package_private(&self) -> bool {
        self.visibility == AttributeVisibility::PackagePrivate
    }
}

/// A constructor of the source class, duplicated on the generated model.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConstructorInfo {
    pub modifiers: Modifiers,
    pub params: Params,
    pub varargs: bool,
}

/// A method in the source hierarchy that returns the model's own type.
/// The generated model overrides it to keep call chains typed.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodInfo {
    pub name: Arc<str>,
    pub modifiers: Modifiers,
    pub params: Params,
    pub varargs: bool,
    pub is_attribute: bool,
}

/// Result of [`ModelDescriptor::add_attribute`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum AddOutcome {
    Added,
    /// Same origin re-added; the descriptor is unchanged apart from a refresh.
    Unchanged,
    Replaced,
    /// Two direct declarations of the same name arrived in one round.
    /// The one declared later in the source is kept.
    Conflict { previous: DeclId },
}

#[derive(Clone, Debug)]
struct AttributeSlot {
    attribute: AttributeDescriptor,
    round: u32,
    direct: bool,
}

/// Everything needed to generate one model class.
#[derive(Clone, Debug)]
pub struct ModelDescriptor {
    source: DeclId,
    source_name: QualifiedName,
    generated_name: QualifiedName,
    package: QualifiedName,
    superclass: Option<QualifiedName>,
    attributes: Vec<AttributeSlot>,
    constructors: Vec<ConstructorInfo>,
    chained_methods: Vec<MethodInfo>,
    origins: Vec<DeclId>,
    should_generate: bool,
    validate_usage: bool,
    held: bool,
    location: Option<SourceLocation>,
}

impl ModelDescriptor {
    pub fn new(source: DeclId, source_name: QualifiedName, package: QualifiedName) -> Self {
        let generated_name = generated_name(&source_name, &package);
        ModelDescriptor {
            source,
            source_name,
            generated_name,
            package,
            superclass: None,
            attributes: Vec::new(),
            constructors: Vec::new(),
            chained_methods: Vec::new(),
            origins: vec![source],
            should_generate: true,
            validate_usage: true,
            held: false,
            location: None,
        }
    }

    #[must_use]
    pub fn with_superclass(mut self, superclass: Option<QualifiedName>) -> Self {
        self.superclass = superclass;
        self
    }

    #[must_use]
    pub fn with_constructors(mut self, constructors: Vec<ConstructorInfo>) -> Self {
        self.constructors = constructors;
        self
    }

    #[must_use]
    pub fn with_chained_methods(mut self, methods: Vec<MethodInfo>) -> Self {
        self.chained_methods = methods;
        self
    }

    #[must_use]
    pub fn with_should_generate(mut self, should_generate: bool) -> Self {
        self.should_generate = should_generate;
        self
    }

    #[must_use]
    pub fn with_validate_usage(mut self, validate_usage: bool) -> Self {
        self.validate_usage = validate_usage;
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    pub fn source(&self) -> DeclId {
        self.source
    }

    pub fn source_name(&self) -> &QualifiedName {
        &self.source_name
    }

    pub fn generated_name(&self) -> &QualifiedName {
        &self.generated_name
    }

    pub fn package(&self) -> &QualifiedName {
        &self.package
    }

    pub fn superclass(&self) -> Option<&QualifiedName> {
        self.superclass.as_ref()
    }

    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    pub fn chained_methods(&self) -> &[MethodInfo] {
        &self.chained_methods
    }

    pub fn origins(&self) -> &[DeclId] {
        &self.origins
    }

    pub fn should_generate(&self) -> bool {
        self.should_generate
    }

    pub fn validate_usage(&self) -> bool {
        self.validate_usage
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    /// Held models wait on a pending attribute and are not emitted.
    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn set_held(&mut self, held: bool) {
        self.held = held;
    }

    /// Record a declaration that influences this model's output.
    pub fn add_origin(&mut self, decl: DeclId) {
        if !self.origins.contains(&decl) {
            self.origins.push(decl);
        }
    }

    pub fn attributes(&self) -> impl ExactSizeIterator<Item = &AttributeDescriptor> + '_ {
        self.attributes.iter().map(|slot| &slot.attribute)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.attributes().find(|a| &*a.name == name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut AttributeDescriptor> {
        self.attributes
            .iter_mut()
            .map(|slot| &mut slot.attribute)
            .find(|a| &*a.name == name)
    }

    /// Whether `name` was declared on this model's own class.
    pub fn declares_directly(&self, name: &str) -> bool {
        self.attributes
            .iter()
            .any(|slot| slot.direct && &*slot.attribute.name == name)
    }

    pub fn attribute_names(&self) -> Vec<Arc<str>> {
        self.attributes().map(|a| Arc::clone(&a.name)).collect()
    }

    /// Attach `attribute`, replacing any attribute of the same name.
    ///
    /// `direct` is true for attributes declared on this model's own class in
    /// round `round`; inherited and imported attributes pass `false`.
    pub fn add_attribute(
        &mut self,
        attribute: AttributeDescriptor,
        round: u32,
        direct: bool,
    ) -> AddOutcome {
        self.remove_chained_method_for(&attribute);
        let slot = AttributeSlot {
            attribute,
            round,
            direct,
        };
        let Some(existing) = self
            .attributes
            .iter_mut()
            .find(|s| s.attribute.name == slot.attribute.name)
        else {
            self.attributes.push(slot);
            return AddOutcome::Added;
        };

        if existing.attribute.origin == slot.attribute.origin {
            *existing = slot;
            return AddOutcome::Unchanged;
        }
        if direct && existing.direct && existing.round == round {
            // Arrival order varies under parallel collection; keep the
            // declaration that comes later in the source.
            let previous = existing.attribute.origin;
            if slot.attribute.origin > previous {
                *existing = slot;
            }
            return AddOutcome::Conflict { previous };
        }
        *existing = slot;
        AddOutcome::Replaced
    }

    /// Attach every attribute in order. Returns how many were new.
    pub fn add_attributes(
        &mut self,
        attributes: impl IntoIterator<Item = AttributeDescriptor>,
        round: u32,
    ) -> usize {
        let mut added = 0;
        for attribute in attributes {
            if self.add_attribute(attribute, round, false) == AddOutcome::Added {
                added += 1;
            }
        }
        added
    }

    /// Drop an attribute. Only used when a speculative attribute is
    /// re-resolved.
    pub fn remove_attribute(&mut self, name: &str) -> Option<AttributeDescriptor> {
        let index = self
            .attributes
            .iter()
            .position(|s| &*s.attribute.name == name)?;
        Some(self.attributes.remove(index).attribute)
    }

    /// A generated setter for `attribute` supersedes a chained override
    /// with the same name and a single parameter of the same type.
    fn remove_chained_method_for(&mut self, attribute: &AttributeDescriptor) {
        self.chained_methods.retain(|m| {
            !(m.name == attribute.name && m.params.len() == 1 && m.params[0].ty == attribute.ty)
        });
    }
}

impl fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} attributes)", self.generated_name, self.attributes.len())
    }
}

/// `com.app.Feed.Row` in package `com.app` becomes `com.app.Feed$Row_`.
pub fn generated_name(source: &QualifiedName, package: &QualifiedName) -> QualifiedName {
    let relative = if package.is_empty() {
        source.as_str()
    } else {
        source
            .as_str()
            .strip_prefix(package.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(source.as_str())
    };
    let simple = format!("{}{GENERATED_SUFFIX}", relative.replace('.', "$"));
    package.child(&simple)
}
