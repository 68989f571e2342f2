//! Declaration aggregation.
//!
//! The aggregator owns one `ModelDescriptor` per owning class, shared by
//! every round. Each round runs three merge passes over the declarations the
//! host made visible:
//!
//! 1. Direct collection: every annotated field or setter is validated and
//!    attached to the descriptor of its enclosing class, which is created on
//!    first use. Model classes without attributes get a descriptor too.
//! 2. Cross-module import: attributes of model superclasses that are not
//!    themselves descriptors here (compiled elsewhere) are copied in. No
//!    descriptor is created for those superclasses.
//! 3. Inheritance: every descriptor absorbs the attributes of every other
//!    descriptor it is a subtype of. Package-private attributes only cross
//!    when both live in the same package.
//!
//! Afterwards, models waiting on a generated style builder are retried.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::{FxBuildHasher, FxHashMap};
use tessel_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use tessel_harness::{Harness, SymbolLookup, TaskFailure};
use tessel_ir::{
    Annotation, AnnotationKind, DeclId, DeclKind, Modifiers, QualifiedName, SymbolTable, TypeRef,
};

use crate::descriptor::{AddOutcome, AttributeDescriptor, AttributeVisibility, ModelDescriptor};
use crate::facts::{superclass_chain, HierarchyFacts};
use crate::package_config::PackageConfigs;
use crate::pending::{
    style_builder_name, styleable_bound, PendingStyle, PendingStyles, STYLE_ATTRIBUTE,
};
use crate::validate::HashValidator;
use crate::ModelOptions;

/// A descriptor shared between tasks.
pub type SharedModel = Arc<Mutex<ModelDescriptor>>;

/// What one round changed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RoundSummary {
    pub round: u32,
    /// Attribute declarations seen in the round.
    pub declared: usize,
    /// Descriptors created in the round.
    pub created: usize,
    /// Attributes copied from superclasses compiled elsewhere.
    pub imported: usize,
    /// Attributes copied between descriptors of this unit.
    pub inherited: usize,
    /// Style attributes synthesized in the round.
    pub resolved: usize,
    /// Models still waiting on a style builder.
    pub pending: usize,
}

/// Process-wide model aggregation state.
pub struct Aggregator {
    options: ModelOptions,
    facts: HierarchyFacts,
    packages: PackageConfigs,
    pending: PendingStyles,
    models: DashMap<QualifiedName, SharedModel, FxBuildHasher>,
}

impl Aggregator {
    pub fn new(options: ModelOptions) -> Self {
        Aggregator {
            facts: HierarchyFacts::new(options.model_base.clone()),
            options,
            packages: PackageConfigs::new(),
            pending: PendingStyles::new(),
            models: DashMap::with_hasher(FxBuildHasher),
        }
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn facts(&self) -> &HierarchyFacts {
        &self.facts
    }

    pub fn packages(&self) -> &PackageConfigs {
        &self.packages
    }

    pub fn pending(&self) -> &PendingStyles {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn contains(&self, source: &QualifiedName) -> bool {
        self.models.contains_key(source)
    }

    /// Snapshot of the descriptor for `source`.
    pub fn model(&self, source: &QualifiedName) -> Option<ModelDescriptor> {
        self.models.get(source).map(|m| m.lock().clone())
    }

    /// Snapshot of every descriptor, ordered by generated name.
    pub fn snapshot(&self) -> Vec<ModelDescriptor> {
        let mut models: Vec<ModelDescriptor> =
            self.models.iter().map(|m| m.value().lock().clone()).collect();
        models.sort_by(|a, b| a.generated_name().cmp(b.generated_name()));
        models
    }

    /// Run all merge passes for one round.
    #[tracing::instrument(level = "debug", skip_all, fields(round = round, elements = elements.len()))]
    pub fn process_round<S>(
        &self,
        round: u32,
        elements: &[DeclId],
        lookup: &SymbolLookup<S>,
        harness: &Harness,
    ) -> RoundSummary
    where
        S: SymbolTable + Send + Sync,
    {
        let sink = harness.sink();
        let mut attributes = Vec::new();
        let mut model_classes = Vec::new();
        for &decl in elements {
            for annotation in lookup.annotations(decl) {
                match annotation.kind() {
                    AnnotationKind::PackageConfig => self.packages.register(lookup, decl, sink),
                    AnnotationKind::Attribute => attributes.push(decl),
                    AnnotationKind::ModelClass => model_classes.push(decl),
                    AnnotationKind::Styleable => {}
                }
            }
        }
        attributes.sort_unstable();
        attributes.dedup();
        model_classes.sort_unstable();
        model_classes.dedup();

        let before = self.models.len();
        let declared = attributes.len();
        harness.for_each("collect attributes", attributes, true, |decl| {
            self.collect_attribute(round, decl, lookup, sink)
        });
        harness.for_each("collect model classes", model_classes, true, |decl| {
            self.get_or_create(decl, lookup, sink);
            Ok(())
        });
        let created = self.models.len() - before;

        let imported = self.import_from_other_modules(round, lookup, harness);
        let inherited = self.propagate_inheritance(round, lookup, harness);

        self.queue_pending_styles(round, lookup);
        let resolved = self.resolve_pending_styles(round, lookup, harness);

        let summary = RoundSummary {
            round,
            declared,
            created,
            imported,
            inherited,
            resolved,
            pending: self.pending.len(),
        };
        tracing::debug!(?summary, models = self.models.len(), "round aggregated");
        summary
    }

    /// Stop accepting rounds and hand over the finished models.
    ///
    /// Every model still waiting on a style builder is reported and stays
    /// held back from emission.
    pub fn finish(self, sink: &DiagnosticSink) -> ModelSet {
        for entry in self.pending.entries() {
            tracing::warn!(model = %entry.model, builder = %entry.builder, "style builder never resolved");
            sink.report(
                Diagnostic::error(ErrorCode::E2002)
                    .with_message(format!(
                        "`{}` needs a `{STYLE_ATTRIBUTE}` attribute but `{}` was never generated",
                        entry.model, entry.builder
                    ))
                    .with_subject(entry.model.clone())
                    .with_note(format!("`{}` is styleable", entry.bound)),
            );
        }
        let models = self.snapshot();
        ModelSet::new(models, self.facts, self.packages, self.options)
    }

    fn collect_attribute<S: SymbolTable>(
        &self,
        round: u32,
        decl: DeclId,
        lookup: &SymbolLookup<S>,
        sink: &DiagnosticSink,
    ) -> Result<(), TaskFailure> {
        let owner = lookup.enclosing(decl).ok_or_else(|| {
            TaskFailure::new(format!("attribute `{}` has no enclosing class", lookup.name(decl)))
        })?;
        self.check_attribute_access(decl, owner, lookup, sink);
        if lookup.kind(owner) != DeclKind::Class {
            return Ok(());
        }
        let attribute = match build_attribute(decl, owner, lookup) {
            Ok(attribute) => attribute,
            Err(diagnostic) => {
                sink.report(diagnostic);
                return Ok(());
            }
        };

        let model = self.get_or_create(owner, lookup, sink);
        let name = Arc::clone(&attribute.name);
        let outcome = model.lock().add_attribute(attribute, round, true);
        if let AddOutcome::Conflict { previous } = outcome {
            let (kept, dropped) = if decl > previous {
                (decl, previous)
            } else {
                (previous, decl)
            };
            sink.report(
                Diagnostic::error(ErrorCode::E2001)
                    .with_message(format!(
                        "attribute `{name}` is declared twice on `{}`",
                        lookup.name(owner)
                    ))
                    .with_subject(lookup.name(kept))
                    .with_location(lookup.location(kept))
                    .with_note(format!("also declared by `{}`", lookup.name(dropped))),
            );
        }
        Ok(())
    }

    /// Descriptor for `class`, created and validated on first request.
    fn get_or_create<S: SymbolTable>(
        &self,
        class: DeclId,
        lookup: &SymbolLookup<S>,
        sink: &DiagnosticSink,
    ) -> SharedModel {
        let name = lookup.name(class);
        if let Some(model) = self.models.get(&name) {
            return Arc::clone(&model);
        }
        match self.models.entry(name.clone()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                self.check_owner(class, &name, lookup, sink);
                let model = Arc::new(Mutex::new(self.describe(class, name, lookup)));
                entry.insert(Arc::clone(&model));
                model
            }
        }
    }

    fn describe<S: SymbolTable>(
        &self,
        class: DeclId,
        name: QualifiedName,
        lookup: &SymbolLookup<S>,
    ) -> ModelDescriptor {
        let modifiers = lookup.modifiers(class);
        let annotated = lookup.has_annotation(class, AnnotationKind::ModelClass);
        let superclass = lookup.superclass(class).and_then(|ty| match ty {
            TypeRef::Declared { name, .. } => Some(name),
            _ => None,
        });
        tracing::debug!(model = %name, "creating model descriptor");
        ModelDescriptor::new(class, name, lookup.package_of(class))
            .with_superclass(superclass)
            .with_constructors(self.facts.constructors(lookup, class).to_vec())
            .with_chained_methods(self.facts.chained_methods(lookup, class).to_vec())
            .with_should_generate(annotated || !modifiers.contains(Modifiers::ABSTRACT))
            .with_validate_usage(self.options.validate_usage)
            .with_location(lookup.location(class))
    }

    fn check_owner<S: SymbolTable>(
        &self,
        class: DeclId,
        name: &QualifiedName,
        lookup: &SymbolLookup<S>,
        sink: &DiagnosticSink,
    ) {
        let modifiers = lookup.modifiers(class);
        let location = lookup.location(class);
        let report = |code: ErrorCode, message: String| {
            sink.report(
                Diagnostic::error(code)
                    .with_message(message)
                    .with_subject(name.clone())
                    .with_location(location.clone()),
            );
        };
        let simple = name.simple_name();

        if modifiers.contains(Modifiers::FINAL) {
            report(
                ErrorCode::E1005,
                format!("classes with attributes cannot be final: `{simple}`"),
            );
        }
        if lookup.nesting(class).is_nested() && !modifiers.contains(Modifiers::STATIC) {
            report(
                ErrorCode::E1002,
                format!("nested model classes must be static: `{simple}`"),
            );
        }
        if !self.facts.is_model_type(lookup, class) {
            report(
                ErrorCode::E1006,
                format!(
                    "classes with attributes must extend `{}`: `{simple}`",
                    self.options.model_base
                ),
            );
        }
        if self
            .packages
            .requires_abstract_models(&lookup.package_of(class), &self.options)
            && !modifiers.contains(Modifiers::ABSTRACT)
        {
            report(
                ErrorCode::E1007,
                format!("model classes must be abstract: `{simple}`"),
            );
        }
    }

    fn check_attribute_access<S: SymbolTable>(
        &self,
        decl: DeclId,
        owner: DeclId,
        lookup: &SymbolLookup<S>,
        sink: &DiagnosticSink,
    ) {
        let field = lookup.name(decl);
        let class = lookup.name(owner);
        let location = lookup.location(decl);
        let report = |code: ErrorCode, message: &str| {
            sink.report(
                Diagnostic::error(code)
                    .with_message(format!(
                        "{message} (class: `{}`, attribute: `{}`)",
                        class.simple_name(),
                        field.simple_name()
                    ))
                    .with_subject(field.clone())
                    .with_location(location.clone()),
            );
        };

        let modifiers = lookup.modifiers(decl);
        let private = modifiers.contains(Modifiers::PRIVATE) && !self.options.allow_private_attributes;
        if private || modifiers.contains(Modifiers::STATIC) {
            report(ErrorCode::E1001, "attributes must not be private or static");
        }
        let owner_modifiers = lookup.modifiers(owner);
        if lookup.nesting(owner).is_nested() && !owner_modifiers.contains(Modifiers::STATIC) {
            report(ErrorCode::E1002, "nested classes with attributes must be static");
        }
        if lookup.kind(owner) != DeclKind::Class {
            report(ErrorCode::E1003, "attributes may only be contained in classes");
        }
        if owner_modifiers.contains(Modifiers::PRIVATE) {
            report(ErrorCode::E1004, "attributes may not be contained in private classes");
        }
    }

    /// Pass 2. Returns the number of attributes added.
    fn import_from_other_modules<S>(
        &self,
        round: u32,
        lookup: &SymbolLookup<S>,
        harness: &Harness,
    ) -> usize
    where
        S: SymbolTable + Send + Sync,
    {
        let models: Vec<SharedModel> = self.models.iter().map(|m| Arc::clone(m.value())).collect();
        harness
            .map("import superclass attributes", models, true, |model| {
                let (source, package) = {
                    let model = model.lock();
                    (model.source(), model.package().clone())
                };
                let imported = self.attributes_from_other_modules(source, &package, lookup);
                Ok(model.lock().add_attributes(imported, round))
            })
            .into_iter()
            .sum()
    }

    /// Attributes of `source`'s model superclasses that have no descriptor
    /// here, nearest superclass first.
    fn attributes_from_other_modules<S: SymbolTable>(
        &self,
        source: DeclId,
        package: &QualifiedName,
        lookup: &SymbolLookup<S>,
    ) -> Vec<AttributeDescriptor> {
        let mut result = Vec::new();
        for level in superclass_chain(lookup, source).skip(1) {
            if !self.facts.is_model_type(lookup, level) {
                break;
            }
            if self.models.contains_key(&lookup.name(level)) {
                continue;
            }
            let same_package = lookup.package_of(level) == *package;
            for member in lookup.enclosed(level) {
                if !lookup.has_annotation(member, AnnotationKind::Attribute) {
                    continue;
                }
                match build_attribute(member, level, lookup) {
                    Ok(attribute) if same_package || !attribute.is_package_private() => {
                        result.push(attribute);
                    }
                    Ok(_) => {}
                    Err(diagnostic) => {
                        tracing::debug!(%diagnostic, "skipping malformed inherited attribute");
                    }
                }
            }
        }
        result
    }

    /// Pass 3. Returns the number of attributes added.
    ///
    /// Every merge reads the attribute sets as they stood after pass 2, so
    /// the result does not depend on task order. Supertypes are merged
    /// farthest first and names declared on the subtype itself are kept, so
    /// the nearest declaration of a name wins.
    fn propagate_inheritance<S>(&self, round: u32, lookup: &SymbolLookup<S>, harness: &Harness) -> usize
    where
        S: SymbolTable + Send + Sync,
    {
        let mut snapshot: Vec<InheritanceEntry> = self
            .models
            .iter()
            .map(|entry| {
                let model = entry.value();
                let locked = model.lock();
                InheritanceEntry {
                    name: entry.key().clone(),
                    source: locked.source(),
                    package: locked.package().clone(),
                    attributes: locked.attributes().filter(|a| !a.synthesized).cloned().collect(),
                    model: Arc::clone(model),
                }
            })
            .collect();
        snapshot.sort_by(|a, b| a.name.cmp(&b.name));

        let indices: Vec<usize> = (0..snapshot.len()).collect();
        harness
            .map("propagate inheritance", indices, true, |index| {
                let entry = &snapshot[index];
                let depth: FxHashMap<DeclId, usize> = superclass_chain(lookup, entry.source)
                    .enumerate()
                    .map(|(depth, decl)| (decl, depth))
                    .collect();
                let mut supertypes: Vec<&InheritanceEntry> = snapshot
                    .iter()
                    .enumerate()
                    .filter(|&(other, candidate)| {
                        other != index && lookup.is_subtype(entry.source, candidate.source)
                    })
                    .map(|(_, candidate)| candidate)
                    .collect();
                supertypes.sort_by_key(|s| {
                    Reverse(depth.get(&s.source).copied().unwrap_or(usize::MAX))
                });

                let mut model = entry.model.lock();
                let mut added = 0;
                for supertype in supertypes {
                    let same_package = entry.package == supertype.package;
                    let inherited: Vec<AttributeDescriptor> = supertype
                        .attributes
                        .iter()
                        .filter(|a| same_package || !a.is_package_private())
                        .filter(|a| !model.declares_directly(&a.name))
                        .cloned()
                        .collect();
                    added += model.add_attributes(inherited, round);
                }
                Ok(added)
            })
            .into_iter()
            .sum()
    }

    fn queue_pending_styles<S: SymbolTable>(&self, round: u32, lookup: &SymbolLookup<S>) {
        let candidates: Vec<(QualifiedName, DeclId, QualifiedName)> = self
            .models
            .iter()
            .filter_map(|entry| {
                let model = entry.value().lock();
                let resolved = model.attribute(STYLE_ATTRIBUTE).is_some_and(|a| a.synthesized);
                (!resolved).then(|| (entry.key().clone(), model.source(), model.generated_name().clone()))
            })
            .collect();

        for (key, source, generated) in candidates {
            if self.pending.contains(&generated) {
                continue;
            }
            let Some(bound) = styleable_bound(lookup, source) else {
                continue;
            };
            let builder = style_builder_name(&bound);
            tracing::debug!(model = %generated, %builder, "model waits on style builder");
            self.pending.insert(PendingStyle {
                model: generated,
                source,
                bound,
                builder,
                since_round: round,
            });
            if let Some(model) = self.models.get(&key) {
                model.lock().set_held(true);
            }
        }
    }

    /// Attach the style attribute to every waiting model whose builder now
    /// resolves. Returns how many were resolved.
    fn resolve_pending_styles<S>(&self, round: u32, lookup: &SymbolLookup<S>, harness: &Harness) -> usize
    where
        S: SymbolTable + Send + Sync,
    {
        let validator = HashValidator::new(lookup, &self.facts);
        let resolved = harness.filter_map("resolve pending styles", self.pending.entries(), true, |entry| {
            let Some(builder) = lookup.find_type(&entry.builder) else {
                return Ok(None);
            };
            let source_name = lookup.name(entry.source);
            let model = self
                .models
                .get(&source_name)
                .map(|m| Arc::clone(m.value()))
                .ok_or_else(|| TaskFailure::new(format!("pending model `{}` has no descriptor", entry.model)))?;

            let ty = TypeRef::declared(builder, entry.builder.clone());
            let use_in_hash = validator.check(&ty).is_ok();
            let mut style = AttributeDescriptor::new(
                STYLE_ATTRIBUTE,
                ty,
                builder,
                source_name,
                lookup.package_of(entry.source),
                AttributeVisibility::Public,
                use_in_hash,
                lookup.location(entry.source),
            );
            style.synthesized = true;
            style.generate_getter = false;

            let mut model = model.lock();
            model.remove_attribute(STYLE_ATTRIBUTE);
            model.add_attribute(style, round, false);
            model.add_origin(builder);
            model.set_held(false);
            Ok(Some(entry.model))
        });
        for model in &resolved {
            self.pending.remove(model);
        }
        resolved.len()
    }
}

/// Build the descriptor for an annotated field or setter of `owner`.
///
/// Setters `setFoo(x)` become attribute `foo` typed like `x`.
pub fn build_attribute<S: SymbolTable>(
    decl: DeclId,
    owner: DeclId,
    lookup: &SymbolLookup<S>,
) -> Result<AttributeDescriptor, Diagnostic> {
    let qualified = lookup.name(decl);
    let options = lookup
        .annotations(decl)
        .into_iter()
        .find_map(|a| match a {
            Annotation::Attribute(options) => Some(options),
            _ => None,
        })
        .unwrap_or_default();

    let (name, ty) = match lookup.kind(decl) {
        DeclKind::Field => (qualified.simple_name().to_owned(), lookup.value_type(decl)),
        DeclKind::Method => {
            let params = lookup.params(decl);
            match (setter_attribute_name(qualified.simple_name()), params.as_slice()) {
                (Some(name), [param]) => (name, param.ty.clone()),
                _ => {
                    return Err(Diagnostic::error(ErrorCode::E1008)
                        .with_message(format!(
                            "attribute methods must be setters with exactly one parameter: `{}`",
                            qualified.simple_name()
                        ))
                        .with_subject(qualified.clone())
                        .with_location(lookup.location(decl)));
                }
            }
        }
        _ => {
            return Err(Diagnostic::error(ErrorCode::E1008)
                .with_message(format!(
                    "attributes belong on fields or setter methods: `{}`",
                    qualified.simple_name()
                ))
                .with_subject(qualified.clone())
                .with_location(lookup.location(decl)));
        }
    };

    let mut attribute = AttributeDescriptor::new(
        &name,
        ty,
        decl,
        lookup.name(owner),
        lookup.package_of(owner),
        lookup.modifiers(decl).visibility().into(),
        !options.do_not_hash,
        lookup.location(decl),
    );
    attribute.generate_getter = options.generate_getter;
    attribute.generate_setter = options.generate_setter;
    attribute.ignore_require_hash = options.ignore_require_hash;
    Ok(attribute)
}

/// `setTitle` names attribute `title`.
fn setter_attribute_name(method: &str) -> Option<String> {
    let rest = method.strip_prefix("set")?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }
    Some(first.to_lowercase().chain(chars).collect())
}

/// The finished models of a run, ordered by generated name.
pub struct ModelSet {
    models: Vec<ModelDescriptor>,
    facts: HierarchyFacts,
    packages: PackageConfigs,
    options: ModelOptions,
}

impl ModelSet {
    fn new(
        models: Vec<ModelDescriptor>,
        facts: HierarchyFacts,
        packages: PackageConfigs,
        options: ModelOptions,
    ) -> Self {
        ModelSet {
            models,
            facts,
            packages,
            options,
        }
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn facts(&self) -> &HierarchyFacts {
        &self.facts
    }

    pub fn packages(&self) -> &PackageConfigs {
        &self.packages
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn model(&self, source: &QualifiedName) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.source_name() == source)
    }

    /// Models to hand to the emitter: generated and not held back.
    pub fn emittable(&self) -> impl Iterator<Item = &ModelDescriptor> + '_ {
        self.models
            .iter()
            .filter(|m| m.should_generate() && !m.is_held())
    }

    /// Emittable models grouped by package, both in name order.
    pub fn by_package(&self) -> BTreeMap<QualifiedName, Vec<&ModelDescriptor>> {
        let mut packages: BTreeMap<QualifiedName, Vec<&ModelDescriptor>> = BTreeMap::new();
        for model in self.emittable() {
            packages.entry(model.package().clone()).or_default().push(model);
        }
        packages
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// A descriptor's attribute set as it stood before inheritance propagation.
struct InheritanceEntry {
    name: QualifiedName,
    source: DeclId,
    package: QualifiedName,
    attributes: Vec<AttributeDescriptor>,
    model: SharedModel,
}
