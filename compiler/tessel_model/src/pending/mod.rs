//! Attributes that depend on code generated in a later round.
//!
//! A model class without a layout whose bound view type is styleable gets a
//! synthesized `style` attribute typed by the view's generated style builder.
//! That builder is produced by another generator, so it may not exist yet
//! when the model is first seen. Such models wait here and are retried at
//! the end of every round until the builder type resolves.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use tessel_harness::SymbolLookup;
use tessel_ir::{Annotation, AnnotationKind, DeclId, QualifiedName, SymbolTable};

/// Name of the synthesized attribute.
pub const STYLE_ATTRIBUTE: &str = "style";

pub const STYLE_BUILDER_SUFFIX: &str = "StyleBuilder";

/// A model waiting for its style builder type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingStyle {
    pub model: QualifiedName,
    pub source: DeclId,
    /// The styleable view type the model binds to.
    pub bound: QualifiedName,
    pub builder: QualifiedName,
    /// Round in which the model was first found to need a style.
    pub since_round: u32,
}

/// `com.app.HeaderView` styles through `com.app.HeaderViewStyleBuilder`.
pub fn style_builder_name(bound: &QualifiedName) -> QualifiedName {
    bound
        .parent()
        .child(&format!("{}{STYLE_BUILDER_SUFFIX}", bound.simple_name()))
}

/// The styleable view type `source` binds to, if it needs a style attribute.
///
/// Only model classes without a layout qualify; the bound type is the first
/// type argument of the direct superclass.
pub fn styleable_bound<S: SymbolTable>(
    lookup: &SymbolLookup<S>,
    source: DeclId,
) -> Option<QualifiedName> {
    let programmatic = lookup.annotations(source).iter().any(|annotation| {
        matches!(annotation, Annotation::ModelClass(options) if options.layout.is_none())
    });
    if !programmatic {
        return None;
    }
    let superclass = lookup.superclass(source)?;
    let bound = superclass.args().first()?.decl()?;
    lookup
        .has_annotation(bound, AnnotationKind::Styleable)
        .then(|| lookup.name(bound))
}

/// Models waiting on a style builder, ordered by model name.
#[derive(Debug, Default)]
pub struct PendingStyles {
    entries: Mutex<BTreeMap<QualifiedName, PendingStyle>>,
}

impl PendingStyles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `entry` unless its model is already waiting.
    pub fn insert(&self, entry: PendingStyle) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains_key(&entry.model) {
            return false;
        }
        entries.insert(entry.model.clone(), entry);
        true
    }

    pub fn remove(&self, model: &QualifiedName) -> Option<PendingStyle> {
        self.entries.lock().remove(model)
    }

    pub fn contains(&self, model: &QualifiedName) -> bool {
        self.entries.lock().contains_key(model)
    }

    /// Snapshot in model-name order.
    pub fn entries(&self) -> Vec<PendingStyle> {
        self.entries.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
