//! Tessel model layer.
//!
//! Turns annotated host declarations into [`ModelDescriptor`]s:
//!
//! - [`Aggregator`]: per-round merge passes over the shared descriptor map
//! - [`HierarchyFacts`]: memoized facts about the source class hierarchy
//! - [`PackageConfigs`]: per-package option overrides
//! - [`PendingStyles`]: models waiting on a later round's generated type
//! - [`validate_hash_contracts`]: the hash/equality check run after the
//!   last round
//!
//! # Rounds
//!
//! Descriptors live for the whole invocation. Each round only adds to them;
//! [`Aggregator::finish`] closes the aggregator and yields the [`ModelSet`]
//! handed to validation and emission.

mod aggregate;
mod descriptor;
mod facts;
mod options;
mod package_config;
mod pending;
mod validate;

#[cfg(test)]
mod test_support;

pub use aggregate::{build_attribute, Aggregator, ModelSet, RoundSummary, SharedModel};
pub use descriptor::{
    generated_name, AddOutcome, AttributeDescriptor, AttributeVisibility, ConstructorInfo,
    MethodInfo, ModelDescriptor, GENERATED_SUFFIX,
};
pub use facts::HierarchyFacts;
pub use options::{ModelOptions, DEFAULT_MODEL_BASE};
pub use package_config::PackageConfigs;
pub use pending::{
    style_builder_name, styleable_bound, PendingStyle, PendingStyles, STYLE_ATTRIBUTE,
    STYLE_BUILDER_SUFFIX,
};
pub use validate::{validate_hash_contracts, HashValidator, HashViolation};
