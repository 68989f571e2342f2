//! Per-package overrides of the global model options.
//!
//! A `PackageConfig` annotation on a package-level declaration applies to
//! that package and every package below it. Each option is resolved
//! independently against the nearest package that sets it.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tessel_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use tessel_harness::SymbolLookup;
use tessel_ir::{Annotation, DeclId, DeclKind, PackageConfigOptions, QualifiedName, SymbolTable};

use crate::ModelOptions;

/// Registered package configs, shared across rounds.
#[derive(Debug, Default)]
pub struct PackageConfigs {
    configs: RwLock<FxHashMap<QualifiedName, PackageConfigOptions>>,
}

impl PackageConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every `PackageConfig` annotation on `decl`.
    ///
    /// Registering the same options again is a no-op; different options for
    /// an already configured package are reported and ignored.
    pub fn register<S: SymbolTable>(
        &self,
        lookup: &SymbolLookup<S>,
        decl: DeclId,
        sink: &DiagnosticSink,
    ) {
        let package = if lookup.kind(decl) == DeclKind::Package {
            lookup.name(decl)
        } else {
            lookup.package_of(decl)
        };
        for annotation in lookup.annotations(decl) {
            let Annotation::PackageConfig(options) = annotation else {
                continue;
            };
            let mut configs = self.configs.write();
            match configs.get(&package) {
                Some(existing) if *existing == options => {}
                Some(_) => {
                    sink.report(
                        Diagnostic::error(ErrorCode::E1009)
                            .with_message(format!(
                                "package `{package}` already has a different configuration"
                            ))
                            .with_subject(package.clone())
                            .with_location(lookup.location(decl)),
                    );
                }
                None => {
                    tracing::debug!(%package, ?options, "registered package config");
                    configs.insert(package.clone(), options);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.configs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn requires_hash_contract(&self, package: &QualifiedName, options: &ModelOptions) -> bool {
        self.nearest(package, |c| c.require_hash_contract)
            .unwrap_or(options.require_hash_contract)
    }

    pub fn requires_abstract_models(&self, package: &QualifiedName, options: &ModelOptions) -> bool {
        self.nearest(package, |c| c.require_abstract_models)
            .unwrap_or(options.require_abstract_models)
    }

    fn nearest(
        &self,
        package: &QualifiedName,
        field: impl Fn(&PackageConfigOptions) -> Option<bool>,
    ) -> Option<bool> {
        let configs = self.configs.read();
        let mut current = package.clone();
        loop {
            if let Some(value) = configs.get(&current).and_then(&field) {
                return Some(value);
            }
            if current.is_empty() {
                return None;
            }
            current = current.parent();
        }
    }
}
