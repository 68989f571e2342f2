//! Per-package builder extensions.
//!
//! Every package with generated models gets one extension file holding a
//! builder function per model constructor (one function when the model has
//! no constructors to duplicate). The function creates the model, applies a
//! caller initializer and adds it to the receiving collector.

use std::fmt::Write as _;

use tessel_ir::{DeclId, Modifiers, QualifiedName};
use tessel_model::{ConstructorInfo, ModelDescriptor, GENERATED_SUFFIX};

use super::outline::params;
use super::Artifact;

pub const EXTENSION_FILE_NAME: &str = "TesselModelExtensions.ext";

const MODEL_SUFFIX: &str = "Model";

/// Build the extension file for `package`. `models` should be in name order.
pub fn build_extension_file(package: &QualifiedName, models: &[&ModelDescriptor]) -> Artifact {
    let mut out = String::new();
    let mut origins: Vec<DeclId> = Vec::new();
    let _ = writeln!(out, "// builder extensions for package {package}");
    for model in models {
        if model.constructors().is_empty() {
            write_function(&mut out, model, None);
        } else {
            for constructor in model.constructors() {
                write_function(&mut out, model, Some(constructor));
            }
        }
        for origin in model.origins() {
            if !origins.contains(origin) {
                origins.push(*origin);
            }
        }
    }
    Artifact {
        path: Artifact::path_in_package(package, EXTENSION_FILE_NAME),
        contents: out,
        origins,
    }
}

fn write_function(out: &mut String, model: &ModelDescriptor, constructor: Option<&ConstructorInfo>) {
    let simple = model.generated_name().simple_name();
    // Names containing `$` must be quoted.
    let type_name = if simple.contains('$') {
        format!("`{simple}`")
    } else {
        simple.to_owned()
    };
    let internal = constructor.is_some_and(|c| !c.modifiers.contains(Modifiers::PUBLIC));
    let (declared, arguments) = match constructor {
        Some(c) => (
            params(&c.params, c.varargs),
            c.params.iter().map(|p| p.name.to_string()).collect::<Vec<_>>().join(", "),
        ),
        None => (String::new(), String::new()),
    };
    let separator = if declared.is_empty() { "" } else { ", " };
    let _ = writeln!(
        out,
        "{}fun ModelCollector.{}({declared}{separator}initializer: {type_name}.() -> Unit) =\n    {type_name}({arguments}).apply {{ initializer() }}.addTo(this)",
        if internal { "internal " } else { "" },
        extension_function_name(model.generated_name()),
    );
}

/// `com.app.HeaderModel_` → `header`, `com.app.Feed$Row_` → `feedRow`.
pub fn extension_function_name(generated: &QualifiedName) -> String {
    let simple = generated.simple_name();
    let trimmed = simple.strip_suffix(GENERATED_SUFFIX).unwrap_or(simple);
    let trimmed = trimmed.strip_suffix(MODEL_SUFFIX).unwrap_or(trimmed);
    let joined: String = trimmed.chars().filter(|&c| c != '$').collect();
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => joined,
    }
}
