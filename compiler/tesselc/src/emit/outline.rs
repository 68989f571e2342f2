//! Plain-text model outlines.

use std::fmt::Write as _;

use tessel_ir::{Modifiers, Param};
use tessel_model::{AttributeDescriptor, ModelDescriptor};

use super::{Artifact, ModelEmitter};

/// File extension of rendered outlines.
const OUTLINE_EXTENSION: &str = "model";

/// Renders a model as a readable outline of what a template would generate.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutlineEmitter;

impl ModelEmitter for OutlineEmitter {
    fn render(&self, model: &ModelDescriptor) -> Artifact {
        let simple = model.generated_name().simple_name();
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = write_outline(&mut out, model);
        Artifact {
            path: Artifact::path_in_package(model.package(), &format!("{simple}.{OUTLINE_EXTENSION}")),
            contents: out,
            origins: model.origins().to_vec(),
        }
    }
}

fn write_outline(out: &mut String, model: &ModelDescriptor) -> std::fmt::Result {
    writeln!(out, "// generated from {}", model.source_name())?;
    if !model.package().is_empty() {
        writeln!(out, "package {}", model.package())?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "model {} extends {} {{",
        model.generated_name().simple_name(),
        model.source_name()
    )?;
    if let Some(superclass) = model.superclass() {
        writeln!(out, "  superclass {superclass}")?;
    }
    for constructor in model.constructors() {
        writeln!(
            out,
            "  {}constructor({})",
            modifier_prefix(constructor.modifiers),
            params(&constructor.params, constructor.varargs)
        )?;
    }
    for attribute in model.attributes() {
        writeln!(out, "  attribute {}: {} [{}]", attribute.name, attribute.ty, flags(attribute))?;
    }
    for method in model.chained_methods() {
        writeln!(
            out,
            "  {}chained {}({})",
            modifier_prefix(method.modifiers),
            method.name,
            params(&method.params, method.varargs)
        )?;
    }
    if model.validate_usage() {
        writeln!(out, "  validate usage")?;
    }
    writeln!(out, "}}")
}

fn flags(attribute: &AttributeDescriptor) -> String {
    let mut flags = Vec::new();
    if attribute.generate_getter {
        flags.push("getter");
    }
    if attribute.generate_setter {
        flags.push("setter");
    }
    if attribute.use_in_hash() {
        flags.push("hash");
    }
    if attribute.is_package_private() {
        flags.push("package-private");
    }
    if attribute.synthesized {
        flags.push("synthesized");
    }
    flags.join(", ")
}

fn modifier_prefix(modifiers: Modifiers) -> &'static str {
    if modifiers.contains(Modifiers::PUBLIC) {
        "public "
    } else if modifiers.contains(Modifiers::PROTECTED) {
        "protected "
    } else {
        ""
    }
}

pub(super) fn params(params: &[Param], varargs: bool) -> String {
    let mut rendered: Vec<String> = params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.ty))
        .collect();
    if varargs {
        if let Some(last) = rendered.last_mut() {
            last.push_str("...");
        }
    }
    rendered.join(", ")
}
