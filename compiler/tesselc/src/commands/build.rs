//! The `build` command: run the processor over a declaration manifest.

use std::path::PathBuf;
use std::sync::Arc;

use tessel_diagnostic::DiagnosticSink;
use tessel_ir::MemorySymbolTable;

use crate::config::{ConfigError, ProcessorConfig};
use crate::driver::{Driver, DriverError, ProcessingOutcome, Round};
use crate::emit::{Artifact, CodeSink, DirectorySink, MemorySink};
use crate::manifest::{Manifest, ManifestError};

/// Options for `tessel build`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BuildOptions {
    pub manifest: PathBuf,
    /// Output directory. Without one, nothing is written to disk.
    pub output: Option<PathBuf>,
    /// `--option key=value` pairs; they override the manifest's options.
    pub overrides: Vec<(String, String)>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Driver(#[from] DriverError),
}

pub struct BuildResult {
    pub outcome: ProcessingOutcome,
    /// Generated files, when no output directory was given.
    pub artifacts: Vec<Artifact>,
}

/// Parse the arguments following `build`.
pub fn parse_build_args(args: &[String]) -> Result<BuildOptions, String> {
    let mut options = BuildOptions::default();
    let mut manifest = None;
    let mut rest = args.iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                let dir = rest.next().ok_or_else(|| format!("`{arg}` needs a directory"))?;
                options.output = Some(PathBuf::from(dir));
            }
            "--option" => {
                let pair = rest.next().ok_or("`--option` needs `key=value`")?;
                options.overrides.push(parse_override(pair)?);
            }
            flag if flag.starts_with('-') => return Err(format!("unknown flag `{flag}`")),
            path if manifest.is_none() => manifest = Some(PathBuf::from(path)),
            extra => return Err(format!("unexpected argument `{extra}`")),
        }
    }
    options.manifest = manifest.ok_or("missing manifest path")?;
    Ok(options)
}

fn parse_override(pair: &str) -> Result<(String, String), String> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected `key=value`, got `{pair}`")),
    }
}

/// Read the manifest, apply overrides and process every round.
pub fn run_build(options: &BuildOptions) -> Result<BuildResult, BuildError> {
    let mut manifest = Manifest::read(&options.manifest)?;
    manifest.options.extend(options.overrides.iter().cloned());
    tracing::debug!(
        manifest = %options.manifest.display(),
        declarations = manifest.declarations.len(),
        "loaded manifest"
    );
    if let Some(dir) = &options.output {
        let outcome = process_manifest(&manifest, &mut DirectorySink::new(dir))?;
        return Ok(BuildResult {
            outcome,
            artifacts: Vec::new(),
        });
    }
    let mut out = MemorySink::new();
    let outcome = process_manifest(&manifest, &mut out)?;
    Ok(BuildResult {
        outcome,
        artifacts: out.into_artifacts(),
    })
}

/// Feed each manifest round to a fresh driver, then finish.
pub fn process_manifest(
    manifest: &Manifest,
    out: &mut dyn CodeSink,
) -> Result<ProcessingOutcome, BuildError> {
    let sink = Arc::new(DiagnosticSink::new());
    let config = ProcessorConfig::from_options(&manifest.options, &sink)?;
    let mut driver = Driver::new(MemorySymbolTable::new(), config, sink);
    for round in manifest.rounds() {
        let elements = driver
            .lookup()
            .update(|host| manifest.register_round(host, round))?;
        driver.process(Round::new(elements), out)?;
    }
    Ok(driver.finish(out)?)
}
