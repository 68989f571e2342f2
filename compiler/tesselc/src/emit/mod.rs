//! Code emission.
//!
//! A [`ModelEmitter`] renders one finished model to an [`Artifact`]; a
//! [`CodeSink`] stores artifacts. Sinks are not required to support
//! concurrent writers, so the driver only writes through
//! `Harness::for_each_serial`.

mod extension;
mod outline;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use tessel_ir::{DeclId, QualifiedName};
use tessel_model::ModelDescriptor;

pub use extension::{build_extension_file, extension_function_name, EXTENSION_FILE_NAME};
pub use outline::OutlineEmitter;

/// Errors from writing generated files.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("`{0}` was already generated")]
    AlreadyWritten(String),
    #[error("failed to write `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One generated file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Artifact {
    /// Relative, `/`-separated path.
    pub path: String,
    pub contents: String,
    /// Declarations the contents were derived from.
    pub origins: Vec<DeclId>,
}

impl Artifact {
    /// `com.app` + `Header_.model` → `com/app/Header_.model`.
    pub fn path_in_package(package: &QualifiedName, file_name: &str) -> String {
        if package.is_empty() {
            file_name.to_owned()
        } else {
            format!("{}/{file_name}", package.as_str().replace('.', "/"))
        }
    }
}

/// Renders a finished model.
pub trait ModelEmitter: Send + Sync {
    fn render(&self, model: &ModelDescriptor) -> Artifact;
}

/// Destination for generated files.
pub trait CodeSink {
    /// Store `artifact`. Writing the same path twice is an error.
    fn write(&mut self, artifact: Artifact) -> Result<(), EmitError>;
}

/// Keeps artifacts in memory, ordered by path.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: BTreeMap<String, Artifact>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&Artifact> {
        self.artifacts.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.artifacts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn into_artifacts(self) -> Vec<Artifact> {
        self.artifacts.into_values().collect()
    }
}

impl CodeSink for MemorySink {
    fn write(&mut self, artifact: Artifact) -> Result<(), EmitError> {
        if self.artifacts.contains_key(&artifact.path) {
            return Err(EmitError::AlreadyWritten(artifact.path));
        }
        self.artifacts.insert(artifact.path.clone(), artifact);
        Ok(())
    }
}

/// Writes artifacts below a root directory.
#[derive(Debug)]
pub struct DirectorySink {
    root: PathBuf,
    written: FxHashSet<String>,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectorySink {
            root: root.into(),
            written: FxHashSet::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CodeSink for DirectorySink {
    fn write(&mut self, artifact: Artifact) -> Result<(), EmitError> {
        if !self.written.insert(artifact.path.clone()) {
            return Err(EmitError::AlreadyWritten(artifact.path));
        }
        let path = self.root.join(&artifact.path);
        let io = |source| EmitError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io)?;
        }
        fs::write(&path, artifact.contents.as_bytes()).map_err(io)?;
        tracing::debug!(path = %path.display(), "wrote artifact");
        Ok(())
    }
}
