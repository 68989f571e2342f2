//! Tessel compiler driver.
//!
//! Ties the model crates to a host:
//! - [`config`]: processor options
//! - [`driver`]: the round orchestrator
//! - [`emit`]: model emitters and code sinks
//! - [`manifest`]: JSON declaration manifests standing in for a host compiler
//! - [`commands`]: the `tessel` CLI commands

pub mod commands;
pub mod config;
pub mod driver;
pub mod emit;
pub mod manifest;

use std::sync::Once;

pub use config::{ConfigError, ProcessorConfig};
pub use driver::{Driver, DriverError, ProcessingOutcome, Round};
pub use emit::{Artifact, CodeSink, DirectorySink, EmitError, MemorySink, ModelEmitter, OutlineEmitter};
pub use manifest::{Manifest, ManifestError};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    });
}
