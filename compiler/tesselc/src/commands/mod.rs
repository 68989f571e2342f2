//! Command handlers for the `tessel` CLI.

mod build;
mod explain;

pub use build::{parse_build_args, process_manifest, run_build, BuildError, BuildOptions, BuildResult};
pub use explain::explain_error;
