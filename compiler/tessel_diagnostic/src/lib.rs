//! Diagnostics for the Tessel model compiler.
//!
//! Every problem the processor finds in user declarations becomes a
//! [`Diagnostic`] with an [`ErrorCode`]. Diagnostics are collected in a
//! [`DiagnosticSink`] from any thread and only surface when the final round
//! flushes it, in a deterministic order.
//!
//! # Error Guarantees
//!
//! The `ErrorGuaranteed` type provides type-level proof that at least one
//! error was emitted.
//!
//! ```text
//! // Can only get ErrorGuaranteed by emitting an error
//! let guarantee = sink.emit_error(diagnostic);
//! ```

mod diagnostic;
mod error_code;
mod guarantee;
pub mod sink;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use sink::{DiagnosticSink, SinkConfig};
