//! Error codes for all processor diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E1001`) with the first digit
//! indicating the kind of problem.

use std::fmt;

/// Error codes for all processor diagnostics.
///
/// Format: E#### where first digit indicates the kind:
/// - E1xxx: Declaration-shape errors (reported when a declaration is seen)
/// - E2xxx: Merge errors (conflicts while combining attributes)
/// - E3xxx: Contract-validation errors (reported in the final pass)
/// - E9xxx: Unexpected failures caught at a task or round boundary
/// - W0xxx: Warnings
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ErrorCode {
    /// Attribute on a private or static member
    E1001,
    /// Nested class holding attributes is not static
    E1002,
    /// Attribute declared outside a class
    E1003,
    /// Attribute declared inside a private class
    E1004,
    /// Model class is final
    E1005,
    /// Model class does not extend the model base type
    E1006,
    /// Model class must be abstract
    E1007,
    /// Attribute method is not a single-parameter setter
    E1008,
    /// Conflicting package configurations
    E1009,

    /// Duplicate attribute in the same round
    E2001,
    /// Pending attribute never resolved
    E2002,

    /// Attribute type breaks the hash/equality contract
    E3001,

    /// Task or round failed unexpectedly
    E9001,
    /// Writing a generated artifact failed
    E9002,

    /// Unknown processor option
    W0001,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E1008,
        ErrorCode::E1009,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E3001,
        ErrorCode::E9001,
        ErrorCode::E9002,
        ErrorCode::W0001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
            ErrorCode::W0001 => "W0001",
        }
    }

    /// One-line explanation for `--explain` style output.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "attributes must not be on private or static members",
            ErrorCode::E1002 => "nested classes with attributes must be static",
            ErrorCode::E1003 => "attributes may only be contained in classes",
            ErrorCode::E1004 => "attributes may not be contained in private classes",
            ErrorCode::E1005 => "classes with attributes cannot be final",
            ErrorCode::E1006 => "classes with attributes must extend the model base type",
            ErrorCode::E1007 => "model classes must be abstract",
            ErrorCode::E1008 => "attribute methods must be setters taking one parameter",
            ErrorCode::E1009 => "a package may declare only one package configuration",
            ErrorCode::E2001 => "an attribute with this name is already declared on the model",
            ErrorCode::E2002 => "a pending attribute could not be resolved",
            ErrorCode::E3001 => "attribute type does not implement hash and equality",
            ErrorCode::E9001 => "processing failed unexpectedly",
            ErrorCode::E9002 => "writing a generated file failed",
            ErrorCode::W0001 => "unrecognized processor option",
        }
    }

    /// Whether this code names a warning rather than an error.
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}
