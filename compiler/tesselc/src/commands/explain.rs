//! The `explain` command: describe a diagnostic code.

use tessel_diagnostic::ErrorCode;

/// One-line description of `code_str`, or `None` for an unknown code.
pub fn explain_error(code_str: &str) -> Option<String> {
    let code = code_str.trim().parse::<ErrorCode>().ok()?;
    Some(format!("{code}: {}", code.description()))
}
