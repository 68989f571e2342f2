//! Options that shape how models are built and checked.

use tessel_ir::QualifiedName;

/// Default root type every model class must extend.
pub const DEFAULT_MODEL_BASE: &str = "tessel.runtime.Model";

/// Global model options. Package configs may override the two `require_*`
/// flags for the packages they cover.
#[derive(Clone, Debug, Eq, PartialEq)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "Options: each bool is an independent processor switch"
)]
pub struct ModelOptions {
    pub require_abstract_models: bool,
    pub require_hash_contract: bool,
    /// Carried into every descriptor for the emitter.
    pub validate_usage: bool,
    pub allow_private_attributes: bool,
    pub model_base: QualifiedName,
}

impl Default for ModelOptions {
    fn default() -> Self {
        ModelOptions {
            require_abstract_models: false,
            require_hash_contract: false,
            validate_usage: true,
            allow_private_attributes: false,
            model_base: QualifiedName::new(DEFAULT_MODEL_BASE),
        }
    }
}
