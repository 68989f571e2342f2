//! Processor options.
//!
//! The host passes options as a flat key/value map. Every recognized key is
//! a boolean except `model-base`, which names the root type all models
//! extend. Unknown keys are reported as warnings and otherwise ignored.

use tessel_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use tessel_ir::QualifiedName;
use tessel_model::ModelOptions;

pub const ENABLE_PARALLELISM: &str = "enable-parallelism";
pub const REQUIRE_ABSTRACT_MODELS: &str = "require-abstract-models";
pub const REQUIRE_HASH_CONTRACT: &str = "require-hash-contract";
pub const VALIDATE_USAGE: &str = "validate-usage";
pub const DISABLE_AUXILIARY_GENERATION: &str = "disable-auxiliary-generation";
pub const LOG_TIMINGS: &str = "log-timings";
pub const ALLOW_PRIVATE_ATTRIBUTES: &str = "allow-private-attributes";
pub const MODEL_BASE: &str = "model-base";

/// Every option key the processor understands.
pub const KNOWN_OPTIONS: &[&str] = &[
    ENABLE_PARALLELISM,
    REQUIRE_ABSTRACT_MODELS,
    REQUIRE_HASH_CONTRACT,
    VALIDATE_USAGE,
    DISABLE_AUXILIARY_GENERATION,
    LOG_TIMINGS,
    ALLOW_PRIVATE_ATTRIBUTES,
    MODEL_BASE,
];

/// Errors from parsing processor options.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("option `{key}` expects `true` or `false`, got `{value}`")]
    InvalidBool { key: String, value: String },
    #[error("option `model-base` expects a qualified type name, got `{0}`")]
    InvalidModelBase(String),
}

/// Fully resolved processor configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProcessorConfig {
    pub enable_parallelism: bool,
    pub disable_auxiliary_generation: bool,
    pub log_timings: bool,
    pub model: ModelOptions,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        ProcessorConfig {
            enable_parallelism: true,
            disable_auxiliary_generation: false,
            log_timings: false,
            model: ModelOptions::default(),
        }
    }
}

impl ProcessorConfig {
    /// Parse host options. Unknown keys become `W0001` warnings in `sink`.
    pub fn from_options<K, V>(
        options: impl IntoIterator<Item = (K, V)>,
        sink: &DiagnosticSink,
    ) -> Result<Self, ConfigError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = ProcessorConfig::default();
        for (key, value) in options {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            let flag = || parse_bool(key, value);
            match key {
                ENABLE_PARALLELISM => config.enable_parallelism = flag()?,
                REQUIRE_ABSTRACT_MODELS => config.model.require_abstract_models = flag()?,
                REQUIRE_HASH_CONTRACT => config.model.require_hash_contract = flag()?,
                VALIDATE_USAGE => config.model.validate_usage = flag()?,
                DISABLE_AUXILIARY_GENERATION => config.disable_auxiliary_generation = flag()?,
                LOG_TIMINGS => config.log_timings = flag()?,
                ALLOW_PRIVATE_ATTRIBUTES => config.model.allow_private_attributes = flag()?,
                MODEL_BASE => config.model.model_base = parse_type_name(value)?,
                _ => {
                    tracing::warn!(option = key, "unknown processor option");
                    sink.report(
                        Diagnostic::warning(ErrorCode::W0001)
                            .with_message(format!("unknown option `{key}`"))
                            .with_note(format!("known options: {}", KNOWN_OPTIONS.join(", "))),
                    );
                }
            }
        }
        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.to_owned(),
            value: value.to_owned(),
        }),
    }
}

fn parse_type_name(value: &str) -> Result<QualifiedName, ConfigError> {
    let valid = !value.is_empty()
        && value.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        });
    if valid {
        Ok(QualifiedName::new(value))
    } else {
        Err(ConfigError::InvalidModelBase(value.to_owned()))
    }
}

#[cfg(test)]
mod tests;
