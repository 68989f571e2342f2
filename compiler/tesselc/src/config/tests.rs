use pretty_assertions::assert_eq;

use super::*;

#[test]
fn defaults_without_options() {
    let sink = DiagnosticSink::new();
    let config = ProcessorConfig::from_options(Vec::<(&str, &str)>::new(), &sink);
    assert_eq!(config, Ok(ProcessorConfig::default()));
    assert!(sink.is_empty());
}

#[test]
fn every_known_option_is_applied() {
    let sink = DiagnosticSink::new();
    let config = ProcessorConfig::from_options(
        [
            (ENABLE_PARALLELISM, "false"),
            (REQUIRE_ABSTRACT_MODELS, "true"),
            (REQUIRE_HASH_CONTRACT, "TRUE"),
            (VALIDATE_USAGE, "false"),
            (DISABLE_AUXILIARY_GENERATION, "true"),
            (LOG_TIMINGS, " true "),
            (ALLOW_PRIVATE_ATTRIBUTES, "true"),
            (MODEL_BASE, "com.app.BaseModel"),
        ],
        &sink,
    );

    let expected = ProcessorConfig {
        enable_parallelism: false,
        disable_auxiliary_generation: true,
        log_timings: true,
        model: ModelOptions {
            require_abstract_models: true,
            require_hash_contract: true,
            validate_usage: false,
            allow_private_attributes: true,
            model_base: QualifiedName::new("com.app.BaseModel"),
        },
    };
    assert_eq!(config, Ok(expected));
    assert!(sink.is_empty());
}

#[test]
fn invalid_booleans_are_errors() {
    let sink = DiagnosticSink::new();
    let config = ProcessorConfig::from_options([(LOG_TIMINGS, "yes")], &sink);
    assert_eq!(
        config,
        Err(ConfigError::InvalidBool {
            key: LOG_TIMINGS.to_owned(),
            value: "yes".to_owned(),
        })
    );
}

#[test]
fn invalid_model_base_is_an_error() {
    let sink = DiagnosticSink::new();
    for bad in ["", "com..Model", "com.1app.Model", "com.app.Model<T>"] {
        let config = ProcessorConfig::from_options([(MODEL_BASE, bad)], &sink);
        assert_eq!(config, Err(ConfigError::InvalidModelBase(bad.to_owned())));
    }
}

#[test]
fn unknown_options_warn_and_continue() {
    let sink = DiagnosticSink::new();
    let config = ProcessorConfig::from_options(
        [("enable-paralelism", "false"), (LOG_TIMINGS, "true")],
        &sink,
    );

    assert_eq!(config.map(|c| c.log_timings), Ok(true));
    let diagnostics = sink.flush();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ErrorCode::W0001);
    assert!(!diagnostics[0].is_error());
    assert!(diagnostics[0].message.contains("enable-paralelism"));
}
