// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

// Config loader and validator
//
// Loads chat-relay.yaml, validates structure, resolves variable
// interpolation, applies defaults, and computes a config hash.

mod defaults;
mod error;
mod interpolation;
mod loader;
mod raw;
mod source;
mod types;

pub use defaults::*;
pub use error::ConfigError;
pub use interpolation::resolve_variables;
pub use loader::{compute_hash, load_config};
pub use source::{ConfigSource, FileSource, StringSource};
pub use types::{Config, ModelConfig, UpstreamConfig};

#[cfg(test)]
mod tests {
    use super::*;

    fn make_source(yaml: &str) -> StringSource {
        StringSource {
            content: yaml.to_string(),
        }
    }

    const FULL_YAML: &str = r#"
relay: v1
upstream:
  base_url: https://llm-gateway.internal/
  api_key: ${CHAT_RELAY_TEST_UNSET_KEY:-sk-fallback}
  api_version: "2023-06-01"
  connect_timeout_ms: 5000
  idle_timeout_ms: 30000
model:
  name: claude-3-5-haiku-latest
  max_tokens: 512
  temperature: 0.2
environment: staging
"#;

    #[test]
    fn full_config_parses_all_fields() {
        let config = load_config(&make_source(FULL_YAML)).unwrap();

        assert_eq!(config.upstream.base_url, "https://llm-gateway.internal");
        assert_eq!(
            config.upstream.messages_url(),
            "https://llm-gateway.internal/v1/messages"
        );
        assert_eq!(config.upstream.api_key, "sk-fallback");
        assert_eq!(config.upstream.api_version, "2023-06-01");
        assert_eq!(config.upstream.connect_timeout_ms, Some(5000));
        assert_eq!(config.upstream.idle_timeout_ms, Some(30000));
        assert_eq!(config.model.name, "claude-3-5-haiku-latest");
        assert_eq!(config.model.max_tokens, 512);
        assert!((config.model.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.environment, "staging");
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = load_config(&make_source("relay: v1\n")).unwrap();

        assert_eq!(config.upstream.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.upstream.api_version, DEFAULT_API_VERSION);
        assert!(config.upstream.api_key.is_empty());
        assert_eq!(config.upstream.idle_timeout_ms, None);
        assert_eq!(config.model, ModelConfig::default());
        assert_eq!(config.model.name, DEFAULT_MODEL);
        assert_eq!(config.model.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(config.environment.is_empty());
    }

    #[test]
    fn api_key_resolved_from_environment() {
        std::env::set_var("CHAT_RELAY_TEST_LOADER_KEY", "sk-from-env");
        let yaml = "relay: v1\nupstream:\n  api_key: ${CHAT_RELAY_TEST_LOADER_KEY}\n";
        let config = load_config(&make_source(yaml)).unwrap();
        assert_eq!(config.upstream.api_key, "sk-from-env");
    }

    #[test]
    fn missing_credential_without_fallback_is_rejected() {
        let yaml = "relay: v1\nupstream:\n  api_key: ${CHAT_RELAY_TEST_NEVER_SET}\n";
        let err = load_config(&make_source(yaml)).unwrap_err();
        assert!(
            matches!(err, ConfigError::UndefinedVariable { ref name } if name == "CHAT_RELAY_TEST_NEVER_SET"),
            "got: {err}"
        );
    }

    #[test]
    fn wrong_version_rejected() {
        let err = load_config(&make_source("relay: v2\n")).unwrap_err();
        assert!(err.to_string().contains("v2"), "got: {err}");
    }

    #[test]
    fn missing_version_is_yaml_error() {
        let err = load_config(&make_source("model:\n  name: x\n")).unwrap_err();
        assert!(matches!(err, ConfigError::YamlError(_)), "got: {err}");
    }

    #[test]
    fn non_http_base_url_rejected() {
        let yaml = "relay: v1\nupstream:\n  base_url: ftp://example.com\n";
        let err = load_config(&make_source(yaml)).unwrap_err();
        assert!(err.to_string().contains("http(s)"), "got: {err}");
    }

    #[test]
    fn zero_max_tokens_rejected() {
        let yaml = "relay: v1\nmodel:\n  max_tokens: 0\n";
        let err = load_config(&make_source(yaml)).unwrap_err();
        assert!(err.to_string().contains("max_tokens"), "got: {err}");
    }

    #[test]
    fn out_of_range_temperature_rejected() {
        let yaml = "relay: v1\nmodel:\n  temperature: 1.5\n";
        let err = load_config(&make_source(yaml)).unwrap_err();
        assert!(err.to_string().contains("temperature"), "got: {err}");
    }

    #[test]
    fn zero_idle_timeout_rejected() {
        let yaml = "relay: v1\nupstream:\n  idle_timeout_ms: 0\n";
        let err = load_config(&make_source(yaml)).unwrap_err();
        assert!(err.to_string().contains("idle_timeout_ms"), "got: {err}");
    }

    #[test]
    fn config_hash_is_deterministic() {
        let config1 = load_config(&make_source(FULL_YAML)).unwrap();
        let config2 = load_config(&make_source(FULL_YAML)).unwrap();
        assert_eq!(config1.config_hash, config2.config_hash);
        assert!(config1.config_hash.starts_with("sha256:"));
        assert_eq!(config1.config_hash.len(), 7 + 64); // "sha256:" + 64 hex chars
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = load_config(&make_source(FULL_YAML)).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-fallback"), "key leaked: {rendered}");
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn file_source_reads_from_disk() {
        let path = std::env::temp_dir().join(format!("chat-relay-test-{}.yaml", std::process::id()));
        std::fs::write(&path, "relay: v1\nenvironment: disk\n").unwrap();

        let config = load_config(&FileSource { path: path.clone() }).unwrap();
        assert_eq!(config.environment, "disk");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_io_error() {
        let source = FileSource {
            path: std::path::PathBuf::from("/definitely/not/here/chat-relay.yaml"),
        };
        let err = load_config(&source).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)), "got: {err}");
    }
}
