// Copyright 2026 The Chat Relay Project
// SPDX-License-Identifier: Apache-2.0

use sha2::{Digest, Sha256};

use super::error::ConfigError;
use super::interpolation::resolve_variables;
use super::raw;
use super::source::ConfigSource;
use super::types::*;

/// Load and validate a relay config from the given source.
///
/// Steps:
/// 1. Read raw YAML from source
/// 2. Compute SHA256 config hash
/// 3. Parse YAML into raw deserialization types
/// 4. Validate version
/// 5. Resolve variable interpolation in string fields
/// 6. Apply defaults and validate values
pub fn load_config(source: &dyn ConfigSource) -> Result<Config, ConfigError> {
    let raw_yaml = source.load()?;
    let config_hash = compute_hash(&raw_yaml);

    let raw: raw::RawConfig = serde_yaml::from_str(&raw_yaml)?;

    if raw.relay != "v1" {
        return Err(ConfigError::Validation(format!(
            "unsupported config version \"{}\", expected \"v1\"",
            raw.relay
        )));
    }

    let upstream = build_upstream_config(raw.upstream)?;
    let model = build_model_config(raw.model)?;
    let environment = match raw.environment {
        Some(env) => resolve_variables(&env)?,
        None => String::new(),
    };

    Ok(Config {
        upstream,
        model,
        environment,
        config_hash,
    })
}

/// SHA256 of the raw YAML, formatted as `sha256:{hex}`.
pub fn compute_hash(raw_yaml: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_yaml.as_bytes());
    let hash = hasher.finalize();
    format!("sha256:{:x}", hash)
}

fn build_upstream_config(
    raw: Option<raw::RawUpstreamConfig>,
) -> Result<UpstreamConfig, ConfigError> {
    let mut config = UpstreamConfig::default();
    let Some(raw) = raw else {
        return Ok(config);
    };

    if let Some(base_url) = raw.base_url {
        let base_url = resolve_variables(&base_url)?;
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Validation(
                "upstream.base_url must not be empty".to_string(),
            ));
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "upstream.base_url must be an http(s) URL, got \"{trimmed}\""
            )));
        }
        config.base_url = trimmed.trim_end_matches('/').to_string();
    }

    if let Some(api_key) = raw.api_key {
        config.api_key = resolve_variables(&api_key)?.trim().to_string();
    }

    if let Some(version) = raw.api_version {
        config.api_version = resolve_variables(&version)?;
    }

    config.connect_timeout_ms = validate_timeout("upstream.connect_timeout_ms", raw.connect_timeout_ms)?;
    config.idle_timeout_ms = validate_timeout("upstream.idle_timeout_ms", raw.idle_timeout_ms)?;

    Ok(config)
}

fn validate_timeout(field: &str, value: Option<u64>) -> Result<Option<u64>, ConfigError> {
    match value {
        Some(0) => Err(ConfigError::Validation(format!(
            "{field} must be greater than 0 (omit it to disable)"
        ))),
        other => Ok(other),
    }
}

fn build_model_config(raw: Option<raw::RawModelConfig>) -> Result<ModelConfig, ConfigError> {
    let mut config = ModelConfig::default();
    let Some(raw) = raw else {
        return Ok(config);
    };

    if let Some(name) = raw.name {
        let name = resolve_variables(&name)?;
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "model.name must not be empty".to_string(),
            ));
        }
        config.name = name;
    }

    if let Some(max_tokens) = raw.max_tokens {
        if max_tokens == 0 {
            return Err(ConfigError::Validation(
                "model.max_tokens must be greater than 0".to_string(),
            ));
        }
        config.max_tokens = max_tokens;
    }

    if let Some(temperature) = raw.temperature {
        if !(0.0..=1.0).contains(&temperature) {
            return Err(ConfigError::Validation(format!(
                "model.temperature must be between 0.0 and 1.0, got {temperature}"
            )));
        }
        config.temperature = temperature;
    }

    Ok(config)
}
