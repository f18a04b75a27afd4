//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the batch
//! processor. The core never reads process-wide environment variables while processing;
//! the `*_from_env_value` helpers take the raw values so binaries own the environment.

use crate::constants::NAMESPACE_ENV;
use crate::{CoreError, CoreResult};
use owl::rewrite::DEFAULT_PREFIXES;
use rxnorm_uuid::Namespace;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    namespace: Namespace,
    reference_prefixes: Vec<String>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `extra_prefixes` are added to the SNOMED CT and RxNorm prefixes that are always
    /// rewritten.
    pub fn new(namespace: Namespace, extra_prefixes: Vec<String>) -> CoreResult<Self> {
        let mut reference_prefixes: Vec<String> =
            DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect();

        for prefix in extra_prefixes {
            if prefix.is_empty() {
                return Err(CoreError::InvalidInput(
                    "reference prefix cannot be empty".into(),
                ));
            }
            if prefix
                .chars()
                .any(|c| c.is_whitespace() || c == '<' || c == '>')
            {
                return Err(CoreError::InvalidInput(format!(
                    "reference prefix {prefix:?} contains whitespace or angle brackets"
                )));
            }
            if !reference_prefixes.contains(&prefix) {
                reference_prefixes.push(prefix);
            }
        }

        Ok(Self {
            namespace,
            reference_prefixes,
        })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn reference_prefixes(&self) -> &[String] {
        &self.reference_prefixes
    }
}

/// Parse the identifier namespace from an optional string value.
///
/// The namespace partitions every derived identifier, so there is no default: a missing or
/// blank value is an error.
pub fn namespace_from_env_value(value: Option<String>) -> CoreResult<Namespace> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::InvalidInput(format!("{NAMESPACE_ENV} must be set")))?;

    Ok(Namespace::parse(&value)?)
}

/// Parse a comma-separated prefix list. Blank entries are ignored.
pub fn extra_prefixes_from_env_value(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
