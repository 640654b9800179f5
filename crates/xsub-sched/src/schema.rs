//! Declared submission parameters and default merging.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SchedError, SchedResult};

/// Caller-supplied parameters, name to value.
pub type ParameterMap = BTreeMap<String, String>;

/// A single declared submission parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name, as referenced by the backend template.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Value used when the caller does not supply one.
    pub default: String,
}

/// The parameters a backend accepts, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Schema {
    params: Vec<ParameterSpec>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parameter. A later declaration of the same name replaces the earlier one.
    pub fn with(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        let spec = ParameterSpec {
            name: name.into(),
            description: description.into(),
            default: default.into(),
        };
        match self.params.iter_mut().find(|p| p.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.params.push(spec),
        }
        self
    }

    /// Look up a declared parameter.
    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Iterate declared parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Merge caller parameters over the declared defaults.
    ///
    /// Caller values always win. Keys the schema does not declare are kept
    /// as-is so a caller can still reference them, but they are logged.
    pub fn resolve(&self, params: &ParameterMap) -> ParameterMap {
        let mut resolved: ParameterMap = self
            .params
            .iter()
            .map(|p| (p.name.clone(), p.default.clone()))
            .collect();

        for (key, value) in params {
            if self.get(key).is_none() {
                warn!("Parameter '{}' is not declared by this scheduler", key);
            }
            resolved.insert(key.clone(), value.clone());
        }

        resolved
    }
}

/// Read a resolved parameter as an integer.
pub fn int_param(params: &ParameterMap, name: &str) -> SchedResult<i64> {
    let raw = params
        .get(name)
        .ok_or_else(|| SchedError::Validation(format!("{name} is required")))?;
    raw.trim()
        .parse()
        .map_err(|_| SchedError::Validation(format!("{name} must be an integer, got '{raw}'")))
}

/// Convert a JSON object of parameters into a [`ParameterMap`].
///
/// Strings are taken verbatim; numbers and booleans are stringified.
pub fn parameters_from_json(value: serde_json::Value) -> SchedResult<ParameterMap> {
    let serde_json::Value::Object(object) = value else {
        return Err(SchedError::Validation(
            "parameters must be a JSON object".to_string(),
        ));
    };

    object
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(SchedError::Validation(format!(
                        "parameter '{key}' must be a scalar, got {other}"
                    )));
                }
            };
            Ok((key, value))
        })
        .collect()
}
