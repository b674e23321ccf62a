// ABOUTME: Variable values in the deployment file.
// ABOUTME: Either a literal or a reference to a process environment variable.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl VariableValue {
    pub fn resolve(&self) -> Result<String> {
        match self {
            VariableValue::Literal(s) => Ok(s.clone()),
            VariableValue::FromEnv { var, default } => std::env::var(var)
                .ok()
                .or_else(|| default.clone())
                .ok_or_else(|| Error::MissingEnvVar(var.clone())),
        }
    }
}

/// Resolve every value, failing on the first unset environment reference.
pub fn resolve_values(map: &HashMap<String, VariableValue>) -> Result<Vec<(String, String)>> {
    map.iter()
        .map(|(k, v)| v.resolve().map(|resolved| (k.clone(), resolved)))
        .collect()
}

/// Parse a `NAME=VALUE` override. The value may itself contain `=`.
pub fn parse_override(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(Error::InvalidVariable(raw.to_string())),
    }
}
