// ABOUTME: String variable store with output publishing and token evaluation.
// ABOUTME: Output variables are recorded in publish order for the orchestrator.

use std::collections::HashMap;

/// Variable names with meaning to the engine itself.
pub mod known {
    /// Name of the action; scopes output variables when set.
    pub const ACTION_NAME: &str = "Action.Name";
    /// Prefix for published output variables.
    pub const OUTPUT_PREFIX: &str = "Output.";
    /// Set to `false` to skip file substitution even when patterns are configured.
    pub const SUBSTITUTE_IN_FILES_ENABLED: &str = "SubstituteInFiles.Enabled";
}

/// An output variable published by a convention, in publish order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OutputVariable {
    pub name: String,
    pub value: String,
}

/// Mapping from variable name to value.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: HashMap<String, String>,
    outputs: Vec<OutputVariable>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Read a boolean flag; anything other than a case-insensitive `true` is false.
    pub fn get_flag(&self, name: &str) -> bool {
        self.get(name)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Replace `#{Name}` tokens with variable values.
    ///
    /// Tokens naming unknown variables are left as written so a later pass (or
    /// the orchestrator) can still see them.
    pub fn evaluate(&self, template: &str) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("#{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let name = after[..end].trim();
                    match self.get(name) {
                        Some(value) => result.push_str(value),
                        None => result.push_str(&rest[start..start + 2 + end + 1]),
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Publish `Output.<name>` and, when an action name is known, the
    /// action-scoped `Action[<action>].Output.<name>` as well.
    pub fn set_output(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let output_name = format!("{}{}", known::OUTPUT_PREFIX, name);

        if let Some(action) = self.get(known::ACTION_NAME).map(str::to_string) {
            self.set(format!("Action[{action}].{output_name}"), value.clone());
        }

        tracing::debug!("Publishing output variable {output_name}");
        self.set(output_name.clone(), value.clone());
        match self.outputs.iter_mut().find(|o| o.name == output_name) {
            Some(existing) => existing.value = value,
            None => self.outputs.push(OutputVariable {
                name: output_name,
                value,
            }),
        }
    }

    /// Output variables published so far, oldest first.
    pub fn outputs(&self) -> &[OutputVariable] {
        &self.outputs
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut variables = Variables::new();
        for (k, v) in iter {
            variables.set(k, v);
        }
        variables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_replaces_known_tokens() {
        let vars: Variables = [("Env", "prod"), ("Region", "eu-west-1")]
            .into_iter()
            .collect();
        assert_eq!(vars.evaluate("app-#{Env}-#{Region}"), "app-prod-eu-west-1");
    }

    #[test]
    fn evaluate_keeps_unknown_and_unterminated_tokens() {
        let vars: Variables = [("Env", "prod")].into_iter().collect();
        assert_eq!(vars.evaluate("#{Missing}-#{Env}"), "#{Missing}-prod");
        assert_eq!(vars.evaluate("tail #{Env"), "tail #{Env");
    }

    #[test]
    fn get_flag_is_case_insensitive() {
        let vars: Variables = [("A", "True"), ("B", "yes")].into_iter().collect();
        assert!(vars.get_flag("A"));
        assert!(!vars.get_flag("B"));
        assert!(!vars.get_flag("C"));
    }

    #[test]
    fn set_output_scopes_to_action() {
        let mut vars: Variables = [(known::ACTION_NAME, "Deploy Web")].into_iter().collect();
        vars.set_output("AwsOutputs[StackId]", "arn:stack/web");

        assert_eq!(vars.get("Output.AwsOutputs[StackId]"), Some("arn:stack/web"));
        assert_eq!(
            vars.get("Action[Deploy Web].Output.AwsOutputs[StackId]"),
            Some("arn:stack/web")
        );
        assert_eq!(vars.outputs().len(), 1);
        assert_eq!(vars.outputs()[0].name, "Output.AwsOutputs[StackId]");
    }
}
