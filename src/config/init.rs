// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates conveyor.yml template files.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::StackName;

use super::{CONFIG_FILENAME, Config};

pub fn init_config(
    dir: &Path,
    stack_name: Option<&str>,
    bucket: Option<&str>,
    force: bool,
) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    if let (Some(name), Some(stack)) = (stack_name, config.stack.as_mut()) {
        StackName::new(name).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        stack.name = name.to_string();
    }

    if let (Some(bucket), Some(upload)) = (bucket, config.upload.as_mut()) {
        upload.bucket = bucket.to_string();
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    let stack_name = config
        .stack
        .as_ref()
        .map(|s| s.name.as_str())
        .unwrap_or("my-app");
    let bucket = config
        .upload
        .as_ref()
        .map(|u| u.bucket.as_str())
        .unwrap_or("my-app-assets");

    format!(
        r##"variables:
  Environment: dev

# Local providers keep stacks and buckets under this directory.
provider:
  kind: local
  root: .conveyor/state

polling:
  interval: 5s
  # timeout: 30m

stack:
  name: "{stack_name}"
  template: template.yml
  parameters:
    Environment: "#{{Environment}}"
  # capabilities: [CAPABILITY_NAMED_IAM]

upload:
  bucket: {bucket}
  targets:
    - kind: file-set
      pattern: "public/**/*"
      key_prefix: "#{{Environment}}/"
"##
    )
}
