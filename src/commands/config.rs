//! Config command handler.

use serde_json::Value;

use crate::config::{app_dir, cache_path, config_path};
use crate::context::AppContext;
use crate::error::Result;
use crate::output::{BOLD, CYAN, GRAY, RESET, YELLOW};

/// Keys whose values are never printed.
const SECRET_KEYS: &[&str] = &["token", "password", "api_token"];

/// Show where devflow keeps its files and the loaded configuration.
pub fn config_display_command(app: &AppContext) -> Result<()> {
    let config_file = config_path()?;

    println!("{BOLD}Paths{RESET}");
    println!("  {GRAY}App directory:{RESET} {CYAN}{}{RESET}", app_dir()?.display());
    println!("  {GRAY}Config file:{RESET}   {CYAN}{}{RESET}", config_file.display());
    println!("  {GRAY}Cache file:{RESET}    {CYAN}{}{RESET}", cache_path()?.display());
    println!();

    println!("{BOLD}# Config{RESET}");
    if !config_file.exists() {
        println!("{YELLOW}# (file does not exist, run `devflow init`){RESET}");
        return Ok(());
    }

    let masked = mask_secrets(app.config.as_value());
    println!("{}", serde_json::to_string_pretty(&masked)?);
    Ok(())
}

/// Copy of `value` with secret string values replaced by `********`.
fn mask_secrets(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let v = match v {
                        Value::String(s) if SECRET_KEYS.contains(&k.as_str()) && !s.is_empty() => {
                            Value::String("********".to_string())
                        }
                        other => mask_secrets(other),
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(mask_secrets).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mask_secrets_hides_nested_tokens() {
        let config = json!({
            "issue_provider": "jira",
            "jira": { "email": "jane@acme.io", "token": "s3cr3t", "url": "https://acme.atlassian.net" }
        });
        let masked = mask_secrets(&config);
        assert_eq!(masked["jira"]["token"], "********");
        assert_eq!(masked["jira"]["email"], "jane@acme.io");
        assert_eq!(masked["issue_provider"], "jira");
    }

    #[test]
    fn test_mask_secrets_keeps_empty_token_visible() {
        let masked = mask_secrets(&json!({ "token": "" }));
        assert_eq!(masked["token"], "");
    }
}
