//! JSON configuration provider.
//!
//! Reads a JSON object whose keys are option names. A value may be a list of
//! scalars, a single scalar (one argument), or `null` (no arguments).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;

use roles_model::RawConfig;

pub fn load_raw_config(path: &Path) -> Result<RawConfig> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    parse_raw_config(&text).with_context(|| format!("parse config: {}", path.display()))
}

pub fn parse_raw_config(text: &str) -> Result<RawConfig> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(entries) = value else {
        bail!("configuration must be a JSON object");
    };
    let mut raw = RawConfig::new();
    for (key, value) in entries {
        let arguments = match value {
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .into_iter()
                .map(|item| scalar_text(&key, item))
                .collect::<Result<Vec<_>>>()?,
            scalar => vec![scalar_text(&key, scalar)?],
        };
        raw.insert(key, arguments);
    }
    if raw.is_empty() {
        bail!("did not find any options");
    }
    Ok(raw)
}

fn scalar_text(key: &str, value: Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(anyhow!("\"{key}\" has a non-scalar argument: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_and_lists() {
        let raw = parse_raw_config(
            r#"{"droprows": ["a", "b"], "col_request": "Request #", "rank": [0, "Onsite"], "empty": null}"#,
        )
        .expect("parse");
        assert_eq!(raw["droprows"], vec!["a", "b"]);
        assert_eq!(raw["col_request"], vec!["Request #"]);
        assert_eq!(raw["rank"], vec!["0", "Onsite"]);
        assert!(raw["empty"].is_empty());
    }

    #[test]
    fn rejects_nested_values() {
        assert!(parse_raw_config(r#"{"a": [["x"]]}"#).is_err());
        assert!(parse_raw_config(r#"["a"]"#).is_err());
        assert!(parse_raw_config("{}").is_err());
    }
}
