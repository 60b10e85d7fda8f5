//! Typed view over the merged config JSON.
//!
//! Reads are explicit JSON-pointer lookups with stable error codes, so a
//! missing required key fails loudly at startup instead of surfacing as a
//! confusing default at the first API call.

use anyhow::{bail, Result};
use serde_json::Value;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 400;
pub const DEFAULT_VIEW_PATH: &str = ".herdvest/view.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorConfig {
    pub mobile: String,
    pub name: String,
    /// Comma-joined backend role string; resolved to a typed set at the edge.
    pub roles_csv: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    pub page_size: u32,
    pub search_debounce_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistConfig {
    pub view_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub operator: OperatorConfig,
    pub list: ListConfig,
    pub persist: PersistConfig,
}

pub(crate) fn extract(config: &Value) -> Result<AppConfig> {
    Ok(AppConfig {
        api: ApiConfig {
            base_url: required_str(config, "/api/base_url")?,
            timeout_secs: optional_u64(config, "/api/timeout_secs")?
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        },
        operator: OperatorConfig {
            mobile: required_str(config, "/operator/mobile")?,
            name: optional_str(config, "/operator/name")?.unwrap_or_default(),
            roles_csv: required_str(config, "/operator/roles")?,
        },
        list: ListConfig {
            page_size: optional_u64(config, "/list/page_size")?
                .map(|v| v as u32)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            search_debounce_ms: optional_u64(config, "/list/search_debounce_ms")?
                .unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS),
        },
        persist: PersistConfig {
            view_path: optional_str(config, "/persist/view_path")?
                .unwrap_or_else(|| DEFAULT_VIEW_PATH.to_string()),
        },
    })
}

fn required_str(config: &Value, pointer: &str) -> Result<String> {
    match optional_str(config, pointer)? {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => bail!("CONFIG_MISSING_KEY: {pointer} (non-empty string required)"),
    }
}

fn optional_str(config: &Value, pointer: &str) -> Result<Option<String>> {
    match config.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => bail!("CONFIG_WRONG_TYPE: {pointer} expected string, got {other}"),
    }
}

fn optional_u64(config: &Value, pointer: &str) -> Result<Option<u64>> {
    match config.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(v) => Ok(Some(v)),
            None => bail!("CONFIG_WRONG_TYPE: {pointer} expected unsigned integer, got {n}"),
        },
        Some(other) => bail!("CONFIG_WRONG_TYPE: {pointer} expected integer, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "api": { "base_url": "https://api.herdvest.example" },
            "operator": { "mobile": "9876500000", "roles": "ADMIN" }
        })
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let app = extract(&minimal()).unwrap();
        assert_eq!(app.api.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(app.list.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(app.list.search_debounce_ms, DEFAULT_SEARCH_DEBOUNCE_MS);
        assert_eq!(app.persist.view_path, DEFAULT_VIEW_PATH);
        assert_eq!(app.operator.name, "");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let mut config = minimal();
        config["list"] = json!({ "page_size": 25, "search_debounce_ms": 250 });
        config["api"]["timeout_secs"] = json!(30);
        let app = extract(&config).unwrap();
        assert_eq!(app.list.page_size, 25);
        assert_eq!(app.list.search_debounce_ms, 250);
        assert_eq!(app.api.timeout_secs, 30);
    }

    #[test]
    fn missing_base_url_fails_with_stable_code() {
        let config = json!({ "operator": { "mobile": "9", "roles": "ADMIN" } });
        let err = extract(&config).unwrap_err();
        assert!(err.to_string().contains("CONFIG_MISSING_KEY: /api/base_url"));
    }

    #[test]
    fn empty_mobile_counts_as_missing() {
        let mut config = minimal();
        config["operator"]["mobile"] = json!("  ");
        let err = extract(&config).unwrap_err();
        assert!(err.to_string().contains("/operator/mobile"));
    }

    #[test]
    fn wrong_type_is_reported() {
        let mut config = minimal();
        config["api"]["timeout_secs"] = json!("soon");
        let err = extract(&config).unwrap_err();
        assert!(err.to_string().contains("CONFIG_WRONG_TYPE"));
    }
}
