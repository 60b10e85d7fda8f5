//! hv-config
//!
//! Layered YAML configuration for the back-office console. Documents merge
//! in order (base first, overlays override), the merged result is hashed
//! over its canonical JSON so two operators can compare effective configs,
//! and a secret guard aborts the load when any leaf value looks like a
//! literal credential. Credentials belong in the environment, never in a
//! config file.

mod typed;

pub use typed::{ApiConfig, AppConfig, ListConfig, OperatorConfig, PersistConfig};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

/// Known secret-like prefixes. A leaf string starting with any of these
/// fails the load with CONFIG_SECRET_DETECTED.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",        // Stripe / OpenAI style
    "sk_live",    // Stripe live
    "sk_test",    // Stripe test
    "AKIA",       // AWS access key ID
    "-----BEGIN", // PEM private keys
    "ghp_",       // GitHub PAT
    "glpat-",     // GitLab PAT
    "xoxb-",      // Slack bot token
];

// ---------------------------------------------------------------------------
// LoadedConfig
// ---------------------------------------------------------------------------

/// The merged configuration plus its deterministic hash.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Extract the typed application view.
    pub fn app_config(&self) -> Result<AppConfig> {
        typed::extract(&self.config_json)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load and merge YAML files in order: earlier paths are base, later paths
/// override.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs = Vec::with_capacity(paths.len());
    for path in paths {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read yaml path: {path}"))?;
        docs.push(raw);
    }
    let refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&refs)
}

/// Same as [`load_layered_yaml`] but over in-memory documents (tests, env
/// overlays already read elsewhere).
pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let as_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let as_json = serde_json::to_value(as_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, as_json);
    }

    enforce_no_secret_literals(&merged)?;

    let canonical_json =
        serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let base_val = base_map.remove(&key).unwrap_or(Value::Null);
                base_map.insert(key, deep_merge(base_val, overlay_val));
            }
            Value::Object(base_map)
        }
        // Scalars, arrays, and nulls replace wholesale.
        (_, overlay_other) => overlay_other,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Secret guard
// ---------------------------------------------------------------------------

fn enforce_no_secret_literals(config: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    collect_leaf_pointers(config, "", &mut leaves);

    for pointer in leaves {
        let Some(value) = config.pointer(&pointer) else {
            continue;
        };
        if let Some(s) = value.as_str() {
            if looks_like_secret(s) {
                bail!("CONFIG_SECRET_DETECTED leaf={pointer} value=REDACTED");
            }
        }
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    t.len() >= 8 && SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

fn collect_leaf_pointers(value: &Value, prefix: &str, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let next = format!("{prefix}/{}", escape_pointer_token(key));
                collect_leaf_pointers(child, &next, out);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                let next = format!("{prefix}/{idx}");
                collect_leaf_pointers(child, &next, out);
            }
        }
        _ => {
            out.push(if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            });
        }
    }
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
