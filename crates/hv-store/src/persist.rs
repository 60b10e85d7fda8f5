//! Filter-persistence port.
//!
//! The persisted view is a convenience cache so a reload resumes the same
//! list position; the server response is always the source of truth. The
//! file-backed implementation is therefore deliberately forgiving: a missing
//! or unreadable file degrades to defaults instead of erroring.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use hv_schemas::QueryFilters;

// ---------------------------------------------------------------------------
// PersistedView
// ---------------------------------------------------------------------------

/// What survives a reload: the active filters and the expanded order row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedView {
    #[serde(default)]
    pub filters: Option<QueryFilters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded_order_id: Option<String>,
}

// ---------------------------------------------------------------------------
// FilterStore
// ---------------------------------------------------------------------------

/// Storage port for the persisted view. Constructor-injected so the state
/// layer has no hidden I/O and tests run against the in-memory stub.
pub trait FilterStore: Send + Sync {
    /// `Ok(None)` when nothing usable is stored.
    fn load(&self) -> Result<Option<PersistedView>>;
    fn save(&self, view: &PersistedView) -> Result<()>;
}

// ---------------------------------------------------------------------------
// InMemoryFilterStore
// ---------------------------------------------------------------------------

/// Test double; also the right choice for ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryFilterStore {
    view: Mutex<Option<PersistedView>>,
}

impl InMemoryFilterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FilterStore for InMemoryFilterStore {
    fn load(&self) -> Result<Option<PersistedView>> {
        Ok(self.view.lock().expect("filter store poisoned").clone())
    }

    fn save(&self, view: &PersistedView) -> Result<()> {
        *self.view.lock().expect("filter store poisoned") = Some(view.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JsonFileFilterStore
// ---------------------------------------------------------------------------

/// JSON file under a fixed path. Writes go through a sibling temp file and a
/// rename so a crash mid-write cannot leave a half-written view behind.
#[derive(Debug)]
pub struct JsonFileFilterStore {
    path: PathBuf,
}

impl JsonFileFilterStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut p = self.path.clone();
        p.set_extension("json.tmp");
        p
    }
}

impl FilterStore for JsonFileFilterStore {
    fn load(&self) -> Result<Option<PersistedView>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("read view file {:?}", self.path))
            }
        };
        match serde_json::from_str(&raw) {
            Ok(view) => Ok(Some(view)),
            Err(err) => {
                // A corrupt cache is not worth failing the session over.
                tracing::warn!(path = ?self.path, %err, "ignoring unreadable persisted view");
                Ok(None)
            }
        }
    }

    fn save(&self, view: &PersistedView) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create_dir_all {parent:?}"))?;
        }
        let tmp = self.tmp_path();
        let raw = serde_json::to_string_pretty(view).context("serialize persisted view")?;
        fs::write(&tmp, raw).with_context(|| format!("write {tmp:?}"))?;
        fs::rename(&tmp, &self.path).with_context(|| format!("rename into {:?}", self.path))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
