//! Process-wide cache of loaded model artifacts.
//!
//! Artifacts are immutable once loaded, so callers share them through `Arc`
//! without further locking. The mutex only guards the path map.

use crate::error::{ForecastError, Result};
use crate::models::ModelArtifact;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::debug;

static MODEL_CACHE: OnceLock<Mutex<HashMap<PathBuf, Arc<ModelArtifact>>>> = OnceLock::new();

fn model_cache() -> &'static Mutex<HashMap<PathBuf, Arc<ModelArtifact>>> {
    MODEL_CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn cache_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Load a model artifact once per path and reuse it afterwards
pub fn load_model_cached<P: AsRef<Path>>(path: P) -> Result<Arc<ModelArtifact>> {
    let key = cache_key(path.as_ref());

    {
        let guard = model_cache()
            .lock()
            .map_err(|_| ForecastError::ModelLoadError("Model cache lock poisoned".to_string()))?;
        if let Some(model) = guard.get(&key) {
            debug!(path = %key.display(), "model cache hit");
            return Ok(Arc::clone(model));
        }
    }

    // Loaded outside the lock; a concurrent loader of the same path keeps the first insert
    let loaded = Arc::new(ModelArtifact::load(&key)?);
    let mut guard = model_cache()
        .lock()
        .map_err(|_| ForecastError::ModelLoadError("Model cache lock poisoned".to_string()))?;
    let model = guard.entry(key).or_insert(loaded);
    Ok(Arc::clone(model))
}

/// Drop every cached artifact
pub fn clear_model_cache() {
    if let Ok(mut guard) = model_cache().lock() {
        guard.clear();
    }
}
