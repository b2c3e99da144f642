//! Evaluation API surface and the caller-side pack cache behind it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::engagement::{self, EvaluationInput, EvaluationReport};
use crate::error::AppError;
use crate::packs::{Pack, PackError, PackStore};

/// Caller-side cache for loaded packs. The evaluation core performs no
/// caching itself; this registry loads each `(pack_id, version)` once and
/// shares the immutable result across requests. A stale entry is detected by
/// comparing `config_checksum` against a fresh load.
pub struct PackRegistry {
    store: PackStore,
    cache: Mutex<HashMap<(String, String), Arc<Pack>>>,
}

impl PackRegistry {
    pub fn new(store: PackStore) -> Self {
        Self {
            store,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &PackStore {
        &self.store
    }

    pub fn get(&self, pack_id: &str, version: &str) -> Result<Arc<Pack>, PackError> {
        let key = (pack_id.to_string(), version.to_string());
        {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(pack) = cache.get(&key) {
                return Ok(Arc::clone(pack));
            }
        }

        let pack = Arc::new(self.store.load(pack_id, version)?);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.entry(key).or_insert(pack)))
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<PackRegistry>,
}

/// Routes for the evaluation API, mounted by the binary alongside the
/// health and metrics endpoints.
pub fn evaluation_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/engagement/evaluate", post(evaluate_endpoint))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct EvaluateRequest {
    #[serde(default)]
    pack_id: Option<String>,
    /// Pack version to evaluate against; defaults to the version the pack's
    /// manifest currently declares.
    #[serde(default)]
    pack_version: Option<String>,
    #[serde(flatten)]
    input: EvaluationInput,
}

async fn evaluate_endpoint(
    State(state): State<ApiState>,
    Json(payload): Json<EvaluateRequest>,
) -> Result<Json<EvaluationReport>, AppError> {
    let EvaluateRequest {
        pack_id,
        pack_version,
        input,
    } = payload;

    // Without a pack id the request runs in legacy mode; a failed pack load
    // is an error, never a silent fallback.
    let pack = match pack_id {
        Some(pack_id) => {
            let version = match pack_version {
                Some(version) => version,
                None => state.registry.store().manifest_version(&pack_id)?,
            };
            Some(state.registry.get(&pack_id, &version)?)
        }
        None => None,
    };

    let report = engagement::evaluate(&input, pack.as_deref());
    Ok(Json(report))
}
