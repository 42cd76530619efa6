use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use newsrank_core::persist::{load_corpus, load_or_build, save_catalog, IndexPaths};
use newsrank_core::{Catalog, IndexSettings, SearchHit, DEFAULT_TOP_K};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { DEFAULT_TOP_K }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

pub struct ServerOptions {
    pub index_dir: PathBuf,
    pub corpus: PathBuf,
    pub settings: IndexSettings,
    pub rebuild: bool,
    pub admin_token: Option<String>,
    /// Comma-separated origins; any origin when unset or empty.
    pub cors_allow_origin: Option<String>,
}

/// Served catalog. Queries clone the inner `Arc`; a rebuild swaps it wholesale.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<Arc<Catalog>>>,
    /// Held for the whole build-save-swap of a rebuild, one rebuild at a time.
    pub rebuild_lock: Arc<Mutex<()>>,
    pub index_dir: PathBuf,
    pub corpus_path: PathBuf,
    pub admin_token: Option<String>,
}

impl AppState {
    fn current(&self) -> Arc<Catalog> { self.catalog.read().clone() }
}

pub fn build_app(opts: ServerOptions) -> Result<Router> {
    let corpus = load_corpus(&opts.corpus)?;
    let paths = IndexPaths::new(&opts.index_dir);
    let catalog = load_or_build(&paths, corpus, opts.settings, opts.rebuild)?;
    tracing::info!(
        num_docs = catalog.num_docs(),
        num_terms = catalog.index().len(),
        "catalog loaded"
    );

    let app_state = AppState {
        catalog: Arc::new(RwLock::new(Arc::new(catalog))),
        rebuild_lock: Arc::new(Mutex::new(())),
        index_dir: opts.index_dir,
        corpus_path: opts.corpus,
        admin_token: opts.admin_token,
    };

    let origins: Vec<_> = opts
        .cors_allow_origin
        .as_deref()
        .unwrap_or("")
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/index/rebuild", post(rebuild_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let k = params.k.clamp(1, 100);
    let results = state.current().search(&params.q, k);
    let elapsed = start.elapsed();
    Json(SearchResponse {
        query: params.q,
        took_s: elapsed.as_secs_f64(),
        total_hits: results.total_hits,
        results: results.hits,
    })
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let catalog = state.current();
    let article = catalog.article(&doc_id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(serde_json::json!({
        "doc_id": doc_id,
        "title": article.title,
        "url": article.url,
        "content": article.content,
    })))
}

/// Re-read the corpus, rebuild with the current settings, persist, then swap.
async fn rebuild_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    tracing::info!(corpus = %state.corpus_path.display(), "rebuild requested");

    // Blocking thread: waits for any running rebuild, then builds, saves and swaps
    // under the lock so the files on disk and the served catalog never disagree.
    let body = tokio::task::spawn_blocking(move || -> Result<serde_json::Value> {
        let _guard = state.rebuild_lock.lock();
        let settings = *state.current().settings();
        let catalog = Catalog::build(load_corpus(&state.corpus_path)?, settings)?;
        save_catalog(&IndexPaths::new(&state.index_dir), &catalog)?;
        let body = serde_json::json!({
            "num_docs": catalog.num_docs(),
            "num_terms": catalog.index().len(),
        });
        *state.catalog.write() = Arc::new(catalog);
        Ok(body)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;

    Ok(Json(body))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
