//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for transcript ingestion, question answering and
//! chunk ranking.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::DeenbotError;
use crate::language::Lang;
use crate::orchestrator::Orchestrator;
use crate::rag::AskOptions;
use crate::ranking::ScoringStrategy;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let app = router(Arc::new(AppState { orchestrator }));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("DeenBot API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ingest", "POST /transcripts");
    Output::kv("List", "GET  /transcripts");
    Output::kv("Ask", "POST /ask");
    Output::kv("Rank", "POST /rank");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/transcripts", post(ingest).get(list_transcripts))
        .route("/ask", post(ask))
        .route("/rank", post(rank))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct IngestRequest {
    text: String,
    #[serde(default)]
    context_id: Option<String>,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
    context_id: String,
    #[serde(default = "default_use_llm")]
    use_llm: bool,
    #[serde(default)]
    lang: Option<Lang>,
}

fn default_use_llm() -> bool {
    true
}

#[derive(Deserialize)]
struct RankRequest {
    question: String,
    context_id: String,
    #[serde(default)]
    strategy: Option<ScoringStrategy>,
    #[serde(default)]
    lang: Option<Lang>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(e: DeenbotError) -> Response {
    let status = match e {
        DeenbotError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DeenbotError::ContextNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ingest(State(state): State<Arc<AppState>>, Json(req): Json<IngestRequest>) -> Response {
    match state
        .orchestrator
        .ingest(&req.text, req.context_id.as_deref())
        .await
    {
        Ok(result) => (StatusCode::CREATED, Json(result)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn list_transcripts(State(state): State<Arc<AppState>>) -> Response {
    match state.orchestrator.list().await {
        Ok(contexts) => Json(serde_json::json!({
            "total": contexts.len(),
            "contexts": contexts,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Always answers; failures surface as template text in the answer.
async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> Response {
    let options = AskOptions {
        use_llm: req.use_llm,
        lang: req.lang,
    };
    let answer = state
        .orchestrator
        .ask(&req.question, &req.context_id, &options)
        .await;
    Json(answer).into_response()
}

async fn rank(State(state): State<Arc<AppState>>, Json(req): Json<RankRequest>) -> Response {
    match state
        .orchestrator
        .rank(&req.question, &req.context_id, req.strategy, req.lang)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(e),
    }
}
