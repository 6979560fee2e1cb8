//! Axum server for the solgen pipeline

use crate::node::ChainProcess;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use solgen_core::{CheckOutcome, DeployOutcome, SolgenConfig};
use solgen_orchestrator::{standard_loop, StandardLoop};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::info;
use uuid::Uuid;

/// Shared application state
pub struct AppState {
    pipeline: StandardLoop,
    node: Mutex<Option<ChainProcess>>,
}

pub type SharedState = Arc<AppState>;

/// Body of `POST /process`
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub prompt: String,
}

/// Successful response of `POST /process`
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResponse {
    pub generated_code: Option<String>,
    pub check_results: Option<CheckOutcome>,
    pub deploy_results: Option<DeployOutcome>,
    pub attempts: u32,
    pub succeeded: bool,
}

/// Serve the pipeline, owning a freshly spawned development chain
pub async fn serve(config: SolgenConfig, port: u16) -> anyhow::Result<()> {
    let node = ChainProcess::spawn(&config.chain)?;
    let pipeline = standard_loop(&config)?;

    let app_state = Arc::new(AppState {
        pipeline,
        node: Mutex::new(Some(node)),
    });

    let app = Router::new()
        .route("/", get(index))
        .route("/process", post(process))
        .route("/shutdown", post(shutdown))
        .layer(CorsLayer::permissive())
        .with_state(app_state.clone());

    let addr = format!("0.0.0.0:{}", port);
    info!("solgen service listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    // Release the chain if it is still ours when the server stops
    if let Some(node) = app_state.node.lock().await.take() {
        node.shutdown().await?;
    }
    Ok(())
}

/// GET / - liveness
async fn index(State(app): State<SharedState>) -> Json<serde_json::Value> {
    let chain = app
        .node
        .lock()
        .await
        .as_ref()
        .map(|node| node.command().to_string());
    Json(serde_json::json!({
        "status": "ok",
        "service": "solgen",
        "chain": chain,
    }))
}

/// POST /process - run one generation loop
async fn process(State(app): State<SharedState>, Json(request): Json<ProcessRequest>) -> Response {
    if request.prompt.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "prompt is required"})),
        )
            .into_response();
    }

    let run_id = Uuid::new_v4();
    info!(%run_id, "processing generation request");

    let result = app.pipeline.run(&request.prompt).await;

    info!(
        %run_id,
        succeeded = result.succeeded,
        attempts = result.attempts,
        "generation request finished"
    );

    if !result.succeeded {
        // Surface the final feedback verbatim so the caller can diagnose
        // what the loop could not self-correct
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "failed to generate and deploy a passing contract",
                "attempts": result.attempts,
                "last_error_stage": result.last_error_stage,
                "feedback": result.feedback,
            })),
        )
            .into_response();
    }

    Json(ProcessResponse {
        generated_code: result.final_code,
        check_results: result.feedback.check_results,
        deploy_results: result.feedback.deploy_results,
        attempts: result.attempts,
        succeeded: true,
    })
    .into_response()
}

/// POST /shutdown - terminate the managed development chain
async fn shutdown(State(app): State<SharedState>) -> Response {
    match app.node.lock().await.take() {
        Some(node) => match node.shutdown().await {
            Ok(()) => Json(serde_json::json!({"status": "chain terminated"})).into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response(),
        },
        None => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": "chain already terminated"})),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_request_deserializes() {
        let request: ProcessRequest =
            serde_json::from_str(r#"{"prompt": "a voting contract"}"#).unwrap();
        assert_eq!(request.prompt, "a voting contract");

        let request: ProcessRequest = serde_json::from_str("{}").unwrap();
        assert!(request.prompt.is_empty());
    }

    #[test]
    fn test_process_response_shape() {
        let response = ProcessResponse {
            generated_code: Some("contract A {}".to_string()),
            check_results: Some(CheckOutcome::success(None, Vec::new())),
            deploy_results: Some(DeployOutcome::success("0xabc")),
            attempts: 1,
            succeeded: true,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["succeeded"], true);
        assert_eq!(value["attempts"], 1);
        assert_eq!(value["deploy_results"]["contract_address"], "0xabc");
        assert_eq!(value["check_results"]["status"], "Success");
    }
}
