//! Study plan HTTP server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/study/plan` | Generate a study plan from the caller's material |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Request
//!
//! ```json
//! { "userId": "u1", "availableTime": 90 }
//! ```
//!
//! `availableTime` may be a number or a numeric string.
//!
//! # Responses
//!
//! | Status | Body |
//! |--------|------|
//! | 200 | `{ "status": "success", "studyPlan": {...}, "warnings": [...] }` |
//! | 400 | `{ "error": "..." }` (bad input, no material uploaded) |
//! | 500 | `{ "error": "Failed to generate study plan. Please try again.", "details": "..." }` |
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser front-ends
//! can call the API directly.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use study_coach_core::pipeline::{ErrorResponse, PlanResponse, Reply, StudyCoach};
use study_coach_core::request::RawPlanRequest;

use crate::coach::coach_from_config;
use crate::config::Config;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    coach: Arc<StudyCoach>,
}

/// Starts the HTTP server on `[server].bind` and runs until the process
/// is terminated.
///
/// # Errors
///
/// Fails if the generation provider cannot be configured (for example a
/// missing API key) or the address cannot be bound.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let coach = Arc::new(coach_from_config(config)?);
    let app = router(coach);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        bind = %config.server.bind,
        provider = %config.generation.provider,
        "study coach listening"
    );
    println!("Study coach listening on http://{}", config.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Router with all endpoints and CORS applied.
pub fn router(coach: Arc<StudyCoach>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/study/plan", post(handle_plan))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { coach })
}

// ============ Error response ============

/// Error body paired with its HTTP status.
struct AppError {
    status: StatusCode,
    body: ErrorResponse,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        body: ErrorResponse {
            error: message.into(),
            details: None,
        },
    }
}

// ============ POST /study/plan ============

async fn handle_plan(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<PlanResponse>, AppError> {
    let Json(value) = payload.map_err(|rejection| {
        tracing::info!("rejected study plan body: {}", rejection.body_text());
        bad_request(rejection.body_text())
    })?;

    // Wrong-typed fields are a client error, not a 422.
    let raw: RawPlanRequest = serde_json::from_value(value)
        .map_err(|e| bad_request(format!("Invalid request body: {}", e)))?;

    match state.coach.respond(&raw).await {
        Reply::Success(response) => Ok(Json(response)),
        Reply::Rejected(body) => Err(AppError {
            status: StatusCode::BAD_REQUEST,
            body,
        }),
        Reply::Failed(body) => Err(AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body,
        }),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use study_coach_core::context::ContextLimits;
    use study_coach_core::generation::{CannedGenerator, DisabledGenerator, Generator};
    use study_coach_core::store::memory::InMemoryMaterialStore;
    use tower::ServiceExt;

    const PLAN: &str = r#"Here you go:
{"totalTimeMinutes": 30, "pomodoroCount": 1, "cycles": [
  {"cycleNumber": 1, "studyMinutes": 25, "quizMinutes": 5, "focusTask": "Mitosis",
   "objectives": ["Name the phases"],
   "quiz": [{"question": "First phase?", "options": ["A) Prophase", "B) Anaphase", "C) Telophase", "D) Metaphase"], "answer": "A"}]}
], "breakMinutes": 0, "longBreakMinutes": 0, "tips": ["Sleep"], "summary": "Cell division"}"#;

    fn app(generator: Arc<dyn Generator>) -> Router {
        let store = InMemoryMaterialStore::new();
        store
            .insert("u1", "bio.pdf#0", "bio.pdf", "Mitosis has four phases.")
            .unwrap();
        router(Arc::new(StudyCoach::new(
            Arc::new(store),
            generator,
            ContextLimits::default(),
        )))
    }

    async fn post_plan(app: Router, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/study/plan")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_plan_success() {
        let (status, body) = post_plan(
            app(Arc::new(CannedGenerator::new(PLAN))),
            r#"{"userId": "u1", "availableTime": "30"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["studyPlan"]["totalTimeMinutes"], 30);
        assert_eq!(body["studyPlan"]["materialsUsed"], json!(["bio.pdf"]));
        assert_eq!(
            body["studyPlan"]["cycles"][0]["quiz"][0]["answerLabel"],
            "A"
        );
        assert!(body["studyPlan"]["createdAt"].is_string());
        assert!(body.get("warnings").is_none());
    }

    #[tokio::test]
    async fn test_missing_user_is_400() {
        let (status, body) = post_plan(
            app(Arc::new(DisabledGenerator)),
            r#"{"availableTime": 30}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "userId is required");
    }

    #[tokio::test]
    async fn test_no_material_is_400() {
        let (status, body) = post_plan(
            app(Arc::new(DisabledGenerator)),
            r#"{"userId": "stranger", "availableTime": 30}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("No study material found"));
    }

    #[tokio::test]
    async fn test_generation_failure_is_500_with_details() {
        let (status, body) = post_plan(
            app(Arc::new(DisabledGenerator)),
            r#"{"userId": "u1", "availableTime": 30}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "Failed to generate study plan. Please try again."
        );
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_unusable_plan_is_500_without_model_text() {
        let (status, body) = post_plan(
            app(Arc::new(CannedGenerator::new(
                r#"{"cycles": "PRIVATE MODEL TEXT"}"#,
            ))),
            r#"{"userId": "u1", "availableTime": 30}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("PRIVATE"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let (status, body) = post_plan(app(Arc::new(DisabledGenerator)), "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Arc::new(DisabledGenerator))
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
