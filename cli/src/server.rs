use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, Request, State, rejection::JsonRejection},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{Local, Utc};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

use weighin_core::db::Database;
use weighin_core::models::{
    ErrorResponse, Goal, GoalInput, HealthResponse, WeightEntry, WeightInput, WeightsResponse,
    parse_iso_date, validate_goal_input, validate_weight_input,
};

const BODY_LIMIT: usize = 64 * 1024; // 64 KB

#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Database>>,
}

impl AppState {
    fn db(&self) -> std::sync::MutexGuard<'_, Database> {
        self.db
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[derive(Deserialize)]
struct WeightsQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

// --- Error handling ---

enum ApiError {
    NotFound(String),
    BadRequest(String),
    PayloadTooLarge,
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_string(),
            ),
            Self::Internal(err) => {
                tracing::error!("internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ApiError::PayloadTooLarge)
        }
        Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
    }
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::BadRequest("Invalid weight ID".to_string()))
}

fn not_found() -> ApiError {
    ApiError::NotFound("Weight entry not found".to_string())
}

// --- Middleware ---

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Health ---

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let timestamp = Utc::now().to_rfc3339();
    match state.db().ping() {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                database: "connected".to_string(),
                timestamp,
            }),
        ),
        Err(err) => {
            tracing::error!("health check failed: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    database: "disconnected".to_string(),
                    timestamp,
                }),
            )
        }
    }
}

// --- Weight handlers ---

async fn list_weights(
    State(state): State<AppState>,
    Query(params): Query<WeightsQuery>,
) -> Result<Json<WeightsResponse>, ApiError> {
    // Empty strings mean "no bound", same as an omitted parameter.
    let bound = |raw: Option<String>| -> Result<_, ApiError> {
        raw.filter(|s| !s.is_empty())
            .map(|s| parse_iso_date(&s).map_err(|e| ApiError::BadRequest(e.to_string())))
            .transpose()
    };
    let start = bound(params.start_date)?;
    let end = bound(params.end_date)?;

    let weights = state
        .db()
        .list_weights(start, end)
        .context("failed to list weights")?;
    Ok(Json(WeightsResponse { weights }))
}

async fn get_weight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WeightEntry>, ApiError> {
    let id = parse_id(&id)?;
    let entry = state
        .db()
        .get_weight(id)
        .context("database error")?
        .ok_or_else(not_found)?;
    Ok(Json(entry))
}

async fn create_weight(
    State(state): State<AppState>,
    payload: Result<Json<WeightInput>, JsonRejection>,
) -> Result<(StatusCode, Json<WeightEntry>), ApiError> {
    let input = json_body(payload)?;
    let entry = validate_weight_input(&input, Local::now().date_naive())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let created = state
        .db()
        .insert_weight(&entry)
        .context("failed to insert weight")?;
    tracing::info!(id = created.id, date = %created.date, "weight entry created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_weight(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<WeightInput>, JsonRejection>,
) -> Result<Json<WeightEntry>, ApiError> {
    let id = parse_id(&id)?;
    let input = json_body(payload)?;
    let entry = validate_weight_input(&input, Local::now().date_naive())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let updated = state
        .db()
        .update_weight(id, &entry)
        .context("failed to update weight")?
        .ok_or_else(not_found)?;
    tracing::info!(id, date = %updated.date, "weight entry updated");
    Ok(Json(updated))
}

async fn delete_weight(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let deleted = state
        .db()
        .delete_weight(id)
        .context("failed to delete weight")?;
    if !deleted {
        return Err(not_found());
    }
    tracing::info!(id, "weight entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

// --- Goal handlers ---

async fn get_goal(State(state): State<AppState>) -> Result<Json<Goal>, ApiError> {
    let goal = state.db().get_goal().context("failed to get goal")?;
    Ok(Json(goal))
}

async fn set_goal(
    State(state): State<AppState>,
    payload: Result<Json<GoalInput>, JsonRejection>,
) -> Result<Json<Goal>, ApiError> {
    let input = json_body(payload)?;
    let pounds = validate_goal_input(&input).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let goal = state.db().set_goal(pounds).context("failed to set goal")?;
    match goal.pounds {
        Some(pounds) => tracing::info!(pounds, "goal set"),
        None => tracing::info!("goal cleared"),
    }
    Ok(Json(goal))
}

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("invalid CORS origin '{origin}'"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]))
}

fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/weights", get(list_weights).post(create_weight))
        .route(
            "/weights/{id}",
            get(get_weight).put(update_weight).delete(delete_weight),
        )
        .route("/goal", get(get_goal).put(set_goal));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(cors)
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

/// The full application router over `db`.
pub fn app(db: Database, cors_origin: &str) -> anyhow::Result<Router> {
    let state = AppState {
        db: Arc::new(Mutex::new(db)),
    };
    Ok(build_router(state, cors_layer(cors_origin)?))
}

// --- Server startup ---

pub async fn start_server(
    db: Database,
    port: u16,
    bind: &str,
    cors_origin: &str,
) -> anyhow::Result<()> {
    let app = app(db, cors_origin)?;

    if bind != "127.0.0.1" && bind != "localhost" {
        tracing::warn!(
            "listening on {bind} with no authentication; any device on your network can access this API"
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
        .await
        .with_context(|| format!("failed to bind {bind}:{port}"))?;
    tracing::info!(cors_origin, "listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
