use crate::error::ExtractionError;
use crate::model::RecipesResponse;
use crate::pipeline::RecipeExtractor;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// The shared application state.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<RecipeExtractor>,
}

/// Query string of `/extract-ingredients`
#[derive(Debug, Deserialize)]
pub struct ExtractParams {
    pub video: String,
}

/// Creates the router with all application routes.
pub fn create_router(extractor: Arc<RecipeExtractor>, cors_permissive: bool) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/extract-ingredients", get(extract_ingredients))
        .with_state(AppState { extractor });

    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Serve the router until the listener fails
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router).await
}

async fn root() -> Json<Value> {
    Json(json!({ "Hello": "World" }))
}

async fn extract_ingredients(
    State(state): State<AppState>,
    Query(params): Query<ExtractParams>,
) -> Result<Json<RecipesResponse>, AppError> {
    info!("Received extraction request for video '{}'", params.video);

    let response = state.extractor.extract(&params.video).await?;
    Ok(Json(response))
}

/// Maps pipeline failures onto HTTP responses.
///
/// Callers only learn whether the transcript was missing; which stage failed
/// and how many attempts were made is logged.
pub struct AppError(ExtractionError);

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = if self.0.is_not_found() {
            warn!("{}", self.0);
            (
                StatusCode::NOT_FOUND,
                "Transcript not found or unavailable for this video.",
            )
        } else {
            error!("{}", self.0);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to extract or parse ingredients.",
            )
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
