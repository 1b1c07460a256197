use crate::error::{AppError, Result};
use crate::model::{ShortenRequest, ShortenResponse, UrlInfoResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use blink_core::{ShortCode, ShortenParams};
use tracing::info;

pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>> {
    let Json(request) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let shortened = state
        .shortener()
        .shorten(ShortenParams {
            original_url: request.url,
            custom_slug: request.custom_slug,
        })
        .await?;

    info!(code = %shortened.short_code, "Created short URL");

    Ok(Json(ShortenResponse {
        short_url: shortened.short_url,
    }))
}

pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let code = ShortCode::new_unchecked(code);
    let original_url = state.shortener().resolve(&code).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, original_url)]).into_response())
}

pub async fn url_info_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UrlInfoResponse>> {
    let record = state
        .shortener()
        .lookup(&ShortCode::new_unchecked(code))
        .await?;

    Ok(Json(record.into()))
}
