//! Session Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{CloseSessionCommand, CreateSessionCommand, ResetSessionCommand};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponseDto {
    pub session_id: String,
}

// ============================================================================
// Create Session
// ============================================================================

pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SessionResponseDto>>, ApiError> {
    let result = state
        .create_session_handler
        .handle(CreateSessionCommand)
        .await?;

    Ok(Json(ApiResponse::success(SessionResponseDto {
        session_id: result.session_id,
    })))
}

// ============================================================================
// Close Session
// ============================================================================

pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<ApiResponse<SessionResponseDto>>, ApiError> {
    let cmd = CloseSessionCommand {
        session_id: req.session_id,
    };

    let result = state.close_session_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(SessionResponseDto {
        session_id: result.session_id,
    })))
}

// ============================================================================
// Reset Session
// ============================================================================

pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<ApiResponse<SessionResponseDto>>, ApiError> {
    let cmd = ResetSessionCommand {
        session_id: req.session_id,
    };

    let result = state.reset_session_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(SessionResponseDto {
        session_id: result.session_id,
    })))
}
