//! Model Handlers

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::application::ListModels;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Serialize)]
pub struct ModelListDto {
    pub models: Vec<String>,
    pub default_model: String,
    /// 列表来自内置备选
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// 列出可选模型；服务端不可用时仍返回备选列表
pub async fn list_models(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ModelListDto>>, ApiError> {
    let result = state.list_models_handler.handle(ListModels).await?;

    Ok(Json(ApiResponse::success(ModelListDto {
        models: result.models,
        default_model: result.default_model,
        fallback: result.fallback,
        warning: result.warning,
    })))
}
