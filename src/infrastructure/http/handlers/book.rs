//! Book Handlers - 生成、查看、编辑、导出

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{
    EditSectionCommand, ExportBookCommand, ExportFormat, GenerateBookCommand, GetBook,
};
use crate::domain::book::SectionPath;
use crate::infrastructure::http::dto::{ApiResponse, BookStateView, BookView, StatisticsView};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Generate
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GenerateBookRequest {
    pub session_id: String,
    pub topic: String,
    #[serde(default)]
    pub instructions: String,
    pub title_model: String,
    pub structure_model: String,
    pub content_model: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateBookResponseDto {
    pub session_id: String,
    pub book: BookView,
    pub statistics: StatisticsView,
}

/// 同步执行完整的生成流程，进度通过 WebSocket 推送
pub async fn generate_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateBookRequest>,
) -> Result<Json<ApiResponse<GenerateBookResponseDto>>, ApiError> {
    let cmd = GenerateBookCommand {
        session_id: req.session_id,
        topic: req.topic,
        instructions: req.instructions,
        title_model: req.title_model,
        structure_model: req.structure_model,
        content_model: req.content_model,
    };

    let result = state.generate_book_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(GenerateBookResponseDto {
        session_id: result.session_id,
        book: BookView::from(&result.book),
        statistics: StatisticsView::from(&result.statistics),
    })))
}

// ============================================================================
// Get
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GetBookRequest {
    pub session_id: String,
}

pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetBookRequest>,
) -> Result<Json<ApiResponse<BookStateView>>, ApiError> {
    let query = GetBook {
        session_id: req.session_id,
    };

    let result = state.get_book_handler.handle(query).await?;

    Ok(Json(ApiResponse::success(BookStateView::from(result))))
}

// ============================================================================
// Update Section
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateSectionRequest {
    pub session_id: String,
    /// 从顶层到目标章节的标题列表
    pub path: Vec<String>,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateSectionResponseDto {
    pub session_id: String,
    pub path: SectionPath,
}

pub async fn update_section(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateSectionRequest>,
) -> Result<Json<ApiResponse<UpdateSectionResponseDto>>, ApiError> {
    let path = SectionPath::new(req.path).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let cmd = EditSectionCommand {
        session_id: req.session_id,
        path,
        content: req.content,
    };

    let result = state.edit_section_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(UpdateSectionResponseDto {
        session_id: result.session_id,
        path: result.path,
    })))
}

// ============================================================================
// Export
// ============================================================================

/// 下载导出文件（GET 便于浏览器直接下载）
pub async fn export_book(
    State(state): State<Arc<AppState>>,
    Path((session_id, format)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = format
        .parse()
        .map_err(|e: crate::application::ExportError| ApiError::BadRequest(e.to_string()))?;

    let cmd = ExportBookCommand { session_id, format };
    let file = state.export_book_handler.handle(cmd).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.content_type)
        .header(header::CONTENT_LENGTH, file.data.len())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&file.file_name),
        )
        .body(Body::from(file.data))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

/// 附件头：ASCII 文件名兜底 + RFC 5987 编码的 UTF-8 文件名
fn content_disposition(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::with_capacity(file_name.len() * 3);
    for byte in file_name.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii, encoded
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("My Book.pdf"),
            "attachment; filename=\"My Book.pdf\"; filename*=UTF-8''My%20Book.pdf"
        );
        assert_eq!(
            content_disposition("Café.md"),
            "attachment; filename=\"Caf_.md\"; filename*=UTF-8''Caf%C3%A9.md"
        );
    }
}
