//! Data Transfer Objects

use serde::Serialize;

use crate::application::{BookStateResponse, GenerationStatistics};
use crate::domain::book::{Book, SectionPath};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Book DTOs
// ============================================================================

/// 页面展示用的书籍视图：章节按深度优先顺序展平
#[derive(Debug, Serialize)]
pub struct BookView {
    pub title: String,
    pub total_sections: usize,
    pub complete: bool,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Serialize)]
pub struct SectionView {
    pub path: SectionPath,
    /// 标题层级，顶层章节为 2（书名占用 1）
    pub level: usize,
    pub title: String,
    pub is_leaf: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl From<&Book> for BookView {
    fn from(book: &Book) -> Self {
        let mut sections = Vec::new();
        book.walk(|path, section| {
            sections.push(SectionView {
                path: path.clone(),
                level: path.depth() + 1,
                title: section.title().to_string(),
                is_leaf: section.is_leaf(),
                content: section.content().map(str::to_string),
            });
        });

        Self {
            title: book.title().to_string(),
            total_sections: book.leaf_count(),
            complete: book.is_complete(),
            sections,
        }
    }
}

/// 生成统计视图
#[derive(Debug, Serialize)]
pub struct StatisticsView {
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub input_time: f64,
    pub output_time: f64,
    pub total_time: f64,
    /// tokens/s
    pub output_speed: f64,
}

impl From<&GenerationStatistics> for StatisticsView {
    fn from(stats: &GenerationStatistics) -> Self {
        Self {
            model: stats.model.clone(),
            input_tokens: stats.input_tokens,
            output_tokens: stats.output_tokens,
            total_tokens: stats.total_tokens(),
            input_time: stats.input_time,
            output_time: stats.output_time,
            total_time: stats.total_time,
            output_speed: stats.output_speed(),
        }
    }
}

/// 会话中书籍的完整状态
#[derive(Debug, Serialize)]
pub struct BookStateView {
    pub session_id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<BookView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<StatisticsView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl From<BookStateResponse> for BookStateView {
    fn from(state: BookStateResponse) -> Self {
        Self {
            session_id: state.session_id,
            status: state.status.as_str(),
            book: state.book.as_ref().map(BookView::from),
            statistics: state.statistics.as_ref().map(StatisticsView::from),
            last_error: state.last_error,
        }
    }
}
