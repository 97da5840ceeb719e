//! Session Manager Port - 会话生命周期管理
//!
//! 定义会话管理的抽象接口，具体实现在 infrastructure/memory 层

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::GenerationStatistics;
use crate::domain::book::{Book, BookError, SectionPath};

/// Session Manager 错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session already exists: {0}")]
    AlreadyExists(String),

    #[error("Generation already running in session: {0}")]
    GenerationInProgress(String),

    #[error("No book in session: {0}")]
    NoBook(String),

    #[error(transparent)]
    Book(#[from] BookError),
}

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// 尚未生成
    Idle,
    /// 正在生成
    Generating,
    /// 生成完成，可导出
    Ready,
    /// 最近一次生成失败
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Generating => "generating",
            SessionStatus::Ready => "ready",
            SessionStatus::Failed => "failed",
        }
    }
}

/// 会话状态（in-memory）
///
/// book 只保存完整生成成功的书，生成失败时保留上一次成功的结果
#[derive(Debug, Clone)]
pub struct BookSession {
    pub id: String,
    pub status: SessionStatus,
    pub book: Option<Book>,
    pub statistics: Option<GenerationStatistics>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl BookSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            status: SessionStatus::Idle,
            book: None,
            statistics: None,
            last_error: None,
            created_at: now,
            last_activity: now,
        }
    }
}

impl Default for BookSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Session Manager Port
///
/// 管理页面会话的生命周期，所有状态存储在内存中
pub trait SessionManagerPort: Send + Sync {
    /// 创建新会话
    fn create(&self, session: BookSession) -> Result<String, SessionError>;

    /// 获取会话快照
    fn get(&self, id: &str) -> Result<BookSession, SessionError>;

    /// 标记开始生成；同一会话已在生成时返回 GenerationInProgress
    fn begin_generation(&self, id: &str) -> Result<(), SessionError>;

    /// 提交完整生成的书
    fn complete_generation(
        &self,
        id: &str,
        book: Book,
        statistics: GenerationStatistics,
    ) -> Result<(), SessionError>;

    /// 记录生成失败，已有的书保持不变
    fn fail_generation(&self, id: &str, error: String) -> Result<(), SessionError>;

    /// 手动编辑某个章节的正文
    fn update_section(
        &self,
        id: &str,
        path: &SectionPath,
        content: String,
    ) -> Result<(), SessionError>;

    /// 丢弃会话中的书与统计，回到 Idle；生成中返回 GenerationInProgress
    fn reset(&self, id: &str) -> Result<(), SessionError>;

    /// 检查会话是否有效
    fn is_valid(&self, id: &str) -> bool;

    /// 关闭会话
    fn close(&self, id: &str) -> Result<(), SessionError>;

    /// 更新最后活动时间
    fn touch(&self, id: &str);

    /// 获取所有过期会话的 ID（生成中的会话不会过期）
    fn get_expired_sessions(&self, idle_timeout_secs: u64) -> Vec<String>;

    /// 获取所有会话 ID
    fn list_all(&self) -> Vec<String>;
}
