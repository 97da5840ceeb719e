//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{ExportError, InferenceError, SessionError};
use crate::domain::book::{BookError, OutlineError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 模型返回的结构无法作为大纲
    #[error("Invalid outline: {0}")]
    OutlineError(#[from] OutlineError),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 同一会话已有生成在进行
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 导出错误
    #[error("Export error: {0}")]
    ExportError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<SessionError> for ApplicationError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(id) => Self::not_found("Session", id),
            SessionError::AlreadyExists(id) => {
                Self::invalid_state(format!("Session already exists: {}", id))
            }
            SessionError::GenerationInProgress(id) => {
                Self::Conflict(format!("Generation already running in session {}", id))
            }
            SessionError::NoBook(id) => {
                Self::invalid_state(format!("No book has been generated in session {}", id))
            }
            SessionError::Book(e) => e.into(),
        }
    }
}

impl From<BookError> for ApplicationError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::SectionNotFound(path) => Self::not_found("Section", path.to_string()),
            other => Self::ValidationError(other.to_string()),
        }
    }
}

impl From<InferenceError> for ApplicationError {
    fn from(err: InferenceError) -> Self {
        Self::ExternalServiceError(err.to_string())
    }
}

impl From<ExportError> for ApplicationError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::UnsupportedFormat(format) => {
                Self::validation(format!("Unsupported export format: {}", format))
            }
            other => Self::ExportError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::SectionPath;

    #[test]
    fn test_session_error_mapping() {
        assert!(matches!(
            ApplicationError::from(SessionError::NotFound("s1".into())),
            ApplicationError::NotFound {
                resource_type: "Session",
                ..
            }
        ));
        assert!(matches!(
            ApplicationError::from(SessionError::GenerationInProgress("s1".into())),
            ApplicationError::Conflict(_)
        ));
        assert!(matches!(
            ApplicationError::from(SessionError::Book(BookError::NotALeaf(SectionPath::root(
                "Part"
            )))),
            ApplicationError::ValidationError(_)
        ));
    }

    #[test]
    fn test_external_errors_mapping() {
        assert!(matches!(
            ApplicationError::from(InferenceError::Timeout),
            ApplicationError::ExternalServiceError(_)
        ));
        assert!(matches!(
            ApplicationError::from(ExportError::RenderError("bad".into())),
            ApplicationError::ExportError(_)
        ));
        assert!(matches!(
            ApplicationError::from(OutlineError::Empty),
            ApplicationError::OutlineError(_)
        ));
    }
}
