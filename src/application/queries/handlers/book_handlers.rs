//! Book Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    BookSession, GenerationStatistics, InferencePort, SessionManagerPort, SessionStatus,
};
use crate::application::queries::{GetBook, ListModels};
use crate::domain::book::Book;

/// 服务端模型列表不可用时的备选模型
pub const FALLBACK_MODELS: [&str; 3] = ["llama3-8b-8192", "llama3-70b-8192", "gemma-7b-it"];

// ============================================================================
// Response DTOs
// ============================================================================

/// 会话中书籍的状态
#[derive(Debug, Clone)]
pub struct BookStateResponse {
    pub session_id: String,
    pub status: SessionStatus,
    pub book: Option<Book>,
    pub statistics: Option<GenerationStatistics>,
    pub last_error: Option<String>,
}

impl From<BookSession> for BookStateResponse {
    fn from(session: BookSession) -> Self {
        Self {
            session_id: session.id,
            status: session.status,
            book: session.book,
            statistics: session.statistics,
            last_error: session.last_error,
        }
    }
}

/// 模型列表
#[derive(Debug, Clone)]
pub struct ModelListResponse {
    pub models: Vec<String>,
    /// 页面默认选中的模型
    pub default_model: String,
    /// 列表来自内置备选而非服务端
    pub fallback: bool,
    pub warning: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GetBook Handler
pub struct GetBookHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl GetBookHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, query: GetBook) -> Result<BookStateResponse, ApplicationError> {
        let session = self.session_manager.get(&query.session_id)?;
        self.session_manager.touch(&query.session_id);
        Ok(BookStateResponse::from(session))
    }
}

/// ListModels Handler
///
/// 服务端列表获取失败或为空时返回备选列表并附带警告
pub struct ListModelsHandler {
    inference: Arc<dyn InferencePort>,
    default_model: String,
}

impl ListModelsHandler {
    pub fn new(inference: Arc<dyn InferencePort>, default_model: impl Into<String>) -> Self {
        Self {
            inference,
            default_model: default_model.into(),
        }
    }

    pub async fn handle(&self, _query: ListModels) -> Result<ModelListResponse, ApplicationError> {
        let warning = match self.inference.list_models().await {
            Ok(mut models) if !models.is_empty() => {
                models.sort();
                return Ok(ModelListResponse {
                    models,
                    default_model: self.default_model.clone(),
                    fallback: false,
                    warning: None,
                });
            }
            Ok(_) => "Provider returned no models".to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list models, using fallback list");
                format!("Could not list models: {}", e)
            }
        };

        Ok(ModelListResponse {
            models: FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
            default_model: self.default_model.clone(),
            fallback: true,
            warning: Some(warning),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::FakeChatClient;
    use crate::infrastructure::memory::InMemorySessionManager;

    #[tokio::test]
    async fn test_list_models_from_provider() {
        let client = FakeChatClient::new().with_models(vec![
            "mixtral-8x7b-32768".to_string(),
            "gemma-7b-it".to_string(),
        ]);
        let response = ListModelsHandler::new(Arc::new(client), "gemma-7b-it")
            .handle(ListModels)
            .await
            .unwrap();
        assert!(!response.fallback);
        assert_eq!(response.models, vec!["gemma-7b-it", "mixtral-8x7b-32768"]);
    }

    #[tokio::test]
    async fn test_list_models_fallback() {
        let response = ListModelsHandler::new(Arc::new(FakeChatClient::new()), "llama3-70b-8192")
            .handle(ListModels)
            .await
            .unwrap();
        assert!(response.fallback);
        assert!(response.warning.is_some());
        assert_eq!(response.models, FALLBACK_MODELS.to_vec());
        assert_eq!(response.default_model, "llama3-70b-8192");
    }

    #[tokio::test]
    async fn test_get_book_unknown_session() {
        let sessions: Arc<dyn SessionManagerPort> = InMemorySessionManager::new().arc();
        let err = GetBookHandler::new(sessions)
            .handle(GetBook {
                session_id: "missing".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_book_empty_session() {
        let sessions: Arc<dyn SessionManagerPort> = InMemorySessionManager::new().arc();
        let id = sessions.create(BookSession::new()).unwrap();
        let response = GetBookHandler::new(sessions)
            .handle(GetBook { session_id: id })
            .await
            .unwrap();
        assert_eq!(response.status, SessionStatus::Idle);
        assert!(response.book.is_none());
    }
}
