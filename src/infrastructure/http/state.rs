//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CloseSessionHandler, CreateSessionHandler, EditSectionHandler, ExportBookHandler,
    GenerateBookHandler, ResetSessionHandler,
    // Query handlers
    GetBookHandler, ListModelsHandler,
    // Ports
    BookExporterPort, InferencePort, SessionManagerPort,
};
use crate::domain::book::OutlineLimits;
use crate::infrastructure::events::EventPublisher;

/// 应用状态
///
/// 会话状态全部在内存中，进程退出即丢失
pub struct AppState {
    // ========== Ports ==========
    pub session_manager: Arc<dyn SessionManagerPort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub create_session_handler: CreateSessionHandler,
    pub close_session_handler: CloseSessionHandler,
    pub reset_session_handler: ResetSessionHandler,
    pub generate_book_handler: GenerateBookHandler,
    pub edit_section_handler: EditSectionHandler,
    pub export_book_handler: ExportBookHandler,

    // ========== Query Handlers ==========
    pub get_book_handler: GetBookHandler,
    pub list_models_handler: ListModelsHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        inference: Arc<dyn InferencePort>,
        session_manager: Arc<dyn SessionManagerPort>,
        exporter: Arc<dyn BookExporterPort>,
        event_publisher: Arc<EventPublisher>,
        limits: OutlineLimits,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            // Ports
            session_manager: session_manager.clone(),
            event_publisher: event_publisher.clone(),

            // Command handlers
            create_session_handler: CreateSessionHandler::new(
                session_manager.clone(),
                event_publisher.clone(),
            ),
            close_session_handler: CloseSessionHandler::new(
                session_manager.clone(),
                event_publisher.clone(),
            ),
            reset_session_handler: ResetSessionHandler::new(session_manager.clone()),
            generate_book_handler: GenerateBookHandler::new(
                inference.clone(),
                session_manager.clone(),
                event_publisher.clone(),
                limits,
            ),
            edit_section_handler: EditSectionHandler::new(session_manager.clone()),
            export_book_handler: ExportBookHandler::new(session_manager.clone(), exporter),

            // Query handlers
            get_book_handler: GetBookHandler::new(session_manager),
            list_models_handler: ListModelsHandler::new(inference, default_model),
        }
    }
}
