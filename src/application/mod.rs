//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Inference、SessionManager、BookExporter）
//! - generation: 书名 / 结构 / 章节的提示词与单次调用
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod generation;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Book commands
    EditSectionCommand,
    EditSectionResponse,
    ExportBookCommand,
    GenerateBookCommand,
    GenerateBookResponse,
    // Session commands
    CloseSessionCommand,
    CloseSessionResponse,
    CreateSessionCommand,
    CreateSessionResponse,
    ResetSessionCommand,
    ResetSessionResponse,
    // Handlers
    handlers::{
        CloseSessionHandler, CreateSessionHandler, EditSectionHandler, ExportBookHandler,
        GenerateBookHandler, ResetSessionHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Exporter
    sanitize_file_stem,
    BookExporterPort,
    ExportError,
    ExportFormat,
    ExportedFile,
    // Inference
    ChatRequest,
    ChatResponse,
    GenerationStatistics,
    InferenceError,
    InferencePort,
    // Session manager
    BookSession,
    SessionError,
    SessionManagerPort,
    SessionStatus,
};

pub use queries::{
    GetBook,
    ListModels,
    // Handlers
    handlers::{
        BookStateResponse, GetBookHandler, ListModelsHandler, ModelListResponse, FALLBACK_MODELS,
    },
};
