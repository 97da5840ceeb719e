//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod exporter;
mod inference;
mod session_manager;

pub use exporter::{
    sanitize_file_stem, BookExporterPort, ExportError, ExportFormat, ExportedFile,
};
pub use inference::{
    ChatRequest, ChatResponse, GenerationStatistics, InferenceError, InferencePort,
};
pub use session_manager::{BookSession, SessionError, SessionManagerPort, SessionStatus};
