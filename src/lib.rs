//! Shelfwright - 大纲驱动的书籍生成服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Book Context: 书名、大纲树、章节路径与正文
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Inference, SessionManager, BookExporter）
//! - Commands: 生成、编辑、导出、会话生命周期
//! - Queries: 书籍状态、模型列表
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket + 内嵌页面
//! - Memory: 会话内存实现
//! - Adapters: 对话补全客户端, Markdown/PDF/DOCX/EPUB 导出
//! - Events: 生成进度事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
