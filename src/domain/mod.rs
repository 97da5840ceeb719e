//! Domain Layer - 领域层
//!
//! 限界上下文:
//! - Book Context: 书名、大纲与章节正文

pub mod book;
