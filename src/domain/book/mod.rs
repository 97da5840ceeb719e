//! Book Context - 书籍限界上下文
//!
//! 职责:
//! - 大纲解析与边界校验
//! - Book 聚合（书名 + 章节树）
//! - 章节正文写入与 Markdown 展平

mod aggregate;
mod entities;
mod errors;
mod outline;
mod value_objects;

pub use aggregate::Book;
pub use entities::{Section, SectionBody};
pub use errors::{BookError, OutlineError};
pub use outline::{Outline, OutlineLimits, OutlineNode};
pub use value_objects::{BookTitle, SectionPath};
