//! Book Commands - 书籍生成、编辑与导出

use crate::application::ports::{ExportFormat, GenerationStatistics};
use crate::domain::book::{Book, SectionPath};

/// 生成书籍命令
#[derive(Debug, Clone)]
pub struct GenerateBookCommand {
    pub session_id: String,
    /// 书籍主题
    pub topic: String,
    /// 附加写作要求，可为空
    pub instructions: String,
    pub title_model: String,
    pub structure_model: String,
    pub content_model: String,
}

/// 生成书籍响应
#[derive(Debug, Clone)]
pub struct GenerateBookResponse {
    pub session_id: String,
    pub book: Book,
    /// 本次生成所有调用的累计统计
    pub statistics: GenerationStatistics,
}

/// 编辑章节命令
#[derive(Debug, Clone)]
pub struct EditSectionCommand {
    pub session_id: String,
    pub path: SectionPath,
    pub content: String,
}

/// 编辑章节响应
#[derive(Debug, Clone)]
pub struct EditSectionResponse {
    pub session_id: String,
    pub path: SectionPath,
}

/// 导出书籍命令
#[derive(Debug, Clone)]
pub struct ExportBookCommand {
    pub session_id: String,
    pub format: ExportFormat,
}
