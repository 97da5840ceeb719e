//! Book Exporter Port - 书籍导出抽象
//!
//! 定义把 Book 转换为文件字节的抽象接口，具体格式实现在 infrastructure/adapters/export 层

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::book::Book;

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Archive error: {0}")]
    ArchiveError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Pdf,
    Docx,
    Epub,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Pdf,
        ExportFormat::Epub,
        ExportFormat::Docx,
        ExportFormat::Markdown,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Epub => "epub",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Epub => "application/epub+zip",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Markdown => write!(f, "markdown"),
            ExportFormat::Pdf => write!(f, "pdf"),
            ExportFormat::Docx => write!(f, "docx"),
            ExportFormat::Epub => write!(f, "epub"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            "epub" => Ok(ExportFormat::Epub),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// 导出结果
#[derive(Debug, Clone)]
pub struct ExportedFile {
    /// 下载文件名（书名 + 扩展名）
    pub file_name: String,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

impl ExportedFile {
    pub fn new(book: &Book, format: ExportFormat, data: Vec<u8>) -> Self {
        Self {
            file_name: format!(
                "{}.{}",
                sanitize_file_stem(book.title().as_str()),
                format.extension()
            ),
            content_type: format.content_type(),
            data,
        }
    }
}

/// 把书名转换为可用的文件名主干
pub fn sanitize_file_stem(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(120)
        .collect();

    let cleaned = cleaned.trim().trim_matches('.').trim();
    if cleaned.is_empty() {
        "book".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Book Exporter Port
///
/// 各格式实现互相独立、无共享状态
pub trait BookExporterPort: Send + Sync {
    fn export(&self, book: &Book, format: ExportFormat) -> Result<ExportedFile, ExportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert!("odt".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("War: and/or Peace?"), "War_ and_or Peace_");
        assert_eq!(sanitize_file_stem("  ..  "), "book");
    }
}
