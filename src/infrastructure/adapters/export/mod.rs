//! Export Adapters
//!
//! 把 Book 渲染为可下载的文件：Markdown / PDF / DOCX / EPUB

mod blocks;
mod docx;
mod epub;
mod markdown;
mod pdf;

pub use docx::render_docx;
pub use epub::render_epub;
pub use markdown::render_markdown;
pub use pdf::render_pdf;

use crate::application::ports::{BookExporterPort, ExportError, ExportFormat, ExportedFile};
use crate::domain::book::Book;

/// 文档导出器
///
/// 纯内存渲染，不落盘
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentExporter;

impl DocumentExporter {
    pub fn new() -> Self {
        Self
    }
}

impl BookExporterPort for DocumentExporter {
    fn export(&self, book: &Book, format: ExportFormat) -> Result<ExportedFile, ExportError> {
        let data = match format {
            ExportFormat::Markdown => render_markdown(book),
            ExportFormat::Pdf => render_pdf(book)?,
            ExportFormat::Docx => render_docx(book)?,
            ExportFormat::Epub => render_epub(book)?,
        };

        tracing::debug!(
            format = %format,
            bytes = data.len(),
            "Book exported"
        );

        Ok(ExportedFile::new(book, format, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::{BookTitle, Outline, OutlineLimits};

    fn sample_book() -> Book {
        let outline =
            Outline::parse(r#"{"Start": "s", "Finish": "f"}"#, &OutlineLimits::default()).unwrap();
        let mut book = Book::new(BookTitle::new("Field Notes: Vol 1").unwrap(), outline);
        for (path, _) in book.clone().leaves() {
            book.update_content(&path, "Some words.").unwrap();
        }
        book
    }

    #[test]
    fn test_every_format_exports() {
        let exporter = DocumentExporter::new();
        let book = sample_book();

        for format in ExportFormat::ALL {
            let file = exporter.export(&book, format).unwrap();
            assert!(!file.data.is_empty(), "{} is empty", format);
            assert_eq!(file.content_type, format.content_type());
            assert!(file.file_name.ends_with(&format!(".{}", format.extension())));
            assert!(!file.file_name.contains(':'));
        }
    }

    #[test]
    fn test_markdown_export_matches_book() {
        let book = sample_book();
        let file = DocumentExporter::new()
            .export(&book, ExportFormat::Markdown)
            .unwrap();
        assert_eq!(String::from_utf8(file.data).unwrap(), book.to_markdown());
    }
}
