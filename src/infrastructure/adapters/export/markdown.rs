//! Markdown Exporter

use crate::domain::book::Book;

/// 导出为 UTF-8 Markdown
pub fn render_markdown(book: &Book) -> Vec<u8> {
    book.to_markdown().into_bytes()
}
