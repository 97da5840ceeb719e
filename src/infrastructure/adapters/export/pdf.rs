//! PDF Exporter
//!
//! 使用 printpdf 内置的 Helvetica 字体排版，无需随包携带字体文件。
//! 正文只输出 ASCII：常见排版符号（弯引号、破折号、省略号）替换为 ASCII 近似，
//! 其余非 ASCII 字符（包括带重音的拉丁字母）输出为 `?`。

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use super::blocks::{split_blocks, Block};
use crate::application::ports::ExportError;
use crate::domain::book::{Book, Section};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LAYER_NAME: &str = "Layer 1";

const TITLE_SIZE: f32 = 24.0;
const BODY_SIZE: f32 = 11.0;

/// 1pt = 0.3528mm
const PT_TO_MM: f32 = 0.3528;
const LINE_SPACING: f32 = 1.4;
/// Helvetica 的平均字宽约为字号的一半
const AVG_CHAR_WIDTH: f32 = 0.5;

/// 导出为 PDF 字节
pub fn render_pdf(book: &Book) -> Result<Vec<u8>, ExportError> {
    let title = to_ascii_text(book.title().as_str());
    let mut writer = PdfWriter::new(&title)?;

    writer.paragraph(&title, TITLE_SIZE, true);
    writer.gap(TITLE_SIZE);

    book.walk(|path, section| {
        writer.section(path.depth(), section);
    });

    writer.finish()
}

fn heading_size(depth: usize) -> f32 {
    match depth {
        1 => 18.0,
        2 => 15.0,
        _ => 13.0,
    }
}

struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// 当前基线距页面底部的距离（mm）
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self, ExportError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::RenderError(format!("{:?}", e)))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::RenderError(format!("{:?}", e)))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        })
    }

    fn section(&mut self, depth: usize, section: &Section) {
        let size = heading_size(depth);
        self.gap(BODY_SIZE);
        self.paragraph(&to_ascii_text(section.title()), size, true);

        let Some(content) = section.content() else {
            return;
        };
        for block in split_blocks(content) {
            match block {
                Block::Heading { text, .. } => {
                    self.gap(BODY_SIZE * 0.5);
                    self.paragraph(&to_ascii_text(&text), BODY_SIZE + 1.0, true);
                }
                Block::Paragraph(text) => {
                    self.paragraph(&to_ascii_text(&text), BODY_SIZE, false);
                    self.gap(BODY_SIZE * 0.5);
                }
            }
        }
    }

    /// 按估算字宽折行输出一段文字，必要时换页
    fn paragraph(&mut self, text: &str, size: f32, bold: bool) {
        let line_height = size * PT_TO_MM * LINE_SPACING;
        let max_chars = max_chars_per_line(size);

        for line in wrap_text(text, max_chars) {
            if self.y - line_height < MARGIN {
                self.new_page();
            }
            self.y -= line_height;
            let font = if bold { &self.bold } else { &self.regular };
            self.layer.use_text(line, size, Mm(MARGIN), Mm(self.y), font);
        }
    }

    fn gap(&mut self, size: f32) {
        self.y -= size * PT_TO_MM * 0.5;
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| ExportError::RenderError(format!("{:?}", e)))
    }
}

fn max_chars_per_line(size: f32) -> usize {
    let usable = PAGE_WIDTH - 2.0 * MARGIN;
    let char_width = size * PT_TO_MM * AVG_CHAR_WIDTH;
    ((usable / char_width) as usize).max(10)
}

/// 按单词折行，超长单词强制截断
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// 转为 ASCII 文本，无法近似的字符输出为 `?`
fn to_ascii_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\t' => out.push(' '),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c if c.is_control() => {}
            _ => out.push('?'),
        }
    }
    out
}
