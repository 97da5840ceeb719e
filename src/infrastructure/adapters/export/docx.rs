//! DOCX Exporter
//!
//! 直接拼装最小的 WordprocessingML 包（OPC zip）：
//! 书名使用 Heading1，章节按层级使用 Heading2..Heading9，正文逐段输出。

use chrono::Utc;
use quick_xml::escape::escape;
use std::io::{Cursor, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::blocks::{split_blocks, Block};
use crate::application::ports::ExportError;
use crate::domain::book::Book;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const MAX_HEADING_LEVEL: usize = 9;

/// 导出为 DOCX 字节
pub fn render_docx(book: &Book) -> Result<Vec<u8>, ExportError> {
    let options =
        || SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    write_entry(&mut zip, "[Content_Types].xml", options(), CONTENT_TYPES_XML)?;
    write_entry(&mut zip, "_rels/.rels", options(), ROOT_RELS_XML)?;
    write_entry(&mut zip, "docProps/core.xml", options(), &generate_core(book))?;
    write_entry(&mut zip, "word/_rels/document.xml.rels", options(), DOCUMENT_RELS_XML)?;
    write_entry(&mut zip, "word/styles.xml", options(), &generate_styles())?;
    write_entry(&mut zip, "word/document.xml", options(), &generate_document(book))?;

    let cursor = zip
        .finish()
        .map_err(|e| ExportError::ArchiveError(e.to_string()))?;
    Ok(cursor.into_inner())
}

fn write_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    options: SimpleFileOptions,
    data: &str,
) -> Result<(), ExportError> {
    zip.start_file(name, options)
        .map_err(|e| ExportError::ArchiveError(e.to_string()))?;
    zip.write_all(data.as_bytes())?;
    Ok(())
}

fn generate_document(book: &Book) -> String {
    let mut body = String::new();
    push_paragraph(&mut body, Some(1), book.title().as_str());

    book.walk(|path, section| {
        let level = (path.depth() + 1).min(MAX_HEADING_LEVEL);
        push_paragraph(&mut body, Some(level), section.title());

        if let Some(content) = section.content() {
            for block in split_blocks(content) {
                match block {
                    Block::Heading { level: inner, text } => {
                        let level = (level + inner).min(MAX_HEADING_LEVEL);
                        push_paragraph(&mut body, Some(level), &text);
                    }
                    Block::Paragraph(text) => push_paragraph(&mut body, None, &text),
                }
            }
        }
    });

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}">
<w:body>
{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>
</w:body>
</w:document>"#,
        WORD_NS, body
    )
}

fn push_paragraph(body: &mut String, heading: Option<usize>, text: &str) {
    body.push_str("<w:p>");
    if let Some(level) = heading {
        body.push_str(&format!(
            r#"<w:pPr><w:pStyle w:val="Heading{}"/></w:pPr>"#,
            level
        ));
    }
    body.push_str(&format!(
        r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape(text)
    ));
    body.push_str("</w:p>\n");
}

fn generate_styles() -> String {
    let mut styles = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{}">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:pPr><w:spacing w:after="160" w:line="276" w:lineRule="auto"/></w:pPr>
    <w:rPr><w:sz w:val="22"/></w:rPr>
  </w:style>
"#,
        WORD_NS
    );

    for level in 1..=MAX_HEADING_LEVEL {
        // 半磅为单位：Heading1 为 32（16pt），逐级递减，最小 22（11pt）
        let size = 34usize.saturating_sub(level * 2).max(22);
        styles.push_str(&format!(
            r#"  <w:style w:type="paragraph" w:styleId="Heading{level}">
    <w:name w:val="heading {level}"/>
    <w:basedOn w:val="Normal"/>
    <w:next w:val="Normal"/>
    <w:qFormat/>
    <w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="{outline}"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="{size}"/></w:rPr>
  </w:style>
"#,
            level = level,
            outline = level - 1,
            size = size
        ));
    }

    styles.push_str("</w:styles>");
    styles
}

fn generate_core(book: &Book) -> String {
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:title>{title}</dc:title>
  <dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created>
  <dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified>
</cp:coreProperties>"#,
        title = escape(book.title().as_str()),
        now = now
    )
}
