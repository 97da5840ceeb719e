//! EPUB Exporter
//!
//! 生成 EPUB 3 包（附带 EPUB 2 的 toc.ncx）：
//! - 每个顶层章节一个 XHTML 文档，子章节在同一文档内以 h2..h6 呈现
//! - 所有章节共用固定样式表 style/book.css
//! - nav.xhtml 与 toc.ncx 按顺序引用全部章节文档

use chrono::Utc;
use quick_xml::escape::escape;
use std::io::{Cursor, Seek, Write};
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::blocks::{split_blocks, Block};
use crate::application::ports::ExportError;
use crate::domain::book::{Book, Section};

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

const STYLESHEET: &str = "body { font-family: serif; line-height: 1.5; margin: 0 5%; }
h1, h2, h3, h4, h5, h6 { font-family: sans-serif; page-break-after: avoid; }
h1 { font-size: 1.8em; margin: 1.5em 0 1em; }
h2 { font-size: 1.4em; margin: 1.2em 0 0.8em; }
h3 { font-size: 1.2em; }
p { text-indent: 1.2em; margin: 0 0 0.6em; }
";

const STYLESHEET_HREF: &str = "style/book.css";

/// 导出为 EPUB 字节
pub fn render_epub(book: &Book) -> Result<Vec<u8>, ExportError> {
    let identifier = format!("urn:uuid:{}", Uuid::new_v4());
    let chapters: Vec<(String, &Section)> = book
        .sections()
        .iter()
        .enumerate()
        .map(|(i, s)| (chapter_href(i), s))
        .collect();

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    // mimetype 必须是第一个条目且不压缩
    write_entry(&mut zip, "mimetype", stored(), b"application/epub+zip")?;
    write_entry(
        &mut zip,
        "META-INF/container.xml",
        deflated(),
        CONTAINER_XML.as_bytes(),
    )?;
    write_entry(
        &mut zip,
        "OEBPS/content.opf",
        deflated(),
        generate_opf(book, &identifier, &chapters).as_bytes(),
    )?;
    write_entry(
        &mut zip,
        "OEBPS/nav.xhtml",
        deflated(),
        generate_nav(book, &chapters).as_bytes(),
    )?;
    write_entry(
        &mut zip,
        "OEBPS/toc.ncx",
        deflated(),
        generate_ncx(book, &identifier, &chapters).as_bytes(),
    )?;
    write_entry(
        &mut zip,
        &format!("OEBPS/{}", STYLESHEET_HREF),
        deflated(),
        STYLESHEET.as_bytes(),
    )?;

    for (href, section) in &chapters {
        write_entry(
            &mut zip,
            &format!("OEBPS/{}", href),
            deflated(),
            generate_chapter(section).as_bytes(),
        )?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| ExportError::ArchiveError(e.to_string()))?;
    Ok(cursor.into_inner())
}

fn stored() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
}

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn write_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    options: SimpleFileOptions,
    data: &[u8],
) -> Result<(), ExportError> {
    zip.start_file(name, options)
        .map_err(|e| ExportError::ArchiveError(e.to_string()))?;
    zip.write_all(data)?;
    Ok(())
}

fn chapter_href(index: usize) -> String {
    format!("chapter_{:03}.xhtml", index + 1)
}

fn chapter_id(href: &str) -> String {
    href.trim_end_matches(".xhtml").to_string()
}

fn generate_opf(book: &Book, identifier: &str, chapters: &[(String, &Section)]) -> String {
    let mut opf = String::new();

    opf.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
"#,
    );
    opf.push_str(&format!(
        "    <dc:identifier id=\"BookId\">{}</dc:identifier>\n",
        escape(identifier)
    ));
    opf.push_str(&format!(
        "    <dc:title>{}</dc:title>\n",
        escape(book.title().as_str())
    ));
    opf.push_str("    <dc:language>en</dc:language>\n");
    opf.push_str(&format!(
        "    <meta property=\"dcterms:modified\">{}</meta>\n",
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    ));
    opf.push_str("  </metadata>\n  <manifest>\n");

    opf.push_str(
        "    <item id=\"nav\" href=\"nav.xhtml\" media-type=\"application/xhtml+xml\" properties=\"nav\"/>\n",
    );
    opf.push_str(
        "    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n",
    );
    opf.push_str(&format!(
        "    <item id=\"style\" href=\"{}\" media-type=\"text/css\"/>\n",
        STYLESHEET_HREF
    ));
    for (href, _) in chapters {
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>\n",
            chapter_id(href),
            href
        ));
    }

    opf.push_str("  </manifest>\n  <spine toc=\"ncx\">\n");
    for (href, _) in chapters {
        opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", chapter_id(href)));
    }
    opf.push_str("  </spine>\n</package>\n");

    opf
}

fn generate_nav(book: &Book, chapters: &[(String, &Section)]) -> String {
    let mut nav = String::new();

    nav.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="en" xml:lang="en">
<head>
  <title>{}</title>
  <link rel="stylesheet" type="text/css" href="{}"/>
</head>
<body>
  <nav epub:type="toc" id="toc">
    <h1>Contents</h1>
    <ol>
"#,
        escape(book.title().as_str()),
        STYLESHEET_HREF
    ));

    for (href, section) in chapters {
        nav.push_str(&format!(
            "      <li><a href=\"{}\">{}</a></li>\n",
            href,
            escape(section.title())
        ));
    }

    nav.push_str("    </ol>\n  </nav>\n</body>\n</html>\n");
    nav
}

fn generate_ncx(book: &Book, identifier: &str, chapters: &[(String, &Section)]) -> String {
    let mut ncx = String::new();

    ncx.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{}"/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle>
    <text>{}</text>
  </docTitle>
  <navMap>
"#,
        escape(identifier),
        escape(book.title().as_str())
    ));

    for (i, (href, section)) in chapters.iter().enumerate() {
        let order = i + 1;
        ncx.push_str(&format!(
            "    <navPoint id=\"navpoint-{order}\" playOrder=\"{order}\">\n      <navLabel>\n        <text>{}</text>\n      </navLabel>\n      <content src=\"{}\"/>\n    </navPoint>\n",
            escape(section.title()),
            href
        ));
    }

    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

fn generate_chapter(section: &Section) -> String {
    let mut html = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" lang="en" xml:lang="en">
<head>
  <title>{}</title>
  <link rel="stylesheet" type="text/css" href="{}"/>
</head>
<body>
"#,
        escape(section.title()),
        STYLESHEET_HREF
    );

    write_section_html(&mut html, section, 1);

    html.push_str("</body>\n</html>\n");
    html
}

fn write_section_html(html: &mut String, section: &Section, level: usize) {
    let level = level.min(6);
    html.push_str(&format!(
        "  <h{level}>{}</h{level}>\n",
        escape(section.title())
    ));

    if let Some(content) = section.content() {
        for block in split_blocks(content) {
            match block {
                Block::Heading { level: inner, text } => {
                    let h = (level + inner).min(6);
                    html.push_str(&format!("  <h{h}>{}</h{h}>\n", escape(&text)));
                }
                Block::Paragraph(text) => {
                    html.push_str(&format!("  <p>{}</p>\n", escape(&text)));
                }
            }
        }
    }

    for child in section.children() {
        write_section_html(html, child, level + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::{BookTitle, Outline, OutlineLimits, SectionPath};
    use std::io::Read;
    use zip::ZipArchive;

    fn sample_book() -> Book {
        let outline = Outline::parse(
            r#"{"Dawn": "morning", "Noon": {"Heat": "hot", "Shade": "cool"}, "Dusk & Night": "evening"}"#,
            &OutlineLimits::default(),
        )
        .unwrap();
        let mut book = Book::new(BookTitle::new("One <Day>").unwrap(), outline);
        for (path, _) in book.clone().leaves() {
            book.update_content(&path, format!("About {}.", path.title()))
                .unwrap();
        }
        book
    }

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut text = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        text
    }

    #[test]
    fn test_one_chapter_per_top_level_section() {
        let bytes = render_epub(&sample_book()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        let chapter_files: Vec<String> = archive
            .file_names()
            .filter(|n| n.starts_with("OEBPS/chapter_"))
            .map(str::to_string)
            .collect();
        assert_eq!(chapter_files.len(), 3);

        let nav = read_entry(&mut archive, "OEBPS/nav.xhtml");
        let ncx = read_entry(&mut archive, "OEBPS/toc.ncx");
        for i in 0..3 {
            let href = chapter_href(i);
            assert!(nav.contains(&format!("href=\"{}\"", href)));
            assert!(ncx.contains(&format!("src=\"{}\"", href)));
        }
        assert!(nav.contains("Dusk &amp; Night"));
    }

    #[test]
    fn test_mimetype_first_and_nested_content() {
        let bytes = render_epub(&sample_book()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        assert_eq!(archive.by_index(0).unwrap().name(), "mimetype");

        let noon = read_entry(&mut archive, "OEBPS/chapter_002.xhtml");
        let heat = noon.find("<h2>Heat</h2>").unwrap();
        let shade = noon.find("<h2>Shade</h2>").unwrap();
        assert!(noon.starts_with("<?xml"));
        assert!(noon.contains("<h1>Noon</h1>"));
        assert!(heat < shade);
        assert!(noon.contains("<p>About Heat.</p>"));
        assert!(noon.contains(STYLESHEET_HREF));

        let opf = read_entry(&mut archive, "OEBPS/content.opf");
        assert!(opf.contains("One &lt;Day&gt;"));
    }

    /// 条目名称按写入顺序，外加目录里的章节链接顺序
    fn layout(bytes: Vec<u8>) -> (Vec<String>, Vec<String>, Vec<String>) {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        let links = |text: &str, attr: &str| -> Vec<String> {
            text.split(attr)
                .skip(1)
                .filter_map(|rest| rest.split('"').next())
                .map(str::to_string)
                .collect()
        };
        let nav = read_entry(&mut archive, "OEBPS/nav.xhtml");
        let ncx = read_entry(&mut archive, "OEBPS/toc.ncx");
        (names, links(&nav, "<a href=\""), links(&ncx, "<content src=\""))
    }

    #[test]
    fn test_structure_is_deterministic() {
        let book = sample_book();
        let (names, nav, ncx) = layout(render_epub(&book).unwrap());
        assert_eq!(layout(render_epub(&book).unwrap()), (names.clone(), nav.clone(), ncx.clone()));

        assert_eq!(names[0], "mimetype");
        let chapters = vec![chapter_href(0), chapter_href(1), chapter_href(2)];
        assert_eq!(nav, chapters);
        assert_eq!(ncx, chapters);

        let mut edited = book.clone();
        edited
            .update_content(&SectionPath::root("Dawn"), "Changed.")
            .unwrap();
        assert_eq!(layout(render_epub(&edited).unwrap()), (names, nav, ncx));
    }
}
