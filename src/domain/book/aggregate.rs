//! Book Context - Aggregate Root

use serde::{Deserialize, Serialize};

use super::{BookError, BookTitle, Outline, Section, SectionPath};

/// Book 聚合根
///
/// 不变量:
/// - 章节顺序即大纲顺序，创建后不再增删章节
/// - 只有叶子章节可以写入正文
/// - 写入某个章节不影响书名与其他章节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    title: BookTitle,
    sections: Vec<Section>,
}

impl Book {
    /// 由书名和已校验的大纲创建
    pub fn new(title: BookTitle, outline: Outline) -> Self {
        let sections = outline
            .into_entries()
            .into_iter()
            .map(|(t, n)| Section::from_outline(t, n))
            .collect();
        Self { title, sections }
    }

    pub fn title(&self) -> &BookTitle {
        &self.title
    }

    /// 顶层章节
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// 按深度优先、插入顺序列出所有叶子章节
    pub fn leaves(&self) -> Vec<(SectionPath, &Section)> {
        let mut leaves = Vec::new();
        self.walk(|path, section| {
            if section.is_leaf() {
                leaves.push((path.clone(), section));
            }
        });
        leaves
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// 所有叶子章节都已写入非空正文
    pub fn is_complete(&self) -> bool {
        self.leaves()
            .iter()
            .all(|(_, s)| s.content().is_some_and(|c| !c.trim().is_empty()))
    }

    pub fn section(&self, path: &SectionPath) -> Option<&Section> {
        let (first, rest) = path.titles().split_first()?;
        let mut current = self.sections.iter().find(|s| s.title() == first.as_str())?;
        for title in rest {
            current = current.children().iter().find(|s| s.title() == title.as_str())?;
        }
        Some(current)
    }

    /// 覆盖指定叶子章节的正文
    pub fn update_content(
        &mut self,
        path: &SectionPath,
        content: impl Into<String>,
    ) -> Result<(), BookError> {
        let section = self
            .section_mut(path)
            .ok_or_else(|| BookError::SectionNotFound(path.clone()))?;

        if section.set_content(content.into()) {
            Ok(())
        } else {
            Err(BookError::NotALeaf(path.clone()))
        }
    }

    /// 展平为单个 Markdown 文档
    ///
    /// 书名为一级标题，章节标题按层级依次为二级及以下标题，正文紧跟其标题。
    pub fn to_markdown(&self) -> String {
        let mut markdown = format!("# {}\n\n", self.title);

        self.walk(|path, section| {
            let level = (path.depth() + 1).min(6);
            markdown.push_str(&"#".repeat(level));
            markdown.push(' ');
            markdown.push_str(section.title());
            markdown.push('\n');

            if let Some(content) = section.content() {
                let content = content.trim();
                if !content.is_empty() {
                    markdown.push_str(content);
                    markdown.push('\n');
                }
            }
            markdown.push('\n');
        });

        markdown
    }

    /// 深度优先遍历所有章节（先父后子）
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&SectionPath, &'a Section)) {
        fn walk_inner<'a>(
            sections: &'a [Section],
            parent: Option<&SectionPath>,
            visit: &mut impl FnMut(&SectionPath, &'a Section),
        ) {
            for section in sections {
                let path = match parent {
                    Some(p) => p.child(section.title()),
                    None => SectionPath::root(section.title()),
                };
                visit(&path, section);
                walk_inner(section.children(), Some(&path), visit);
            }
        }

        walk_inner(&self.sections, None, &mut visit);
    }

    fn section_mut(&mut self, path: &SectionPath) -> Option<&mut Section> {
        let (first, rest) = path.titles().split_first()?;
        let mut current = self.sections.iter_mut().find(|s| s.title() == first.as_str())?;
        for title in rest {
            current = current
                .children_mut()?
                .iter_mut()
                .find(|s| s.title() == title.as_str())?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::OutlineLimits;

    fn sample_book() -> Book {
        let outline = Outline::parse(
            r#"{
                "Beginnings": "How it started",
                "Part Two": {
                    "Rise": "The climb",
                    "Fall": "The drop"
                },
                "Endings": "How it ends"
            }"#,
            &OutlineLimits::default(),
        )
        .unwrap();
        Book::new(BookTitle::new("A Short History").unwrap(), outline)
    }

    #[test]
    fn test_leaves_in_insertion_order() {
        let book = sample_book();
        let paths: Vec<String> = book.leaves().iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(
            paths,
            vec!["Beginnings", "Part Two / Rise", "Part Two / Fall", "Endings"]
        );
        assert_eq!(book.leaf_count(), 4);
        assert!(!book.is_complete());
    }

    #[test]
    fn test_update_content_touches_only_target() {
        let mut book = sample_book();
        for (path, _) in book.clone().leaves() {
            book.update_content(&path, format!("text of {}", path.title()))
                .unwrap();
        }
        let before = book.clone();

        let target = SectionPath::root("Part Two").child("Rise");
        book.update_content(&target, "rewritten").unwrap();

        assert_eq!(book.section(&target).unwrap().content(), Some("rewritten"));
        assert_eq!(book.title(), before.title());
        for (path, section) in before.leaves() {
            if path != target {
                assert_eq!(book.section(&path).unwrap().content(), section.content());
            }
        }
    }

    #[test]
    fn test_update_content_errors() {
        let mut book = sample_book();
        assert!(matches!(
            book.update_content(&SectionPath::root("Missing"), "x"),
            Err(BookError::SectionNotFound(_))
        ));
        assert!(matches!(
            book.update_content(&SectionPath::root("Part Two"), "x"),
            Err(BookError::NotALeaf(_))
        ));
    }

    #[test]
    fn test_markdown_heading_order() {
        let mut book = sample_book();
        for (path, _) in book.clone().leaves() {
            book.update_content(&path, format!("Body of {}.", path.title()))
                .unwrap();
        }
        assert!(book.is_complete());

        let markdown = book.to_markdown();
        assert!(markdown.starts_with("# A Short History\n\n"));

        let expected = [
            "## Beginnings\nBody of Beginnings.\n",
            "## Part Two\n",
            "### Rise\nBody of Rise.\n",
            "### Fall\nBody of Fall.\n",
            "## Endings\nBody of Endings.\n",
        ];
        let mut cursor = 0;
        for chunk in expected {
            let pos = markdown[cursor..]
                .find(chunk)
                .unwrap_or_else(|| panic!("missing or out of order: {chunk:?}"));
            cursor += pos + chunk.len();
        }
    }
}
