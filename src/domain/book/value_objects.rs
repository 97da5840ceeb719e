//! Book Context - Value Objects

use serde::{Deserialize, Serialize};

/// 书名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookTitle(String);

impl BookTitle {
    pub fn new(title: impl Into<String>) -> Result<Self, &'static str> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err("书名不能为空");
        }
        if title.chars().count() > 500 {
            return Err("书名长度不能超过500字符");
        }
        Ok(Self(title))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 章节路径：从根到该章节的标题序列
///
/// 同名小节可以出现在不同章节下，路径在整本书内唯一。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionPath(Vec<String>);

impl SectionPath {
    pub fn new(titles: Vec<String>) -> Result<Self, &'static str> {
        if titles.is_empty() {
            return Err("章节路径不能为空");
        }
        if titles.iter().any(|t| t.is_empty()) {
            return Err("章节路径包含空标题");
        }
        Ok(Self(titles))
    }

    /// 顶层章节路径
    pub fn root(title: impl Into<String>) -> Self {
        Self(vec![title.into()])
    }

    pub fn child(&self, title: impl Into<String>) -> Self {
        let mut titles = self.0.clone();
        titles.push(title.into());
        Self(titles)
    }

    /// 层级深度（顶层为 1）
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn title(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    pub fn titles(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for SectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(" / "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_is_trimmed() {
        let title = BookTitle::new("  The Long Road  ").unwrap();
        assert_eq!(title.as_str(), "The Long Road");
        assert!(BookTitle::new("   ").is_err());
    }

    #[test]
    fn test_section_path() {
        let path = SectionPath::root("Part I").child("Origins");
        assert_eq!(path.depth(), 2);
        assert_eq!(path.title(), "Origins");
        assert_eq!(path.to_string(), "Part I / Origins");
        assert!(SectionPath::new(vec![]).is_err());
        assert!(SectionPath::new(vec!["A".into(), String::new()]).is_err());
    }
}
