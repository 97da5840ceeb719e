//! Book Context - Outline
//!
//! 模型返回的结构 JSON 解析为大纲树：
//! - 字符串值：叶子章节的描述，之后会被生成的正文替换
//! - 对象值：子大纲
//!
//! 遍历顺序即 JSON 中的键顺序（serde_json 开启 preserve_order）。

use serde_json::{Map, Value};

use super::OutlineError;

/// 大纲边界
#[derive(Debug, Clone, Copy)]
pub struct OutlineLimits {
    /// 最大层级（顶层为 1）
    pub max_depth: usize,
    /// 最多叶子章节数，即最多调用多少次章节生成
    pub max_sections: usize,
}

impl Default for OutlineLimits {
    fn default() -> Self {
        Self {
            max_depth: 6,
            max_sections: 120,
        }
    }
}

/// 大纲节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineNode {
    Leaf(String),
    Group(Vec<(String, OutlineNode)>),
}

impl OutlineNode {
    fn leaf_count(&self) -> usize {
        match self {
            OutlineNode::Leaf(_) => 1,
            OutlineNode::Group(children) => children.iter().map(|(_, c)| c.leaf_count()).sum(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            OutlineNode::Leaf(_) => 1,
            OutlineNode::Group(children) => {
                1 + children.iter().map(|(_, c)| c.depth()).max().unwrap_or(0)
            }
        }
    }
}

/// 已校验的大纲
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outline {
    entries: Vec<(String, OutlineNode)>,
}

impl Outline {
    /// 解析模型返回的结构文本
    pub fn parse(text: &str, limits: &OutlineLimits) -> Result<Self, OutlineError> {
        let value: Value = serde_json::from_str(text.trim())
            .map_err(|e| OutlineError::InvalidJson(e.to_string()))?;

        let Value::Object(map) = value else {
            return Err(OutlineError::NotAnObject);
        };
        if map.is_empty() {
            return Err(OutlineError::Empty);
        }

        let outline = Self {
            entries: convert_map(map)?,
        };

        if outline.depth() > limits.max_depth {
            return Err(OutlineError::TooDeep {
                max: limits.max_depth,
            });
        }
        let count = outline.leaf_count();
        if count > limits.max_sections {
            return Err(OutlineError::TooManySections {
                count,
                max: limits.max_sections,
            });
        }

        Ok(outline)
    }

    pub fn entries(&self) -> &[(String, OutlineNode)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(String, OutlineNode)> {
        self.entries
    }

    pub fn leaf_count(&self) -> usize {
        self.entries.iter().map(|(_, n)| n.leaf_count()).sum()
    }

    pub fn depth(&self) -> usize {
        self.entries.iter().map(|(_, n)| n.depth()).max().unwrap_or(0)
    }
}

fn convert_map(map: Map<String, Value>) -> Result<Vec<(String, OutlineNode)>, OutlineError> {
    let mut entries = Vec::with_capacity(map.len());

    for (title, value) in map {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(OutlineError::EmptyTitle);
        }

        let node = match value {
            Value::String(description) => OutlineNode::Leaf(description),
            Value::Object(children) => {
                if children.is_empty() {
                    return Err(OutlineError::EmptyGroup { title });
                }
                OutlineNode::Group(convert_map(children)?)
            }
            other => {
                return Err(OutlineError::UnsupportedValue {
                    title,
                    kind: value_kind(&other),
                })
            }
        };

        // trim 之后可能出现同名键
        if entries.iter().any(|(t, _)| *t == title) {
            return Err(OutlineError::DuplicateTitle { title });
        }
        entries.push((title, node));
    }

    Ok(entries)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = r#"{
        "Origins": "Where it all began",
        "The Middle Years": {
            "Growth": "How things expanded",
            "Decline": {
                "Early Signs": "The first cracks",
                "Collapse": "The end of an era"
            }
        },
        "Legacy": "What remains"
    }"#;

    #[test]
    fn test_parse_preserves_order() {
        let outline = Outline::parse(NESTED, &OutlineLimits::default()).unwrap();
        let titles: Vec<&str> = outline.entries().iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(titles, vec!["Origins", "The Middle Years", "Legacy"]);
        assert_eq!(outline.leaf_count(), 5);
        assert_eq!(outline.depth(), 3);
    }

    #[test]
    fn test_rejects_non_json() {
        let err = Outline::parse("Chapter 1: intro", &OutlineLimits::default()).unwrap_err();
        assert!(matches!(err, OutlineError::InvalidJson(_)));
    }

    #[test]
    fn test_rejects_non_object_and_empty() {
        let limits = OutlineLimits::default();
        assert!(matches!(
            Outline::parse(r#"["a", "b"]"#, &limits).unwrap_err(),
            OutlineError::NotAnObject
        ));
        assert!(matches!(
            Outline::parse("{}", &limits).unwrap_err(),
            OutlineError::Empty
        ));
        assert!(matches!(
            Outline::parse(r#"{"A": {}}"#, &limits).unwrap_err(),
            OutlineError::EmptyGroup { .. }
        ));
        assert!(matches!(
            Outline::parse(r#"{"A": 3}"#, &limits).unwrap_err(),
            OutlineError::UnsupportedValue { kind: "number", .. }
        ));
        assert!(matches!(
            Outline::parse(r#"{" ": "x"}"#, &limits).unwrap_err(),
            OutlineError::EmptyTitle
        ));
    }

    #[test]
    fn test_enforces_limits() {
        let shallow = OutlineLimits {
            max_depth: 2,
            max_sections: 100,
        };
        assert!(matches!(
            Outline::parse(NESTED, &shallow).unwrap_err(),
            OutlineError::TooDeep { max: 2 }
        ));

        let few = OutlineLimits {
            max_depth: 10,
            max_sections: 4,
        };
        assert!(matches!(
            Outline::parse(NESTED, &few).unwrap_err(),
            OutlineError::TooManySections { count: 5, max: 4 }
        ));
    }

    #[test]
    fn test_titles_equal_after_trim_are_rejected() {
        let err = Outline::parse(
            r#"{"Intro": "first leaf", "Intro ": "second leaf"}"#,
            &OutlineLimits::default(),
        )
        .unwrap_err();
        assert!(matches!(err, OutlineError::DuplicateTitle { ref title } if title == "Intro"));

        let err = Outline::parse(
            r#"{"Part": {" Scene": "a", "Scene": "b"}}"#,
            &OutlineLimits::default(),
        )
        .unwrap_err();
        assert!(matches!(err, OutlineError::DuplicateTitle { .. }));
    }
}
