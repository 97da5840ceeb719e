//! Book Context - Entities

use serde::{Deserialize, Serialize};

use super::OutlineNode;

/// 章节
///
/// 不变量:
/// - 同一层级内标题唯一
/// - 叶子章节持有描述或已生成的正文，分组章节只持有子章节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    title: String,
    body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionBody {
    Leaf {
        /// 大纲中的章节描述（生成提示词的一部分）
        description: String,
        /// 生成或手动编辑后的正文
        content: Option<String>,
    },
    Group { children: Vec<Section> },
}

impl Section {
    pub fn from_outline(title: String, node: OutlineNode) -> Self {
        let body = match node {
            OutlineNode::Leaf(description) => SectionBody::Leaf {
                description,
                content: None,
            },
            OutlineNode::Group(children) => SectionBody::Group {
                children: children
                    .into_iter()
                    .map(|(t, n)| Section::from_outline(t, n))
                    .collect(),
            },
        };
        Self { title, body }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &SectionBody {
        &self.body
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.body, SectionBody::Leaf { .. })
    }

    pub fn description(&self) -> Option<&str> {
        match &self.body {
            SectionBody::Leaf { description, .. } => Some(description),
            SectionBody::Group { .. } => None,
        }
    }

    /// 已写入的正文，未生成或分组章节返回 None
    pub fn content(&self) -> Option<&str> {
        match &self.body {
            SectionBody::Leaf { content, .. } => content.as_deref(),
            SectionBody::Group { .. } => None,
        }
    }

    pub fn children(&self) -> &[Section] {
        match &self.body {
            SectionBody::Leaf { .. } => &[],
            SectionBody::Group { children } => children,
        }
    }

    pub(super) fn children_mut(&mut self) -> Option<&mut Vec<Section>> {
        match &mut self.body {
            SectionBody::Leaf { .. } => None,
            SectionBody::Group { children } => Some(children),
        }
    }

    /// 写入正文；分组章节返回 false
    pub(super) fn set_content(&mut self, text: String) -> bool {
        match &mut self.body {
            SectionBody::Leaf { content, .. } => {
                *content = Some(text);
                true
            }
            SectionBody::Group { .. } => false,
        }
    }
}
