//! Book Context - Errors

use thiserror::Error;

use super::SectionPath;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("无效的书名: {0}")]
    InvalidTitle(String),

    #[error("章节不存在: {0}")]
    SectionNotFound(SectionPath),

    #[error("章节不是叶子节点，无法写入正文: {0}")]
    NotALeaf(SectionPath),

    #[error("无效的章节路径: {0}")]
    InvalidPath(String),
}

/// 大纲解析错误
#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("大纲不是合法的 JSON: {0}")]
    InvalidJson(String),

    #[error("大纲顶层必须是 JSON 对象")]
    NotAnObject,

    #[error("大纲为空")]
    Empty,

    #[error("章节标题不能为空")]
    EmptyTitle,

    #[error("同一层级出现重复的章节标题: {title}")]
    DuplicateTitle { title: String },

    #[error("章节 {title} 的子大纲为空")]
    EmptyGroup { title: String },

    #[error("章节 {title} 的值类型不受支持: {kind}")]
    UnsupportedValue { title: String, kind: &'static str },

    #[error("大纲层级超过上限 {max}")]
    TooDeep { max: usize },

    #[error("大纲叶子章节数 {count} 超过上限 {max}")]
    TooManySections { count: usize, max: usize },
}
