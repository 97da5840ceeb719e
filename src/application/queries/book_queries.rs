//! Book Queries

/// 获取会话中的书
#[derive(Debug, Clone)]
pub struct GetBook {
    pub session_id: String,
}

/// 列出可用模型
#[derive(Debug, Clone, Default)]
pub struct ListModels;
