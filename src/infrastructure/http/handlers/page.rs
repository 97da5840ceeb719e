//! Page Handler
//!
//! 单页前端，编译期嵌入

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../../../assets/index.html");

/// 返回页面
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
