//! LLM Adapter - 对话补全客户端实现

mod fake_chat_client;
mod http_chat_client;

pub use fake_chat_client::FakeChatClient;
pub use http_chat_client::*;
