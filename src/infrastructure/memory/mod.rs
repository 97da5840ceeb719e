//! Memory Layer - In-Memory State Management
//!
//! 实现 SessionManager，管理会话与书籍的内存状态

mod session_manager;

pub use session_manager::InMemorySessionManager;
