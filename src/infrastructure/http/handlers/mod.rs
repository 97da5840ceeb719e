//! HTTP Handlers

mod book;
mod models;
mod page;
mod ping;
mod session;
mod websocket;

pub use book::*;
pub use models::*;
pub use page::*;
pub use ping::*;
pub use session::*;
pub use websocket::*;
