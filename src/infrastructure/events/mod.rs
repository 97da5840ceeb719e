//! Events - 生成进度推送

mod publisher;

pub use publisher::{EventPublisher, GenerationEvent};
