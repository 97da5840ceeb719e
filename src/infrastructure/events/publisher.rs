//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现：每个会话一个 broadcast 通道

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::application::ports::GenerationStatistics;
use crate::domain::book::SectionPath;

const CHANNEL_CAPACITY: usize = 100;

/// WebSocket 事件类型
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum GenerationEvent {
    /// 开始生成
    GenerationStarted { session_id: String },
    /// 书名已生成
    TitleGenerated { title: String },
    /// 结构已生成
    StructureGenerated { total_sections: usize },
    /// 单个章节已生成
    SectionGenerated {
        path: SectionPath,
        completed: usize,
        total: usize,
    },
    /// 全部生成完成
    GenerationCompleted {
        title: String,
        statistics: GenerationStatistics,
    },
    /// 生成失败
    GenerationFailed { error: String },
    /// 会话关闭
    SessionClosed { session_id: String, reason: String },
}

/// 事件发布器
pub struct EventPublisher {
    /// session_id -> broadcast sender
    session_channels: DashMap<String, broadcast::Sender<GenerationEvent>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            session_channels: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 注册会话的事件通道，已注册时复用
    pub fn register_session(&self, session_id: &str) -> broadcast::Receiver<GenerationEvent> {
        self.session_channels
            .entry(session_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// 取消注册会话
    pub fn unregister_session(&self, session_id: &str) {
        self.session_channels.remove(session_id);
    }

    /// 获取会话的事件接收器
    pub fn subscribe(&self, session_id: &str) -> Option<broadcast::Receiver<GenerationEvent>> {
        self.session_channels.get(session_id).map(|s| s.subscribe())
    }

    /// 发布事件到指定会话；没有订阅者时丢弃
    pub fn publish(&self, session_id: &str, event: GenerationEvent) {
        if let Some(sender) = self.session_channels.get(session_id) {
            if let Err(e) = sender.send(event) {
                tracing::debug!(
                    session_id = %session_id,
                    error = %e,
                    "Failed to publish event (no receivers)"
                );
            }
        }
    }

    /// 发布会话关闭事件
    pub fn publish_session_closed(&self, session_id: &str, reason: &str) {
        self.publish(
            session_id,
            GenerationEvent::SessionClosed {
                session_id: session_id.to_string(),
                reason: reason.to_string(),
            },
        );
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_registered_session_only() {
        let publisher = EventPublisher::new();
        let mut rx_a = publisher.register_session("a");
        let mut rx_b = publisher.register_session("b");

        publisher.publish("a", GenerationEvent::StructureGenerated { total_sections: 3 });

        match rx_a.recv().await.unwrap() {
            GenerationEvent::StructureGenerated { total_sections } => {
                assert_eq!(total_sections, 3)
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn test_register_reuses_channel() {
        let publisher = EventPublisher::new();
        let _rx1 = publisher.register_session("s");
        let mut rx2 = publisher.register_session("s");

        publisher.publish("s", GenerationEvent::TitleGenerated { title: "T".into() });
        assert!(rx2.try_recv().is_ok());

        publisher.unregister_session("s");
        assert!(publisher.subscribe("s").is_none());
    }

    #[test]
    fn test_event_wire_format() {
        let event = GenerationEvent::SectionGenerated {
            path: SectionPath::root("Part").child("Intro"),
            completed: 1,
            total: 4,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "SectionGenerated");
        assert_eq!(value["data"]["path"], serde_json::json!(["Part", "Intro"]));
        assert_eq!(value["data"]["total"], 4);
    }
}
