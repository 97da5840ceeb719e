//! Session Command Handlers

use std::sync::Arc;

use crate::application::commands::session_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{BookSession, SessionManagerPort};
use crate::infrastructure::events::EventPublisher;

/// CreateSession Handler - 创建会话并注册事件通道
pub struct CreateSessionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl CreateSessionHandler {
    pub fn new(
        session_manager: Arc<dyn SessionManagerPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            session_manager,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        _cmd: CreateSessionCommand,
    ) -> Result<CreateSessionResponse, ApplicationError> {
        let session_id = self.session_manager.create(BookSession::new())?;
        self.event_publisher.register_session(&session_id);

        Ok(CreateSessionResponse { session_id })
    }
}

/// CloseSession Handler - 关闭会话
pub struct CloseSessionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl CloseSessionHandler {
    pub fn new(
        session_manager: Arc<dyn SessionManagerPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            session_manager,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CloseSessionCommand,
    ) -> Result<CloseSessionResponse, ApplicationError> {
        // 发布会话关闭事件
        self.event_publisher
            .publish_session_closed(&cmd.session_id, "client_close");

        self.session_manager.close(&cmd.session_id)?;

        // 取消注册事件通道
        self.event_publisher.unregister_session(&cmd.session_id);

        Ok(CloseSessionResponse {
            session_id: cmd.session_id,
        })
    }
}

/// ResetSession Handler - 丢弃会话中的书
pub struct ResetSessionHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl ResetSessionHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(
        &self,
        cmd: ResetSessionCommand,
    ) -> Result<ResetSessionResponse, ApplicationError> {
        self.session_manager.reset(&cmd.session_id)?;

        tracing::info!(session_id = %cmd.session_id, "Session reset");

        Ok(ResetSessionResponse {
            session_id: cmd.session_id,
        })
    }
}
