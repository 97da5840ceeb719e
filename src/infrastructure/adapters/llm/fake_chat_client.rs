//! Fake Chat Client - 用于测试的推理客户端
//!
//! 按顺序返回预设的回复，不实际调用推理服务

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{
    ChatRequest, ChatResponse, GenerationStatistics, InferenceError, InferencePort,
};

enum Scripted {
    Text(String),
    Fail(String),
}

/// Fake Chat Client
///
/// 预设回复用完后返回 fallback（未设置则报错），并记录收到的所有请求
#[derive(Default)]
pub struct FakeChatClient {
    scripted: Mutex<VecDeque<Scripted>>,
    fallback: Option<String>,
    models: Option<Vec<String>>,
    delay: Option<Duration>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条成功回复
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(Scripted::Text(text.into()));
        self
    }

    /// 追加一次服务端失败
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Scripted::Fail(message.into()));
        self
    }

    /// 预设回复用完后的默认回复
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    /// 每次调用前等待，模拟慢速服务
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = Some(models);
        self
    }

    /// 已收到的请求
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn push(&self, item: Scripted) {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted.push_back(item);
        }
    }
}

#[async_trait]
impl InferencePort for FakeChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, InferenceError> {
        let model = request.model.clone();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.scripted.lock().ok().and_then(|mut s| s.pop_front());
        let text = match next {
            Some(Scripted::Text(text)) => text,
            Some(Scripted::Fail(message)) => return Err(InferenceError::ServiceError(message)),
            None => self.fallback.clone().ok_or_else(|| {
                InferenceError::InvalidResponse("no scripted response left".to_string())
            })?,
        };

        tracing::debug!(model = %model, text_len = text.len(), "FakeChatClient: returning scripted text");

        let output_tokens = text.split_whitespace().count() as u64;
        Ok(ChatResponse {
            text,
            statistics: GenerationStatistics {
                model,
                input_tokens: 10,
                output_tokens,
                input_time: 0.01,
                output_time: 0.1,
                total_time: 0.11,
            },
        })
    }

    async fn list_models(&self) -> Result<Vec<String>, InferenceError> {
        self.models
            .clone()
            .ok_or_else(|| InferenceError::ServiceError("model listing unavailable".to_string()))
    }
}
