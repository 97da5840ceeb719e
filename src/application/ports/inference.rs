//! Inference Port - 对话补全推理抽象
//!
//! 定义托管对话补全 API 的抽象接口，具体实现在 infrastructure/adapters/llm 层

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// 推理错误
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing API key")]
    MissingApiKey,
}

/// 对话补全请求
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// 模型标识
    pub model: String,
    /// 系统提示词
    pub system: Option<String>,
    /// 用户提示词
    pub prompt: String,
    /// 要求模型输出 JSON 对象
    pub json_mode: bool,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            prompt: prompt.into(),
            json_mode: false,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// 对话补全响应
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// 生成的文本
    pub text: String,
    /// 本次调用的用量统计
    pub statistics: GenerationStatistics,
}

/// 生成统计（仅用于展示）
///
/// 时间单位为秒，与服务端 usage 字段一致
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationStatistics {
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub input_time: f64,
    pub output_time: f64,
    pub total_time: f64,
}

impl GenerationStatistics {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// 输出速度（tokens/s）
    pub fn output_speed(&self) -> f64 {
        if self.output_time > 0.0 {
            self.output_tokens as f64 / self.output_time
        } else {
            0.0
        }
    }

    /// 累加另一次调用的统计
    ///
    /// 模型名不同时记为 "mixed"
    pub fn add(&mut self, other: &GenerationStatistics) {
        if self.model.is_empty() {
            self.model = other.model.clone();
        } else if self.model != other.model {
            self.model = "mixed".to_string();
        }
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.input_time += other.input_time;
        self.output_time += other.output_time;
        self.total_time += other.total_time;
    }
}

/// Inference Port
///
/// 外部对话补全服务的抽象接口
#[async_trait]
pub trait InferencePort: Send + Sync {
    /// 执行一次对话补全，失败不重试
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, InferenceError>;

    /// 列出服务端可用模型
    async fn list_models(&self) -> Result<Vec<String>, InferenceError>;
}
