//! HTTP Chat Client - 调用托管的对话补全服务
//!
//! 实现 InferencePort trait，兼容 OpenAI 风格的接口（默认指向 Groq）
//!
//! 外部 API:
//! POST {base_url}/chat/completions
//! Request: {"model": "...", "messages": [...], "response_format": {"type": "json_object"}}
//! Response: {"choices": [{"message": {"content": "..."}}], "usage": {...}}
//! GET  {base_url}/models
//! Response: {"data": [{"id": "..."}]}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{
    ChatRequest, ChatResponse, GenerationStatistics, InferenceError, InferencePort,
};

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// 服务端用量统计；时间字段只有部分服务商返回
#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    prompt_time: f64,
    #[serde(default)]
    completion_time: f64,
    #[serde(default)]
    total_time: f64,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// HTTP 对话补全客户端配置
#[derive(Debug, Clone)]
pub struct HttpChatClientConfig {
    /// API 基础 URL（包含版本前缀）
    pub base_url: String,
    /// API 密钥
    pub api_key: Option<String>,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpChatClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            timeout_secs: 300,
        }
    }
}

impl HttpChatClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 对话补全客户端
pub struct HttpChatClient {
    client: Client,
    config: HttpChatClientConfig,
}

impl HttpChatClient {
    pub fn new(config: HttpChatClientConfig) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InferenceError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.config.base_url.trim_end_matches('/'))
    }

    fn api_key(&self) -> Result<&str, InferenceError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(InferenceError::MissingApiKey)
    }

    fn map_send_error(e: reqwest::Error) -> InferenceError {
        if e.is_timeout() {
            InferenceError::Timeout
        } else if e.is_connect() {
            InferenceError::NetworkError(format!("Cannot connect to inference service: {}", e))
        } else {
            InferenceError::NetworkError(e.to_string())
        }
    }
}

fn build_messages(request: &ChatRequest) -> Vec<Message<'_>> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &request.system {
        messages.push(Message {
            role: "system",
            content: system,
        });
    }
    messages.push(Message {
        role: "user",
        content: &request.prompt,
    });
    messages
}

fn into_chat_response(
    requested_model: &str,
    response: CompletionResponse,
) -> Result<ChatResponse, InferenceError> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| InferenceError::InvalidResponse("empty completion".to_string()))?;

    let usage = response.usage.unwrap_or_default();
    let statistics = GenerationStatistics {
        model: response.model.unwrap_or_else(|| requested_model.to_string()),
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
        input_time: usage.prompt_time,
        output_time: usage.completion_time,
        total_time: usage.total_time,
    };

    Ok(ChatResponse {
        text: text.trim().to_string(),
        statistics,
    })
}

#[async_trait]
impl InferencePort for HttpChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, InferenceError> {
        let api_key = self.api_key()?;
        let body = CompletionRequest {
            model: &request.model,
            messages: build_messages(&request),
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        tracing::debug!(
            url = %self.completions_url(),
            model = %request.model,
            prompt_len = request.prompt.len(),
            json_mode = request.json_mode,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(InferenceError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let result = into_chat_response(&request.model, completion)?;

        tracing::info!(
            model = %result.statistics.model,
            input_tokens = result.statistics.input_tokens,
            output_tokens = result.statistics.output_tokens,
            total_time = result.statistics.total_time,
            "Chat completion finished"
        );

        Ok(result)
    }

    async fn list_models(&self) -> Result<Vec<String>, InferenceError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(self.models_url())
            .bearer_auth(api_key)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::ServiceError(format!("HTTP {}", status)));
        }

        let list: ModelList = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}
