//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

use crate::domain::book::OutlineLimits;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 对话补全服务配置
    #[serde(default)]
    pub llm: LlmConfig,

    /// 生成边界
    #[serde(default)]
    pub generation: GenerationConfig,

    /// 会话过期配置
    #[serde(default)]
    pub session: SessionConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 对话补全服务配置（OpenAI 兼容接口）
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// API 基础 URL（包含版本前缀）
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// API 密钥；未配置时读取 GROQ_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    /// 单次请求超时时间（秒）
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// 页面默认选中的模型
    #[serde(default = "default_model")]
    pub default_model: String,
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_timeout() -> u64 {
    300
}

fn default_model() -> String {
    "llama3-70b-8192".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: None,
            timeout_secs: default_llm_timeout(),
            default_model: default_model(),
        }
    }
}

impl LlmConfig {
    /// 用于日志输出的密钥掩码
    pub fn masked_api_key(&self) -> String {
        match self.api_key.as_deref() {
            None | Some("") => "<not set>".to_string(),
            Some(key) if key.chars().count() <= 8 => "****".to_string(),
            Some(key) => {
                let head: String = key.chars().take(4).collect();
                format!("{}****", head)
            }
        }
    }
}

/// 生成边界配置
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// 大纲最大层级
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// 最多叶子章节数
    #[serde(default = "default_max_sections")]
    pub max_sections: usize,
}

fn default_max_depth() -> usize {
    OutlineLimits::default().max_depth
}

fn default_max_sections() -> usize {
    OutlineLimits::default().max_sections
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_sections: default_max_sections(),
        }
    }
}

impl GenerationConfig {
    pub fn limits(&self) -> OutlineLimits {
        OutlineLimits {
            max_depth: self.max_depth,
            max_sections: self.max_sections,
        }
    }
}

/// 会话过期配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// 空闲多久后过期（秒）
    #[serde(default = "default_session_expire")]
    pub expire_secs: u64,

    /// 过期扫描间隔（秒）
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_session_expire() -> u64 {
    6 * 3600
}

fn default_sweep_interval() -> u64 {
    300
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expire_secs: default_session_expire(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 输出 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_api_key() {
        let mut llm = LlmConfig::default();
        assert_eq!(llm.masked_api_key(), "<not set>");
        llm.api_key = Some("short".to_string());
        assert_eq!(llm.masked_api_key(), "****");
        llm.api_key = Some("gsk_abcdefghijklmnop".to_string());
        assert_eq!(llm.masked_api_key(), "gsk_****");
    }

    #[test]
    fn test_generation_limits() {
        let limits = GenerationConfig::default().limits();
        assert_eq!(limits.max_depth, 6);
        assert_eq!(limits.max_sections, 120);
    }
}
