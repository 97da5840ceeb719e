//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "SHELFWRIGHT";

/// 未配置 llm.api_key 时读取的环境变量
const FALLBACK_API_KEY_VAR: &str = "GROQ_API_KEY";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `SHELFWRIGHT_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `SHELFWRIGHT_SERVER__PORT=8080`
/// - `SHELFWRIGHT_LLM__BASE_URL=https://api.groq.com/openai/v1`
/// - `SHELFWRIGHT_LLM__API_KEY=gsk_...`（或 `GROQ_API_KEY`）
/// - `SHELFWRIGHT_GENERATION__MAX_SECTIONS=60`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    let defaults = AppConfig::default();
    builder = builder
        .set_default("server.host", defaults.server.host)?
        .set_default("server.port", defaults.server.port as i64)?
        .set_default("llm.base_url", defaults.llm.base_url)?
        .set_default("llm.timeout_secs", defaults.llm.timeout_secs)?
        .set_default("llm.default_model", defaults.llm.default_model)?
        .set_default("generation.max_depth", defaults.generation.max_depth as u64)?
        .set_default("generation.max_sections", defaults.generation.max_sections as u64)?
        .set_default("session.expire_secs", defaults.session.expire_secs)?
        .set_default("session.sweep_interval_secs", defaults.session.sweep_interval_secs)?
        .set_default("log.level", defaults.log.level)?
        .set_default("log.json", defaults.log.json)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 例如: SHELFWRIGHT_LLM__TIMEOUT_SECS=120
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let mut app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    // 6. API 密钥兜底
    if app_config.llm.api_key.as_deref().map_or(true, str::is_empty) {
        app_config.llm.api_key = std::env::var(FALLBACK_API_KEY_VAR)
            .ok()
            .filter(|k| !k.is_empty());
    }

    // 7. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.llm.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "LLM base URL cannot be empty".to_string(),
        ));
    }

    if config.llm.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "LLM timeout cannot be 0".to_string(),
        ));
    }

    if config.generation.max_depth == 0 || config.generation.max_sections == 0 {
        return Err(ConfigError::ValidationError(
            "Generation bounds must be greater than 0".to_string(),
        ));
    }

    if config.session.sweep_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Session sweep interval cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("LLM Base URL: {}", config.llm.base_url);
    tracing::info!("LLM API Key: {}", config.llm.masked_api_key());
    tracing::info!("LLM Timeout: {}s", config.llm.timeout_secs);
    tracing::info!("Default Model: {}", config.llm.default_model);
    tracing::info!(
        "Outline Bounds: depth <= {}, sections <= {}",
        config.generation.max_depth,
        config.generation.max_sections
    );
    tracing::info!(
        "Session Expire: {}s (sweep every {}s)",
        config.session.expire_secs,
        config.session.sweep_interval_secs
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.llm.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9100

[llm]
base_url = "http://localhost:11434/v1"
api_key = "file-key"

[generation]
max_sections = 12
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
        assert_eq!(config.llm.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.generation.max_sections, 12);
        assert_eq!(config.generation.max_depth, 6);
        assert_eq!(config.session.sweep_interval_secs, 300);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[generation]\nmax_depth = 0").unwrap();

        assert!(matches!(
            load_config_from_path(Some(file.path())),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_base_url() {
        let mut config = AppConfig::default();
        config.llm.base_url = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_sweep_interval() {
        let mut config = AppConfig::default();
        config.session.sweep_interval_secs = 0;
        assert!(validate_config(&config).is_err());
    }
}
