//! Shelfwright - 大纲驱动的书籍生成服务
//!
//! 组装顺序：配置 -> 日志 -> 适配器 -> 应用状态 -> 过期清理 -> HTTP 服务

use std::sync::Arc;
use std::time::Duration;

use shelfwright::application::SessionManagerPort;
use shelfwright::config::{load_config, print_config, AppConfig};
use shelfwright::infrastructure::adapters::{DocumentExporter, HttpChatClient, HttpChatClientConfig};
use shelfwright::infrastructure::events::EventPublisher;
use shelfwright::infrastructure::http::{AppState, HttpServer, ServerConfig};
use shelfwright::infrastructure::memory::InMemorySessionManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Shelfwright - book generation service");
    print_config(&config);

    // 对话补全客户端
    let mut llm_config = HttpChatClientConfig::new(config.llm.base_url.clone())
        .with_timeout(config.llm.timeout_secs);
    match config.llm.api_key.as_deref() {
        Some(key) => llm_config = llm_config.with_api_key(key),
        None => tracing::warn!(
            "No API key configured; generation requests will fail until \
             SHELFWRIGHT_LLM__API_KEY or GROQ_API_KEY is set"
        ),
    }
    let inference = Arc::new(
        HttpChatClient::new(llm_config)
            .map_err(|e| anyhow::anyhow!("Failed to create chat client: {}", e))?,
    );

    let session_manager = InMemorySessionManager::new().arc();
    let event_publisher = EventPublisher::new().arc();

    spawn_session_sweeper(
        session_manager.clone(),
        event_publisher.clone(),
        config.session.expire_secs,
        config.session.sweep_interval_secs,
    );

    let state = AppState::new(
        inference,
        session_manager,
        Arc::new(DocumentExporter::new()),
        event_publisher,
        config.generation.limits(),
        config.llm.default_model.clone(),
    );

    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let server = HttpServer::new(server_config, Arc::new(state));

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志；`RUST_LOG` 优先于配置
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},shelfwright={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 周期性关闭空闲过久的会话
fn spawn_session_sweeper(
    session_manager: Arc<InMemorySessionManager>,
    event_publisher: Arc<EventPublisher>,
    expire_secs: u64,
    interval_secs: u64,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // 第一次 tick 立即返回
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let expired = session_manager.get_expired_sessions(expire_secs);
            if expired.is_empty() {
                continue;
            }

            for session_id in &expired {
                event_publisher.publish_session_closed(session_id, "expired");
                if let Err(e) = session_manager.close(session_id) {
                    tracing::warn!(session_id = %session_id, error = %e, "Failed to close expired session");
                }
                event_publisher.unregister_session(session_id);
            }

            tracing::info!(
                closed = expired.len(),
                remaining = session_manager.list_all().len(),
                "Expired sessions swept"
            );
        }
    });
}
