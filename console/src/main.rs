use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum_server::Handle;
use clap::Parser;
use common::config::{AppConfig, DEFAULT_CONFIG_PATH};
use console::dispatcher::HttpManagementClient;
use console::query_client::HttpMetricsQueryClient;
use console::{router, Dashboard};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// 优雅关闭时等待在途请求的最长时间
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Parser)]
#[command(name = "console", about = "服务注册中心监控控制台")]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 加载配置
    let config = AppConfig::from_file(Some(&args.config))
        .with_context(|| format!("加载配置失败: {}", args.config))?;

    // 初始化日志
    common::logging::init_from_config(&config)?;
    info!("正在启动监控控制台...");

    let http_client = reqwest::Client::builder()
        .timeout(config.backend.timeout())
        .build()
        .context("创建HTTP客户端失败")?;

    let query = HttpMetricsQueryClient::from_config(http_client.clone(), &config.backend);
    let backend = HttpManagementClient::from_config(http_client, &config.backend);
    let dashboard = Arc::new(Dashboard::new(
        Arc::new(query),
        Arc::new(backend),
        &config.table,
    )?);

    // 首屏数据，失败时页面展示错误状态，服务照常启动
    if let Err(e) = dashboard.refresh().await {
        warn!("首次加载服务统计失败: {}", e);
    }

    let app = configure_middleware(
        router::build(dashboard),
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr: SocketAddr = config
        .server
        .server_url()
        .parse()
        .with_context(|| format!("无效的监听地址: {}", config.server.server_url()))?;
    info!("监控控制台监听: http://{}", addr);
    info!("管理后端: {}", config.backend.base_url);

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    if let Err(err) = axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await
    {
        error!("服务器错误: {}", err);
        return Err(err.into());
    }

    info!("监控控制台已关闭");
    Ok(())
}

/// 配置中间件
fn configure_middleware(app: Router, request_timeout: Duration) -> Router {
    app.layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// 等待 Ctrl+C 或 SIGTERM，然后通知服务器优雅关闭
async fn shutdown_signal(handle: Handle) {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("无法安装Ctrl+C处理器: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("无法安装SIGTERM处理器: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("接收到关闭信号，准备优雅关闭...");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
