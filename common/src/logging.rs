use std::env;
use std::str::FromStr;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::Result;

// 日志输出格式类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    // 普通文本格式
    Plain,
    // JSON格式，适合ELK等日志聚合系统
    Json,
}

impl FromStr for LogFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Plain,
        })
    }
}

/// 根据配置构建过滤器字符串，例如 `info,console=debug`
pub fn filter_directives(config: &AppConfig) -> String {
    let mut filter_parts = vec![config.log.level.clone()];

    if let Some(components) = &config.log.components {
        // 保证输出稳定
        let mut components: Vec<_> = components.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_parts.push(format!("{}={}", component, level));
        }
    }

    filter_parts.join(",")
}

/// 从配置初始化日志系统
///
/// `RUST_LOG` 存在时覆盖配置文件中的级别；
/// `RUST_LOG_<COMPONENT>` 可以单独调整常见组件。
pub fn init_from_config(config: &AppConfig) -> Result<()> {
    let env_filter = match env::var("RUST_LOG") {
        Ok(env_filter) => EnvFilter::new(env_filter),
        Err(_) => EnvFilter::new(filter_directives(config)),
    };

    let env_filter = check_env_component_overrides(env_filter);

    let log_format = config
        .log
        .format
        .as_deref()
        .map(|format| format.parse().unwrap_or(LogFormat::Plain))
        .unwrap_or(LogFormat::Plain);

    // 重复初始化（例如测试中）时静默忽略
    let installed = match log_format {
        LogFormat::Plain => fmt()
            .with_env_filter(env_filter)
            .with_ansi(true)
            .with_thread_names(true)
            .try_init()
            .is_ok(),
        LogFormat::Json => fmt()
            .with_env_filter(env_filter)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_thread_names(true)
            .try_init()
            .is_ok(),
    };

    if installed {
        info!("日志系统从配置初始化成功，全局级别: {}", config.log.level);
        info!("日志格式: {:?}", log_format);
    }

    Ok(())
}

/// 检查环境变量中是否有组件特定的日志级别覆盖
fn check_env_component_overrides(mut env_filter: EnvFilter) -> EnvFilter {
    let common_components = ["console", "tower_http", "hyper", "axum", "reqwest"];

    for component in &common_components {
        let env_var_name = format!("RUST_LOG_{}", component.to_uppercase());
        if let Ok(level) = env::var(&env_var_name) {
            // 解析失败则忽略
            if let Ok(directive) = format!("{}={}", component, level).parse() {
                env_filter = env_filter.add_directive(directive);
            }
        }
    }

    env_filter
}
