use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use crate::configs::{BackendConfig, LogConfig, ServerConfig, TableConfig};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "./config/config.yaml";

/// 环境变量前缀，例如 `CONSOLE__BACKEND__BASE_URL`
pub const ENV_PREFIX: &str = "CONSOLE";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig, // 管理后端
    pub table: TableConfig,
    pub log: LogConfig,
}

impl AppConfig {
    // 从多个来源加载配置
    pub fn from_file(file_path: Option<&str>) -> Result<Self, ConfigError> {
        // .env 中的变量与进程环境变量一样参与覆盖
        let _ = dotenv::dotenv();

        let path = file_path.unwrap_or(DEFAULT_CONFIG_PATH);
        let mut builder = Config::builder();

        // 1. 配置文件（不存在时使用默认值）
        if Path::new(path).exists() {
            let format = if path.ends_with(".json") {
                FileFormat::Json
            } else if path.ends_with(".yaml") || path.ends_with(".yml") {
                FileFormat::Yaml
            } else {
                FileFormat::Toml
            };
            builder = builder.add_source(File::with_name(path).format(format));
            info!("加载配置文件: {}", path);
        } else {
            warn!("配置文件 {} 不存在，使用默认配置", path);
        }

        // 2. 读取环境变量 (最高优先级)
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;

        // 转换为AppConfig结构体
        config.try_deserialize()
    }
}
