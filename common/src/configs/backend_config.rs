use serde::Deserialize;
use std::time::Duration;

/// 管理后端配置
///
/// 查询接口与管理接口共用同一个基础地址
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    /// 后端基础地址，例如 `http://127.0.0.1:8080`
    pub base_url: String,
    /// 分页查询接口路径
    pub query_path: String,
    /// 管理命令接口路径
    pub manager_path: String,
    /// 请求超时（毫秒）
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            query_path: "/laopopo-console/index.do".to_string(),
            manager_path: "/laopopo-console/manager.do".to_string(),
            timeout_ms: 5000,
        }
    }
}

impl BackendConfig {
    pub fn query_url(&self) -> String {
        join_url(&self.base_url, &self.query_path)
    }

    pub fn manager_url(&self) -> String {
        join_url(&self.base_url, &self.manager_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// 合并URL
pub fn join_url(base: &str, path: &str) -> String {
    let base_ends_with_slash = base.ends_with('/');
    let path_starts_with_slash = path.starts_with('/');

    match (base_ends_with_slash, path_starts_with_slash) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}
