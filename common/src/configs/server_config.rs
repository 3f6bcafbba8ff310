use serde::Deserialize;

/// 控制台HTTP监听配置
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 单个请求的处理超时（秒）
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn server_url(&self) -> String {
        format!("{}:{}", &self.host, self.port)
    }
}
