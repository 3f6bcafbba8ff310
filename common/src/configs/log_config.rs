use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub components: Option<HashMap<String, String>>, // 其他组件的日志级别
    pub format: Option<String>,                      // 日志输出格式: plain或json
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            components: None,
            format: None,
        }
    }
}
