use serde::Deserialize;

/// 服务汇总表的分页配置
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TableConfig {
    /// 默认每页行数
    pub page_size: u32,
    /// 页面上可选的每页行数
    pub page_sizes: Vec<u32>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            page_sizes: vec![10, 25, 50, 100],
        }
    }
}
