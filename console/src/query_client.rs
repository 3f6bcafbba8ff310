use std::fmt::Debug;

use async_trait::async_trait;
use common::configs::BackendConfig;
use common::{Error, Result};
use reqwest::Client;
use tracing::{debug, error};

use crate::model::{Page, QueryParams};

/// 服务统计分页查询接口
#[async_trait]
pub trait MetricsQuery: Send + Sync + Debug {
    /// 按分页参数查询一页服务汇总，行顺序由后端决定
    async fn fetch_page(&self, params: &QueryParams) -> Result<Page>;
}

/// 基于HTTP的查询客户端
#[derive(Debug, Clone)]
pub struct HttpMetricsQueryClient {
    http_client: Client,
    url: String,
}

impl HttpMetricsQueryClient {
    pub fn new(http_client: Client, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
        }
    }

    pub fn from_config(http_client: Client, config: &BackendConfig) -> Self {
        Self::new(http_client, config.query_url())
    }
}

#[async_trait]
impl MetricsQuery for HttpMetricsQueryClient {
    async fn fetch_page(&self, params: &QueryParams) -> Result<Page> {
        if params.page_size == 0 {
            return Err(Error::BadRequest("page_size 必须大于0".to_string()));
        }

        debug!(
            "查询服务统计: page_index={}, page_size={}, search={:?}",
            params.page_index, params.page_size, params.search_key
        );

        let response = self
            .http_client
            .get(&self.url)
            .query(&params.to_wire())
            .send()
            .await
            .map_err(|e| {
                error!("查询服务统计失败: {}", e);
                Error::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("查询服务统计返回错误状态: {}", status);
            return Err(Error::Backend {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let page = response.json::<Page>().await.map_err(|e| {
            error!("解析服务统计失败: {}", e);
            Error::Http(e)
        })?;

        debug!("查询到 {} 条服务统计，共 {} 条", page.rows.len(), page.total);
        Ok(page)
    }
}
