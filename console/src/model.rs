//! 注册中心返回的服务统计数据模型
//!
//! 字段名与后端JSON一致（camelCase）。缺失、为 `null` 或类型不符的字段按空值处理，
//! 未知的枚举值落到 `Unknown`，单个字段或单行损坏不会导致整页解析失败。

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// 查询接口必须携带的固定参数。
///
/// 后端要求 `bysex=1`，含义未在接口文档中说明，作为占位常量保留，
/// 等待后端确认后再决定是否可以去掉。不可由用户配置。
pub const BYSEX: u8 = 1;

/// 字段为 `null` 或类型不符时按默认值处理
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// 逐个解析数组元素，跳过无法解析的元素；不是数组时视为空
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("跳过无法解析的元素: {}", e);
                None
            }
        })
        .collect())
}

/// 逐项解析对象，跳过无法解析的值；不是对象时视为空
fn lenient_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Object(entries) => entries,
        _ => return Ok(BTreeMap::new()),
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value(value) {
            Ok(value) => Some((key, value)),
            Err(e) => {
                warn!("跳过无法解析的条目 {}: {}", key, e);
                None
            }
        })
        .collect())
}

/// 负载均衡策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadBalanceStrategy {
    /// 加权随机，兼容后端的旧拼写 `WEIGHTINGRANDOM`
    #[serde(alias = "WEIGHTINGRANDOM")]
    WeightedRandom,
    Random,
    /// 轮询
    Polling,
    #[default]
    #[serde(other)]
    Unknown,
}

/// 服务提供者的审核状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceReviewState {
    PassReview,
    HasNotReviewed,
    NotPassReview,
    Forbidden,
    #[default]
    #[serde(other)]
    Unknown,
}

/// 服务提供者信息，同一服务内以 (host, port) 唯一标识
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderInfo {
    #[serde(deserialize_with = "lenient")]
    pub host: String,
    #[serde(deserialize_with = "lenient")]
    pub port: u16,
    #[serde(deserialize_with = "lenient")]
    pub call_count: u64,
    #[serde(deserialize_with = "lenient")]
    pub fail_count: u64,
    #[serde(deserialize_with = "lenient")]
    pub is_support_degrade: bool,
    #[serde(deserialize_with = "lenient")]
    pub is_degrade_service: bool,
    #[serde(deserialize_with = "lenient")]
    pub service_review_state: ServiceReviewState,
    /// 平均处理时间，页面不展示
    #[serde(deserialize_with = "lenient")]
    pub handler_avg_time: Option<f64>,
    /// 平均请求包大小，页面不展示
    #[serde(deserialize_with = "lenient")]
    pub handler_data_avg_size: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub is_vip_service: Option<bool>,
}

impl ProviderInfo {
    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 服务消费者信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerInfo {
    #[serde(deserialize_with = "lenient")]
    pub host: String,
    #[serde(deserialize_with = "lenient")]
    pub port: u16,
}

impl ConsumerInfo {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 单个服务的汇总统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceSummary {
    #[serde(deserialize_with = "lenient")]
    pub service_name: String,
    #[serde(deserialize_with = "lenient")]
    pub total_call_count: u64,
    #[serde(deserialize_with = "lenient")]
    pub total_fail_count: u64,
    #[serde(deserialize_with = "lenient")]
    pub load_balance_strategy: LoadBalanceStrategy,
    /// 按key排序，保证渲染顺序稳定
    #[serde(deserialize_with = "lenient_map")]
    pub provider_maps: BTreeMap<String, ProviderInfo>,
    #[serde(deserialize_with = "lenient_seq")]
    pub consumer_infos: Vec<ConsumerInfo>,
}

/// 一页查询结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub rows: Vec<ServiceSummary>,
    pub total: u64,
}

impl<'de> Deserialize<'de> for Page {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawPage {
            #[serde(default, deserialize_with = "lenient_seq")]
            rows: Vec<ServiceSummary>,
            #[serde(default, deserialize_with = "lenient")]
            total: Option<u64>,
        }

        let raw = RawPage::deserialize(deserializer)?;
        // 缺少total时以当前行数为准
        let total = raw.total.unwrap_or(raw.rows.len() as u64);
        Ok(Page {
            rows: raw.rows,
            total,
        })
    }
}

/// 分页查询参数，每次查询时根据当前表格状态重新生成
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    /// 空字符串表示不过滤
    pub search_key: String,
    pub page_index: u32,
    pub page_size: u32,
}

impl QueryParams {
    pub fn new(search_key: impl Into<String>, page_index: u32, page_size: u32) -> Self {
        Self {
            search_key: search_key.into(),
            page_index,
            page_size,
        }
    }

    pub fn offset(&self) -> u64 {
        self.page_index as u64 * self.page_size as u64
    }

    /// 转换为后端查询接口的参数
    pub fn to_wire(&self) -> WireQuery<'_> {
        WireQuery {
            bysex: BYSEX,
            limit: self.page_size,
            offset: self.offset(),
            search: &self.search_key,
        }
    }
}

/// 查询接口的URL参数
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct WireQuery<'a> {
    pub bysex: u8,
    pub limit: u32,
    pub offset: u64,
    pub search: &'a str,
}
