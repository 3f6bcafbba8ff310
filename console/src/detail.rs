use std::fmt;
use std::sync::Arc;

use common::Result;
use handlebars::Handlebars;
use serde::Serialize;

use crate::actions::{provider_actions, ActionView};
use crate::labels::{review_state_label, yes_no, DEFAULT_PROVIDER_WEIGHT, NO_CONSUMERS};
use crate::model::{ProviderInfo, ServiceSummary};
use crate::ratio::success_ratio;
use crate::views::DETAIL_TEMPLATE;

#[derive(Debug, Serialize)]
struct ProviderRow {
    address: String,
    weight: u32,
    can_degrade: &'static str,
    degraded: &'static str,
    review_state: &'static str,
    call_count: u64,
    fail_count: u64,
    success_ratio: String,
    actions: Vec<ActionView>,
}

impl ProviderRow {
    fn new(service_name: &str, provider: &ProviderInfo) -> Self {
        Self {
            address: provider.address(),
            weight: DEFAULT_PROVIDER_WEIGHT,
            can_degrade: yes_no(provider.is_support_degrade),
            degraded: yes_no(provider.is_degrade_service),
            review_state: review_state_label(provider.service_review_state),
            call_count: provider.call_count,
            fail_count: provider.fail_count,
            success_ratio: success_ratio(provider.call_count, provider.fail_count),
            actions: provider_actions(service_name, provider)
                .iter()
                .map(ActionView::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DetailView<'a> {
    service_name: &'a str,
    providers: Vec<ProviderRow>,
    consumers: Vec<String>,
    placeholder: &'static str,
}

/// 展开行的详情：服务提供者表与服务消费者表
///
/// 只依赖传入的行数据，不访问网络；相同输入得到相同输出。
#[derive(Clone)]
pub struct DetailRenderer {
    views: Arc<Handlebars<'static>>,
}

impl fmt::Debug for DetailRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetailRenderer").finish_non_exhaustive()
    }
}

impl DetailRenderer {
    pub fn new(views: Arc<Handlebars<'static>>) -> Self {
        Self { views }
    }

    pub fn render(&self, row: &ServiceSummary) -> Result<String> {
        let view = DetailView {
            service_name: &row.service_name,
            providers: row
                .provider_maps
                .values()
                .map(|provider| ProviderRow::new(&row.service_name, provider))
                .collect(),
            consumers: row.consumer_infos.iter().map(|c| c.address()).collect(),
            placeholder: NO_CONSUMERS,
        };

        Ok(self.views.render(DETAIL_TEMPLATE, &view)?)
    }
}
