use std::sync::Arc;

use common::configs::TableConfig;
use common::{Error, Result};
use handlebars::Handlebars;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::detail::DetailRenderer;
use crate::dispatcher::{CommandDispatcher, ManagementBackend};
use crate::labels::error_label;
use crate::query_client::MetricsQuery;
use crate::table::{FetchOutcome, FetchTrigger, Notice, NoticeLevel, ServiceSummaryTable};
use crate::views::{self, PAGE_TEMPLATE};

/// 控制台
///
/// 串联查询客户端、汇总表、详情渲染和命令分发。表格状态只在锁内读写，
/// 锁不会跨越 `.await` 持有。
pub struct Dashboard {
    table: Mutex<ServiceSummaryTable>,
    query: Arc<dyn MetricsQuery>,
    dispatcher: CommandDispatcher,
    views: Arc<Handlebars<'static>>,
    detail: DetailRenderer,
    page_sizes: Vec<u32>,
}

/// 查询未完成就被取消时，负责结束表格的加载状态
struct PendingFetch<'a> {
    table: &'a Mutex<ServiceSummaryTable>,
    generation: u64,
    armed: bool,
}

impl PendingFetch<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingFetch<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.table.lock().abandon_fetch(self.generation);
        }
    }
}

impl Dashboard {
    pub fn new(
        query: Arc<dyn MetricsQuery>,
        backend: Arc<dyn ManagementBackend>,
        config: &TableConfig,
    ) -> Result<Self> {
        let views = Arc::new(views::registry()?);
        Ok(Self {
            table: Mutex::new(ServiceSummaryTable::new(config.page_size)),
            query,
            dispatcher: CommandDispatcher::new(backend),
            detail: DetailRenderer::new(views.clone()),
            views,
            page_sizes: config.page_sizes.clone(),
        })
    }

    /// 按当前条件重新查询
    pub async fn refresh(&self) -> Result<FetchOutcome> {
        self.fetch(FetchTrigger::Refresh).await
    }

    pub async fn search(&self, search_key: &str) -> Result<FetchOutcome> {
        self.fetch(FetchTrigger::Search(search_key.to_string()))
            .await
    }

    pub async fn navigate(&self, page_index: u32, page_size: u32) -> Result<FetchOutcome> {
        self.fetch(FetchTrigger::Navigate {
            page_index,
            page_size,
        })
        .await
    }

    async fn fetch(&self, trigger: FetchTrigger) -> Result<FetchOutcome> {
        let ticket = self.table.lock().begin_fetch(trigger)?;
        let pending = PendingFetch {
            table: &self.table,
            generation: ticket.generation,
            armed: true,
        };

        let result = self.query.fetch_page(&ticket.params).await;
        pending.disarm();

        if let Err(e) = &result {
            warn!("加载服务统计失败: {}", e);
        }

        let outcome = self.table.lock().complete_fetch(&ticket, result);
        debug!("查询结束 generation={}: {:?}", ticket.generation, outcome);
        Ok(outcome)
    }

    /// 单选，按服务名定位
    pub fn select(&self, service_name: &str) -> Result<()> {
        let mut table = self.table.lock();
        let index = table.index_of(service_name)?;
        table.select(index)
    }

    pub fn toggle_expand(&self, service_name: &str) -> Result<bool> {
        let mut table = self.table.lock();
        let index = table.index_of(service_name)?;
        table.toggle_expand(index)
    }

    /// 渲染缓存行的详情，不发起查询
    pub fn render_detail(&self, service_name: &str) -> Result<String> {
        let table = self.table.lock();
        let row = table.row(table.index_of(service_name)?)?;
        self.detail.render(row)
    }

    pub fn page_size(&self) -> u32 {
        self.table.lock().page_size()
    }

    /// 渲染整页，提示信息只展示一次
    pub fn render_page(&self) -> Result<String> {
        let view = {
            let mut table = self.table.lock();
            let view = table.view(&self.detail, &self.page_sizes)?;
            table.take_notice();
            view
        };
        Ok(self.views.render(PAGE_TEMPLATE, &view)?)
    }

    pub fn post_notice(&self, notice: Notice) {
        self.table.lock().set_notice(notice);
    }

    pub fn notice(&self) -> Option<Notice> {
        self.table.lock().notice().cloned()
    }

    /// 禁用服务提供者
    ///
    /// 等待命令完成后再返回。成功时重新加载当前页，失败时只给出提示，表格保持不变。
    pub async fn forbid_provider(&self, host: &str, port: u16, service_name: &str) -> Notice {
        let notice = match self
            .dispatcher
            .forbid_provider(host, port, service_name)
            .await
        {
            Ok(()) => Notice::success(format!(
                "forbade {}:{} for {}",
                host, port, service_name
            )),
            Err(Error::Busy(_)) => Notice::warning(format!(
                "forbid {}:{} for {} is already in progress",
                host, port, service_name
            )),
            Err(e) => Notice::error(format!(
                "failed to forbid {}:{} for {}: {}",
                host,
                port,
                service_name,
                error_label(&e)
            )),
        };
        self.post_notice(notice.clone());

        // 在途的查询早于命令发出，重新加载并使其过期
        if notice.level == NoticeLevel::Success {
            match self.fetch(FetchTrigger::Reload).await {
                Ok(outcome) => debug!("禁用后重新加载表格: {:?}", outcome),
                Err(e) => warn!("禁用后重新加载表格失败: {}", e),
            }
        }

        notice
    }

    #[cfg(test)]
    pub(crate) fn with_table<R>(&self, f: impl FnOnce(&ServiceSummaryTable) -> R) -> R {
        f(&self.table.lock())
    }
}
