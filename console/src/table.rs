//! 服务汇总表
//!
//! 表格持有当前页的全部行数据以及分页、选中、展开等界面状态。
//! 每次查询成功后整页替换；查询通过带代号的凭据完成，过期的响应直接丢弃。

use std::collections::BTreeSet;

use chrono::{DateTime, Local};
use common::{Error, Result};
use serde::Serialize;
use tracing::debug;

use crate::actions::{summary_actions, ActionView};
use crate::detail::DetailRenderer;
use crate::labels::{error_label, load_balance_label};
use crate::model::{Page, QueryParams, ServiceSummary};
use crate::ratio::success_ratio;

pub const COLUMNS: [&str; 6] = [
    "service name",
    "calls",
    "failures",
    "load balance",
    "success ratio",
    "actions",
];

/// 触发查询的界面事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTrigger {
    /// 按当前条件重新查询
    Refresh,
    /// 新的搜索关键字，回到第一页
    Search(String),
    /// 翻页或修改每页行数
    Navigate { page_index: u32, page_size: u32 },
    /// 按当前条件重新查询，进行中的查询随之过期
    Reload,
}

/// 一次查询的凭据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub params: QueryParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// 查询期间发生了翻页或重新加载，响应已过期
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    /// 尚未加载
    Idle,
    Ready,
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// 操作结果提示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryRowView {
    pub service_name: String,
    pub total_call_count: u64,
    pub total_fail_count: u64,
    pub load_balance: &'static str,
    pub success_ratio: String,
    pub selected: bool,
    pub expanded: bool,
    /// 展开时的详情片段
    pub detail: Option<String>,
    pub actions: Vec<ActionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationView {
    pub page_index: u32,
    pub page_number: u32,
    pub page_size: u32,
    pub page_count: u64,
    pub total: u64,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_index: u32,
    pub next_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSizeOption {
    pub size: u32,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct TableView {
    pub search_key: String,
    pub loading: bool,
    pub columns: &'static [&'static str],
    pub rows: Vec<SummaryRowView>,
    /// 无数据或查询失败时显示的文字
    pub status_message: Option<String>,
    pub notice: Option<Notice>,
    pub pagination: PaginationView,
    pub page_sizes: Vec<PageSizeOption>,
    pub last_loaded_at: Option<String>,
}

#[derive(Debug)]
pub struct ServiceSummaryTable {
    search_key: String,
    page_index: u32,
    page_size: u32,
    rows: Vec<ServiceSummary>,
    total: u64,
    selected: Option<usize>,
    expanded: BTreeSet<usize>,
    loading: bool,
    generation: u64,
    status: TableStatus,
    notice: Option<Notice>,
    last_loaded_at: Option<DateTime<Local>>,
}

impl ServiceSummaryTable {
    pub fn new(page_size: u32) -> Self {
        Self {
            search_key: String::new(),
            page_index: 0,
            page_size: page_size.max(1),
            rows: Vec::new(),
            total: 0,
            selected: None,
            expanded: BTreeSet::new(),
            loading: false,
            generation: 0,
            status: TableStatus::Idle,
            notice: None,
            last_loaded_at: None,
        }
    }

    pub fn query_params(&self) -> QueryParams {
        QueryParams::new(self.search_key.clone(), self.page_index, self.page_size)
    }

    /// 开始一次查询
    ///
    /// 查询进行中时拒绝刷新和搜索；翻页会使进行中的查询过期。
    pub fn begin_fetch(&mut self, trigger: FetchTrigger) -> Result<FetchTicket> {
        match trigger {
            FetchTrigger::Refresh => {
                if self.loading {
                    return Err(Error::Busy("查询进行中".to_string()));
                }
            }
            FetchTrigger::Search(search_key) => {
                if self.loading {
                    return Err(Error::Busy("查询进行中".to_string()));
                }
                self.search_key = search_key.trim().to_string();
                self.page_index = 0;
            }
            FetchTrigger::Reload => {}
            FetchTrigger::Navigate {
                page_index,
                page_size,
            } => {
                if page_size == 0 {
                    return Err(Error::BadRequest("page_size 必须大于0".to_string()));
                }
                self.page_index = page_index;
                self.page_size = page_size;
            }
        }

        self.generation += 1;
        self.loading = true;
        debug!("开始查询 generation={}", self.generation);

        Ok(FetchTicket {
            generation: self.generation,
            params: self.query_params(),
        })
    }

    /// 应用查询结果，过期的结果不改变任何状态
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, result: Result<Page>) -> FetchOutcome {
        if ticket.generation != self.generation {
            debug!(
                "丢弃过期的查询结果 generation={}, 当前={}",
                ticket.generation, self.generation
            );
            return FetchOutcome::Discarded;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                let selected = self.selected.and_then(|i| self.service_name(i));
                let expanded: Vec<String> = self
                    .expanded
                    .iter()
                    .filter_map(|i| self.service_name(*i))
                    .collect();

                self.rows = page.rows;
                self.total = page.total;
                self.status = if self.rows.is_empty() {
                    TableStatus::Empty
                } else {
                    TableStatus::Ready
                };
                self.last_loaded_at = Some(Local::now());

                // 同名服务在新数据中保持选中和展开
                self.selected = selected.and_then(|name| self.position(&name));
                self.expanded = expanded
                    .iter()
                    .filter_map(|name| self.position(name))
                    .collect();
            }
            Err(e) => {
                self.rows = Vec::new();
                self.total = 0;
                self.selected = None;
                self.expanded.clear();
                self.status = TableStatus::Failed(error_label(&e));
            }
        }

        FetchOutcome::Applied
    }

    /// 查询被取消时结束加载状态
    pub fn abandon_fetch(&mut self, generation: u64) {
        if generation == self.generation && self.loading {
            debug!("查询被取消 generation={}", generation);
            self.loading = false;
        }
    }

    fn service_name(&self, index: usize) -> Option<String> {
        self.rows.get(index).map(|row| row.service_name.clone())
    }

    fn position(&self, service_name: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.service_name == service_name)
    }

    /// 按服务名定位当前页中的行
    pub fn index_of(&self, service_name: &str) -> Result<usize> {
        self.position(service_name)
            .ok_or_else(|| Error::NotFound(format!("服务 {} 不在当前页", service_name)))
    }

    pub fn row(&self, index: usize) -> Result<&ServiceSummary> {
        self.rows
            .get(index)
            .ok_or_else(|| Error::NotFound(format!("第 {} 行不存在", index)))
    }

    pub fn rows(&self) -> &[ServiceSummary] {
        &self.rows
    }

    /// 单选
    pub fn select(&mut self, index: usize) -> Result<()> {
        self.row(index)?;
        self.selected = Some(index);
        Ok(())
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// 展开或收起一行，返回操作后是否展开
    pub fn toggle_expand(&mut self, index: usize) -> Result<bool> {
        self.row(index)?;
        if self.expanded.remove(&index) {
            Ok(false)
        } else {
            self.expanded.insert(index);
            Ok(true)
        }
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.contains(&index)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn status(&self) -> &TableStatus {
        &self.status
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// 取走提示，提示只在下一次渲染中出现
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn pagination(&self) -> PaginationView {
        let page_size = self.page_size.max(1);
        let page_count = self.total.div_ceil(page_size as u64).max(1);
        let has_next = (self.page_index as u64 + 1) < page_count;

        PaginationView {
            page_index: self.page_index,
            page_number: self.page_index.saturating_add(1),
            page_size,
            page_count,
            total: self.total,
            has_prev: self.page_index > 0,
            has_next,
            prev_index: self.page_index.saturating_sub(1),
            next_index: self.page_index.saturating_add(1),
        }
    }

    /// 生成页面数据，展开的行附带详情片段
    pub fn view(&self, detail: &DetailRenderer, page_sizes: &[u32]) -> Result<TableView> {
        let mut rows = Vec::with_capacity(self.rows.len());
        for (index, row) in self.rows.iter().enumerate() {
            let expanded = self.is_expanded(index);
            let detail = if expanded {
                Some(detail.render(row)?)
            } else {
                None
            };

            rows.push(SummaryRowView {
                service_name: row.service_name.clone(),
                total_call_count: row.total_call_count,
                total_fail_count: row.total_fail_count,
                load_balance: load_balance_label(row.load_balance_strategy),
                success_ratio: success_ratio(row.total_call_count, row.total_fail_count),
                selected: self.selected == Some(index),
                expanded,
                detail,
                actions: summary_actions(row).iter().map(ActionView::from).collect(),
            });
        }

        let status_message = match &self.status {
            TableStatus::Idle | TableStatus::Ready => None,
            TableStatus::Empty => Some("no matching records".to_string()),
            TableStatus::Failed(message) => Some(format!("failed to load: {}", message)),
        };

        let mut sizes: Vec<u32> = page_sizes.to_vec();
        if !sizes.contains(&self.page_size) {
            sizes.push(self.page_size);
            sizes.sort_unstable();
        }

        Ok(TableView {
            search_key: self.search_key.clone(),
            loading: self.loading,
            columns: &COLUMNS,
            rows,
            status_message,
            notice: self.notice.clone(),
            pagination: self.pagination(),
            page_sizes: sizes
                .into_iter()
                .map(|size| PageSizeOption {
                    size,
                    selected: size == self.page_size,
                })
                .collect(),
            last_loaded_at: self
                .last_loaded_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string()),
        })
    }
}
