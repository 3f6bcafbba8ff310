//! 行操作按钮
//!
//! 按钮以描述符的形式给出，由模板统一渲染；只有接到后端的操作才带有表单地址。

use serde::Serialize;

use crate::model::{ProviderInfo, ServiceSummary};

pub const REFRESH_ROUTE: &str = "/refresh";
pub const FORBID_ROUTE: &str = "/providers/forbid";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionHandler {
    /// 重新查询当前页
    RefreshPage,
    /// 修改负载策略，由外部系统处理
    EditLoadBalance { service_name: String },
    ForbidProvider {
        host: String,
        port: u16,
        service_name: String,
    },
    /// 降级，仅展示
    DegradeProvider {
        host: String,
        port: u16,
        service_name: String,
    },
    /// 审核通过，仅展示
    ApproveProvider {
        host: String,
        port: u16,
        service_name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub value: String,
}

impl ActionHandler {
    /// 表单提交地址，`None` 表示按钮不可用
    pub fn route(&self) -> Option<&'static str> {
        match self {
            ActionHandler::RefreshPage => Some(REFRESH_ROUTE),
            ActionHandler::ForbidProvider { .. } => Some(FORBID_ROUTE),
            ActionHandler::EditLoadBalance { .. }
            | ActionHandler::DegradeProvider { .. }
            | ActionHandler::ApproveProvider { .. } => None,
        }
    }

    pub fn fields(&self) -> Vec<FormField> {
        match self {
            ActionHandler::RefreshPage => Vec::new(),
            ActionHandler::EditLoadBalance { service_name } => vec![FormField {
                name: "service_name",
                value: service_name.clone(),
            }],
            ActionHandler::ForbidProvider {
                host,
                port,
                service_name,
            }
            | ActionHandler::DegradeProvider {
                host,
                port,
                service_name,
            }
            | ActionHandler::ApproveProvider {
                host,
                port,
                service_name,
            } => vec![
                FormField {
                    name: "host",
                    value: host.clone(),
                },
                FormField {
                    name: "port",
                    value: port.to_string(),
                },
                FormField {
                    name: "service_name",
                    value: service_name.clone(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAction {
    pub label: &'static str,
    pub icon: &'static str,
    pub style: &'static str,
    pub handler: ActionHandler,
}

/// 模板使用的按钮数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionView {
    pub label: &'static str,
    pub icon: &'static str,
    pub style: &'static str,
    pub route: Option<&'static str>,
    pub fields: Vec<FormField>,
}

impl From<&RowAction> for ActionView {
    fn from(action: &RowAction) -> Self {
        Self {
            label: action.label,
            icon: action.icon,
            style: action.style,
            route: action.handler.route(),
            fields: action.handler.fields(),
        }
    }
}

pub fn summary_actions(row: &ServiceSummary) -> Vec<RowAction> {
    vec![
        RowAction {
            label: "refresh",
            icon: "refresh",
            style: "success",
            handler: ActionHandler::RefreshPage,
        },
        RowAction {
            label: "load balance",
            icon: "edit",
            style: "warning",
            handler: ActionHandler::EditLoadBalance {
                service_name: row.service_name.clone(),
            },
        },
    ]
}

pub fn provider_actions(service_name: &str, provider: &ProviderInfo) -> Vec<RowAction> {
    let host = provider.host.clone();
    let port = provider.port;
    let service_name = service_name.to_string();

    vec![
        RowAction {
            label: "forbid",
            icon: "ban",
            style: "danger",
            handler: ActionHandler::ForbidProvider {
                host: host.clone(),
                port,
                service_name: service_name.clone(),
            },
        },
        RowAction {
            label: "degrade",
            icon: "arrow-down",
            style: "success",
            handler: ActionHandler::DegradeProvider {
                host: host.clone(),
                port,
                service_name: service_name.clone(),
            },
        },
        RowAction {
            label: "approve",
            icon: "check",
            style: "success",
            handler: ActionHandler::ApproveProvider {
                host,
                port,
                service_name,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_forbid_is_wired_for_providers() {
        let provider = ProviderInfo {
            host: "10.0.0.1".to_string(),
            port: 8080,
            ..Default::default()
        };
        let views: Vec<ActionView> = provider_actions("OrderService", &provider)
            .iter()
            .map(ActionView::from)
            .collect();

        assert_eq!(views.len(), 3);
        assert_eq!(views[0].label, "forbid");
        assert_eq!(views[0].route, Some(FORBID_ROUTE));
        assert_eq!(
            views[0].fields,
            vec![
                FormField { name: "host", value: "10.0.0.1".to_string() },
                FormField { name: "port", value: "8080".to_string() },
                FormField { name: "service_name", value: "OrderService".to_string() },
            ]
        );
        assert_eq!(views[1].route, None);
        assert_eq!(views[2].route, None);
    }

    #[test]
    fn test_summary_actions() {
        let row = ServiceSummary {
            service_name: "OrderService".to_string(),
            ..Default::default()
        };
        let actions = summary_actions(&row);
        assert_eq!(actions[0].handler.route(), Some(REFRESH_ROUTE));
        assert_eq!(actions[1].handler.route(), None);
    }
}
