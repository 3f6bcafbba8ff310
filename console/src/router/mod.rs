use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use common::Error;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::actions::{FORBID_ROUTE, REFRESH_ROUTE};
use crate::dashboard::Dashboard;
use crate::table::Notice;

type Shared = State<Arc<Dashboard>>;

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub index: u32,
    pub size: Option<u32>,
}

/// 行操作以服务名定位
#[derive(Debug, Deserialize)]
pub struct RowForm {
    pub service_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ForbidForm {
    pub host: String,
    pub port: u16,
    pub service_name: String,
}

/// 构建控制台路由
pub fn build(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/search", post(search))
        .route(REFRESH_ROUTE, post(refresh))
        .route("/page", get(page))
        .route("/rows/select", post(select_row))
        .route("/rows/expand", post(expand_row))
        .route("/rows/detail", get(row_detail))
        .route(FORBID_ROUTE, post(forbid))
        .with_state(dashboard)
}

/// 查询进行中时给出提示并回到首页，其它错误原样返回
fn settle<T>(dashboard: &Dashboard, result: common::Result<T>) -> Result<Redirect, Error> {
    match result {
        Ok(_) => Ok(Redirect::to("/")),
        Err(Error::Busy(what)) => {
            debug!("忽略重复请求: {}", what);
            dashboard.post_notice(Notice::warning("a query is already in progress"));
            Ok(Redirect::to("/"))
        }
        Err(e) => Err(e),
    }
}

async fn index(State(dashboard): Shared) -> Result<Html<String>, Error> {
    Ok(Html(dashboard.render_page()?))
}

/// 健康检查处理函数
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

async fn search(State(dashboard): Shared, Form(form): Form<SearchForm>) -> Result<Redirect, Error> {
    let result = dashboard.search(&form.search).await;
    settle(&dashboard, result)
}

async fn refresh(State(dashboard): Shared) -> Result<Redirect, Error> {
    let result = dashboard.refresh().await;
    settle(&dashboard, result)
}

async fn page(State(dashboard): Shared, Query(query): Query<PageQuery>) -> Result<Redirect, Error> {
    let page_size = query.size.unwrap_or_else(|| dashboard.page_size());
    let result = dashboard.navigate(query.index, page_size).await;
    settle(&dashboard, result)
}

async fn select_row(State(dashboard): Shared, Form(row): Form<RowForm>) -> Result<Redirect, Error> {
    dashboard.select(&row.service_name)?;
    Ok(Redirect::to("/"))
}

async fn expand_row(State(dashboard): Shared, Form(row): Form<RowForm>) -> Result<Redirect, Error> {
    dashboard.toggle_expand(&row.service_name)?;
    Ok(Redirect::to("/"))
}

async fn row_detail(State(dashboard): Shared, Query(row): Query<RowForm>) -> Result<Html<String>, Error> {
    Ok(Html(dashboard.render_detail(&row.service_name)?))
}

async fn forbid(State(dashboard): Shared, Form(form): Form<ForbidForm>) -> Redirect {
    let notice = dashboard
        .forbid_provider(&form.host, form.port, &form.service_name)
        .await;
    info!("禁用服务提供者 {}:{} ({}): {}", form.host, form.port, form.service_name, notice.message);
    Redirect::to("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{ManagementBackend, ManagementCommand};
    use crate::model::{Page, QueryParams, ServiceSummary};
    use crate::query_client::MetricsQuery;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use common::configs::TableConfig;
    use parking_lot::Mutex;
    use tower::ServiceExt;

    #[derive(Debug, Default)]
    struct StaticQuery {
        seen: Mutex<Vec<QueryParams>>,
    }

    #[async_trait]
    impl MetricsQuery for StaticQuery {
        async fn fetch_page(&self, params: &QueryParams) -> common::Result<Page> {
            self.seen.lock().push(params.clone());
            Ok(Page {
                rows: vec![ServiceSummary {
                    service_name: "OrderService".to_string(),
                    ..Default::default()
                }],
                total: 31,
            })
        }
    }

    #[derive(Debug, Default)]
    struct NullBackend {
        sent: Mutex<Vec<ManagementCommand>>,
    }

    #[async_trait]
    impl ManagementBackend for NullBackend {
        async fn send(&self, command: &ManagementCommand) -> common::Result<()> {
            self.sent.lock().push(command.clone());
            Ok(())
        }
    }

    fn app() -> (Router, Arc<StaticQuery>, Arc<NullBackend>, Arc<Dashboard>) {
        let query = Arc::new(StaticQuery::default());
        let backend = Arc::new(NullBackend::default());
        let dashboard = Arc::new(
            Dashboard::new(query.clone(), backend.clone(), &TableConfig::default()).unwrap(),
        );
        (build(dashboard.clone()), query, backend, dashboard)
    }

    fn form(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, ..) = app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_search_then_navigate() {
        let (app, query, ..) = app();

        let response = app
            .clone()
            .oneshot(form("/search", "search=Order"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app
            .oneshot(Request::get("/page?index=2&size=10").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let seen = query.seen.lock();
        assert_eq!(seen[0], QueryParams::new("Order", 0, 10));
        assert_eq!(seen[1], QueryParams::new("Order", 2, 10));
    }

    #[tokio::test]
    async fn test_unknown_row_is_not_found() {
        let (app, ..) = app();
        let response = app
            .oneshot(form("/rows/select", "service_name=Missing"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_forbid_form_dispatches_command() {
        let (app, _, backend, dashboard) = app();

        let response = app
            .oneshot(form(
                "/providers/forbid",
                "host=10.0.0.1&port=8080&service_name=OrderService",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            *backend.sent.lock(),
            vec![ManagementCommand::forbid("10.0.0.1", 8080, "OrderService")]
        );
        assert!(dashboard.notice().is_some());
    }

    #[tokio::test]
    async fn test_expanded_row_detail_by_service_name() {
        let (app, _, _, dashboard) = app();
        dashboard.refresh().await.unwrap();

        let response = app
            .clone()
            .oneshot(form("/rows/expand", "service_name=OrderService"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app
            .oneshot(
                Request::get("/rows/detail?service_name=OrderService")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&body).contains("no consumers"));

        let page = dashboard.render_page().unwrap();
        assert!(page.contains("detail-view"));
        assert!(page.contains("total 31"));
        assert!(page.contains(r#"action="/rows/select""#));
        assert!(page.contains(r#"<input type="hidden" name="service_name" value="OrderService">"#));
    }
}
