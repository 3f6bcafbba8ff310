//! 管理命令下发
//!
//! 命令发送到注册中心的管理接口，只关心成功或失败，不解析响应内容。
//! 同一目标的命令在完成前不允许重复提交。

use std::collections::HashSet;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use async_trait::async_trait;
use common::configs::BackendConfig;
use common::{Error, Result};
use parking_lot::Mutex;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, warn};

/// 管理命令类型，数值与后端 `managerType` 参数一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerType {
    /// 禁用服务提供者
    Forbid,
}

impl ManagerType {
    pub fn code(self) -> u8 {
        match self {
            ManagerType::Forbid => 1,
        }
    }
}

/// 命令作用的目标：某个服务在某个地址上的提供者
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandTarget {
    pub host: String,
    pub port: u16,
    pub service_name: String,
}

impl Display for CommandTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.service_name, self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManagementCommand {
    pub manager_type: ManagerType,
    pub target: CommandTarget,
}

impl ManagementCommand {
    pub fn forbid(host: impl Into<String>, port: u16, service_name: impl Into<String>) -> Self {
        Self {
            manager_type: ManagerType::Forbid,
            target: CommandTarget {
                host: host.into(),
                port,
                service_name: service_name.into(),
            },
        }
    }

    pub fn to_wire(&self) -> WireCommand<'_> {
        WireCommand {
            manager_type: self.manager_type.code(),
            host: &self.target.host,
            port: self.target.port,
            service_name: &self.target.service_name,
        }
    }
}

/// 管理接口的URL参数
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireCommand<'a> {
    pub manager_type: u8,
    pub host: &'a str,
    pub port: u16,
    pub service_name: &'a str,
}

/// 管理后端
#[async_trait]
pub trait ManagementBackend: Send + Sync + Debug {
    async fn send(&self, command: &ManagementCommand) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct HttpManagementClient {
    http_client: Client,
    url: String,
}

impl HttpManagementClient {
    pub fn new(http_client: Client, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
        }
    }

    pub fn from_config(http_client: Client, config: &BackendConfig) -> Self {
        Self::new(http_client, config.manager_url())
    }
}

#[async_trait]
impl ManagementBackend for HttpManagementClient {
    async fn send(&self, command: &ManagementCommand) -> Result<()> {
        let response = self
            .http_client
            .get(&self.url)
            .query(&command.to_wire())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Backend {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }
        Ok(())
    }
}

/// 命令分发器
///
/// 调用方等待命令完成后再继续处理，同一目标同时只允许一条命令在途。
#[derive(Debug)]
pub struct CommandDispatcher {
    backend: Arc<dyn ManagementBackend>,
    in_flight: Arc<Mutex<HashSet<ManagementCommand>>>,
}

/// 在途标记，释放时从集合中移除，调用方被取消时同样生效
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<ManagementCommand>>>,
    command: ManagementCommand,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.command);
    }
}

impl CommandDispatcher {
    pub fn new(backend: Arc<dyn ManagementBackend>) -> Self {
        Self {
            backend,
            in_flight: Arc::default(),
        }
    }

    /// 禁用某个服务提供者
    pub async fn forbid_provider(&self, host: &str, port: u16, service_name: &str) -> Result<()> {
        self.dispatch(ManagementCommand::forbid(host, port, service_name))
            .await
    }

    /// 当前是否有针对该目标的命令在途
    pub fn is_in_flight(&self, command: &ManagementCommand) -> bool {
        self.in_flight.lock().contains(command)
    }

    pub async fn dispatch(&self, command: ManagementCommand) -> Result<()> {
        let _guard = self.acquire(&command)?;

        info!("下发管理命令 {:?}: {}", command.manager_type, command.target);
        match self.backend.send(&command).await {
            Ok(()) => {
                info!("管理命令执行成功: {}", command.target);
                Ok(())
            }
            Err(e) => {
                error!("管理命令执行失败 {}: {}", command.target, e);
                Err(e)
            }
        }
    }

    fn acquire(&self, command: &ManagementCommand) -> Result<InFlightGuard> {
        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(command.clone()) {
            warn!("重复提交的管理命令被拒绝: {}", command.target);
            return Err(Error::Busy(command.target.to_string()));
        }
        Ok(InFlightGuard {
            in_flight: self.in_flight.clone(),
            command: command.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;
    use tokio::sync::Notify;

    /// 记录收到的命令，可选地在返回前等待通知
    #[derive(Debug, Default)]
    struct RecordingBackend {
        sent: Mutex<Vec<ManagementCommand>>,
        gate: Option<Arc<Notify>>,
        fail: bool,
    }

    #[async_trait]
    impl ManagementBackend for RecordingBackend {
        async fn send(&self, command: &ManagementCommand) -> Result<()> {
            self.sent.lock().push(command.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                return Err(Error::Backend {
                    status: 503,
                    url: "mock".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_wire_command() {
        let command = ManagementCommand::forbid("10.0.0.1", 8080, "OrderService");
        assert_eq!(
            command.to_wire(),
            WireCommand {
                manager_type: 1,
                host: "10.0.0.1",
                port: 8080,
                service_name: "OrderService",
            }
        );
    }

    #[tokio::test]
    async fn test_forbid_provider_sends_command() {
        let backend = Arc::new(RecordingBackend::default());
        let dispatcher = CommandDispatcher::new(backend.clone());

        dispatcher
            .forbid_provider("10.0.0.1", 8080, "OrderService")
            .await
            .unwrap();

        let sent = backend.sent.lock();
        assert_eq!(*sent, vec![ManagementCommand::forbid("10.0.0.1", 8080, "OrderService")]);
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_guard_released() {
        let backend = Arc::new(RecordingBackend {
            fail: true,
            ..Default::default()
        });
        let dispatcher = CommandDispatcher::new(backend.clone());
        let command = ManagementCommand::forbid("10.0.0.1", 8080, "OrderService");

        let err = dispatcher.dispatch(command.clone()).await.unwrap_err();
        assert!(matches!(err, Error::Backend { status: 503, .. }));
        assert!(!dispatcher.is_in_flight(&command));
    }

    #[tokio::test]
    async fn test_double_submission_is_rejected_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(RecordingBackend {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let dispatcher = Arc::new(CommandDispatcher::new(backend.clone()));

        let first = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.forbid_provider("10.0.0.1", 8080, "OrderService").await })
        };

        // 等第一条命令进入后端
        while backend.sent.lock().is_empty() {
            tokio::task::yield_now().await;
        }

        let second = dispatcher
            .forbid_provider("10.0.0.1", 8080, "OrderService")
            .await;
        assert!(matches!(second, Err(Error::Busy(_))));

        // 放行第一条命令
        gate.notify_one();
        first.await.unwrap().unwrap();

        assert_eq!(backend.sent.lock().len(), 1);
        assert!(!dispatcher.is_in_flight(&ManagementCommand::forbid("10.0.0.1", 8080, "OrderService")));
    }

    #[tokio::test]
    async fn test_http_client_sends_manager_query() {
        let seen: Arc<Mutex<Vec<HashMap<String, String>>>> = Arc::default();
        let router = Router::new()
            .route(
                "/laopopo-console/manager.do",
                get(
                    |State(seen): State<Arc<Mutex<Vec<HashMap<String, String>>>>>,
                     Query(query): Query<HashMap<String, String>>| async move {
                        seen.lock().push(query);
                        "ok"
                    },
                ),
            )
            .route("/broken", get(|| async { StatusCode::BAD_GATEWAY }))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = HttpManagementClient::new(
            Client::new(),
            format!("http://{}/laopopo-console/manager.do", addr),
        );
        client
            .send(&ManagementCommand::forbid("10.0.0.1", 8080, "OrderService"))
            .await
            .unwrap();

        {
            let seen = seen.lock();
            assert_eq!(seen[0]["managerType"], "1");
            assert_eq!(seen[0]["host"], "10.0.0.1");
            assert_eq!(seen[0]["port"], "8080");
            assert_eq!(seen[0]["serviceName"], "OrderService");
        }

        let broken = HttpManagementClient::new(Client::new(), format!("http://{}/broken", addr));
        let err = broken
            .send(&ManagementCommand::forbid("10.0.0.1", 8080, "OrderService"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend { status: 502, .. }));
    }
}
