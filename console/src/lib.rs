//! 服务监控控制台
//!
//! 分页查询注册中心的服务调用统计，渲染汇总表与提供者/消费者详情，
//! 并向管理后端下发禁用服务提供者的命令。

pub mod actions;
pub mod dashboard;
pub mod detail;
pub mod dispatcher;
pub mod labels;
pub mod model;
pub mod query_client;
pub mod ratio;
pub mod router;
pub mod table;
pub mod views;

pub use dashboard::Dashboard;
