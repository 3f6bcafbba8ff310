//! 页面上的文字标签
//!
//! 枚举到文字的映射都写成穷尽的 `match`，新增枚举值时编译期即会报错；
//! `Unknown` 统一渲染为空字符串。

use common::Error;

use crate::model::{LoadBalanceStrategy, ServiceReviewState};

/// 服务提供者的权重列。
///
/// 后端尚未返回真实权重，先固定展示注册中心的默认权重，待后端补充字段后替换。
pub const DEFAULT_PROVIDER_WEIGHT: u32 = 50;

pub const NO_CONSUMERS: &str = "no consumers";

pub fn load_balance_label(strategy: LoadBalanceStrategy) -> &'static str {
    match strategy {
        LoadBalanceStrategy::WeightedRandom => "weighted-random",
        LoadBalanceStrategy::Random => "random",
        LoadBalanceStrategy::Polling => "round-robin",
        LoadBalanceStrategy::Unknown => "",
    }
}

pub fn review_state_label(state: ServiceReviewState) -> &'static str {
    match state {
        ServiceReviewState::PassReview => "approved",
        ServiceReviewState::HasNotReviewed => "not reviewed",
        ServiceReviewState::NotPassReview => "rejected",
        ServiceReviewState::Forbidden => "forbidden",
        ServiceReviewState::Unknown => "",
    }
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// 页面上展示的错误说明，内部错误细节只写日志
pub fn error_label(error: &Error) -> String {
    match error {
        Error::Backend { status, .. } => format!("backend returned HTTP {}", status),
        Error::Http(e) if e.is_timeout() => "backend timed out".to_string(),
        Error::Http(e) if e.is_decode() => "backend sent an unreadable response".to_string(),
        Error::Http(_) => "backend unreachable".to_string(),
        Error::Busy(_) => "operation already in progress".to_string(),
        Error::BadRequest(_) => "invalid request".to_string(),
        Error::NotFound(_) => "not found".to_string(),
        Error::Template(_) | Error::Render(_) => "internal error".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_balance_labels() {
        assert_eq!(load_balance_label(LoadBalanceStrategy::WeightedRandom), "weighted-random");
        assert_eq!(load_balance_label(LoadBalanceStrategy::Random), "random");
        assert_eq!(load_balance_label(LoadBalanceStrategy::Polling), "round-robin");
        assert_eq!(load_balance_label(LoadBalanceStrategy::Unknown), "");
    }

    #[test]
    fn test_review_state_labels_are_distinct() {
        let states = [
            ServiceReviewState::PassReview,
            ServiceReviewState::HasNotReviewed,
            ServiceReviewState::NotPassReview,
            ServiceReviewState::Forbidden,
        ];
        let labels: Vec<_> = states.iter().map(|s| review_state_label(*s)).collect();
        assert_eq!(labels, vec!["approved", "not reviewed", "rejected", "forbidden"]);
        assert_eq!(review_state_label(ServiceReviewState::Unknown), "");
    }

    #[test]
    fn test_error_labels_are_plain_english() {
        assert_eq!(
            error_label(&Error::Backend { status: 502, url: "http://registry/index.do".into() }),
            "backend returned HTTP 502"
        );
        assert_eq!(error_label(&Error::Busy("OrderService@10.0.0.1:8080".into())), "operation already in progress");
        assert_eq!(
            error_label(&Error::Render(handlebars::RenderError::new("模板缺失"))),
            "internal error"
        );
    }
}
