//! 调用成功率
//!
//! 成功率 = call * 100 / (call + fail)，取浮点数最短十进制表示的前4个字符后加 `%`。
//! 截断而非四舍五入：99.99… 显示为 `99.9%`，2/3 显示为 `66.6%`。

/// 调用次数与失败次数都为0时的占位符
pub const RATIO_PLACEHOLDER: &str = "—";

/// 百分号前保留的字符数
pub const RATIO_WIDTH: usize = 4;

pub fn success_ratio(call_count: u64, fail_count: u64) -> String {
    let total = call_count as f64 + fail_count as f64;
    if total == 0.0 {
        return RATIO_PLACEHOLDER.to_string();
    }

    let ratio = call_count as f64 * 100.0 / total;
    let text = ratio.to_string();
    // 数字文本只包含ASCII字符，按字节截断是安全的
    let truncated = &text[..text.len().min(RATIO_WIDTH)];
    format!("{}%", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_counts_render_placeholder() {
        assert_eq!(success_ratio(0, 0), RATIO_PLACEHOLDER);
    }

    #[test]
    fn test_boundary_values() {
        assert_eq!(success_ratio(0, 1), "0%");
        assert_eq!(success_ratio(1, 1), "50%");
        assert_eq!(success_ratio(100, 0), "100%");
        assert_eq!(success_ratio(2, 1), "66.6%");
        assert_eq!(success_ratio(1, 2), "33.3%");
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        // 99.99
        assert_eq!(success_ratio(9999, 1), "99.9%");
        // 12.5
        assert_eq!(success_ratio(1, 7), "12.5%");
        // 0.0999000999000999
        assert_eq!(success_ratio(1, 1000), "0.09%");
    }

    #[test]
    fn test_large_counts_do_not_overflow() {
        assert_eq!(success_ratio(u64::MAX, u64::MAX), "50%");
    }
}
