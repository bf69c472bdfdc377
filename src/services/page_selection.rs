//! 快捷选页
//!
//! 根据策略名称生成单文档模式的页码列表，纯函数，不访问网络

use tracing::debug;

/// 快捷选页策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionStrategy {
    /// 全部页面
    All,
    /// 奇数页
    Odd,
    /// 偶数页
    Even,
    /// 前半部分（含中间页）
    FirstHalf,
    /// 后半部分
    SecondHalf,
}

impl SelectionStrategy {
    /// 获取策略名称
    pub fn name(self) -> &'static str {
        match self {
            SelectionStrategy::All => "all",
            SelectionStrategy::Odd => "odd",
            SelectionStrategy::Even => "even",
            SelectionStrategy::FirstHalf => "first-half",
            SelectionStrategy::SecondHalf => "second-half",
        }
    }

    /// 从名称解析策略（精确匹配）
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "all" => Some(SelectionStrategy::All),
            "odd" => Some(SelectionStrategy::Odd),
            "even" => Some(SelectionStrategy::Even),
            "first-half" => Some(SelectionStrategy::FirstHalf),
            "second-half" => Some(SelectionStrategy::SecondHalf),
            _ => None,
        }
    }

    /// 生成升序页码
    pub fn pages(self, page_count: u32) -> Vec<u32> {
        let half = page_count.div_ceil(2);
        match self {
            SelectionStrategy::All => (1..=page_count).collect(),
            SelectionStrategy::Odd => (1..=page_count).filter(|p| p % 2 == 1).collect(),
            SelectionStrategy::Even => (1..=page_count).filter(|p| p % 2 == 0).collect(),
            SelectionStrategy::FirstHalf => (1..=half).collect(),
            SelectionStrategy::SecondHalf => (half + 1..=page_count).collect(),
        }
    }
}

/// 按策略名称选页
///
/// 未知名称返回空列表而不是报错；空列表之后会在生成工作计划时被拒绝
pub fn quick_select(page_count: u32, strategy: &str) -> Vec<u32> {
    match SelectionStrategy::from_name(strategy) {
        Some(s) => s.pages(page_count),
        None => {
            debug!("未知的选页策略: {}，不选择任何页面", strategy);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_pages() {
        assert_eq!(quick_select(10, "all"), (1..=10).collect::<Vec<_>>());
        assert_eq!(quick_select(10, "odd"), vec![1, 3, 5, 7, 9]);
        assert_eq!(quick_select(10, "even"), vec![2, 4, 6, 8, 10]);
        assert_eq!(quick_select(10, "first-half"), vec![1, 2, 3, 4, 5]);
        assert_eq!(quick_select(10, "second-half"), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn seven_pages_put_middle_page_in_first_half() {
        assert_eq!(quick_select(7, "first-half"), vec![1, 2, 3, 4]);
        assert_eq!(quick_select(7, "second-half"), vec![5, 6, 7]);
    }

    #[test]
    fn single_page_has_empty_second_half() {
        assert_eq!(quick_select(1, "first-half"), vec![1]);
        assert!(quick_select(1, "second-half").is_empty());
        assert!(quick_select(1, "even").is_empty());
    }

    #[test]
    fn zero_pages_select_nothing() {
        for name in ["all", "odd", "even", "first-half", "second-half"] {
            assert!(quick_select(0, name).is_empty(), "{name}");
        }
    }

    #[test]
    fn unknown_strategy_is_noop() {
        assert!(quick_select(10, "every-third").is_empty());
        assert!(quick_select(10, "ALL").is_empty());
    }

    #[test]
    fn names_round_trip() {
        for s in [
            SelectionStrategy::All,
            SelectionStrategy::Odd,
            SelectionStrategy::Even,
            SelectionStrategy::FirstHalf,
            SelectionStrategy::SecondHalf,
        ] {
            assert_eq!(SelectionStrategy::from_name(s.name()), Some(s));
        }
    }
}
