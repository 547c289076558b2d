//! 定向规则选择
//!
//! 纯函数，无副作用：按存储顺序评估规则，首个结构化命中生效。
//! 匹配为大小写折叠后的精确相等，无评分、无特异性排序。

use crate::storage::models::{RuleMatcher, TargetingRule};

/// 返回首个命中规则的覆盖 URL
///
/// - `device`：归一化后的设备类别（见 user_agent 模块）
/// - `country`：解析出的国家代码，查询失败或未启用时为 None（geo 规则不命中）
pub fn select_target<'a>(
    rules: &'a [TargetingRule],
    device: &str,
    country: Option<&str>,
) -> Option<&'a str> {
    for rule in rules {
        let matched = match &rule.matcher {
            RuleMatcher::Device(key) => key.eq_ignore_ascii_case(device),
            RuleMatcher::Geo(key) => {
                country.is_some_and(|c| key.eq_ignore_ascii_case(c))
            }
        };
        if matched {
            return Some(&rule.target_url);
        }
    }
    None
}
