//! Dashboard API 类型定义

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::ShortgateError;
use crate::storage::models::{DashboardStats, Redirect, RuleMatcher, TargetingRule};

/// 输出目录常量
pub const TS_EXPORT_PATH: &str = "../dashboard/src/services/types.generated.ts";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

/// 定向规则的 wire 形态（kind + key 两段字符串）
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct RulePayload {
    /// "device" | "geo"
    pub kind: String,
    pub key: String,
    pub target_url: String,
}

impl RulePayload {
    /// wire 形态 → tagged variant，未知 kind 是校验错误
    pub fn into_rule(self) -> Result<TargetingRule, ShortgateError> {
        let matcher = match self.kind.as_str() {
            "device" => RuleMatcher::Device(self.key),
            "geo" => RuleMatcher::Geo(self.key),
            other => {
                return Err(ShortgateError::validation(format!(
                    "Unknown targeting rule kind '{}'. Valid: device, geo",
                    other
                )));
            }
        };
        Ok(TargetingRule {
            matcher,
            target_url: self.target_url,
        })
    }
}

impl From<&TargetingRule> for RulePayload {
    fn from(rule: &TargetingRule) -> Self {
        Self {
            kind: rule.matcher.kind().to_string(),
            key: rule.matcher.key().to_string(),
            target_url: rule.target_url.clone(),
        }
    }
}

/// 创建/更新链接的请求体
#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PostRedirect {
    pub code: Option<String>,
    /// 可为空：允许创建 pending 链接
    pub target_url: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    pub starts_at: Option<String>,
    pub expires_at: Option<String>,
    /// Some(非空) 设置新密码；Some("") 清除；None 保持
    pub password: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub targeting_rules: Option<Vec<RulePayload>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub search: Option<String>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
    pub only_expired: Option<bool>,
    pub only_active: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PaginatedResponse<T> {
    pub code: i32,
    pub data: T,
    pub pagination: PaginationInfo,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PaginationInfo {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// 链接的响应形态（密码只回传 has_password，绝不回传哈希）
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct RedirectResponse {
    pub code: String,
    pub target_url: Option<String>,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: String,
    pub starts_at: Option<String>,
    pub expires_at: Option<String>,
    pub has_password: bool,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub targeting_rules: Vec<RulePayload>,
    pub click_count: u64,
}

impl RedirectResponse {
    pub fn from_redirect(link: Redirect, click_count: u64) -> Self {
        Self {
            code: link.short_code,
            target_url: link.target_url,
            description: link.description,
            active: link.active,
            created_at: link.created_at.to_rfc3339(),
            starts_at: link.starts_at.map(|dt| dt.to_rfc3339()),
            expires_at: link.expires_at.map(|dt| dt.to_rfc3339()),
            has_password: link.password.is_some(),
            og_title: link.og_title,
            og_description: link.og_description,
            og_image: link.og_image,
            targeting_rules: link.rules.iter().map(RulePayload::from).collect(),
            click_count,
        }
    }
}

/// 仪表盘汇总统计响应
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct StatsResponse {
    pub total_links: u64,
    pub total_clicks: u64,
    pub active_links: u64,
}

impl From<DashboardStats> for StatsResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_links: stats.total_links,
            total_clicks: stats.total_clicks,
            active_links: stats.active_links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::services::admin::analytics::{
        AnalyticsResponse, BreakdownEntry, ClickRow, DailyCount,
    };
    use crate::api::services::admin::error_code::ErrorCode;

    #[test]
    fn export_typescript_types() {
        // 运行此测试会自动生成 TypeScript 类型文件
        // cargo test export_typescript_types -- --nocapture

        RulePayload::export_all(&ts_rs::Config::default()).expect("Failed to export RulePayload");
        PostRedirect::export_all(&ts_rs::Config::default()).expect("Failed to export PostRedirect");
        ListQuery::export_all(&ts_rs::Config::default()).expect("Failed to export ListQuery");
        PaginationInfo::export_all(&ts_rs::Config::default()).expect("Failed to export PaginationInfo");
        RedirectResponse::export_all(&ts_rs::Config::default()).expect("Failed to export RedirectResponse");
        StatsResponse::export_all(&ts_rs::Config::default()).expect("Failed to export StatsResponse");

        // Analytics types
        AnalyticsResponse::export_all(&ts_rs::Config::default()).expect("Failed to export AnalyticsResponse");
        ClickRow::export_all(&ts_rs::Config::default()).expect("Failed to export ClickRow");
        DailyCount::export_all(&ts_rs::Config::default()).expect("Failed to export DailyCount");
        BreakdownEntry::export_all(&ts_rs::Config::default()).expect("Failed to export BreakdownEntry");

        ErrorCode::export_all(&ts_rs::Config::default()).expect("Failed to export ErrorCode");

        println!("TypeScript types exported to {}", TS_EXPORT_PATH);
    }

    #[test]
    fn test_rule_payload_round_trip() {
        let payload = RulePayload {
            kind: "device".to_string(),
            key: "mobile".to_string(),
            target_url: "https://m.example.com".to_string(),
        };
        let rule = payload.into_rule().unwrap();
        assert_eq!(rule.matcher, RuleMatcher::Device("mobile".to_string()));

        let back = RulePayload::from(&rule);
        assert_eq!(back.kind, "device");
        assert_eq!(back.key, "mobile");
    }

    #[test]
    fn test_rule_payload_unknown_kind() {
        let payload = RulePayload {
            kind: "weather".to_string(),
            key: "rainy".to_string(),
            target_url: "https://example.com".to_string(),
        };
        assert!(payload.into_rule().is_err());
    }
}
