use serde::{Deserialize, Serialize};

/// 定向规则匹配器
///
/// 以 tagged variant 表达，不存在非法 kind 的状态；
/// 存储层落库时降级为 kind + match_key 两列。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleMatcher {
    /// 设备类型匹配（mobile / desktop 等归一化小写 token）
    Device(String),
    /// ISO 3166-1 alpha-2 国家代码匹配
    Geo(String),
}

impl RuleMatcher {
    pub fn kind(&self) -> &'static str {
        match self {
            RuleMatcher::Device(_) => "device",
            RuleMatcher::Geo(_) => "geo",
        }
    }

    pub fn key(&self) -> &str {
        match self {
            RuleMatcher::Device(key) | RuleMatcher::Geo(key) => key,
        }
    }
}

/// 定向规则：命中时覆盖默认目标 URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingRule {
    pub matcher: RuleMatcher,
    pub target_url: String,
}

/// 短链接记录（领域模型）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redirect {
    pub short_code: String,
    /// 为 None 且无规则命中时链接处于 pending 状态
    pub target_url: Option<String>,
    pub description: Option<String>,
    pub active: bool,
    pub owner_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub starts_at: Option<chrono::DateTime<chrono::Utc>>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Argon2id 哈希
    pub password: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    /// 插入顺序即匹配顺序
    pub rules: Vec<TargetingRule>,
}

impl Redirect {
    /// 当前时间是否落在可见窗口内
    ///
    /// 窗口外与不存在对访客不可区分，由调用方统一返回 NotFound。
    pub fn within_window(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        if let Some(starts_at) = self.starts_at
            && now < starts_at
        {
            return false;
        }
        if let Some(expires_at) = self.expires_at
            && now > expires_at
        {
            return false;
        }
        true
    }

    pub fn has_geo_rules(&self) -> bool {
        self.rules
            .iter()
            .any(|r| matches!(r.matcher, RuleMatcher::Geo(_)))
    }
}

/// 仪表盘列表查询的过滤条件
#[derive(Default, Clone, Debug)]
pub struct RedirectFilter {
    /// 模糊搜索 code 或 target
    pub search: Option<String>,
    pub created_after: Option<chrono::DateTime<chrono::Utc>>,
    pub created_before: Option<chrono::DateTime<chrono::Utc>>,
    pub only_expired: bool,
    pub only_active: bool,
}

/// 仪表盘汇总统计
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_links: u64,
    pub total_clicks: u64,
    pub active_links: u64,
}
