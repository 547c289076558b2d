pub mod manager;
pub mod sink;

pub use manager::ClickManager;
pub use sink::ClickSink;

use chrono::{DateTime, Utc};

/// 单次访问的点击记录
///
/// 落库后不可变；机器人访问不产生记录。
#[derive(Debug, Clone)]
pub struct ClickRecord {
    /// 短链接代码
    pub code: String,
    /// 点击时间戳
    pub clicked_at: DateTime<Utc>,
    /// 原始 User-Agent
    pub user_agent: Option<String>,
    /// 解析出的浏览器名称
    pub browser: Option<String>,
    /// 解析出的操作系统名称
    pub os: Option<String>,
    /// 设备类别（mobile / desktop / ...）
    pub device: Option<String>,
    /// 客户端 IP（代理链取第一跳）
    pub ip_address: Option<String>,
    /// 来源页面 (Referer header)
    pub referrer: Option<String>,
    /// 国家代码 (ISO 3166-1 alpha-2)，查询失败为 "Unknown"
    pub country: Option<String>,
    /// 城市名称，查询失败为 "Unknown"
    pub city: Option<String>,
}

impl ClickRecord {
    pub fn new(code: String) -> Self {
        Self {
            code,
            clicked_at: Utc::now(),
            user_agent: None,
            browser: None,
            os: None,
            device: None,
            ip_address: None,
            referrer: None,
            country: None,
            city: None,
        }
    }
}
