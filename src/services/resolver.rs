//! 跳转决策核心
//!
//! 每个入站短码请求执行一次 resolve，按固定顺序短路求值：
//! 记录查找 → 启用/窗口门禁 → 密码门禁 → Bot 分类 → 定向规则 →
//! pending 判定 → 点击日志派发 → 跳转。
//!
//! 四种终态（NotFound / PasswordRequired / Pending / Redirect）每次调用
//! 恰好产生一个。点击日志是解析路径上唯一的写操作，fire-and-forget，
//! 失败只是可观测性事件，绝不影响跳转结果。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, error, trace};

use crate::analytics::{ClickManager, ClickRecord};
use crate::config::get_config;
use crate::errors::Result;
use crate::services::geoip::{GeoInfo, GeoIpProvider};
use crate::services::grant::GrantService;
use crate::services::targeting::select_target;
use crate::services::user_agent::{ClassifiedAgent, classify_user_agent};
use crate::storage::models::Redirect;
use crate::utils::ip::is_private_or_local;

/// 社交卡片元数据（插页渲染用）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialCard {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl SocialCard {
    fn from_record(record: &Redirect) -> Self {
        Self {
            title: record.og_title.clone(),
            description: record.og_description.clone(),
            image: record.og_image.clone(),
        }
    }
}

/// 一次解析的终态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 不存在、未启用、窗口外 —— 对访客统一不可区分
    NotFound,
    /// 设有密码且无有效授权；不记点击
    PasswordRequired,
    /// 无目标可跳；不记点击
    Pending,
    /// 跳转到生效目标；card 供展示层渲染插页
    Redirect { url: String, card: SocialCard },
}

/// 一次访问的请求上下文
///
/// 授权令牌由 HTTP 层从自己的 cookie 机制中取出显式传入，
/// 解析器不读任何环境态。
#[derive(Debug, Clone, Default)]
pub struct Visit {
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub referrer: Option<String>,
    /// 当前时间由调用方提供，窗口判定可测试
    pub now: DateTime<Utc>,
    /// pwd_<code> cookie 中的授权令牌
    pub grant: Option<String>,
}

impl Visit {
    pub fn now() -> Self {
        Self {
            now: Utc::now(),
            ..Default::default()
        }
    }
}

/// 解析器对存储的窄接口
#[async_trait]
pub trait RedirectStore: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<Redirect>>;
}

/// 跳转解析器
///
/// 协作方全部通过构造注入；并发解析之间没有共享可变状态。
pub struct Resolver {
    store: Arc<dyn RedirectStore>,
    clicks: Arc<ClickManager>,
    geoip: Arc<GeoIpProvider>,
    grants: Arc<GrantService>,
}

impl Resolver {
    pub fn new(
        store: Arc<dyn RedirectStore>,
        clicks: Arc<ClickManager>,
        geoip: Arc<GeoIpProvider>,
        grants: Arc<GrantService>,
    ) -> Self {
        Self {
            store,
            clicks,
            geoip,
            grants,
        }
    }

    /// 解析一次访问，返回唯一终态
    pub async fn resolve(&self, code: &str, visit: Visit) -> Outcome {
        // 1. 记录查找。存储错误对访客等同于不存在
        let record = match self.store.find_by_code(code).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("Redirect not found: {}", code);
                return Outcome::NotFound;
            }
            Err(e) => {
                error!("Store lookup failed for '{}': {}", code, e);
                return Outcome::NotFound;
            }
        };

        // 2. 启用标记与可见窗口，硬门禁
        if !record.active {
            debug!("Redirect inactive: {}", code);
            return Outcome::NotFound;
        }
        if !record.within_window(visit.now) {
            debug!("Redirect outside validity window: {}", code);
            return Outcome::NotFound;
        }

        // 3. 密码门禁。无有效授权即终止，不记点击
        if record.password.is_some() {
            let granted = visit
                .grant
                .as_deref()
                .is_some_and(|token| self.grants.verify(token, code));
            if !granted {
                trace!("Password required for: {}", code);
                return Outcome::PasswordRequired;
            }
        }

        // 4. UA 分类。Bot 照常跳转，只是不进统计
        let agent = classify_user_agent(visit.user_agent.as_deref().unwrap_or(""));

        // 5. 定向规则。仅当存在 geo 规则时才在解析路径上做 geo 查询
        let geo = if record.has_geo_rules() {
            self.lookup_geo(visit.ip.as_deref()).await
        } else {
            None
        };
        let country = geo.as_ref().and_then(|g| g.country.as_deref());

        let target = select_target(&record.rules, &agent.device, country)
            .map(str::to_string)
            .or_else(|| record.target_url.clone());

        let Some(target) = target else {
            trace!("Redirect pending (no target): {}", code);
            return Outcome::Pending;
        };

        // 6. 点击日志（非 Bot 且有目标时）
        if !agent.is_bot {
            self.dispatch_click(&record, visit, agent, geo);
        }

        Outcome::Redirect {
            url: target,
            card: SocialCard::from_record(&record),
        }
    }

    /// 密码验证：成功则签发 24h 授权令牌
    ///
    /// 未配置密码视为验证失败，调用方不会把"无密码"误当成"任意密码均可"。
    /// 无重试/锁定策略，每次调用独立。
    pub async fn verify_password(&self, code: &str, supplied: &str) -> Option<String> {
        let record = self.store.find_by_code(code).await.ok().flatten()?;
        let hash = record.password.as_deref()?;

        match crate::utils::password::verify_password(supplied, hash) {
            Ok(true) => self.grants.issue(code).ok(),
            Ok(false) => None,
            Err(e) => {
                error!("Password verification failed for '{}': {}", code, e);
                None
            }
        }
    }

    /// 解析路径上的 geo 查询（定向规则用）
    ///
    /// 失败返回 None，geo 规则不命中即可，解析本身不失败。
    async fn lookup_geo(&self, ip: Option<&str>) -> Option<GeoInfo> {
        let config = get_config();
        if !config.analytics.enable_geo_lookup {
            return None;
        }

        let ip = ip?;
        let ip_addr = ip.parse::<std::net::IpAddr>().ok()?;
        if is_private_or_local(&ip_addr) {
            return None;
        }

        self.geoip.lookup(ip).await
    }

    /// 构建点击记录并异步派发，不阻塞响应
    ///
    /// 同步阶段只拷贝原始字符串，geo 富化在后台任务里执行；
    /// 查询失败降级为 "Unknown"。
    fn dispatch_click(
        &self,
        record: &Redirect,
        visit: Visit,
        agent: ClassifiedAgent,
        resolved_geo: Option<GeoInfo>,
    ) {
        let config = get_config();
        let enable_geo_lookup = config.analytics.enable_geo_lookup;
        let enable_ip_logging = config.analytics.enable_ip_logging;

        let code = record.short_code.clone();
        let geoip = Arc::clone(&self.geoip);
        let clicks = Arc::clone(&self.clicks);

        tokio::spawn(async move {
            let mut click = ClickRecord {
                code,
                clicked_at: visit.now,
                user_agent: visit.user_agent,
                browser: agent.browser,
                os: agent.os,
                device: Some(agent.device),
                ip_address: if enable_ip_logging {
                    visit.ip.clone()
                } else {
                    None
                },
                referrer: visit.referrer,
                country: None,
                city: None,
            };

            if enable_geo_lookup {
                let geo = match resolved_geo {
                    // 定向阶段已查过，直接复用
                    Some(geo) => Some(geo),
                    None => match visit.ip.as_deref() {
                        Some(ip)
                            if ip
                                .parse::<std::net::IpAddr>()
                                .map(|a| !is_private_or_local(&a))
                                .unwrap_or(false) =>
                        {
                            geoip.lookup(ip).await
                        }
                        _ => None,
                    },
                };

                match geo {
                    Some(geo) => {
                        click.country = geo.country.or_else(|| Some("Unknown".to_string()));
                        click.city = geo.city.or_else(|| Some("Unknown".to_string()));
                    }
                    None => {
                        click.country = Some("Unknown".to_string());
                        click.city = Some("Unknown".to_string());
                    }
                }
            }

            clicks.record(click);
        });
    }
}
