//! 跳转入口 HTTP 层
//!
//! GET /{code} 触发一次解析，按终态渲染响应；
//! POST /{code}/unlock 验证密码并下发 pwd_<code> 授权 cookie。

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use governor::middleware::NoOpMiddleware;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::api::constants::grant_cookie_name;
use crate::api::services::pages;
use crate::config::get_config;
use crate::services::resolver::{Outcome, Resolver, Visit};
use crate::utils::ip::{extract_client_ip, is_trusted_proxy};
use crate::utils::is_valid_short_code;

#[derive(Debug, Deserialize)]
pub struct UnlockForm {
    pub password: String,
}

/// 解锁限流的 key 提取器
///
/// 默认使用连接 IP（peer_addr），无法被伪造；
/// 连接来自配置的可信代理时使用 X-Forwarded-For。
#[derive(Clone, Copy)]
pub struct UnlockKeyExtractor;

impl KeyExtractor for UnlockKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        let conn_info = req.connection_info();

        let peer_ip = conn_info
            .peer_addr()
            .ok_or_else(|| SimpleKeyExtractionError::new("Unable to extract peer IP"))?;

        let config = get_config();
        let trusted_proxies = &config.server.trusted_proxies;

        if !trusted_proxies.is_empty() && is_trusted_proxy(peer_ip, trusted_proxies) {
            let real_ip = conn_info.realip_remote_addr().unwrap_or(peer_ip);
            debug!("Unlock rate limit key from trusted proxy: {}", real_ip);
            Ok(real_ip.to_string())
        } else {
            Ok(peer_ip.to_string())
        }
    }
}

/// 解锁端点限流：每秒补充 1 个令牌，突发最多 5 次
///
/// 密码验证本身没有锁定策略，限流是唯一的暴力破解缓解。
pub fn unlock_rate_limiter() -> Governor<UnlockKeyExtractor, NoOpMiddleware> {
    let config = GovernorConfigBuilder::default()
        .seconds_per_request(1)
        .burst_size(5)
        .key_extractor(UnlockKeyExtractor)
        .finish()
        .expect("Invalid rate limit config");

    debug!("Unlock rate limiter created: 1 req/s, burst 5");
    Governor::new(&config)
}

pub struct RedirectService {}

impl RedirectService {
    /// 根路径跳转到配置的兜底 URL
    pub async fn handle_root() -> impl Responder {
        let config = get_config();
        HttpResponse::TemporaryRedirect()
            .insert_header(("Location", config.redirect.fallback_url.as_str()))
            .finish()
    }

    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        resolver: web::Data<Arc<Resolver>>,
    ) -> impl Responder {
        let code = path.into_inner();

        if !is_valid_short_code(&code) {
            // 非法短码直接 404，不进解析
            trace!("Invalid short code rejected: {}", &code);
            return pages::not_found_response();
        }

        let visit = Self::build_visit(&req, &code);

        match resolver.resolve(&code, visit).await {
            Outcome::NotFound => pages::not_found_response(),
            Outcome::PasswordRequired => pages::password_page(&code, false),
            Outcome::Pending => pages::pending_page(),
            Outcome::Redirect { url, card } => {
                let config = get_config();
                if config.redirect.interstitial {
                    pages::interstitial_page(&url, &card)
                } else {
                    HttpResponse::build(StatusCode::TEMPORARY_REDIRECT)
                        .insert_header(("Location", url))
                        .finish()
                }
            }
        }
    }

    /// 密码验证：成功下发授权 cookie 并 303 回跳转页
    pub async fn handle_unlock(
        path: web::Path<String>,
        form: web::Form<UnlockForm>,
        resolver: web::Data<Arc<Resolver>>,
    ) -> impl Responder {
        let code = path.into_inner();

        if !is_valid_short_code(&code) {
            return pages::not_found_response();
        }

        match resolver.verify_password(&code, &form.password).await {
            Some(token) => {
                let cookie = crate::api::services::admin::build_grant_cookie(&code, token);
                HttpResponse::SeeOther()
                    .insert_header(("Location", format!("/{}", code)))
                    .cookie(cookie)
                    .finish()
            }
            None => pages::password_page(&code, true),
        }
    }

    /// 从请求收集访问上下文，授权令牌从 pwd_<code> cookie 显式取出
    fn build_visit(req: &HttpRequest, code: &str) -> Visit {
        let user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .map(String::from);
        let referrer = req
            .headers()
            .get("referer")
            .and_then(|h| h.to_str().ok())
            .map(String::from);
        let grant = req
            .cookie(&grant_cookie_name(code))
            .map(|c| c.value().to_string());

        Visit {
            user_agent,
            ip: extract_client_ip(req),
            referrer,
            now: chrono::Utc::now(),
            grant,
        }
    }
}

/// 跳转路由配置
pub fn redirect_routes() -> actix_web::Scope {
    web::scope("")
        .route("/", web::get().to(RedirectService::handle_root))
        .route(
            "/{code}/unlock",
            web::post()
                .to(RedirectService::handle_unlock)
                .wrap(unlock_rate_limiter()),
        )
        .route("/{code}", web::get().to(RedirectService::handle_redirect))
        .route("/{code}", web::head().to(RedirectService::handle_redirect))
}
