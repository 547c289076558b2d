//! Dashboard API 帮助函数

use actix_web::HttpResponse;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::api::constants;
use crate::errors::ShortgateError;
use crate::utils::TimeParser;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 解析过期时间字符串，支持相对格式（如 '1h', '30m'）和 RFC3339 格式
pub fn parse_expires_at(expire_str: &str) -> Result<chrono::DateTime<chrono::Utc>, String> {
    TimeParser::parse_expire_time(expire_str).map_err(|_| {
        format!(
            "Invalid time format: {}. Use relative format (e.g., '1h', '30m') or RFC3339 format",
            expire_str
        )
    })
}

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 ShortgateError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_shortgate(err: &ShortgateError) -> HttpResponse {
    let status = err.http_status();
    let error_code = ErrorCode::from(err.clone());
    error_response(status, error_code, err.message())
}

/// 统一 Result → HttpResponse 转换
///
/// 成功时返回 200 OK + JSON 数据，失败时自动映射 ShortgateError。
pub fn api_result<T, E>(result: Result<T, E>) -> HttpResponse
where
    T: Serialize,
    E: Into<ShortgateError>,
{
    match result {
        Ok(data) => success_response(data),
        Err(e) => {
            let err: ShortgateError = e.into();
            error_from_shortgate(&err)
        }
    }
}

/// 构建 pwd_<code> 授权 cookie
///
/// HttpOnly + SameSite=Lax；Secure 按配置；有效期与授权令牌一致。
pub fn build_grant_cookie(code: &str, token: String) -> Cookie<'static> {
    let config = crate::config::get_config();

    let mut cookie = Cookie::new(constants::grant_cookie_name(code), token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(config.auth.cookie_secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(actix_web::cookie::time::Duration::hours(
        config.auth.grant_ttl_hours as i64,
    ));
    cookie
}
