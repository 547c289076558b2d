//! Dashboard API 链接 CRUD 操作
//!
//! 所有操作都以认证中间件注入的 owner id 为范围；
//! 不属于该 owner 的记录一律表现为 404，不区分"不存在"与"不属于"。

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::{error, info, trace};

use crate::api::middleware::OwnerId;
use crate::storage::models::{Redirect, RedirectFilter, TargetingRule};
use crate::storage::SeaOrmStorage;
use crate::utils::password::process_new_password;
use crate::utils::url_validator::validate_url;
use crate::utils::{generate_random_code, is_reserved_short_code, is_valid_short_code};

use super::error_code::ErrorCode;
use super::helpers::{
    api_result, error_from_shortgate, error_response, parse_expires_at, success_response,
};
use super::types::{
    ListQuery, PaginatedResponse, PaginationInfo, PostRedirect, RedirectResponse, RulePayload,
    StatsResponse,
};

/// 获取 owner 名下所有链接（支持分页和过滤）
pub async fn list_redirects(
    owner: OwnerId,
    query: web::Query<ListQuery>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    trace!("Dashboard API: list redirects with filters: {:?}", query);

    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).clamp(1, 100);

    let filter = RedirectFilter {
        search: query.search.clone(),
        created_after: query
            .created_after
            .as_ref()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&chrono::Utc)),
        created_before: query
            .created_before
            .as_ref()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&chrono::Utc)),
        only_expired: query.only_expired == Some(true),
        only_active: query.only_active == Some(true),
    };

    match storage.list_for_owner(&owner.0, page, page_size, filter).await {
        Ok((links, total)) => {
            let total_pages = total.div_ceil(page_size);
            let data: Vec<RedirectResponse> = links
                .into_iter()
                .map(|(link, clicks)| RedirectResponse::from_redirect(link, clicks))
                .collect();

            info!(
                "Dashboard API: returning {} redirects (page {} of {}, total: {})",
                data.len(),
                page,
                total_pages,
                total
            );

            Ok(HttpResponse::Ok()
                .append_header(("Content-Type", "application/json; charset=utf-8"))
                .json(PaginatedResponse {
                    code: 0,
                    data,
                    pagination: PaginationInfo {
                        page,
                        page_size,
                        total,
                        total_pages,
                    },
                }))
        }
        Err(e) => {
            error!("Dashboard API: list failed: {}", e);
            Ok(error_from_shortgate(&e))
        }
    }
}

/// 把 wire 规则列表转换为领域规则，顺带校验覆盖 URL
fn convert_rules(payloads: Vec<RulePayload>) -> Result<Vec<TargetingRule>, HttpResponse> {
    let mut rules = Vec::with_capacity(payloads.len());
    for payload in payloads {
        if let Err(e) = validate_url(&payload.target_url) {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::LinkInvalidUrl,
                e.message(),
            ));
        }
        match payload.into_rule() {
            Ok(rule) => rules.push(rule),
            Err(e) => {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::LinkInvalidRule,
                    e.message(),
                ));
            }
        }
    }
    Ok(rules)
}

/// 解析可选时间字段；空字符串显式清除
fn parse_time_field(
    value: &Option<String>,
    existing: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, String> {
    match value.as_deref() {
        None => Ok(existing),
        Some("") => Ok(None),
        Some(s) => parse_expires_at(s).map(Some),
    }
}

/// 创建新链接
pub async fn create_redirect(
    owner: OwnerId,
    payload: web::Json<PostRedirect>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let payload = payload.into_inner();
    let config = crate::config::get_config();

    // 未提供短码则随机生成
    let code = match payload.code.as_ref().filter(|c| !c.is_empty()) {
        Some(provided) => {
            if !is_valid_short_code(provided) {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::LinkInvalidCode,
                    "Invalid short code. Only alphanumeric, underscore, hyphen and dot allowed.",
                ));
            }
            if is_reserved_short_code(provided) {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::LinkReservedCode,
                    "Short code conflicts with reserved routes",
                ));
            }
            provided.clone()
        }
        None => {
            trace!("Dashboard API: no code provided, generating a new one");
            generate_random_code(config.redirect.random_code_length)
        }
    };

    info!(
        "Dashboard API: create redirect - code: {}, target: {:?}",
        code, payload.target_url
    );

    // 目标可为空（pending 链接），给了就必须合法
    if let Some(ref target) = payload.target_url
        && let Err(e) = validate_url(target)
    {
        return Ok(error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::LinkInvalidUrl,
            e.message(),
        ));
    }

    let rules = match convert_rules(payload.targeting_rules.unwrap_or_default()) {
        Ok(rules) => rules,
        Err(response) => return Ok(response),
    };

    let starts_at = match parse_time_field(&payload.starts_at, None) {
        Ok(v) => v,
        Err(msg) => {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidDateFormat,
                &msg,
            ));
        }
    };
    let expires_at = match parse_time_field(&payload.expires_at, None) {
        Ok(v) => v,
        Err(msg) => {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::LinkInvalidExpireTime,
                &msg,
            ));
        }
    };

    let password = match process_new_password(payload.password.as_deref()) {
        Ok(p) => p,
        Err(e) => return Ok(error_from_shortgate(&e)),
    };

    let link = Redirect {
        short_code: code.clone(),
        target_url: payload.target_url.filter(|t| !t.is_empty()),
        description: payload.description,
        active: payload.active.unwrap_or(true),
        owner_id: owner.0,
        created_at: chrono::Utc::now(),
        starts_at,
        expires_at,
        password,
        og_title: payload.og_title,
        og_description: payload.og_description,
        og_image: payload.og_image,
        rules,
    };

    match storage.create(link.clone()).await {
        Ok(_) => {
            info!("Dashboard API: redirect created - {}", code);
            Ok(HttpResponse::Created()
                .append_header(("Content-Type", "application/json; charset=utf-8"))
                .json(super::types::ApiResponse {
                    code: 0,
                    message: "OK".to_string(),
                    data: Some(RedirectResponse::from_redirect(link, 0)),
                }))
        }
        Err(e) => {
            error!("Dashboard API: failed to create redirect - {}: {}", code, e);
            Ok(error_from_shortgate(&e))
        }
    }
}

/// 获取单个链接
pub async fn get_redirect(
    owner: OwnerId,
    code: web::Path<String>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    trace!("Dashboard API: get redirect - {}", code);

    match storage.find_for_owner(&code, &owner.0).await {
        Ok(Some(link)) => {
            let clicks = storage.count_clicks(&code).await.unwrap_or(0);
            Ok(success_response(RedirectResponse::from_redirect(
                link, clicks,
            )))
        }
        Ok(None) => Ok(error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::LinkNotFound,
            "Redirect not found",
        )),
        Err(e) => Ok(error_from_shortgate(&e)),
    }
}

/// 更新链接
///
/// 请求中省略的字段保持原值；target_url / starts_at / expires_at / password
/// 传空字符串表示显式清除。规则给了就整体替换。
pub async fn update_redirect(
    owner: OwnerId,
    code: web::Path<String>,
    payload: web::Json<PostRedirect>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let payload = payload.into_inner();
    info!("Dashboard API: update redirect - {}", code);

    let existing = match storage.find_for_owner(&code, &owner.0).await {
        Ok(Some(link)) => link,
        Ok(None) => {
            info!("Dashboard API: attempt to update nonexistent redirect - {}", code);
            return Ok(error_response(
                StatusCode::NOT_FOUND,
                ErrorCode::LinkNotFound,
                "Redirect not found",
            ));
        }
        Err(e) => return Ok(error_from_shortgate(&e)),
    };

    let target_url = match payload.target_url {
        None => existing.target_url.clone(),
        Some(ref t) if t.is_empty() => None,
        Some(t) => {
            if let Err(e) = validate_url(&t) {
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::LinkInvalidUrl,
                    e.message(),
                ));
            }
            Some(t)
        }
    };

    let rules = match payload.targeting_rules {
        None => existing.rules.clone(),
        Some(payloads) => match convert_rules(payloads) {
            Ok(rules) => rules,
            Err(response) => return Ok(response),
        },
    };

    let starts_at = match parse_time_field(&payload.starts_at, existing.starts_at) {
        Ok(v) => v,
        Err(msg) => {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidDateFormat,
                &msg,
            ));
        }
    };
    let expires_at = match parse_time_field(&payload.expires_at, existing.expires_at) {
        Ok(v) => v,
        Err(msg) => {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::LinkInvalidExpireTime,
                &msg,
            ));
        }
    };

    // 密码：Some(非空) 换新，Some("") 清除，None 保持
    let password = match payload.password.as_deref() {
        None => existing.password.clone(),
        Some("") => None,
        Some(new_password) => match process_new_password(Some(new_password)) {
            Ok(p) => p,
            Err(e) => return Ok(error_from_shortgate(&e)),
        },
    };

    let updated = Redirect {
        short_code: existing.short_code.clone(),
        target_url,
        description: payload.description.or(existing.description),
        active: payload.active.unwrap_or(existing.active),
        owner_id: existing.owner_id.clone(),
        created_at: existing.created_at,
        starts_at,
        expires_at,
        password,
        og_title: payload.og_title.or(existing.og_title),
        og_description: payload.og_description.or(existing.og_description),
        og_image: payload.og_image.or(existing.og_image),
        rules,
    };

    match storage.update(updated.clone(), &owner.0).await {
        Ok(_) => {
            info!("Dashboard API: redirect updated - {}", code);
            let clicks = storage.count_clicks(&code).await.unwrap_or(0);
            Ok(success_response(RedirectResponse::from_redirect(
                updated, clicks,
            )))
        }
        Err(e) => {
            error!("Dashboard API: failed to update redirect - {}: {}", code, e);
            Ok(error_from_shortgate(&e))
        }
    }
}

/// 删除链接（级联点击与规则，不可逆）
pub async fn delete_redirect(
    owner: OwnerId,
    code: web::Path<String>,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    info!("Dashboard API: delete redirect - {}", code);

    match storage.delete(&code, &owner.0).await {
        Ok(_) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => {
            error!("Dashboard API: failed to delete redirect - {}: {}", code, e);
            Ok(error_from_shortgate(&e))
        }
    }
}

/// 仪表盘汇总统计
pub async fn get_stats(
    owner: OwnerId,
    storage: web::Data<Arc<SeaOrmStorage>>,
) -> ActixResult<impl Responder> {
    let result = storage
        .stats_for_owner(&owner.0)
        .await
        .map(StatsResponse::from);
    Ok(api_result(result))
}
