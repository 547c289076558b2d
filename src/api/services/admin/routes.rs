//! Dashboard API 路由配置

use actix_web::web;

use super::analytics::get_redirect_analytics;
use super::redirect_crud::{
    create_redirect, delete_redirect, get_redirect, get_stats, list_redirects, update_redirect,
};

/// 链接管理路由 `/redirects`
///
/// 包含：
/// - GET /redirects - 获取所有链接（分页 + 过滤）
/// - POST /redirects - 创建链接
/// - GET /redirects/{code} - 获取单个链接
/// - PUT /redirects/{code} - 更新链接
/// - DELETE /redirects/{code} - 删除链接
/// - GET /redirects/{code}/analytics - 单链接分析数据
pub fn redirects_routes() -> actix_web::Scope {
    web::scope("/redirects")
        .route("", web::get().to(list_redirects))
        .route("", web::post().to(create_redirect))
        // Analytics (must be before /{code})
        .route("/{code}/analytics", web::get().to(get_redirect_analytics))
        .route("/{code}", web::get().to(get_redirect))
        .route("/{code}", web::put().to(update_redirect))
        .route("/{code}", web::delete().to(delete_redirect))
}

/// 统计路由 `/stats`
pub fn stats_routes() -> actix_web::Scope {
    web::scope("/stats").route("", web::get().to(get_stats))
}
