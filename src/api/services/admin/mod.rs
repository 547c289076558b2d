//! Dashboard API 服务模块
//!
//! 该模块包含仪表盘 API 的所有端点，包括：
//! - 链接 CRUD 操作
//! - 分析统计读取
//! - 汇总统计

pub mod analytics;
pub mod error_code;
mod helpers;
mod redirect_crud;
pub mod routes;
mod types;

// 重新导出类型
pub use types::*;

// 重新导出帮助函数
pub use helpers::{
    api_result, build_grant_cookie, error_from_shortgate, error_response, parse_expires_at,
    success_response,
};

// 重新导出错误码
pub use error_code::ErrorCode;

// 重新导出 CRUD 端点
pub use redirect_crud::{
    create_redirect, delete_redirect, get_redirect, get_stats, list_redirects, update_redirect,
};

// 重新导出分析端点
pub use analytics::get_redirect_analytics;
