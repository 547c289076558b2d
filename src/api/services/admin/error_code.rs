//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};
use ts_rs::TS;

use super::types::TS_EXPORT_PATH;

use crate::errors::ShortgateError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，ts-rs 自动生成 TypeScript 类型。
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: 链接错误
/// - 6000-6099: 分析统计错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[ts(rename = "ErrorCode")]
#[ts(repr(enum))]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    InvalidDateFormat = 1012,

    // 认证错误 2000-2099
    AuthFailed = 2000,
    RateLimitExceeded = 2004,

    // 链接错误 3000-3099
    LinkNotFound = 3000,
    LinkAlreadyExists = 3001,
    LinkInvalidUrl = 3002,
    LinkInvalidExpireTime = 3003,
    LinkPasswordHashError = 3004,
    LinkDatabaseError = 3005,
    LinkInvalidCode = 3006,
    LinkReservedCode = 3007,
    LinkInvalidRule = 3008,

    // Analytics 错误 6000-6099
    AnalyticsQueryFailed = 6000,
}

impl From<ShortgateError> for ErrorCode {
    fn from(err: ShortgateError) -> Self {
        match err {
            ShortgateError::Validation(_) => ErrorCode::BadRequest,
            ShortgateError::DateParse(_) => ErrorCode::InvalidDateFormat,
            ShortgateError::NotFound(_) => ErrorCode::LinkNotFound,
            ShortgateError::Unauthorized(_) => ErrorCode::Unauthorized,
            ShortgateError::Conflict(_) => ErrorCode::LinkAlreadyExists,
            ShortgateError::PasswordHash(_) => ErrorCode::LinkPasswordHashError,
            ShortgateError::DatabaseConfig(_)
            | ShortgateError::DatabaseConnection(_)
            | ShortgateError::DatabaseOperation(_) => ErrorCode::LinkDatabaseError,
            ShortgateError::Serialization(_) => ErrorCode::InternalServerError,
        }
    }
}
