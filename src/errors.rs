use actix_web::http::StatusCode;
use std::fmt;

#[derive(Debug, Clone)]
pub enum ShortgateError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    Unauthorized(String),
    Conflict(String),
    Serialization(String),
    DateParse(String),
    PasswordHash(String),
}

impl ShortgateError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ShortgateError::DatabaseConfig(_) => "E001",
            ShortgateError::DatabaseConnection(_) => "E002",
            ShortgateError::DatabaseOperation(_) => "E003",
            ShortgateError::Validation(_) => "E004",
            ShortgateError::NotFound(_) => "E005",
            ShortgateError::Unauthorized(_) => "E006",
            ShortgateError::Conflict(_) => "E007",
            ShortgateError::Serialization(_) => "E008",
            ShortgateError::DateParse(_) => "E009",
            ShortgateError::PasswordHash(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ShortgateError::DatabaseConfig(_) => "Database Configuration Error",
            ShortgateError::DatabaseConnection(_) => "Database Connection Error",
            ShortgateError::DatabaseOperation(_) => "Database Operation Error",
            ShortgateError::Validation(_) => "Validation Error",
            ShortgateError::NotFound(_) => "Resource Not Found",
            ShortgateError::Unauthorized(_) => "Unauthorized",
            ShortgateError::Conflict(_) => "Conflict",
            ShortgateError::Serialization(_) => "Serialization Error",
            ShortgateError::DateParse(_) => "Date Parse Error",
            ShortgateError::PasswordHash(_) => "Password Hash Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ShortgateError::DatabaseConfig(msg)
            | ShortgateError::DatabaseConnection(msg)
            | ShortgateError::DatabaseOperation(msg)
            | ShortgateError::Validation(msg)
            | ShortgateError::NotFound(msg)
            | ShortgateError::Unauthorized(msg)
            | ShortgateError::Conflict(msg)
            | ShortgateError::Serialization(msg)
            | ShortgateError::DateParse(msg)
            | ShortgateError::PasswordHash(msg) => msg,
        }
    }

    /// API 层的 HTTP 状态码映射
    pub fn http_status(&self) -> StatusCode {
        match self {
            ShortgateError::Validation(_) | ShortgateError::DateParse(_) => {
                StatusCode::BAD_REQUEST
            }
            ShortgateError::NotFound(_) => StatusCode::NOT_FOUND,
            ShortgateError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ShortgateError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（启动阶段）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ShortgateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ShortgateError {}

// 便捷的构造函数
impl ShortgateError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ShortgateError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ShortgateError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ShortgateError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ShortgateError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShortgateError::NotFound(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        ShortgateError::Unauthorized(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        ShortgateError::Conflict(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        ShortgateError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        ShortgateError::DateParse(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        ShortgateError::PasswordHash(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ShortgateError {
    fn from(err: sea_orm::DbErr) -> Self {
        ShortgateError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ShortgateError {
    fn from(err: serde_json::Error) -> Self {
        ShortgateError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for ShortgateError {
    fn from(err: chrono::ParseError) -> Self {
        ShortgateError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortgateError>;
