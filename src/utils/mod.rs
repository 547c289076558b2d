pub mod ip;
pub mod password;
pub mod time_parser;
pub mod url_validator;

pub use time_parser::TimeParser;

/// 短码最大长度
const MAX_SHORT_CODE_LEN: usize = 64;

/// 校验短码格式：字母数字、下划线、连字符、点
///
/// 同时作为 SQL 注入的纵深防御，所有进入存储层的短码都先过这里。
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_SHORT_CODE_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// 与跳转路由冲突的保留短码
const RESERVED_CODES: &[&str] = &["api", "health", "favicon.ico", "robots.txt"];

pub fn is_reserved_short_code(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    // 随机选择字母和数字
    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

/// 生成安全随机令牌（用于未配置密钥时的兜底值）
pub fn generate_secure_token(length: usize) -> String {
    generate_random_code(length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_short_code() {
        assert!(is_valid_short_code("promo"));
        assert!(is_valid_short_code("my-link_2024.v1"));
        assert!(!is_valid_short_code(""));
        assert!(!is_valid_short_code("has space"));
        assert!(!is_valid_short_code("sql';--"));
        assert!(!is_valid_short_code(&"x".repeat(65)));
    }

    #[test]
    fn test_is_reserved_short_code() {
        assert!(is_reserved_short_code("api"));
        assert!(is_reserved_short_code("health"));
        assert!(!is_reserved_short_code("apiv2"));
    }

    #[test]
    fn test_generate_random_code() {
        let code = generate_random_code(6);
        assert_eq!(code.len(), 6);
        assert!(is_valid_short_code(&code));

        // 两次生成撞车的概率可以忽略
        assert_ne!(generate_random_code(16), generate_random_code(16));
    }
}
