//! 密码哈希工具模块
//!
//! 链接密码使用 Argon2id 哈希存储。原始需求中密码曾以明文比较，
//! 这里不沿用（见 DESIGN.md 的偏差记录）。

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::errors::ShortgateError;

/// 对密码进行 Argon2id 哈希
pub fn hash_password(password: &str) -> Result<String, ShortgateError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ShortgateError::password_hash(e.to_string()))
}

/// 验证密码是否匹配哈希
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ShortgateError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| ShortgateError::password_hash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 处理用户输入的新密码 - 始终哈希，不接受预哈希值
///
/// - 如果输入为空或 None，返回 None
/// - 否则对密码进行哈希
pub fn process_new_password(password: Option<&str>) -> Result<Option<String>, ShortgateError> {
    match password {
        Some(pwd) if !pwd.is_empty() => hash_password(pwd).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cr3t").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cr3t", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let h1 = hash_password("same").unwrap();
        let h2 = hash_password("same").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_process_new_password() {
        assert!(process_new_password(None).unwrap().is_none());
        assert!(process_new_password(Some("")).unwrap().is_none());
        let hashed = process_new_password(Some("pw")).unwrap().unwrap();
        assert!(verify_password("pw", &hashed).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("pw", "not-a-hash").is_err());
    }
}
