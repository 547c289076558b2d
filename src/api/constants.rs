//! API 层常量

/// 密码门禁授权 cookie 前缀，完整名称为 pwd_<code>
pub const GRANT_COOKIE_PREFIX: &str = "pwd_";

/// Dashboard API 路由前缀
pub const API_PREFIX: &str = "/api";

/// 插页倒计时秒数
pub const INTERSTITIAL_SECONDS: u32 = 3;

/// 构造某个短码的授权 cookie 名称
pub fn grant_cookie_name(code: &str) -> String {
    format!("{}{}", GRANT_COOKIE_PREFIX, code)
}
