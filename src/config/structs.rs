use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量
/// - database: 数据库连接配置
/// - auth: 仪表盘身份令牌与访问授权（grant）密钥
/// - redirect: 跳转行为（默认 URL、插页、随机短码长度）
/// - analytics: 点击日志与 GeoIP 配置
/// - cors: 仪表盘跨域配置
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub redirect: RedirectConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：SG，分隔符：__
    /// 示例：SG__SERVER__PORT=9999
    pub fn load() -> Self {
        use config::{Config, Environment, File};

        let path = "config.toml";

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("SG")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 显式可信代理列表（IP 或 CIDR）。空列表时对私有来源 IP 自动探测。
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 认证配置
///
/// 仪表盘身份令牌由外部身份服务签发，这里只做本地校验；
/// grant_secret 用于密码门禁的访问授权 cookie 签名。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// 校验 owner JWT 的共享密钥。为空则 Dashboard API 整体 404。
    #[serde(default)]
    pub jwt_secret: String,
    /// 签发 pwd_<code> 授权令牌的密钥。为空则启动时生成随机值（重启后授权失效）。
    #[serde(default)]
    pub grant_secret: String,
    #[serde(default = "default_grant_ttl_hours")]
    pub grant_ttl_hours: u64,
    /// 生产环境 cookie 加 Secure 标记
    #[serde(default)]
    pub cookie_secure: bool,
}

/// 跳转行为配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectConfig {
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    /// 有目标时显示 3 秒插页而不是直接 307
    #[serde(default = "default_interstitial")]
    pub interstitial: bool,
    #[serde(default = "default_random_code_length")]
    pub random_code_length: usize,
}

/// 分析统计配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,
    #[serde(default = "default_flush_threshold")]
    pub flush_threshold: usize,
    /// MaxMind GeoLite2-City.mmdb 路径，可读时优先于外部 API
    #[serde(default)]
    pub maxminddb_path: Option<String>,
    #[serde(default = "default_geoip_api_url")]
    pub geoip_api_url: String,
    #[serde(default = "default_enable_geo_lookup")]
    pub enable_geo_lookup: bool,
    #[serde(default = "default_enable_ip_logging")]
    pub enable_ip_logging: bool,
}

/// CORS 配置（独立托管的仪表盘前端）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origins: Vec::new(),
            max_age: default_cors_max_age(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "shortgate.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_grant_ttl_hours() -> u64 {
    24
}

fn default_fallback_url() -> String {
    "https://esap.cc/repo".to_string()
}

fn default_interstitial() -> bool {
    true
}

fn default_random_code_length() -> usize {
    6
}

fn default_flush_interval_secs() -> u64 {
    10
}

fn default_flush_threshold() -> usize {
    200
}

fn default_geoip_api_url() -> String {
    "http://ip-api.com/json/{ip}?fields=status,countryCode,city".to_string()
}

fn default_enable_geo_lookup() -> bool {
    true
}

fn default_enable_ip_logging() -> bool {
    true
}

fn default_cors_max_age() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    7
}

fn default_enable_rotation() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            grant_secret: String::new(),
            grant_ttl_hours: default_grant_ttl_hours(),
            cookie_secure: false,
        }
    }
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            fallback_url: default_fallback_url(),
            interstitial: default_interstitial(),
            random_code_length: default_random_code_length(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            flush_interval_secs: default_flush_interval_secs(),
            flush_threshold: default_flush_threshold(),
            maxminddb_path: None,
            geoip_api_url: default_geoip_api_url(),
            enable_geo_lookup: default_enable_geo_lookup(),
            enable_ip_logging: default_enable_ip_logging(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
