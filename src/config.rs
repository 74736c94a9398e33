use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub stripe: StripeConfig,
    pub identity: IdentityConfig,
    pub mailer: MailerConfig,
    #[serde(default)]
    pub lottery: LotteryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    pub secret_key: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "usd".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub base_url: String,
    pub api_key: String,
    /// 启动时播种的管理员账号 (不存在则创建)
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
    #[serde(default)]
    pub admin_username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    pub base_url: String,
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotteryConfig {
    /// 流程会话空闲过期时间 (分钟)
    pub session_ttl_minutes: i64,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            session_ttl_minutes: 30,
        }
    }
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                // 有配置文件：先解析再用环境变量覆盖
                toml::from_str(&config_str)
                    .map_err(|e| anyhow::anyhow!("解析配置文件失败: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 无配置文件：使用环境变量与默认值构建
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL").ok_or_else(|| {
                    anyhow::anyhow!("缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml")
                })?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                        refresh_token_expires_in: get_env_parse(
                            "JWT_REFRESH_EXPIRES_IN",
                            2_592_000i64,
                        ),
                    },
                    stripe: StripeConfig {
                        secret_key: get_env("STRIPE_SECRET_KEY").unwrap_or_default(),
                        currency: get_env("STRIPE_CURRENCY").unwrap_or_else(default_currency),
                    },
                    identity: IdentityConfig {
                        base_url: get_env("IDENTITY_BASE_URL").unwrap_or_default(),
                        api_key: get_env("IDENTITY_API_KEY").unwrap_or_default(),
                        admin_email: get_env("IDENTITY_ADMIN_EMAIL"),
                        admin_password: get_env("IDENTITY_ADMIN_PASSWORD"),
                        admin_username: get_env("IDENTITY_ADMIN_USERNAME"),
                    },
                    mailer: MailerConfig {
                        base_url: get_env("MAILER_BASE_URL").unwrap_or_default(),
                        api_key: get_env("MAILER_API_KEY").unwrap_or_default(),
                        sender_email: get_env("MAILER_SENDER_EMAIL").unwrap_or_default(),
                        sender_name: get_env("MAILER_SENDER_NAME")
                            .unwrap_or_else(|| "Lottery".to_string()),
                    },
                    lottery: LotteryConfig {
                        session_ttl_minutes: get_env_parse("LOTTERY_SESSION_TTL_MINUTES", 30i64),
                    },
                }
            }
            Err(e) => {
                return Err(anyhow::anyhow!("无法读取配置文件 {config_path}: {e}"));
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.refresh_token_expires_in = n;
        }
        if let Ok(v) = env::var("STRIPE_SECRET_KEY") {
            config.stripe.secret_key = v;
        }
        if let Ok(v) = env::var("STRIPE_CURRENCY") {
            config.stripe.currency = v;
        }
        if let Ok(v) = env::var("IDENTITY_BASE_URL") {
            config.identity.base_url = v;
        }
        if let Ok(v) = env::var("IDENTITY_API_KEY") {
            config.identity.api_key = v;
        }
        if let Ok(v) = env::var("IDENTITY_ADMIN_EMAIL") {
            config.identity.admin_email = Some(v);
        }
        if let Ok(v) = env::var("IDENTITY_ADMIN_PASSWORD") {
            config.identity.admin_password = Some(v);
        }
        if let Ok(v) = env::var("IDENTITY_ADMIN_USERNAME") {
            config.identity.admin_username = Some(v);
        }
        if let Ok(v) = env::var("MAILER_BASE_URL") {
            config.mailer.base_url = v;
        }
        if let Ok(v) = env::var("MAILER_API_KEY") {
            config.mailer.api_key = v;
        }
        if let Ok(v) = env::var("MAILER_SENDER_EMAIL") {
            config.mailer.sender_email = v;
        }
        if let Ok(v) = env::var("MAILER_SENDER_NAME") {
            config.mailer.sender_name = v;
        }
        if let Ok(v) = env::var("LOTTERY_SESSION_TTL_MINUTES")
            && let Ok(n) = v.parse()
        {
            config.lottery.session_ttl_minutes = n;
        }

        Ok(config)
    }
}
