use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// SMTP relay credentials. Present only when every required variable is set.
///
/// Port 465 uses implicit TLS and 587 uses STARTTLS. Any other port talks
/// plain SMTP, which suits local relays only.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub smtp: Option<SmtpConfig>,
    pub code_ttl_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "streamflix".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "streamflix-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };
        let code_ttl_seconds = std::env::var("VERIFICATION_CODE_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(550);
        Ok(Self {
            database_url,
            jwt,
            smtp: SmtpConfig::from_env(),
            code_ttl_seconds,
        })
    }
}

impl SmtpConfig {
    pub fn from_env() -> Option<Self> {
        fn non_empty(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|s| !s.is_empty())
        }

        Some(Self {
            host: non_empty("SMTP_HOST")?,
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(465),
            username: non_empty("SMTP_USERNAME")?,
            password: non_empty("SMTP_PASSWORD")?,
            from_email: non_empty("SMTP_FROM_EMAIL")?,
            from_name: non_empty("SMTP_FROM_NAME"),
        })
    }
}
