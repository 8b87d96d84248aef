use std::env;

/// Switches for behaviour the order workflow leaves permissive by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderPolicy {
    /// Reject status changes outside PENDING -> CONFIRMED -> SHIPPED -> DELIVERED
    /// (plus cancellation from PENDING or CONFIRMED).
    pub strict_transitions: bool,
    /// Reject orders whose total differs from the sum of their line items.
    pub verify_totals: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expires_hours: i64,
    pub cors_origin: Option<String>,
    pub order_policy: OrderPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_expires_hours = env::var("JWT_EXPIRES_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(24);
        let cors_origin = env::var("CORS_ORIGIN").ok().filter(|o| !o.is_empty());
        let order_policy = OrderPolicy {
            strict_transitions: env_flag("ORDER_STRICT_TRANSITIONS"),
            verify_totals: env_flag("ORDER_VERIFY_TOTALS"),
        };
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            jwt_expires_hours,
            cors_origin,
            order_policy,
        })
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
