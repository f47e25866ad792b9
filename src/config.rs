use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    /// Sales tax applied at checkout, in whole percent.
    pub tax_rate_percent: i64,
    /// Products with stock strictly below this count as low stock.
    pub low_stock_threshold: i32,
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
        let tax_rate_percent = env::var("TAX_RATE_PERCENT")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| (0..=100).contains(v))
            .unwrap_or(16);
        let low_stock_threshold = env::var("LOW_STOCK_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(10);
        Ok(Self {
            port,
            database_url,
            jwt_secret,
            host,
            tax_rate_percent,
            low_stock_threshold,
        })
    }
}
