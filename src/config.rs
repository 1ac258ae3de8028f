use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Optional Slack-compatible webhook announcing new leads.
    pub notify_webhook_url: Option<String>,
    /// Seconds a submission email is held in the dedup window.
    pub dedup_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable required"))
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DATABASE_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            notify_webhook_url: match std::env::var("NOTIFY_WEBHOOK_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
            {
                Some(raw) => {
                    let parsed = url::Url::parse(&raw)
                        .map_err(|e| anyhow::anyhow!("NOTIFY_WEBHOOK_URL is not a valid URL: {}", e))?;
                    if parsed.scheme() != "http" && parsed.scheme() != "https" {
                        anyhow::bail!("NOTIFY_WEBHOOK_URL must start with http:// or https://");
                    }
                    Some(raw)
                }
                None => None,
            },
            dedup_ttl_secs: std::env::var("DEDUP_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DEDUP_TTL_SECS must be a number of seconds"))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            &config.database_url[..20.min(config.database_url.len())]
        );
        if let Some(ref webhook) = config.notify_webhook_url {
            tracing::info!("Lead notification webhook configured: {}", webhook);
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
