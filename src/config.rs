use std::time::Duration;

/// Where validated leads go. Exactly one backend is active per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Forward leads to an external HTTP API.
    Api(ApiSettings),
    /// Insert leads into the `usuarios` table.
    Database(DatabaseSettings),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Api(_) => "api",
            Backend::Database(_) => "database",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseSettings {
    Url {
        url: String,
        max_connections: u32,
    },
    Parts {
        host: String,
        port: u16,
        database: String,
        user: String,
        password: String,
        ssl: bool,
        max_connections: u32,
    },
}

impl DatabaseSettings {
    pub fn max_connections(&self) -> u32 {
        match self {
            DatabaseSettings::Url {
                max_connections, ..
            }
            | DatabaseSettings::Parts {
                max_connections, ..
            } => *max_connections,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub public_dir: String,
    pub backend: Backend,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("Public dir: {}", config.public_dir);
        match &config.backend {
            Backend::Api(api) => tracing::info!("Lead backend: api -> {}", api.url),
            Backend::Database(DatabaseSettings::Parts { host, port, database, ssl, .. }) => {
                tracing::info!(
                    "Lead backend: database -> {}:{}/{} (ssl: {})",
                    host,
                    port,
                    database,
                    ssl
                )
            }
            Backend::Database(DatabaseSettings::Url { .. }) => {
                tracing::info!("Lead backend: database -> DATABASE_URL")
            }
        }

        Ok(config)
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| anyhow::anyhow!("{} environment variable required", key))
        };

        let port = get("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?;

        let public_dir = get("PUBLIC_DIR").unwrap_or_else(|| "public".to_string());

        let backend = match get("LEAD_BACKEND")
            .unwrap_or_else(|| "api".to_string())
            .trim()
            .to_lowercase()
            .as_str()
        {
            "api" => {
                let url = require("LEAD_API_URL").and_then(|raw| {
                    let parsed = url::Url::parse(raw.trim())
                        .map_err(|e| anyhow::anyhow!("LEAD_API_URL is not a valid URL: {}", e))?;
                    if parsed.scheme() != "http" && parsed.scheme() != "https" {
                        anyhow::bail!("LEAD_API_URL must start with http:// or https://");
                    }
                    Ok(raw.trim().to_string())
                })?;
                let timeout_secs: u64 = get("LEAD_API_TIMEOUT_SECS")
                    .unwrap_or_else(|| "30".to_string())
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("LEAD_API_TIMEOUT_SECS must be a whole number"))?;

                Backend::Api(ApiSettings {
                    url,
                    timeout: Duration::from_secs(timeout_secs),
                })
            }
            "database" | "db" => {
                let max_connections: u32 = get("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|| "10".to_string())
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a whole number"))?;

                let settings = match get("DATABASE_URL") {
                    Some(url) => {
                        if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                            anyhow::bail!(
                                "DATABASE_URL must start with postgresql:// or postgres://"
                            );
                        }
                        DatabaseSettings::Url {
                            url,
                            max_connections,
                        }
                    }
                    None => DatabaseSettings::Parts {
                        host: require("DB_HOST")?,
                        port: get("DB_PORT")
                            .unwrap_or_else(|| "5432".to_string())
                            .trim()
                            .parse()
                            .map_err(|_| anyhow::anyhow!("DB_PORT must be a valid port number"))?,
                        database: require("DB_NAME")?,
                        user: require("DB_USER")?,
                        password: require("DB_PASSWORD")?,
                        ssl: get("DB_SSL").map(|v| parse_flag(&v)).unwrap_or(false),
                        max_connections,
                    },
                };

                Backend::Database(settings)
            }
            other => anyhow::bail!("LEAD_BACKEND must be 'api' or 'database', got '{}'", other),
        };

        Ok(Self {
            port,
            public_dir,
            backend,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
