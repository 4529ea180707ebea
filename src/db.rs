use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
    PgPool,
};

use crate::config::DatabaseSettings;

/// Schema of the table leads are written to.
pub const USUARIOS_SCHEMA: &str = include_str!("../sql/usuarios.sql");

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        let options = PgPoolOptions::new().max_connections(settings.max_connections());

        let pool = match settings {
            DatabaseSettings::Url { url, .. } => options.connect(url).await?,
            DatabaseSettings::Parts {
                host,
                port,
                database,
                user,
                password,
                ssl,
                ..
            } => {
                let connect = PgConnectOptions::new()
                    .host(host)
                    .port(*port)
                    .database(database)
                    .username(user)
                    .password(password)
                    .ssl_mode(if *ssl {
                        PgSslMode::Require
                    } else {
                        PgSslMode::Disable
                    });
                options.connect_with(connect).await?
            }
        };

        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Creates the `usuarios` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(USUARIOS_SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}
