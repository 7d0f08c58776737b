use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. `DATABASE_URL` wins over the
    /// individual `DB_*` parts when present.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => {
                let db_port: u16 = var("DB_PORT", "5432")
                    .parse()
                    .context("DB_PORT must be a valid number")?;
                format!(
                    "postgres://{}:{}@{}:{}/{}",
                    var("DB_USERNAME", "user"),
                    var("DB_PASSWORD", "password"),
                    var("DB_HOST", "localhost"),
                    db_port,
                    var("DB_NAME", "product_management"),
                )
            }
        };

        Ok(Self {
            database_url,
            max_connections: var("DB_MAX_CONNECTIONS", "10")
                .parse()
                .context("DB_MAX_CONNECTIONS must be a valid number")?,
            host: var("HOST", "0.0.0.0"),
            port: var("PORT", "8080")
                .parse()
                .context("PORT must be a valid number")?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
