use common::env::env_or;
use std::error::Error;

#[derive(Debug, Clone)]
pub struct PGConfig {
    pub(super) dbname: String,
    pub(super) user: String,
    pub(super) password: String,
    pub(super) host: String,
    pub(super) port: u16,
}

impl PGConfig {
    /// Load PostgreSQL configuration from `DB_*` environment variables,
    /// falling back to local development defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `DB_PORT` cannot be parsed.
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            dbname: env_or("DB_NAME", "ecommerce"),
            user: env_or("DB_USER", "postgres"),
            password: env_or("DB_PASSWORD", "password"),
            host: env_or("DB_HOST", "localhost"),
            port: env_or("DB_PORT", "5432").parse::<u16>()?,
        })
    }

    /// Connection target without credentials, safe to log.
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.dbname)
    }
}
