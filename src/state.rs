use deadpool_postgres::Pool;
use std::sync::Arc;
use crate::config::Config;
use crate::crypto::jwt::JwtKeys;
use crate::error::Result;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: Pool,
    /// The application's configuration.
    pub config: Config,
    /// Access token signer/validator.
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        tracing::info!("✅ PostgreSQL Pool initialized with deadpool-postgres");

        let jwt = Arc::new(JwtKeys::new(&config.jwt_secret, config.token_ttl_minutes));
        tracing::info!("✅ JWT keys loaded (token TTL: {} min)", config.token_ttl_minutes);

        Ok(AppState {
            db,
            config: config.clone(),
            jwt,
        })
    }
}
