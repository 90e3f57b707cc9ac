/// Server configuration loaded from environment variables.
///
/// All fields except the database URL have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// JWT authentication against the external identity provider.
    pub auth: AuthConfig,
}

/// Identity-provider settings for bearer-token authentication.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Whether playlist routes require a valid bearer token.
    pub enabled: bool,
    /// Base URL of the identity provider (Keycloak-style realms).
    pub issuer_url: String,
    /// Realm whose signing keys are trusted.
    pub realm: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var           | Default                 |
    /// |-------------------|-------------------------|
    /// | `HOST`            | `0.0.0.0`               |
    /// | `PORT`            | `8080`                  |
    /// | `AUTH_ENABLED`    | `false`                 |
    /// | `AUTH_ISSUER_URL` | `http://localhost:8180` |
    /// | `AUTH_REALM`      | `jukebox`               |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let enabled: bool = std::env::var("AUTH_ENABLED")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("AUTH_ENABLED must be true or false");

        let issuer_url =
            std::env::var("AUTH_ISSUER_URL").unwrap_or_else(|_| "http://localhost:8180".into());
        let realm = std::env::var("AUTH_REALM").unwrap_or_else(|_| "jukebox".into());

        Self {
            host,
            port,
            auth: AuthConfig {
                enabled,
                issuer_url,
                realm,
            },
        }
    }
}
