use anyhow::Result;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub authorization: AuthorizationConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub web_client: WebClientConfig,
    pub webhook_api: Option<WebhookApiConfig>,
    pub delegation_invite: DelegationInviteConfig,
    pub email: EmailConfig,
    pub patient_registry: PatientRegistryConfig,
    pub communication: CommunicationConfig,
    /// IANA timezone used when computing organization-local reference dates.
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Base64 key used to verify HS256 bearer tokens.
    pub token_secret: String,
    /// Expected `iss` claim; skipped when absent.
    pub issuer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationConfig {
    /// Dependent delegations expire once the resource owner reaches this age
    /// in years. `None` disables the expiry check entirely.
    pub max_dependent_age: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebClientConfig {
    pub min_patient_age: u32,
    pub user_profile_history_record_limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookApiConfig {
    pub header_name: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DelegationInviteConfig {
    pub expiry_hours: i64,
    /// Base64 key for the invite-id protector.
    pub protector_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Host placed in invite links, e.g. `https://healthgateway.example.ca`.
    pub activation_host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatientRegistryConfig {
    /// Base URL of the upstream patient demographics service.
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommunicationConfig {
    pub cache_ttl_seconds: u64,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8780)?
            .set_default("database.max_connections", 4)?
            .set_default("logging.level", "debug")?
            .set_default("authorization.max_dependent_age", 12)?
            .set_default("web_client.min_patient_age", 12)?
            .set_default("web_client.user_profile_history_record_limit", 4)?
            .set_default("delegation_invite.expiry_hours", 48)?
            .set_default("communication.cache_ttl_seconds", 300)?
            .set_default("patient_registry.timeout_seconds", 10)?
            .set_default("timezone", "America/Vancouver")?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Resolves the configured IANA timezone.
    ///
    /// ## Errors
    /// Returns an error if the timezone name is not a valid IANA identifier.
    pub fn local_timezone(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid timezone {}: {e}", self.timezone))
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
