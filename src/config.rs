use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub unleash: UnleashConfig,
    pub groq: GroqConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// UnleashNFTs (BitsCrunch) data-provider settings.
#[derive(Debug, Deserialize, Clone)]
pub struct UnleashConfig {
    pub api_key: String,
    pub base_url: String,
    /// Per-call timeout for candidate endpoints, in seconds.
    pub timeout_seconds: u64,
}

/// Groq completion-provider settings.
#[derive(Debug, Deserialize, Clone)]
pub struct GroqConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("unleash.api_key", "")?
            .set_default("unleash.base_url", "https://api.unleashnfts.com/api/v1")?
            .set_default("unleash.timeout_seconds", 10)?
            .set_default("groq.api_key", "")?
            .set_default("groq.base_url", "https://api.groq.com/openai/v1")?
            .set_default("groq.model", "llama3-70b-8192")?
            .set_default("groq.timeout_seconds", 10)?
            // Load from config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (GENIUS__UNLEASH__API_KEY, etc.)
            // Double underscore as separator to handle nested keys with underscores
            .add_source(
                Environment::with_prefix("GENIUS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Both provider keys are required at startup; absence is fatal.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.unleash.api_key.is_empty() {
            return Err(ConfigError::Message(
                "unleash.api_key is required (set GENIUS__UNLEASH__API_KEY)".into(),
            ));
        }
        if self.groq.api_key.is_empty() {
            return Err(ConfigError::Message(
                "groq.api_key is required (set GENIUS__GROQ__API_KEY)".into(),
            ));
        }
        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
