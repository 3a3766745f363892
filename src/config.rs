//! Application configuration.
//!
//! Everything the service needs from its environment is read once into an
//! [`AppConfig`] and handed to the components that use it. Nothing below the
//! bootstrap layer looks at environment variables.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Provider credential. Checked per request: absence is a server error, not a startup failure.
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";
/// Model name override.
pub const GEMINI_MODEL_ENV: &str = "GEMINI_MODEL";
/// Provider base URL override.
pub const GEMINI_BASE_URL_ENV: &str = "GEMINI_BASE_URL";
/// Hosted database URL (required).
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
/// Hosted database service credential (required).
pub const SUPABASE_SERVICE_KEY_ENV: &str = "SUPABASE_SERVICE_KEY";
/// Listening port.
pub const PORT_ENV: &str = "LEARNING_ASSISTANT_PORT";
/// Directory with front-end assets.
pub const STATIC_DIR_ENV: &str = "LEARNING_ASSISTANT_STATIC_DIR";
/// Development mode switch: adds error details to responses.
pub const DEV_MODE_ENV: &str = "LEARNING_ASSISTANT_DEV";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default generation model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
/// Default provider endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set or is blank.
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    /// A variable is set but cannot be used.
    #[error("invalid value for {name}: {reason}")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// A configured URL does not parse.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Convenience result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Generative model settings.
    pub gemini: GeminiConfig,
    /// Material store settings.
    pub supabase: SupabaseConfig,
    /// Request limits.
    pub chat: ChatLimits,
    /// Material recommendation settings.
    pub materials: MaterialsConfig,
    /// Include internal error details in responses.
    pub expose_error_details: bool,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match var(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidVar {
                name: PORT_ENV,
                reason: format!("{e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let config = Self {
            server: ServerConfig {
                port,
                static_dir: var(STATIC_DIR_ENV)
                    .map_or_else(|| PathBuf::from("static"), PathBuf::from),
            },
            gemini: GeminiConfig {
                api_key: var(GOOGLE_API_KEY_ENV),
                model: var(GEMINI_MODEL_ENV).unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                base_url: var(GEMINI_BASE_URL_ENV)
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
                ..GeminiConfig::default()
            },
            supabase: SupabaseConfig {
                url: var(SUPABASE_URL_ENV).ok_or(ConfigError::MissingVar(SUPABASE_URL_ENV))?,
                service_key: var(SUPABASE_SERVICE_KEY_ENV)
                    .ok_or(ConfigError::MissingVar(SUPABASE_SERVICE_KEY_ENV))?,
                request_timeout: Duration::from_secs(10),
            },
            chat: ChatLimits::default(),
            materials: MaterialsConfig::default(),
            expose_error_details: var(DEV_MODE_ENV)
                .is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes")),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ConfigResult<()> {
        Url::parse(&self.gemini.base_url)?;
        Url::parse(&self.supabase.url)?;

        if self.gemini.model.is_empty() {
            return Err(ConfigError::InvalidVar {
                name: GEMINI_MODEL_ENV,
                reason: "model name must not be empty".to_string(),
            });
        }

        if self.chat.max_message_chars == 0 {
            return Err(ConfigError::InvalidVar {
                name: "chat.max_message_chars",
                reason: "must be > 0".to_string(),
            });
        }

        if self.materials.max_per_request == 0 {
            return Err(ConfigError::InvalidVar {
                name: "materials.max_per_request",
                reason: "must be > 0".to_string(),
            });
        }

        Ok(())
    }
}

/// HTTP server settings.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
    /// Front-end asset directory, served as the fallback route.
    pub static_dir: PathBuf,
}

/// Generative model settings.
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// Provider credential. `None` makes every chat turn fail with a configuration error.
    pub api_key: Option<String>,
    /// Model name.
    pub model: String,
    /// Provider base URL.
    pub base_url: String,
    /// Overall timeout of a single-shot call.
    pub request_timeout: Duration,
    /// Longest silence allowed between chunks of a streamed reply.
    pub stream_idle_timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(120),
            stream_idle_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Material store settings.
#[derive(Clone, Debug)]
pub struct SupabaseConfig {
    /// Project URL.
    pub url: String,
    /// Service-role credential.
    pub service_key: String,
    /// Per-query timeout.
    pub request_timeout: Duration,
}

/// Limits applied to incoming chat requests.
#[derive(Clone, Debug)]
pub struct ChatLimits {
    /// Maximum message length, in characters.
    pub max_message_chars: usize,
    /// Maximum decoded image size, in bytes.
    pub max_image_bytes: usize,
    /// Accepted image MIME types.
    pub allowed_image_types: Vec<String>,
}

impl Default for ChatLimits {
    fn default() -> Self {
        Self {
            max_message_chars: 2000,
            max_image_bytes: 10 * 1024 * 1024, // 10 MB
            allowed_image_types: ["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Headroom for the JSON envelope and the data URI prefix.
const BODY_ENVELOPE_BYTES: usize = 64 * 1024;

impl ChatLimits {
    /// Largest request body that can still carry a valid message and image.
    ///
    /// The image travels base64 encoded and each message character may
    /// take up to six bytes once JSON-escaped.
    #[must_use]
    pub const fn request_body_limit(&self) -> usize {
        self.max_image_bytes.div_ceil(3) * 4 + self.max_message_chars * 6 + BODY_ENVELOPE_BYTES
    }
}

/// Material recommendation settings.
#[derive(Clone, Debug)]
pub struct MaterialsConfig {
    /// Maximum materials attached to one reply.
    pub max_per_request: usize,
    /// Subjects the store has content for. Other subjects are never queried.
    pub subjects: Vec<String>,
}

impl Default for MaterialsConfig {
    fn default() -> Self {
        Self {
            max_per_request: 5,
            subjects: vec!["ekonomi".to_string(), "fisika".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_with_required_vars() {
        let config = AppConfig::from_lookup(lookup(&[
            (SUPABASE_URL_ENV, "https://project.supabase.co"),
            (SUPABASE_SERVICE_KEY_ENV, "service"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.gemini.model, DEFAULT_GEMINI_MODEL);
        assert!(config.gemini.api_key.is_none());
        assert_eq!(config.chat.max_message_chars, 2000);
        assert_eq!(config.materials.max_per_request, 5);
        assert!(!config.expose_error_details);
    }

    #[test]
    fn test_body_limit_fits_largest_image() {
        let limits = ChatLimits::default();
        let encoded_image = limits.max_image_bytes.div_ceil(3) * 4;
        assert!(limits.request_body_limit() > encoded_image + limits.max_message_chars * 6);
        assert!(limits.request_body_limit() < 2 * limits.max_image_bytes);
    }

    #[test]
    fn test_missing_database_url_is_fatal() {
        let err = AppConfig::from_lookup(lookup(&[(SUPABASE_SERVICE_KEY_ENV, "service")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(SUPABASE_URL_ENV)));
    }

    #[test]
    fn test_blank_service_key_counts_as_missing() {
        let err = AppConfig::from_lookup(lookup(&[
            (SUPABASE_URL_ENV, "https://project.supabase.co"),
            (SUPABASE_SERVICE_KEY_ENV, "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(SUPABASE_SERVICE_KEY_ENV)));
    }

    #[test]
    fn test_invalid_port_and_url() {
        let err = AppConfig::from_lookup(lookup(&[
            (SUPABASE_URL_ENV, "https://project.supabase.co"),
            (SUPABASE_SERVICE_KEY_ENV, "service"),
            (PORT_ENV, "not-a-port"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { name: PORT_ENV, .. }));

        let err = AppConfig::from_lookup(lookup(&[
            (SUPABASE_URL_ENV, "not a url"),
            (SUPABASE_SERVICE_KEY_ENV, "service"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (SUPABASE_URL_ENV, "https://project.supabase.co"),
            (SUPABASE_SERVICE_KEY_ENV, "service"),
            (GOOGLE_API_KEY_ENV, "key"),
            (GEMINI_MODEL_ENV, "gemini-1.5-pro"),
            (PORT_ENV, "8080"),
            (DEV_MODE_ENV, "true"),
        ]))
        .unwrap();

        assert_eq!(config.gemini.api_key.as_deref(), Some("key"));
        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.server.port, 8080);
        assert!(config.expose_error_details);
    }
}
