//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::openai::{DEFAULT_IMAGE_MODEL, OPENAI_BASE_URL};
use crate::story::Language;
use crate::story::orchestrator::{DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_LLM_TIMEOUT, OrchestratorConfig};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Optional path prefix guarding the MCP endpoint.
    pub secret_key: Option<String>,
    pub data_dir: PathBuf,
    /// Base URL under which stored objects are reachable.
    pub object_base_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub image_model: String,
    pub llm_timeout: Duration,
    pub download_timeout: Duration,
    pub default_user_id: Option<String>,
    pub display_language: Language,
    pub cleanup_orphaned_uploads: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());

        let port = match var("MCP_PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "MCP_PORT",
                value,
            })?,
            None => 3000,
        };
        let bind_address = format!("0.0.0.0:{port}");

        let llm_timeout = parse_secs("LLM_TIMEOUT_SECS", var("LLM_TIMEOUT_SECS"), DEFAULT_LLM_TIMEOUT)?;
        let download_timeout =
            parse_secs("DOWNLOAD_TIMEOUT_SECS", var("DOWNLOAD_TIMEOUT_SECS"), DEFAULT_DOWNLOAD_TIMEOUT)?;

        let display_language = match var("DISPLAY_LANGUAGE") {
            Some(value) => Language::parse(&value).ok_or(ConfigError::Invalid {
                name: "DISPLAY_LANGUAGE",
                value,
            })?,
            None => Language::English,
        };

        let cleanup_orphaned_uploads = match var("CLEANUP_ORPHANED_UPLOADS") {
            Some(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "CLEANUP_ORPHANED_UPLOADS",
                        value,
                    });
                }
            },
            None => false,
        };

        Ok(Self {
            port,
            secret_key: var("SECRET_KEY"),
            data_dir: var("DATA_DIR").map(PathBuf::from).unwrap_or_else(default_data_dir),
            object_base_url: resolve_object_base_url(var("PUBLIC_BASE_URL").or_else(|| var("DOMAIN")), &bind_address),
            openai_api_key: var("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?,
            openai_base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            image_model: var("OPENAI_IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            llm_timeout,
            download_timeout,
            default_user_id: var("DEFAULT_USER_ID"),
            display_language,
            cleanup_orphaned_uploads,
        })
    }

    /// Without a secret path prefix anyone who can reach the endpoint can
    /// sign in as any user.
    pub fn sign_in_is_unguarded(&self) -> bool {
        self.secret_key.is_none()
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.data_dir.join("objects")
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join("documents")
    }

    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            image_model: self.image_model.clone(),
            llm_timeout: self.llm_timeout,
            download_timeout: self.download_timeout,
            cleanup_orphaned_uploads: self.cleanup_orphaned_uploads,
        }
    }
}

/// Whole seconds, greater than zero.
fn parse_secs(name: &'static str, value: Option<String>, default: Duration) -> Result<Duration, ConfigError> {
    match value {
        Some(value) => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::Invalid { name, value }),
        },
        None => Ok(default),
    }
}

fn default_data_dir() -> PathBuf {
    let mut base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push("storyspace-rmcp");
    base
}

fn resolve_object_base_url(domain: Option<String>, bind_address: &str) -> String {
    let raw = domain.unwrap_or_else(|| bind_address.to_string());
    let trimmed = raw.trim().trim_end_matches('/');
    let base = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    format!("{base}/objects")
}
