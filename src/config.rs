use crate::genai::{DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, GenAiSettings};
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Directory holding persisted chat histories
    #[arg(long, env = "DATA_DIR")]
    pub data_dir: Option<String>,

    /// Content YAML overriding the embedded site copy
    #[arg(long, env = "CONTENT_FILE")]
    pub content: Option<String>,

    /// Enable rate limiting
    #[arg(long, env = "RATE_LIMIT_ENABLED")]
    pub rate_limit_enabled: Option<bool>,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub resilience: ResilienceConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResilienceConfig {
    pub rate_limit_enabled: bool,
    pub requests_per_second: f32,
    pub burst_size: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ContentConfig {
    /// Uses the embedded copy when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Priority: CLI flag > CLI env var > `SLASHTECH_` env > config file > defaults.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("resilience.rate_limit_enabled", true)?
            .set_default("resilience.requests_per_second", 5.0)?
            .set_default("resilience.burst_size", 10.0)?
            .set_default("storage.data_dir", "data")?
            .set_default("logging.json", false)?;

        // Explicit file must exist; ./config.yaml is picked up only if present.
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path).required(true));
        } else if Path::new("config.yaml").exists() {
            builder = builder.add_source(File::with_name("config.yaml").required(false));
        }

        // E.g. SLASHTECH_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("SLASHTECH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(dir) = cli.data_dir {
            builder = builder.set_override("storage.data_dir", dir)?;
        }
        if let Some(path) = cli.content {
            builder = builder.set_override("content.path", path)?;
        }
        if let Some(rl) = cli.rate_limit_enabled {
            builder = builder.set_override("resilience.rate_limit_enabled", rl)?;
        }
        if let Some(json) = cli.log_json {
            builder = builder.set_override("logging.json", json)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}

/// Read the Gemini settings from `GEMINI_*` env vars.
///
/// A missing `GEMINI_API_KEY` is not an error: the site still serves and
/// every chat turn fails with the localized failure message.
pub fn load_genai_settings() -> Result<GenAiSettings, String> {
    let base_url = non_empty_env("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let parsed = url::Url::parse(&base_url)
        .map_err(|e| format!("GEMINI_BASE_URL is not a valid URL: {e}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!(
            "GEMINI_BASE_URL must be http or https, got {}",
            parsed.scheme()
        ));
    }

    let mut settings = GenAiSettings {
        base_url: base_url.trim_end_matches('/').to_string(),
        api_key: non_empty_env("GEMINI_API_KEY"),
        model: non_empty_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
        image_model: non_empty_env("GEMINI_IMAGE_MODEL")
            .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
        ..GenAiSettings::default()
    };

    if let Some(tokens) = non_empty_env("GEMINI_MAX_OUTPUT_TOKENS") {
        settings.max_output_tokens = tokens
            .parse()
            .map_err(|_| format!("GEMINI_MAX_OUTPUT_TOKENS is not a number: {tokens}"))?;
    }
    if let Some(temp) = non_empty_env("GEMINI_TEMPERATURE") {
        settings.temperature = temp
            .parse()
            .map_err(|_| format!("GEMINI_TEMPERATURE is not a number: {temp}"))?;
    }

    Ok(settings)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
