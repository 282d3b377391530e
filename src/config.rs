use clap::{Parser, Subcommand};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on query requests processed at the same time
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    pub backend: String, // "gemini", "remote", or "ollama"
    pub model: String,   // Model name
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub temperature: f32,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchemaConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexConfig {
    /// Directory holding the persisted example collection. Retrieval is off when unset.
    pub path: Option<PathBuf>,
    pub collection: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    pub backend: String, // "ollama" or "remote"
    pub model: String,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ValidatorConfig {
    pub dialect: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub service_token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub web: WebConfig,
    pub llm: LlmConfig,
    pub schema: SchemaConfig,
    pub index: IndexConfig,
    pub embedding: EmbeddingConfig,
    pub validator: ValidatorConfig,
    pub auth: AuthConfig,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Schema description handed to the model
    #[arg(long, value_name = "FILE", global = true)]
    pub schema: Option<PathBuf>,

    /// Directory of the example index
    #[arg(long, value_name = "DIR", global = true)]
    pub index: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Answer a single question and print the response record
    Ask {
        #[arg(short, long)]
        question: String,
    },
}

const ENV_PREFIX: &str = "SQL_BOT";

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        // Defaults first, so a config file only needs to name what it changes
        let mut config_builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            // Check for config in default locations
            let default_locations = vec![
                "config.toml",
                "config/config.toml",
                "/etc/sql-bot/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        // SQL_BOT__LLM__API_KEY style variables
        config_builder = config_builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        // Build the config
        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        // Override with command line args if provided
        if let Some(host) = &args.host {
            config.web.host = host.clone();
        }
        if let Some(port) = args.port {
            config.web.port = port;
        }
        if let Some(schema) = &args.schema {
            config.schema.path = schema.clone();
        }
        if let Some(index) = &args.index {
            config.index.path = Some(index.clone());
        }

        // An empty value means "not configured"
        config.index.path = config.index.path.filter(|p| !p.as_os_str().is_empty());
        config.auth.service_token = config.auth.service_token.filter(|t| !t.is_empty());
        config.llm.api_key = config.llm.api_key.filter(|k| !k.is_empty());

        Ok(config)
    }
}

// Default implementation
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                max_concurrent_requests: 16,
            },
            llm: LlmConfig {
                backend: "gemini".to_string(),
                model: "gemini-1.5-pro".to_string(),
                api_key: None,
                api_url: None,
                temperature: 0.1,
                max_retries: 2,
                timeout_secs: 60,
            },
            schema: SchemaConfig {
                path: PathBuf::from("llm_schema.txt"),
            },
            index: IndexConfig {
                path: None,
                collection: "chat_collection".to_string(),
            },
            embedding: EmbeddingConfig {
                backend: "ollama".to_string(),
                model: "nomic-embed-text".to_string(),
                api_url: None,
                api_key: None,
            },
            validator: ValidatorConfig {
                dialect: "generic".to_string(),
            },
            auth: AuthConfig {
                service_token: None,
            },
        }
    }
}
