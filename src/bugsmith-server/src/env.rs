//! Environment validation.
//!
//! All required variables are checked up front so a misconfigured deploy
//! fails at startup with one aggregate message instead of dying on the first
//! request.

use std::fmt;

use bugsmith_llm::LlmConfig;
use bugsmith_ratelimits::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECONDS};
use bugsmith_slack::SlackConfig;
use tracing::{info, warn};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE: &str = "bugsmith";

/// Required variables and what they are for.
const REQUIRED_VARS: &[(&str, &str)] = &[
    ("SLACK_BOT_TOKEN", "Slack bot token for authentication"),
    (
        "SLACK_SIGNING_SECRET",
        "Slack signing secret for request verification",
    ),
    ("MONGO_URL", "MongoDB connection URL"),
];

/// Aggregate of everything missing from the environment.
#[derive(Debug)]
pub struct MissingEnv {
    missing: Vec<String>,
}

impl fmt::Display for MissingEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Missing required environment variables:")?;
        for line in &self.missing {
            writeln!(f, "  - {line}")?;
        }
        write!(
            f,
            "\nPlease set these variables before starting the application."
        )
    }
}

impl std::error::Error for MissingEnv {}

/// Validated server configuration.
#[derive(Debug)]
pub struct ServerEnv {
    pub slack: SlackConfig,
    pub mongo_url: String,
    pub database: String,
    pub llm: Option<LlmConfig>,
    pub port: u16,
    pub rate_limit_max: u32,
    pub rate_limit_window_seconds: u64,
}

impl ServerEnv {
    /// Read and validate from the process environment.
    pub fn from_env() -> Result<Self, MissingEnv> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read and validate via a lookup function (injectable for tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MissingEnv> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .filter(|(name, _)| get(name).is_none())
            .map(|(name, description)| format!("{name}: {description}"))
            .collect();
        if !missing.is_empty() {
            return Err(MissingEnv { missing });
        }

        let bot_token = get("SLACK_BOT_TOKEN").unwrap_or_default();
        let signing_secret = get("SLACK_SIGNING_SECRET").unwrap_or_default();
        let mongo_url = get("MONGO_URL").unwrap_or_default();

        let llm = match get("OPENAI_API_KEY") {
            Some(key) => {
                let mut config = LlmConfig::new(key);
                if let Some(model) = get("OPENAI_MODEL") {
                    config = config.with_model(model);
                }
                Some(config)
            }
            None => {
                info!("OPENAI_API_KEY not set; bug report generation will be unavailable");
                None
            }
        };

        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT);
        let rate_limit_max = parse_or(
            "RATE_LIMIT_OPENAI_MAX",
            get("RATE_LIMIT_OPENAI_MAX"),
            DEFAULT_MAX_REQUESTS,
        );
        let rate_limit_window_seconds = parse_or(
            "RATE_LIMIT_OPENAI_WINDOW_SECONDS",
            get("RATE_LIMIT_OPENAI_WINDOW_SECONDS"),
            DEFAULT_WINDOW_SECONDS,
        );

        info!(
            rate_limit_max,
            "AI rate limiting: {rate_limit_max} requests per organization per window"
        );

        Ok(Self {
            slack: SlackConfig::new(bot_token, signing_secret),
            mongo_url,
            database: get("MONGO_DB").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            llm,
            port,
            rate_limit_max,
            rate_limit_window_seconds,
        })
    }
}

fn parse_or<T: std::str::FromStr + Copy + fmt::Display>(
    name: &str,
    value: Option<String>,
    default: T,
) -> T {
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("invalid {name}={raw}; using default {default}");
            default
        }),
        None => default,
    }
}
