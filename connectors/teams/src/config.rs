use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::client::GRAPH_API_BASE;
use crate::fetcher::DEFAULT_TRANSCRIPT_DAYS;
use crate::summarizer::{DEFAULT_MAX_INPUT_CHARS, DEFAULT_MAX_OUTPUT_TOKENS};

pub const DEFAULT_PORT: u16 = 3978;
const MIN_TRANSCRIPT_DAYS: i64 = 1;
const MAX_TRANSCRIPT_DAYS: i64 = 14;

#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authority: String,
    pub base_url: String,
    pub token_timeout: Duration,
    pub list_timeout: Duration,
    pub content_timeout: Duration,
    pub content_concurrency: usize,
}

#[derive(Debug, Clone)]
pub struct AzureOpenAiConfig {
    /// Always ends with `/` when set.
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
    pub max_input_chars: usize,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct TeamsConnectorConfig {
    pub graph: GraphConfig,
    pub openai: AzureOpenAiConfig,
    pub port: u16,
    pub transcript_days: i64,
    pub meeting_organizer_user_id: Option<String>,
    pub output_dir: Option<PathBuf>,
}

impl TeamsConnectorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Values are trimmed
    /// and blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let tenant_id = get_or("TENANT_ID", "");
        let client_id = get("CLIENT_ID")
            .or_else(|| get("MicrosoftAppId"))
            .unwrap_or_default();
        let client_secret = get("CLIENT_SECRET")
            .or_else(|| get("MicrosoftAppPassword"))
            .unwrap_or_default();
        let authority = get("AUTHORITY")
            .unwrap_or_else(|| format!("https://login.microsoftonline.com/{}", tenant_id));

        let transcript_days = get("TRANSCRIPT_DAYS")
            .and_then(|v| v.parse::<i64>().ok())
            .map(|d| d.clamp(MIN_TRANSCRIPT_DAYS, MAX_TRANSCRIPT_DAYS))
            .unwrap_or(DEFAULT_TRANSCRIPT_DAYS);

        let port = parse_or(get("PORT"), DEFAULT_PORT);

        let endpoint = get("AZURE_OPENAI_ENDPOINT")
            .map(|e| format!("{}/", e.trim_end_matches('/')))
            .unwrap_or_default();

        Self {
            graph: GraphConfig {
                client_id,
                client_secret,
                authority,
                base_url: get_or("GRAPH_BASE_URL", GRAPH_API_BASE),
                token_timeout: Duration::from_secs(parse_or(get("TOKEN_TIMEOUT_SECS"), 30)),
                list_timeout: Duration::from_secs(parse_or(get("LIST_TIMEOUT_SECS"), 60)),
                content_timeout: Duration::from_secs(parse_or(get("CONTENT_TIMEOUT_SECS"), 30)),
                content_concurrency: parse_or::<usize>(get("CONTENT_CONCURRENCY"), 1).max(1),
            },
            openai: AzureOpenAiConfig {
                endpoint,
                api_key: get_or("AZURE_OPENAI_API_KEY", ""),
                deployment: get_or("AZURE_OPENAI_DEPLOYMENT_NAME", "gpt-4o-mini"),
                api_version: get_or("AZURE_OPENAI_API_VERSION", "2024-02-15-preview"),
                max_input_chars: parse_or(get("SUMMARY_MAX_INPUT_CHARS"), DEFAULT_MAX_INPUT_CHARS),
                max_output_tokens: parse_or(
                    get("SUMMARY_MAX_OUTPUT_TOKENS"),
                    DEFAULT_MAX_OUTPUT_TOKENS,
                ),
            },
            port,
            transcript_days,
            meeting_organizer_user_id: get("MEETING_ORGANIZER_USER_ID"),
            output_dir: Some(PathBuf::from(get_or("SUMMARY_OUTPUT_DIR", "output"))),
        }
    }
}

/// Parses `value` as `T`; missing or out-of-range values give `default`.
fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}
