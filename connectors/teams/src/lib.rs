pub mod api;
pub mod auth;
pub mod caption;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod summarizer;

pub use auth::{ClientCredentialsAuth, TokenProvider};
pub use caption::{parse_to_segments, parse_to_text, CaptionCue};
pub use client::{GraphTranscriptClient, TranscriptApi};
pub use config::TeamsConnectorConfig;
pub use error::{AuthError, ConnectorError, FetchError, LlmError};
pub use fetcher::TranscriptFetcher;
pub use llm::{AzureOpenAiClient, CompletionBackend, CompletionRequest};
pub use models::{TimeWindow, TranscriptMetadata, TranscriptPage, TranscriptRecord};
pub use pipeline::MeetingSummaryPipeline;
pub use summarizer::{SummarizationOrchestrator, SummaryMode, SummaryOptions, SummaryResult};
