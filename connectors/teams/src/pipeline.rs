use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::auth::{ClientCredentialsAuth, TokenProvider};
use crate::client::GraphTranscriptClient;
use crate::config::TeamsConnectorConfig;
use crate::fetcher::TranscriptFetcher;
use crate::llm::AzureOpenAiClient;
use crate::models::TimeWindow;
use crate::summarizer::{SummarizationOrchestrator, SummaryMode, SummaryOptions};

/// Fetch-then-summarize for one meeting organizer.
pub struct MeetingSummaryPipeline {
    fetcher: TranscriptFetcher,
    summarizer: SummarizationOrchestrator,
    output_dir: Option<PathBuf>,
}

impl MeetingSummaryPipeline {
    pub fn new(
        fetcher: TranscriptFetcher,
        summarizer: SummarizationOrchestrator,
        output_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            output_dir,
        }
    }

    /// Wires the Graph and Azure OpenAI clients described by `config`.
    pub fn from_config(config: &TeamsConnectorConfig) -> Self {
        let auth: Arc<dyn TokenProvider> = Arc::new(
            ClientCredentialsAuth::new(
                &config.graph.authority,
                config.graph.client_id.clone(),
                config.graph.client_secret.clone(),
            )
            .with_timeout(config.graph.token_timeout),
        );

        let graph_client = GraphTranscriptClient::with_base_url(&config.graph.base_url, auth)
            .with_timeouts(config.graph.list_timeout, config.graph.content_timeout);
        let fetcher = TranscriptFetcher::new(Arc::new(graph_client))
            .with_content_concurrency(config.graph.content_concurrency)
            .with_transcript_days(config.transcript_days);

        let backend = AzureOpenAiClient::new(
            &config.openai.endpoint,
            config.openai.api_key.clone(),
            config.openai.deployment.clone(),
            config.openai.api_version.clone(),
        );
        let summarizer = SummarizationOrchestrator::new(
            Arc::new(backend),
            SummaryOptions {
                max_input_chars: config.openai.max_input_chars,
                max_output_tokens: config.openai.max_output_tokens,
            },
        );

        Self::new(fetcher, summarizer, config.output_dir.clone())
    }

    /// Summarizes the user's transcripts from the configured look-back window as
    /// one combined summary. Always returns text; failures are described in it.
    pub async fn summarize_for_user(&self, user_id: &str) -> String {
        let window = self.fetcher.default_window();
        self.summarize_window(user_id, &window).await
    }

    pub async fn summarize_window(&self, user_id: &str, window: &TimeWindow) -> String {
        info!(
            "Summarizing transcripts for user {} from {} to {}",
            user_id,
            window.start_param(),
            window.end_param()
        );

        let records = match self.fetcher.fetch_all(user_id, window).await {
            Ok(records) => records,
            Err(e) => {
                error!("Transcript fetch failed for user {}: {}", user_id, e);
                return format!("Error: {}", e);
            }
        };

        self.summarizer
            .summarize(&records, SummaryMode::Combined, self.output_dir.as_deref())
            .await
            .render()
    }
}
