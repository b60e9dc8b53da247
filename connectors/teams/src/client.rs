use async_trait::async_trait;
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::auth::TokenProvider;
use crate::error::FetchError;
use crate::models::{TimeWindow, TranscriptPage};

pub const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_CONTENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote transcript listing and content retrieval.
#[async_trait]
pub trait TranscriptApi: Send + Sync {
    /// Fetches one page of transcript metadata. `next_link` is the locator
    /// returned by the previous page; `None` requests the first page.
    async fn list_transcripts(
        &self,
        user_id: &str,
        window: &TimeWindow,
        next_link: Option<&str>,
    ) -> Result<TranscriptPage, FetchError>;

    /// Fetches the raw WebVTT body behind a content reference.
    async fn get_transcript_content(&self, content_ref: &str) -> Result<String, FetchError>;
}

pub struct GraphTranscriptClient {
    client: Client,
    base_url: String,
    auth: Arc<dyn TokenProvider>,
    list_timeout: Duration,
    content_timeout: Duration,
}

impl GraphTranscriptClient {
    pub fn new(auth: Arc<dyn TokenProvider>) -> Self {
        Self::with_base_url(GRAPH_API_BASE, auth)
    }

    pub fn with_base_url(base_url: &str, auth: Arc<dyn TokenProvider>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            list_timeout: DEFAULT_LIST_TIMEOUT,
            content_timeout: DEFAULT_CONTENT_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, list_timeout: Duration, content_timeout: Duration) -> Self {
        self.list_timeout = list_timeout;
        self.content_timeout = content_timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn all_transcripts_url(&self, user_id: &str, window: &TimeWindow) -> String {
        format!(
            "{}/users/{}/onlineMeetings/getAllTranscripts(meetingOrganizerUserId='{}',startDateTime={},endDateTime={})",
            self.base_url,
            user_id,
            user_id,
            window.start_param(),
            window.end_param()
        )
    }

    /// Absolute references are used as-is; anything else is appended to the base URL.
    pub fn resolve_content_url(&self, content_ref: &str) -> String {
        if Url::parse(content_ref).is_ok() {
            content_ref.to_string()
        } else {
            format!("{}/{}", self.base_url, content_ref.trim_start_matches('/'))
        }
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<Response, FetchError> {
        let token = self.auth.get_bearer_token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&token)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: if e.is_timeout() {
                    format!("timed out after {}ms", timeout.as_millis())
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl TranscriptApi for GraphTranscriptClient {
    async fn list_transcripts(
        &self,
        user_id: &str,
        window: &TimeWindow,
        next_link: Option<&str>,
    ) -> Result<TranscriptPage, FetchError> {
        let url = match next_link {
            Some(link) => link.to_string(),
            None => self.all_transcripts_url(user_id, window),
        };

        debug!("Listing transcripts: {}", url);

        let response = self.get(&url, self.list_timeout).await?;
        let body = response.text().await.map_err(|e| FetchError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url,
            message: e.to_string(),
        })
    }

    async fn get_transcript_content(&self, content_ref: &str) -> Result<String, FetchError> {
        let url = self.resolve_content_url(content_ref);
        debug!("Fetching transcript content: {}", url);

        let response = self.get(&url, self.content_timeout).await?;
        response.text().await.map_err(|e| FetchError::Transport {
            url,
            message: e.to_string(),
        })
    }
}
