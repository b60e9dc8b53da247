use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::caption;
use crate::client::TranscriptApi;
use crate::error::{ConnectorError, FetchError};
use crate::models::{TimeWindow, TranscriptMetadata, TranscriptRecord};

pub const DEFAULT_TRANSCRIPT_DAYS: i64 = 7;

pub struct TranscriptFetcher {
    api: Arc<dyn TranscriptApi>,
    content_concurrency: usize,
    transcript_days: i64,
}

impl TranscriptFetcher {
    pub fn new(api: Arc<dyn TranscriptApi>) -> Self {
        Self {
            api,
            content_concurrency: 1,
            transcript_days: DEFAULT_TRANSCRIPT_DAYS,
        }
    }

    /// Look-back used by [`fetch_for_user`](Self::fetch_for_user).
    pub fn with_transcript_days(mut self, days: i64) -> Self {
        self.transcript_days = days.max(1);
        self
    }

    /// Number of content downloads in flight at once. Results keep metadata order.
    pub fn with_content_concurrency(mut self, concurrency: usize) -> Self {
        self.content_concurrency = concurrency.max(1);
        self
    }

    /// The last `transcript_days` days, ending now.
    pub fn default_window(&self) -> TimeWindow {
        TimeWindow::last_days(self.transcript_days)
    }

    pub async fn fetch_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<TranscriptRecord>, ConnectorError> {
        self.fetch_all(user_id, &self.default_window()).await
    }

    /// Lists every transcript in the window, then downloads and parses each one.
    ///
    /// A listing failure aborts the fetch. A content failure only empties that
    /// record's text. Metadata without a content reference is skipped.
    pub async fn fetch_all(
        &self,
        user_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<TranscriptRecord>, ConnectorError> {
        let metadata = self.list_all_metadata(user_id, window).await?;
        let total = metadata.len();

        let pending: Vec<TranscriptMetadata> = metadata
            .into_iter()
            .filter(|meta| {
                let has_ref = meta.content_ref().is_some();
                if !has_ref {
                    debug!("Skipping transcript {} without content reference", meta.id);
                }
                has_ref
            })
            .collect();

        info!(
            "Fetching content for {} of {} transcripts (concurrency {})",
            pending.len(),
            total,
            self.content_concurrency
        );

        let records: Vec<TranscriptRecord> = stream::iter(pending)
            .map(|meta| self.fetch_record(meta))
            .buffered(self.content_concurrency)
            .collect()
            .await;

        let failed = records.iter().filter(|r| r.is_failed()).count();
        if failed > 0 {
            warn!("{} of {} transcripts had no retrievable content", failed, records.len());
        }

        Ok(records)
    }

    async fn list_all_metadata(
        &self,
        user_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<TranscriptMetadata>, FetchError> {
        let mut all_metadata = Vec::new();
        let mut next_link: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let page = self
                .api
                .list_transcripts(user_id, window, next_link.as_deref())
                .await?;
            pages += 1;

            debug!("Received {} transcripts in page {}", page.value.len(), pages);

            next_link = page.next_link().map(str::to_string);
            all_metadata.extend(page.value);

            if next_link.is_none() {
                break;
            }
        }

        info!(
            "Listed {} transcripts for user {} across {} page(s)",
            all_metadata.len(),
            user_id,
            pages
        );

        Ok(all_metadata)
    }

    async fn fetch_record(&self, metadata: TranscriptMetadata) -> TranscriptRecord {
        let content_ref = metadata.content_ref().unwrap_or_default().to_string();

        match self.api.get_transcript_content(&content_ref).await {
            Ok(raw) => {
                let text = caption::parse_to_text(&raw);
                debug!(
                    "Parsed transcript {} ({} chars of text)",
                    metadata.id,
                    text.len()
                );
                TranscriptRecord::with_content(metadata, text)
            }
            Err(e) => {
                warn!("Failed to fetch transcript content {}: {}", metadata.id, e);
                TranscriptRecord::failed(metadata, e.to_string())
            }
        }
    }
}
