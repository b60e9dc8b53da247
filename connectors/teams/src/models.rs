use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

const GRAPH_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Half-open `[start, end)` range used to select transcripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The `days` days leading up to now.
    pub fn last_days(days: i64) -> Self {
        let end = Utc::now();
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    pub fn start_param(&self) -> String {
        self.start.format(GRAPH_DATETIME_FORMAT).to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format(GRAPH_DATETIME_FORMAT).to_string()
    }
}

/// One `callTranscript` entry from the listing API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranscriptMetadata {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "meetingId", default)]
    pub meeting_id: String,
    /// `createdDateTime` exactly as Graph sent it.
    #[serde(rename = "createdDateTime", default)]
    pub created_at: Option<String>,
    #[serde(rename = "transcriptContentUrl", default)]
    pub content_ref: Option<String>,
}

impl TranscriptMetadata {
    /// The content locator, if there is a non-blank one.
    pub fn content_ref(&self) -> Option<&str> {
        self.content_ref
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptPage {
    #[serde(default)]
    pub value: Vec<TranscriptMetadata>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

impl TranscriptPage {
    /// The next-page locator, ignoring blank values.
    pub fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref().filter(|l| !l.trim().is_empty())
    }
}

/// Transcript metadata joined with its parsed content.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptRecord {
    pub transcript_id: String,
    pub meeting_id: String,
    pub created_at: Option<String>,
    pub content_text: String,
    /// Set when the content could not be fetched; `content_text` is empty then.
    pub fetch_error: Option<String>,
}

impl TranscriptRecord {
    pub fn with_content(metadata: TranscriptMetadata, content_text: String) -> Self {
        Self {
            transcript_id: metadata.id,
            meeting_id: metadata.meeting_id,
            created_at: metadata.created_at,
            content_text,
            fetch_error: None,
        }
    }

    pub fn failed(metadata: TranscriptMetadata, reason: String) -> Self {
        Self {
            transcript_id: metadata.id,
            meeting_id: metadata.meeting_id,
            created_at: metadata.created_at,
            content_text: String::new(),
            fetch_error: Some(reason),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.fetch_error.is_some()
    }

    /// The raw creation timestamp, or empty when Graph sent none.
    pub fn created_at_display(&self) -> &str {
        self.created_at.as_deref().unwrap_or_default()
    }
}
