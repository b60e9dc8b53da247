use shared::utils::truncate_chars;
use shared::TextFileStorage;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::llm::{CompletionBackend, CompletionRequest};
use crate::models::TranscriptRecord;

pub const NO_TRANSCRIPTS_MESSAGE: &str = "No transcripts found for the selected period.";
pub const NO_CONTENT_MESSAGE: &str = "(No transcript content to summarize.)";
pub const NO_SUMMARY_MESSAGE: &str = "(No summary generated.)";

pub const COMBINED_SUMMARY_FILE: &str = "combined_summary.md";
pub const DEFAULT_MAX_INPUT_CHARS: usize = 50_000;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1000;

const SECTION_DELIMITER: &str = "\n\n---\n\n";
const MAX_FILE_ID_CHARS: usize = 50;
const UNKNOWN_MEETING: &str = "unknown";

const SYSTEM_PROMPT: &str = "You are a meeting summarizer. Given raw meeting transcript text \
(possibly from multiple meetings), produce a concise summary. Include: main topics, decisions, \
and action items when present. Keep the summary clear and scannable.";

pub fn build_user_message(text: &str) -> String {
    format!(
        "Summarize the following meeting transcript(s):\n\n---\n{}\n---\n\nSummary:",
        text
    )
}

/// File-name-safe form of a meeting id: anything other than alphanumerics,
/// `-` and `_` becomes `_`, capped at 50 chars. Distinct ids may collide.
pub fn sanitize_meeting_id(meeting_id: &str) -> String {
    meeting_id
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILE_ID_CHARS)
        .collect()
}

pub fn meeting_summary_file(meeting_id: &str) -> String {
    format!("summary_{}.md", sanitize_meeting_id(meeting_id))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryMode {
    Combined,
    PerMeeting,
}

/// Result of summarizing one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Generated(String),
    /// Input text was blank; the backend was not called.
    NoContent,
    /// The backend answered without usable text.
    Empty,
    /// The backend call failed.
    Failed(String),
}

impl fmt::Display for SummaryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryOutcome::Generated(text) => f.write_str(text),
            SummaryOutcome::NoContent => f.write_str(NO_CONTENT_MESSAGE),
            SummaryOutcome::Empty => f.write_str(NO_SUMMARY_MESSAGE),
            SummaryOutcome::Failed(reason) => write!(f, "(Summarization failed: {})", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeetingSummary {
    pub meeting_id: String,
    pub created_at: Option<String>,
    pub outcome: SummaryOutcome,
}

impl MeetingSummary {
    pub fn summary_text(&self) -> String {
        self.outcome.to_string()
    }

    fn label(&self) -> String {
        format!(
            "**Meeting {}** ({}):\n{}",
            self.meeting_id,
            self.created_at.as_deref().unwrap_or_default(),
            self.outcome
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryResult {
    NoTranscripts,
    Combined(SummaryOutcome),
    PerMeeting(Vec<MeetingSummary>),
}

impl SummaryResult {
    /// Plain-text reply for the caller.
    pub fn render(&self) -> String {
        match self {
            SummaryResult::NoTranscripts => NO_TRANSCRIPTS_MESSAGE.to_string(),
            SummaryResult::Combined(outcome) => outcome.to_string(),
            SummaryResult::PerMeeting(summaries) => summaries
                .iter()
                .map(MeetingSummary::label)
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SummaryOptions {
    /// Longest input, in chars, embedded in one request.
    pub max_input_chars: usize,
    pub max_output_tokens: u32,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

pub struct SummarizationOrchestrator {
    backend: Arc<dyn CompletionBackend>,
    options: SummaryOptions,
}

impl SummarizationOrchestrator {
    pub fn new(backend: Arc<dyn CompletionBackend>, options: SummaryOptions) -> Self {
        Self { backend, options }
    }

    /// Summarizes one block of text. Failures become a [`SummaryOutcome`], never an error.
    pub async fn summarize_text(&self, text: &str) -> SummaryOutcome {
        if text.trim().is_empty() {
            return SummaryOutcome::NoContent;
        }

        let input = truncate_chars(text, self.options.max_input_chars);
        if input.len() < text.len() {
            debug!(
                "Truncated transcript input to {} chars",
                self.options.max_input_chars
            );
        }

        let request = CompletionRequest {
            system_instruction: SYSTEM_PROMPT.to_string(),
            user_message: build_user_message(input),
            max_output_tokens: self.options.max_output_tokens,
        };

        match self.backend.complete(&request).await {
            Ok(Some(content)) if !content.trim().is_empty() => {
                SummaryOutcome::Generated(content.trim().to_string())
            }
            Ok(_) => {
                warn!("Completion returned no usable content");
                SummaryOutcome::Empty
            }
            Err(e) => {
                error!("Summarization failed: {}", e);
                SummaryOutcome::Failed(e.to_string())
            }
        }
    }

    /// Summarizes `records` as one document or one request per meeting, mirroring
    /// each summary to `output_dir` when given.
    pub async fn summarize(
        &self,
        records: &[TranscriptRecord],
        mode: SummaryMode,
        output_dir: Option<&Path>,
    ) -> SummaryResult {
        if records.is_empty() {
            return SummaryResult::NoTranscripts;
        }

        let storage = match output_dir {
            Some(dir) => match TextFileStorage::create(dir).await {
                Ok(storage) => Some(storage),
                Err(e) => {
                    warn!(
                        "Cannot use summary output directory {}: {}",
                        dir.display(),
                        e
                    );
                    None
                }
            },
            None => None,
        };

        match mode {
            SummaryMode::Combined => {
                info!("Summarizing {} transcripts as one document", records.len());
                let combined = combine_records(records);
                let outcome = self.summarize_text(&combined).await;
                persist(storage.as_ref(), COMBINED_SUMMARY_FILE, &outcome).await;
                SummaryResult::Combined(outcome)
            }
            SummaryMode::PerMeeting => {
                info!("Summarizing {} transcripts individually", records.len());
                let mut summaries = Vec::with_capacity(records.len());
                for record in records {
                    let meeting_id = if record.meeting_id.is_empty() {
                        UNKNOWN_MEETING.to_string()
                    } else {
                        record.meeting_id.clone()
                    };
                    let outcome = self.summarize_text(&record.content_text).await;
                    persist(storage.as_ref(), &meeting_summary_file(&meeting_id), &outcome).await;
                    summaries.push(MeetingSummary {
                        meeting_id,
                        created_at: record.created_at.clone(),
                        outcome,
                    });
                }
                SummaryResult::PerMeeting(summaries)
            }
        }
    }
}

fn combine_records(records: &[TranscriptRecord]) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "Meeting {} ({}):\n{}",
                r.meeting_id,
                r.created_at_display(),
                r.content_text
            )
        })
        .collect::<Vec<_>>()
        .join(SECTION_DELIMITER)
}

async fn persist(storage: Option<&TextFileStorage>, file_name: &str, outcome: &SummaryOutcome) {
    let Some(storage) = storage else { return };
    match storage.write_text(file_name, &outcome.to_string()).await {
        Ok(path) => debug!("Saved summary to {}", path.display()),
        Err(e) => warn!("Failed to save summary {}: {}", file_name, e),
    }
}
