mod common;

use anyhow::Result;
use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use omni_teams_connector::summarizer::{
    build_user_message, COMBINED_SUMMARY_FILE, NO_TRANSCRIPTS_MESSAGE,
};
use omni_teams_connector::{
    GraphTranscriptClient, MeetingSummaryPipeline, SummarizationOrchestrator, SummaryOptions,
    TimeWindow, TranscriptFetcher,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use common::{vtt, MockGraphServer, RecordingBackend, StaticToken};

const LIST_PATH: &str = "/v1.0/users/organizer/onlineMeetings/getAllTranscripts";

fn window() -> TimeWindow {
    TimeWindow::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap(),
    )
}

fn pipeline(
    mock: &MockGraphServer,
    backend: Arc<RecordingBackend>,
    output_dir: Option<PathBuf>,
) -> MeetingSummaryPipeline {
    let client = GraphTranscriptClient::with_base_url(&mock.url("/v1.0"), Arc::new(StaticToken));
    let fetcher = TranscriptFetcher::new(Arc::new(client));
    let summarizer = SummarizationOrchestrator::new(backend, SummaryOptions::default());
    MeetingSummaryPipeline::new(fetcher, summarizer, output_dir)
}

#[tokio::test]
async fn test_summarize_window_combines_transcripts() -> Result<()> {
    let mock = MockGraphServer::start().await?;
    mock.respond_json(
        LIST_PATH,
        StatusCode::OK,
        json!({
            "value": [
                {
                    "id": "t1",
                    "meetingId": "m1",
                    "createdDateTime": "2024-06-03T10:00:00Z",
                    "transcriptContentUrl": "users/organizer/onlineMeetings/m1/transcripts/t1/content"
                },
                {
                    "id": "t2",
                    "meetingId": "m2",
                    "createdDateTime": "2024-06-04T10:00:00Z"
                },
                {
                    "id": "t3",
                    "meetingId": "m3",
                    "createdDateTime": "2024-06-05T10:00:00Z",
                    "transcriptContentUrl": "users/organizer/onlineMeetings/m3/transcripts/t3/content"
                }
            ]
        }),
    );
    mock.respond_text(
        "/v1.0/users/organizer/onlineMeetings/m1/transcripts/t1/content",
        StatusCode::OK,
        &vtt(&[("Alice", "Budget is approved."), ("Bob", "I'll send the invoice.")]),
    );
    mock.respond_text(
        "/v1.0/users/organizer/onlineMeetings/m3/transcripts/t3/content",
        StatusCode::OK,
        &vtt(&[("Carol", "Launch moves to July.")]),
    );

    let tmp = tempfile::tempdir()?;
    let output_dir = tmp.path().join("output");
    let backend = RecordingBackend::new("Budget approved; launch in July.");

    let reply = pipeline(&mock, backend.clone(), Some(output_dir.clone()))
        .summarize_window("organizer", &window())
        .await;

    assert_eq!(reply, "Budget approved; launch in July.");

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].user_message,
        build_user_message(
            "Meeting m1 (2024-06-03T10:00:00Z):\nAlice: Budget is approved.\nBob: I'll send the invoice.\
             \n\n---\n\n\
             Meeting m3 (2024-06-05T10:00:00Z):\nCarol: Launch moves to July."
        )
    );

    let saved = std::fs::read_to_string(output_dir.join(COMBINED_SUMMARY_FILE))?;
    assert_eq!(saved, "Budget approved; launch in July.");

    Ok(())
}

#[tokio::test]
async fn test_no_transcripts_skips_llm() -> Result<()> {
    let mock = MockGraphServer::start().await?;
    mock.respond_json(LIST_PATH, StatusCode::OK, json!({ "value": [] }));

    let backend = RecordingBackend::new("unused");
    let reply = pipeline(&mock, backend.clone(), None)
        .summarize_window("organizer", &window())
        .await;

    assert_eq!(reply, NO_TRANSCRIPTS_MESSAGE);
    assert!(backend.requests().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_listing_failure_becomes_error_reply() -> Result<()> {
    let mock = MockGraphServer::start().await?;
    mock.respond_json(
        LIST_PATH,
        StatusCode::SERVICE_UNAVAILABLE,
        json!({ "error": { "code": "ServiceUnavailable" } }),
    );

    let backend = RecordingBackend::new("unused");
    let reply = pipeline(&mock, backend.clone(), None)
        .summarize_for_user("organizer")
        .await;

    assert!(reply.starts_with("Error: Transcript listing failed"));
    assert!(reply.contains("503"));
    assert!(backend.requests().is_empty());

    Ok(())
}
