use anyhow::Result;
use dotenvy::dotenv;
use omni_teams_connector::api::{create_router, ApiState};
use omni_teams_connector::{MeetingSummaryPipeline, TeamsConnectorConfig};
use shared::telemetry::{self, TelemetryConfig};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let telemetry_config = TelemetryConfig::from_env("omni-teams-connector");
    telemetry::init_telemetry(telemetry_config)?;

    info!("Starting Teams Connector");

    let config = TeamsConnectorConfig::from_env();
    if config.meeting_organizer_user_id.is_none() {
        warn!("MEETING_ORGANIZER_USER_ID is not set; summary requests will be declined");
    }

    let pipeline = Arc::new(MeetingSummaryPipeline::from_config(&config));
    let api_state = ApiState {
        pipeline,
        organizer_user_id: config.meeting_organizer_user_id.clone(),
    };

    let app = create_router(api_state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("HTTP server listening on {} (POST /api/messages)", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("HTTP server stopped: {:?}", e);
    }

    Ok(())
}
