//! Server-Sent Events (SSE) stream of recommender activity.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_core::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::state::SharedState;

/// GET /api/events: clients subscribe here for live updates.
/// Lagged receivers skip the events they missed.
pub async fn sse_handler(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let event = result.ok()?;
        let data = serde_json::to_string(&event).ok()?;
        Some(Ok(Event::default().event(event_name(&event)).data(data)))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn event_name(event: &crate::state::AppEvent) -> &'static str {
    use crate::state::AppEvent::*;
    match event {
        RecommendationsServed { .. } => "recommendations_served",
        InteractionRecorded { .. } => "interaction_recorded",
        PreferencesUpdated { .. } => "preferences_updated",
        PreferencesReset { .. } => "preferences_reset",
    }
}
