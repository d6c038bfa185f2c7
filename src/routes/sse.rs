use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/outcomes",
    tag = "sse",
    responses((status = 200, description = "Confirmed, disputed and completed outcomes as they happen", content_type = "text/event-stream", body = String))
)]
/// Stream outcome events to connected frontends.
pub async fn outcome_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_outcomes(&state);
    info!(
        subscribers = state.outcomes().receiver_count(),
        "new outcome SSE connection"
    );
    sse_service::to_sse_stream(receiver, sse_service::handshake(&state))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/outcomes", get(outcome_stream))
}
