//! Live catalog updates via Server-Sent Events
//!
//! Each connection holds one broadcast receiver; the subscription is
//! torn down by dropping the stream when the client disconnects.

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::AppState;
use crate::data::Category;
use crate::error::AppError;
use crate::events::{MaterialChange, MaterialEvent};

/// GET /api/v1/catalog/:category/stream
///
/// Streams lifecycle events for one category. Only `published` and
/// `removed` reach this stream: `submitted` events carry pending
/// records, which stay invisible to catalog consumers until an admin
/// approves them. A slow client that falls behind the broadcast buffer
/// gets a `reset` event and should refetch the listing rather than
/// rely on replay.
pub async fn stream_catalog(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let category = Category::parse(&category)?;
    let receiver = state.events.subscribe();

    let stream = BroadcastStream::new(receiver).filter_map(move |item| match item {
        Ok(event)
            if event.category == category && event.change != MaterialChange::Submitted =>
        {
            Some(Ok(to_sse_event(&event)))
        }
        Ok(_) => None,
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::debug!(skipped, "SSE subscriber lagged, sending reset");
            Some(Ok(Event::default().event("reset").data("{}")))
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn to_sse_event(event: &MaterialEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    Event::default().event(event.change.as_str()).data(data)
}
