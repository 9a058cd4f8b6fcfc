//! Server-Sent Events support

use crate::runtime::WidgetEvent;
use crate::surface::WidgetView;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream, starting with the current view
pub fn sse_stream(
    init_view: WidgetView,
    broadcast_rx: tokio::sync::broadcast::Receiver<WidgetEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move {
        Ok(Event::default()
            .event("init")
            .data(init_payload(&init_view).to_string()))
    });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(widget_event_to_axum(&event))),
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(init.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn init_payload(view: &WidgetView) -> Value {
    json!({
        "type": "init",
        "view": view,
    })
}

/// Event name and JSON payload for a widget event
fn event_payload(event: &WidgetEvent) -> (&'static str, Value) {
    match event {
        WidgetEvent::Message { message } => (
            "message",
            json!({
                "type": "message",
                "message": message
            }),
        ),
        WidgetEvent::StateChange { state, typing } => (
            "state_change",
            json!({
                "type": "state_change",
                "state": state,
                "typing": typing
            }),
        ),
        WidgetEvent::Visibility { visibility } => (
            "visibility",
            json!({
                "type": "visibility",
                "visibility": visibility
            }),
        ),
        WidgetEvent::Scroll { message_id } => (
            "scroll",
            json!({
                "type": "scroll",
                "message_id": message_id
            }),
        ),
    }
}

fn widget_event_to_axum(event: &WidgetEvent) -> Event {
    let (event_type, data) = event_payload(event);
    Event::default().event(event_type).data(data.to_string())
}
