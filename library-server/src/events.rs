//! Mirrors notable library events into the server log.

use core_runtime::events::{EventBus, EventSeverity, EventStream, RecvError};
use tokio::task::JoinHandle;

/// Logs every event of at least [`EventSeverity::Info`] until the bus closes.
pub fn spawn_event_log(bus: &EventBus) -> JoinHandle<()> {
    let mut stream =
        EventStream::new(bus.subscribe()).filter(|event| event.severity() >= EventSeverity::Info);

    tokio::spawn(async move {
        loop {
            match stream.recv().await {
                Ok(event) => match event.severity() {
                    EventSeverity::Warning | EventSeverity::Error => {
                        tracing::warn!(event = ?event, "{}", event.description())
                    }
                    _ => tracing::info!(event = ?event, "{}", event.description()),
                },
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Event log fell behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
