//! Trigger command handler: sends one control event to a running recorder

use crate::application::ports::ControlSink;
use crate::domain::control::ControlEvent;

use super::presenter::Presenter;

/// Send `event` through `sink`
pub async fn handle_trigger_command<S: ControlSink>(
    event: ControlEvent,
    sink: &S,
    target: &str,
    presenter: &Presenter,
) -> Result<(), String> {
    sink.send(event)
        .await
        .map_err(|e| format!("Failed to send {} to {}: {}", event, target, e))?;

    presenter.success(&format!("Sent {} to {}", event, target));
    Ok(())
}
