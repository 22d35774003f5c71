//! Signal handling for the recorder loop

use colored::Colorize;
use tokio::sync::mpsc;

use crate::domain::control::ControlEvent;

/// Everything the recorder loop reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceSignal {
    /// Trigger from the control transport
    Control(ControlEvent),
    /// Fatal failure reported from the capture thread
    Fault(String),
    /// SIGINT/SIGTERM
    Shutdown,
}

/// Recorder signal handler
///
/// Handles OS shutdown signals and provides a channel for other sources
/// (control listener, capture thread) to feed the recorder loop.
pub struct ServiceSignalHandler {
    receiver: mpsc::Receiver<ServiceSignal>,
}

impl ServiceSignalHandler {
    /// Create the handler and start listening for shutdown signals.
    ///
    /// Returns the handler and a sender for the other signal sources.
    pub async fn new() -> Result<(Self, mpsc::Sender<ServiceSignal>), std::io::Error> {
        let (tx, rx) = mpsc::channel(16);

        let tx_int = tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("{} Received SIGINT (shutdown)", "↓".cyan());
                let _ = tx_int.send(ServiceSignal::Shutdown).await;
            }
        });

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let tx_term = tx.clone();
            let mut sigterm = signal(SignalKind::terminate())?;
            tokio::spawn(async move {
                sigterm.recv().await;
                eprintln!("{} Received SIGTERM (shutdown)", "↓".cyan());
                let _ = tx_term.send(ServiceSignal::Shutdown).await;
            });
        }

        Ok((Self { receiver: rx }, tx))
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> Option<ServiceSignal> {
        self.receiver.recv().await
    }
}

/// Forward control events into the signal channel until either side closes
pub async fn forward_control_events(
    mut events: mpsc::Receiver<ControlEvent>,
    tx: mpsc::Sender<ServiceSignal>,
) {
    while let Some(event) = events.recv().await {
        if tx.send(ServiceSignal::Control(event)).await.is_err() {
            break;
        }
    }
}
