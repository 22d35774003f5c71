//! Control transport port interface

use std::io;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::control::ControlEvent;

/// Port for the control-plane transport delivering trigger events
#[async_trait]
pub trait ControlSource: Send + Sync {
    /// Bind the endpoint
    async fn bind(&mut self) -> io::Result<()>;

    /// Human-readable endpoint description
    fn endpoint(&self) -> String;

    /// Receive events until the channel closes, forwarding each recognized one.
    async fn run(&self, tx: mpsc::Sender<ControlEvent>) -> io::Result<()>;
}

/// Port for sending trigger events to a running recorder
#[async_trait]
pub trait ControlSink: Send + Sync {
    async fn send(&self, event: ControlEvent) -> io::Result<()>;
}
