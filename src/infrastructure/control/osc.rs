//! OSC trigger transport over UDP

use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use rosc::{OscMessage, OscPacket, OscType};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use crate::application::ports::{ControlSink, ControlSource};
use crate::domain::control::ControlEvent;

/// Largest datagram accepted by the listener
const MAX_PACKET_SIZE: usize = 1536;

/// Listens for marker triggers on `host:port`
pub struct OscControlServer {
    bind_addr: SocketAddr,
    address: String,
    socket: Option<UdpSocket>,
}

impl OscControlServer {
    pub fn new(bind_addr: SocketAddr, address: impl Into<String>) -> Self {
        Self {
            bind_addr,
            address: address.into(),
            socket: None,
        }
    }

    /// Loopback listener on `port`
    pub fn localhost(port: u16, address: impl Into<String>) -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], port)), address)
    }

    /// Address actually bound, once `bind` has succeeded
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }
}

#[async_trait]
impl ControlSource for OscControlServer {
    async fn bind(&mut self) -> io::Result<()> {
        self.socket = Some(UdpSocket::bind(self.bind_addr).await?);
        Ok(())
    }

    fn endpoint(&self) -> String {
        let addr = self.local_addr().unwrap_or(self.bind_addr);
        format!("osc.udp://{}{}", addr, self.address)
    }

    async fn run(&self, tx: mpsc::Sender<ControlEvent>) -> io::Result<()> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "control socket not bound"))?;

        let mut buf = [0u8; MAX_PACKET_SIZE];
        loop {
            let (size, peer) = socket.recv_from(&mut buf).await?;
            let packet = match rosc::decoder::decode_udp(&buf[..size]) {
                Ok((_, packet)) => packet,
                Err(e) => {
                    tracing::debug!(%peer, error = ?e, "discarding malformed OSC packet");
                    continue;
                }
            };

            for event in parse_packet(&packet, &self.address) {
                if tx.send(event).await.is_err() {
                    return Ok(());
                }
            }
        }
    }
}

/// Sends triggers to a running recorder
pub struct OscControlClient {
    target: SocketAddr,
    address: String,
}

impl OscControlClient {
    pub fn new(target: SocketAddr, address: impl Into<String>) -> Self {
        Self {
            target,
            address: address.into(),
        }
    }

    pub fn localhost(port: u16, address: impl Into<String>) -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], port)), address)
    }

    fn encode(&self, event: ControlEvent) -> io::Result<Vec<u8>> {
        let msg = OscMessage {
            addr: self.address.clone(),
            args: vec![OscType::Float(event.as_value())],
        };
        rosc::encoder::encode(&OscPacket::Message(msg))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{e:?}")))
    }
}

#[async_trait]
impl ControlSink for OscControlClient {
    async fn send(&self, event: ControlEvent) -> io::Result<()> {
        let bytes = self.encode(event)?;
        let local: SocketAddr = if self.target.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(local).await?;
        socket.send_to(&bytes, self.target).await?;
        Ok(())
    }
}

/// Every recognized event in `packet`, bundles flattened in order
fn parse_packet(packet: &OscPacket, address: &str) -> Vec<ControlEvent> {
    match packet {
        OscPacket::Message(msg) => parse_message(msg, address).into_iter().collect(),
        OscPacket::Bundle(bundle) => bundle
            .content
            .iter()
            .flat_map(|p| parse_packet(p, address))
            .collect(),
    }
}

fn parse_message(msg: &OscMessage, address: &str) -> Option<ControlEvent> {
    if msg.addr != address {
        return None;
    }
    let value = match msg.args.first()? {
        OscType::Float(f) => *f,
        OscType::Double(d) => *d as f32,
        OscType::Int(i) => *i as f32,
        _ => return None,
    };
    ControlEvent::from_value(value)
}
