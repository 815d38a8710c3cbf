//! WebSocket transport for the chain-sync session.
//!
//! The transport is deliberately dumb: serialize requests out, hand raw JSON
//! messages back in. Pipelining and reply matching live in the scheduler and
//! client, which only rely on the node answering in FIFO order.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use chaincensus_core::CensusError;

use crate::messages::Request;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Transport abstraction over the chain-sync connection.
///
/// `&mut self` throughout: the session is single-owner and strictly
/// sequential on each side, there is nothing to share.
#[async_trait]
pub trait ChainSyncTransport: Send {
    /// Submit a request. Returns as soon as the frame is written; the reply
    /// arrives later via [`next_message`](Self::next_message).
    async fn send(&mut self, request: &Request) -> Result<(), CensusError>;

    /// Receive the next JSON message. `Ok(None)` means the peer closed the
    /// connection cleanly.
    async fn next_message(&mut self) -> Result<Option<Value>, CensusError>;
}

/// [`ChainSyncTransport`] over a WebSocket connection to an Ogmios node.
pub struct WsTransport {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

impl WsTransport {
    pub async fn connect(url: &str) -> Result<Self, CensusError> {
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| CensusError::Transport(format!("connect {url}: {e}")))?;
        tracing::info!(url, "connected to node");
        let (sink, stream) = ws.split();
        Ok(Self { sink, stream })
    }
}

#[async_trait]
impl ChainSyncTransport for WsTransport {
    async fn send(&mut self, request: &Request) -> Result<(), CensusError> {
        let text = serde_json::to_string(request)?;
        self.sink
            .send(Message::Text(text))
            .await
            .map_err(|e| CensusError::Transport(format!("send {}: {e}", request.method())))
    }

    async fn next_message(&mut self) -> Result<Option<Value>, CensusError> {
        while let Some(frame) = self.stream.next().await {
            let frame = frame.map_err(|e| CensusError::Transport(format!("receive: {e}")))?;
            match frame {
                Message::Text(text) => return Ok(Some(serde_json::from_str(&text)?)),
                Message::Ping(payload) => {
                    self.sink
                        .send(Message::Pong(payload))
                        .await
                        .map_err(|e| CensusError::Transport(format!("pong: {e}")))?;
                }
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }
}
