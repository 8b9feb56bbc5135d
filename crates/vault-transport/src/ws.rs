//! WebSocket transport implementation

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{Sink, SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use vault_core::{VaultError, VaultResult};
use vault_wire::ticket_frame;

use crate::{data_to_string, Request, Response, TicketTable, Transport};

/// One persistent WebSocket connection to the ledger endpoint.
///
/// A writer task drains an outgoing queue into the socket and a reader task
/// routes every response frame to the request holding its ticket. Once either
/// side stops, the transport reports itself closed and all waiters fail.
pub struct WsTransport {
    url: String,
    outgoing: mpsc::UnboundedSender<Message>,
    tickets: Arc<TicketTable>,
    open: Arc<AtomicBool>,
}

impl WsTransport {
    /// Connect to `url` (ws:// or wss://)
    pub async fn connect(url: &str) -> VaultResult<Self> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| VaultError::Transport(e.to_string()))?;
        tracing::info!(url, "connected to ledger endpoint");

        let (sink, mut source) = stream.split();
        let (outgoing, queue) = mpsc::unbounded_channel::<Message>();
        let tickets = Arc::new(TicketTable::new());
        let open = Arc::new(AtomicBool::new(true));

        tokio::spawn(write_loop(
            sink,
            queue,
            Arc::clone(&open),
            Arc::clone(&tickets),
        ));

        let reader_open = Arc::clone(&open);
        let reader_tickets = Arc::clone(&tickets);
        let reader_url = url.to_string();
        tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                match frame {
                    Ok(Message::Text(text)) => dispatch(&reader_tickets, text.as_bytes()),
                    Ok(Message::Binary(bytes)) => dispatch(&reader_tickets, &bytes),
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("WebSocket receive error: {}", e);
                        break;
                    }
                }
            }
            reader_open.store(false, Ordering::SeqCst);
            reader_tickets.fail_all();
            tracing::info!(url = %reader_url, "ledger connection closed");
        });

        Ok(WsTransport {
            url: url.to_string(),
            outgoing,
            tickets,
            open,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Requests still waiting for a response
    pub fn pending(&self) -> usize {
        self.tickets.len()
    }

    /// Ask the peer to close the connection
    pub fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            let _ = self.outgoing.send(Message::Close(None));
        }
    }

    fn enqueue(&self, message: Message) -> VaultResult<()> {
        if !self.is_open() {
            return Err(VaultError::NotConnected);
        }
        self.outgoing
            .send(message)
            .map_err(|_| VaultError::NotConnected)
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&self, request_type: &str, data: Value) -> VaultResult<Value> {
        if !self.is_open() {
            return Err(VaultError::NotConnected);
        }
        let pending = self.tickets.register();
        let request = Request {
            request_type,
            ticket: pending.ticket(),
            data,
        };
        let text = serde_json::to_string(&request)?;
        tracing::trace!(request_type, ticket = pending.ticket(), "sending request");

        self.enqueue(Message::Text(text))?;
        pending.wait().await
    }

    async fn send_bin(&self, payload: &[u8]) -> VaultResult<String> {
        if !self.is_open() {
            return Err(VaultError::NotConnected);
        }
        let pending = self.tickets.register();
        let frame = ticket_frame(pending.ticket(), payload);
        tracing::trace!(ticket = pending.ticket(), len = frame.len(), "sending binary request");

        self.enqueue(Message::Binary(frame.to_vec()))?;
        pending.wait().await.map(data_to_string)
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Drain the outgoing queue into `sink` until the queue closes, a close frame
/// goes out or a send fails. Outstanding requests fail on exit.
async fn write_loop<S>(
    mut sink: S,
    mut queue: mpsc::UnboundedReceiver<Message>,
    open: Arc<AtomicBool>,
    tickets: Arc<TicketTable>,
) where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    while let Some(message) = queue.recv().await {
        let closing = matches!(message, Message::Close(_));
        if let Err(e) = sink.send(message).await {
            tracing::warn!("WebSocket send error: {}", e);
            break;
        }
        if closing {
            break;
        }
    }
    open.store(false, Ordering::SeqCst);
    tickets.fail_all();
}

fn dispatch(tickets: &TicketTable, raw: &[u8]) {
    match serde_json::from_slice::<Response>(raw) {
        Ok(response) => {
            if !tickets.complete(response.ticket, response.data) {
                tracing::debug!(ticket = response.ticket, "response for unknown ticket dropped");
            }
        }
        Err(e) => tracing::warn!("unparseable response frame: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    /// Echo server: answers JSON requests with "type:data" and binary
    /// requests with the payload length
    async fn spawn_server(close_after: Option<usize>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            let mut handled = 0;
            while let Some(Ok(message)) = ws.next().await {
                let reply = match message {
                    Message::Text(text) => {
                        let req: Value = serde_json::from_str(&text).unwrap();
                        json!({
                            "ticket": req["ticket"],
                            "data": format!("{}:{}", req["type"].as_str().unwrap(), req["data"]),
                        })
                    }
                    Message::Binary(bytes) => {
                        let ticket = i64::from_be_bytes(bytes[..8].try_into().unwrap());
                        json!({ "ticket": ticket, "data": { "len": bytes.len() - 8 } })
                    }
                    _ => continue,
                };
                ws.send(Message::Text(reply.to_string())).await.unwrap();
                handled += 1;
                if Some(handled) == close_after {
                    ws.close(None).await.unwrap();
                    break;
                }
            }
        });

        format!("ws://{}", addr)
    }

    #[tokio::test]
    async fn test_json_request_roundtrip() {
        let url = spawn_server(None).await;
        let transport = WsTransport::connect(&url).await.unwrap();

        let data = transport.send("keys", json!("pally")).await.unwrap();
        assert_eq!(data, json!("keys:\"pally\""));
        assert_eq!(transport.pending(), 0);
    }

    #[tokio::test]
    async fn test_binary_request_roundtrip() {
        let url = spawn_server(None).await;
        let transport = WsTransport::connect(&url).await.unwrap();

        let data = transport.send_bin(&[1, 2, 3]).await.unwrap();
        assert_eq!(data, r#"{"len":3}"#);
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_correlated() {
        let url = spawn_server(None).await;
        let transport = WsTransport::connect(&url).await.unwrap();

        let (a, b, c) = tokio::join!(
            transport.send("blockheight", json!("")),
            transport.send("keys", json!("n1")),
            transport.send_bin(&[0; 10]),
        );
        assert_eq!(a.unwrap(), json!("blockheight:\"\""));
        assert_eq!(b.unwrap(), json!("keys:\"n1\""));
        assert_eq!(c.unwrap(), r#"{"len":10}"#);
    }

    #[tokio::test]
    async fn test_not_connected_after_peer_close() {
        let url = spawn_server(Some(1)).await;
        let transport = WsTransport::connect(&url).await.unwrap();
        transport.send("blockheight", json!("")).await.unwrap();

        for _ in 0..100 {
            if !transport.is_open() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!transport.is_open());
        assert_eq!(
            transport.send("keys", json!("n")).await,
            Err(VaultError::NotConnected)
        );
        assert_eq!(transport.send_bin(&[1]).await, Err(VaultError::NotConnected));
    }

    #[tokio::test]
    async fn test_send_failure_fails_waiting_requests() {
        let tickets = Arc::new(TicketTable::new());
        let open = Arc::new(AtomicBool::new(true));
        let pending = tickets.register();

        let (outgoing, queue) = mpsc::unbounded_channel();
        outgoing.send(Message::Text("{}".into())).unwrap();
        let broken = Box::pin(futures_util::sink::unfold((), |_, _: Message| async {
            Err::<(), _>("socket gone")
        }));

        write_loop(broken, queue, Arc::clone(&open), Arc::clone(&tickets)).await;

        assert!(!open.load(Ordering::SeqCst));
        assert!(tickets.is_empty());
        assert!(matches!(pending.wait().await, Err(VaultError::Transport(_))));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = WsTransport::connect(&format!("ws://{}", addr)).await;
        assert!(matches!(result, Err(VaultError::Transport(_))));
    }
}
