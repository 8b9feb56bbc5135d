//! Ticket correlation
//!
//! Every outstanding request owns a random 64-bit ticket. The response with
//! the same ticket completes it. A ticket is released when its response
//! arrives or when the waiting side gives up, whichever comes first, so a
//! response after a timeout finds no entry and is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

use vault_core::{VaultError, VaultResult};

/// Outstanding requests keyed by ticket
#[derive(Debug, Default)]
pub struct TicketTable {
    pending: Mutex<HashMap<i64, oneshot::Sender<Value>>>,
}

impl TicketTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request under an unused random ticket
    pub fn register(self: &Arc<Self>) -> PendingTicket {
        let (tx, rx) = oneshot::channel();
        let mut pending = self.pending.lock();
        let ticket = loop {
            let candidate: i64 = rand::random();
            if !pending.contains_key(&candidate) {
                break candidate;
            }
            tracing::debug!(ticket = candidate, "ticket collision, redrawing");
        };
        pending.insert(ticket, tx);
        drop(pending);

        PendingTicket {
            ticket,
            rx,
            table: Arc::clone(self),
        }
    }

    /// Deliver a response. Returns false if no request waits on `ticket`.
    pub fn complete(&self, ticket: i64, data: Value) -> bool {
        match self.pending.lock().remove(&ticket) {
            Some(tx) => tx.send(data).is_ok(),
            None => false,
        }
    }

    /// Drop every outstanding request; their waiters see a closed connection
    pub fn fail_all(&self) {
        let drained: Vec<_> = self.pending.lock().drain().collect();
        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "failing outstanding requests");
        }
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, ticket: i64) {
        self.pending.lock().remove(&ticket);
    }
}

/// Handle held by the requesting side until its response arrives
#[derive(Debug)]
pub struct PendingTicket {
    ticket: i64,
    rx: oneshot::Receiver<Value>,
    table: Arc<TicketTable>,
}

impl PendingTicket {
    pub fn ticket(&self) -> i64 {
        self.ticket
    }

    /// Wait for the response data
    pub async fn wait(mut self) -> VaultResult<Value> {
        (&mut self.rx)
            .await
            .map_err(|_| VaultError::Transport("connection closed before response".into()))
    }
}

impl Drop for PendingTicket {
    fn drop(&mut self) {
        self.table.release(self.ticket);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_complete_delivers_data() {
        let table = Arc::new(TicketTable::new());
        let pending = table.register();
        let ticket = pending.ticket();
        assert_eq!(table.len(), 1);

        assert!(table.complete(ticket, json!("42")));
        assert_eq!(pending.wait().await.unwrap(), json!("42"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_unknown_ticket_is_ignored() {
        let table = Arc::new(TicketTable::new());
        let pending = table.register();
        assert!(!table.complete(pending.ticket().wrapping_add(1), json!(null)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_dropped_waiter_releases_ticket() {
        let table = Arc::new(TicketTable::new());
        let pending = table.register();
        let ticket = pending.ticket();
        drop(pending);

        assert!(table.is_empty());
        // A late response finds nothing to complete
        assert!(!table.complete(ticket, json!("late")));
    }

    #[test]
    fn test_tickets_are_distinct() {
        let table = Arc::new(TicketTable::new());
        let held: Vec<_> = (0..64).map(|_| table.register()).collect();
        let mut tickets: Vec<i64> = held.iter().map(PendingTicket::ticket).collect();
        tickets.sort_unstable();
        tickets.dedup();
        assert_eq!(tickets.len(), 64);
        assert_eq!(table.len(), 64);
    }

    #[tokio::test]
    async fn test_fail_all_closes_waiters() {
        let table = Arc::new(TicketTable::new());
        let pending = table.register();
        table.fail_all();

        assert!(matches!(
            pending.wait().await,
            Err(VaultError::Transport(_))
        ));
    }
}
