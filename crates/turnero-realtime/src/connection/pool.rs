//! Pool of active connections, indexed by ID and by operator.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use super::handle::{ConnectionHandle, ConnectionId};

/// Thread-safe pool of all active socket connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// Connection ID → handle.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    /// Operator ID → connection handles (authenticated only).
    by_operator: DashMap<Uuid, Vec<Arc<ConnectionHandle>>>,
}

impl ConnectionPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle.clone());
        if let Some(operator_id) = handle.operator_id() {
            self.by_operator.entry(operator_id).or_default().push(handle);
        }
    }

    /// Removes a connection, returning its handle.
    pub fn remove(&self, conn_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(&conn_id)?;
        if let Some(operator_id) = handle.operator_id() {
            if let Some(mut connections) = self.by_operator.get_mut(&operator_id) {
                connections.retain(|c| c.id != conn_id);
                if connections.is_empty() {
                    drop(connections);
                    self.by_operator.remove(&operator_id);
                }
            }
        }
        Some(handle)
    }

    /// Looks up a connection by ID.
    pub fn get(&self, conn_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(&conn_id).map(|entry| entry.value().clone())
    }

    /// All connections of an operator, oldest first.
    pub fn operator_connections(&self, operator_id: Uuid) -> Vec<Arc<ConnectionHandle>> {
        self.by_operator
            .get(&operator_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;
    use turnero_auth::OperatorRole;
    use turnero_service::context::OperatorContext;

    use super::*;

    fn handle(operator_id: Option<Uuid>) -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::channel(1);
        let identity = operator_id
            .map(|id| OperatorContext::new(id, "Ana".to_string(), OperatorRole::Operator));
        Arc::new(ConnectionHandle::new(identity, tx))
    }

    #[test]
    fn indexes_authenticated_connections_by_operator() {
        let pool = ConnectionPool::new();
        let operator_id = Uuid::new_v4();

        let first = handle(Some(operator_id));
        let second = handle(Some(operator_id));
        let anonymous = handle(None);
        pool.add(first.clone());
        pool.add(second.clone());
        pool.add(anonymous.clone());

        assert_eq!(pool.connection_count(), 3);
        assert_eq!(pool.operator_connections(operator_id).len(), 2);

        pool.remove(first.id);
        assert_eq!(pool.operator_connections(operator_id).len(), 1);
        pool.remove(second.id);
        assert!(pool.operator_connections(operator_id).is_empty());
        assert!(pool.get(anonymous.id).is_some());
    }
}
