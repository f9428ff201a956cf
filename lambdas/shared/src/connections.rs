//! WebSocket connection registry

use tracing::info;

use crate::errors::Result;
use crate::models::Connection;
use crate::store::ConnectionStore;

/// Register a connection. Reconnecting with the same id overwrites.
pub async fn on_connect(store: &dyn ConnectionStore, connection_id: &str) -> Result<Connection> {
    let connection = Connection::new(connection_id);
    store.put_connection(&connection).await?;

    info!(connection_id = %connection_id, "Registered connection");
    Ok(connection)
}

/// Deregister a connection. Unknown ids are not an error.
pub async fn on_disconnect(store: &dyn ConnectionStore, connection_id: &str) -> Result<()> {
    store.delete_connection(connection_id).await?;

    info!(connection_id = %connection_id, "Removed connection");
    Ok(())
}
