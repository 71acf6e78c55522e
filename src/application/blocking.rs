//! Store access off the async worker threads.

use crate::error::StoreError;

/// Run synchronous store I/O on the blocking pool.
pub(crate) async fn store_io<T, F>(task: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| StoreError::Aborted(e.to_string()))?
}
