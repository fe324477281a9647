//! Best-effort execution for remote delivery
//!
//! Forwarding a snapshot is a convenience next to the live table: a refused
//! connection or an error status from the collector is logged once and then
//! forgotten. Nothing here retries.

use std::future::Future;
use tracing::warn;

use crate::Result;

/// Await `f`, turning an error into a `warn!` event and `None`
///
/// `operation` names the work in the log event, e.g. `keeper::store`.
///
/// ```no_run
/// use perfstat_core::fail_open::fail_open;
/// use perfstat_core::Result;
///
/// async fn store() -> Result<()> {
///     Ok(())
/// }
///
/// async fn example() {
///     let delivered = fail_open("keeper::store", store).await.is_some();
/// }
/// ```
pub async fn fail_open<F, Fut, T>(operation: &str, f: F) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    f().await
        .inspect_err(|error| warn!(operation, %error, "best-effort operation failed"))
        .ok()
}
