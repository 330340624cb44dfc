//! Filesystem work kept off the async runtime.

use std::io;

/// Run `f` on tokio's blocking pool and wait for it.
///
/// A panic inside `f` comes back as an `io::Error` instead of unwinding
/// into the caller.
pub async fn run_blocking<T, E, F>(f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<io::Error> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| E::from(io::Error::other(e)))?
}
