//! Helpers for tests that need a real HTTP upstream.

use anyhow::Context as _;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// An axum app served on an ephemeral localhost port.
///
/// The server shuts down gracefully when this handle is dropped.
pub struct TestServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// `http://127.0.0.1:<port>`, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Serve `app` on `127.0.0.1:0` in a background task.
///
/// # Errors
///
/// Returns an error if binding the listener or reading its local address fails.
pub async fn spawn_router(app: Router) -> anyhow::Result<TestServer> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind ephemeral port")?;
    let addr = listener.local_addr().context("read local addr")?;

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    Ok(TestServer {
        base_url: format!("http://{addr}"),
        shutdown: Some(tx),
    })
}
