//! Throwaway HTTP backend for tests.

use std::net::SocketAddr;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct MockBackend {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl MockBackend {
    /// Serves `router` on an ephemeral localhost port until dropped.
    pub async fn start(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self { addr, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
