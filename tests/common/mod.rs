//! Shared utilities for integration tests.

use burrow::{RunningServer, Server, ServerOptions};

/// Options for a server on an ephemeral loopback port.
#[allow(dead_code)]
pub fn local_options() -> ServerOptions {
    ServerOptions {
        host: "127.0.0.1".into(),
        port: "0".into(),
        ..Default::default()
    }
}

/// Start `server` and return its handle plus the base URL.
pub async fn start(mut server: Server) -> (RunningServer, String) {
    let running = server.start().await.expect("server should start");
    let base = format!("http://{}", running.local_addr());
    (running, base)
}

/// A client that never reuses connections, so a dropped connection cannot
/// leak into the next request.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
