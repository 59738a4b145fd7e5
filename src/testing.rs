//! Test helpers: stub upstream servers on ephemeral ports.

use axum::Router;
use tokio::net::TcpListener;

/// Serve `app` on 127.0.0.1 with an OS-assigned port, returning `http://addr`.
pub async fn spawn_upstream(app: Router) -> String {
    // ---
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub upstream");
    let addr = listener.local_addr().expect("stub upstream addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub upstream server");
    });

    format!("http://{addr}")
}

/// URL of a port that was just released, so connections are refused.
pub fn closed_port_url() -> String {
    // ---
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    let addr = listener.local_addr().expect("probe port addr");
    drop(listener);

    format!("http://{addr}/weather")
}
