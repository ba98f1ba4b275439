//! Demo backend for trying the balancer locally.
//!
//! ```text
//! cargo run --example mock_backend -- 8081
//! cargo run --example mock_backend -- 8082
//! cargo run -- --backend http://127.0.0.1:8081 --backend http://127.0.0.1:8082
//! ```

use axum::{extract::Request, routing::get, Router};
use std::net::SocketAddr;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let port: u16 = std::env::args()
        .nth(1)
        .map(|p| p.parse())
        .transpose()?
        .unwrap_or(8081);

    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route(
            "/slow",
            get(move || async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                format!("Slow response from backend on port {}\n", port)
            }),
        )
        .fallback(move |request: Request| async move {
            println!("[{}] {} {}", port, request.method(), request.uri().path());
            format!(
                "Response from backend server\nPort: {}\nPath: {}\n",
                port,
                request.uri().path()
            )
        });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("Backend server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
