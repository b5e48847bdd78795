/* demos/axum.rs */

use axum::{Router, extract::ConnectInfo, response::Json, routing::get};
use forwarded_ip::{ClientIp, ClientIpLayer, ClientIpResolver, is_private_subnet};
use serde_json::json;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = create_app();
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();

    println!("Server starting on http://localhost:3000");
    println!("Test endpoints:");
    println!("  • GET /ip            - JSON response with the resolved client IP");
    println!("  • GET /cloudflare/   - Resolver that reads CF-Connecting-IP first");
    println!("  • GET /debug         - Forwarding headers next to the socket address");
    println!();
    println!("Test with headers:");
    println!("  curl -H 'X-Forwarded-For: 198.51.100.1, 192.168.1.1' http://localhost:3000/ip");
    println!("  curl -H 'X-Real-Ip: 203.0.113.42' http://localhost:3000/ip");
    println!("  curl -H 'CF-Connecting-IP: 192.0.2.100' http://localhost:3000/cloudflare/");
    println!();

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}

fn create_app() -> Router {
    let default_router = Router::new()
        .route("/ip", get(ip_handler))
        .layer(ClientIpLayer::default());

    let cloudflare = ClientIpResolver::new().with_headers(vec![
        "CF-Connecting-IP".to_string(),
        "X-Forwarded-For".to_string(),
        "X-Real-Ip".to_string(),
    ]);
    let cloudflare_router = Router::new()
        .route("/", get(ip_handler))
        .layer(ClientIpLayer::with_resolver(cloudflare));

    Router::new()
        .merge(default_router)
        .nest("/cloudflare", cloudflare_router)
        .route("/debug", get(debug_handler))
}

/// Handler that returns IP information in JSON format
async fn ip_handler(ClientIp(ip): ClientIp) -> Json<serde_json::Value> {
    Json(json!({
        "client_ip": ip.to_string(),
        "ip_version": match ip {
            std::net::IpAddr::V4(_) => "IPv4",
            std::net::IpAddr::V6(_) => "IPv6",
        },
        "is_loopback": ip.is_loopback(),
        "is_private": is_private_subnet(ip),
    }))
}

/// Debug handler showing the forwarding headers and the socket address
async fn debug_handler(
    client_ip: ClientIp,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: axum::http::HeaderMap,
) -> Json<serde_json::Value> {
    let forwarding: std::collections::HashMap<&str, String> = ["x-forwarded-for", "x-real-ip"]
        .into_iter()
        .filter_map(|name| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(|value| (name, value.to_string()))
        })
        .collect();

    Json(json!({
        "resolved_client_ip": client_ip.ip().to_string(),
        "remote_addr": addr.to_string(),
        "forwarding_headers": forwarding,
        "matches_connection": client_ip.ip() == addr.ip(),
    }))
}
