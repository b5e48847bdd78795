/* demos/demo.rs */

use forwarded_ip::{AddressRange, ClientIpResolver, HeaderMap, request_ip};
use std::net::Ipv4Addr;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    println!("=== Forwarded IP Resolution Examples ===\n");

    // Example 1: Single public address
    example_1_single_address();

    // Example 2: Proxy chain, rightmost public address wins
    example_2_proxy_chain();

    // Example 3: X-Real-Ip used when X-Forwarded-For has nothing usable
    example_3_real_ip();

    // Example 4: Nothing usable, loopback fallback
    example_4_fallback();

    // Example 5: Custom resolver configuration
    example_5_custom_resolver();

    println!("=== All examples completed! ===");
}

fn example_1_single_address() {
    println!("Example 1: Single public address");

    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for".to_string(), "8.8.8.8".to_string());

    println!("Resolved IP: {}", request_ip(&headers));
    println!();
}

fn example_2_proxy_chain() {
    println!("Example 2: X-Forwarded-For proxy chain");

    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for".to_string(),
        "203.0.113.1, 198.51.100.20, 10.0.0.5".to_string(),
    );

    println!("Resolved IP (rightmost public): {}", request_ip(&headers));
    println!();
}

fn example_3_real_ip() {
    println!("Example 3: X-Real-Ip after an unusable X-Forwarded-For");

    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for".to_string(),
        "not-an-ip, 192.168.1.10".to_string(),
    );
    headers.insert("x-real-ip".to_string(), "198.51.100.42".to_string());

    println!("Resolved IP: {}", request_ip(&headers));
    println!();
}

fn example_4_fallback() {
    println!("Example 4: Fallback");

    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for".to_string(), "127.0.0.1, 172.16.4.4".to_string());

    println!("Resolved IP: {}", request_ip(&headers));
    println!();
}

fn example_5_custom_resolver() {
    println!("Example 5: Custom resolver configuration");

    let mut headers = HeaderMap::new();
    headers.insert("cf-connecting-ip".to_string(), "203.0.113.200".to_string());
    headers.insert("x-forwarded-for".to_string(), "198.51.100.7".to_string());

    let documentation = match AddressRange::new(
        Ipv4Addr::new(203, 0, 113, 0),
        Ipv4Addr::new(203, 0, 114, 0),
    ) {
        Ok(range) => range,
        Err(e) => {
            println!("Invalid range: {}", e);
            return;
        }
    };

    let resolver = match ClientIpResolver::new()
        .with_headers(vec![
            "CF-Connecting-IP".to_string(),
            "X-Forwarded-For".to_string(),
        ])
        .with_private_ranges(vec![documentation])
        .parse_fallback("192.0.2.1")
    {
        Ok(resolver) => resolver,
        Err(e) => {
            println!("Invalid fallback: {}", e);
            return;
        }
    };

    println!("Custom resolver result: {}", resolver.resolve(&headers));
    println!(
        "Default resolver result: {}",
        ClientIpResolver::default().resolve(&headers)
    );
    println!();
}
