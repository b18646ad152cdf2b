use std::time::Duration;

use chefapi_core::{Body, Context, Result};
use chefapi_http_send_reqwest::ReqwestHttpSend;

fn main() -> Result<()> {
    // Build a blocking client with a short timeout and no certificate checks,
    // the way a workstation talks to a self-signed chef-zero.
    let http = ReqwestHttpSend::builder()
        .ssl_verify(false)
        .read_timeout(Duration::from_secs(10))
        .build()?;

    println!("Created HTTP client with:");
    println!("  - 10 second timeout");
    println!("  - certificate verification disabled");

    let ctx = Context::new().with_http_send(http);

    let url = "https://localhost:8889/_status";
    println!("\nTesting HTTP client with GET {url}");

    let req = http::Request::get(url)
        .header("Accept", "application/json")
        .body(Body::Empty)?;

    match ctx.http_send(req) {
        Ok(resp) => {
            println!("Response status: {}", resp.status());
            for (name, value) in resp.headers() {
                println!("  {name}: {value:?}");
            }
            println!("\n{}", String::from_utf8_lossy(resp.body()));
        }
        Err(e) => eprintln!("Request failed: {e}"),
    }

    Ok(())
}
