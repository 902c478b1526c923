//! Proxy health check

use crate::client::ProxyClient;
use anyhow::Result;
use console::style;

pub async fn run(proxy: &str) -> Result<()> {
    let client = ProxyClient::new(proxy)?;
    let health = client.health().await?;

    let service = health["service"].as_str().unwrap_or("unknown");
    let version = health["version"].as_str().unwrap_or("?");
    let backend = health["backend_url"].as_str().unwrap_or("?");

    println!("{} {} {}", style("●").green(), style(service).bold(), style(version).dim());
    println!("  {} {}", style("Proxy:").dim(), proxy);
    println!("  {} {}", style("Backend:").dim(), backend);

    Ok(())
}
