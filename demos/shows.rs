//! Prints the shows of a year. Requires `PHISH_API_KEY`.
//!
//! ```sh
//! PHISH_API_KEY=... RUST_LOG=debug cargo run --example shows --features tracing -- 1997
//! ```

#![expect(clippy::print_stdout, reason = "demo writes results to stdout")]

use phishnet_client::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let year = std::env::args()
        .nth(1)
        .map(|y| y.parse::<i32>())
        .transpose()?
        .unwrap_or(1997);

    let client = Client::from_env()?;
    let shows = client.shows_by_year(year)?;
    info!(
        year,
        count = shows.shows.len(),
        truncated = shows.is_truncated(),
        "fetched shows"
    );

    for show in shows.shows {
        println!(
            "{} {}",
            show["showdate"].as_str().unwrap_or("?"),
            show["venue"].as_str().unwrap_or_default()
        );
    }

    Ok(())
}
