//! Blog reads work without an API key.

#![expect(clippy::print_stdout, reason = "demo writes results to stdout")]

use phishnet_client::{Client, ClientConfig, Params};

fn main() -> anyhow::Result<()> {
    let client = Client::new(ClientConfig::default())?;
    let raw = client.request("blog/get", Params::new())?;
    println!("{raw}");

    Ok(())
}
