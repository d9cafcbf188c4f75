use anyhow::Result;
use clap::Parser;
use ecoscan::cli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    if let Err(err) = cli::dispatch(args).await {
        // Not tracing: errors can occur before the subscriber exists and
        // must still reach the user.
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
    Ok(())
}
