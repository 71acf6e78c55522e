use alto_tracker::adapter::inbound::cli::command::Cli;
use alto_tracker::adapter::inbound::cli::{execute, output};
use clap::Parser;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = execute(cli).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
