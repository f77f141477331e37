use anyhow::Context;
use bookshop_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Bookshop catalog service
#[derive(Debug, Parser)]
#[command(name = "bookshop", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Print the resolved settings as JSON
    Config,
    /// Print the merged OpenAPI document
    Openapi,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshop settings")?;

    match cli.command {
        Command::Serve => {
            bookshop_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "bookshop serve starting");
            bookshop_app::run(settings).await
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
        Command::Openapi => {
            let registry = bookshop_app::build_registry(&settings).await?;
            let document = bookshop_http::router::openapi_document(&registry);
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
    }
}
