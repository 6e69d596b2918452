use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gleaner::app::AppContext;
use gleaner::cli::{commands, Cli, Commands};
use gleaner::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gleaner=info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sources => {
            commands::list_sources();
        }
        Commands::Locations { source } => {
            commands::list_locations(&source)?;
        }
        Commands::Scrape {
            source,
            keywords,
            locations,
            output,
            proxies,
        } => {
            let mut config = Config::load(cli.config.as_deref())?;
            if let Some(workers) = cli.workers {
                config.http.workers = workers;
            }
            if let Some(proxies) = proxies {
                config.proxy_file = proxies;
            }

            let ctx = AppContext::new(config)?;
            commands::scrape(&ctx, &source, &keywords, &locations, &output).await?;
        }
    }

    Ok(())
}
